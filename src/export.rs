//! Export Pipeline - Single Entry Point
//!
//! `Exporter::export` is the only way to produce a document. It always
//! restores the view it was given, and a failure always ends in the print
//! fallback rather than an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::charts::ChartData;
use crate::hashing::project_fingerprint;
use crate::model::Project;
use crate::print::{PageSpec, Placement};
use crate::ENGINE_VERSION;

pub const EXPORT_SUFFIX: &str = "_estimate.pdf";

pub const FALLBACK_NOTICE: &str = "Error generating PDF. Falling back to browser print dialog.";

/// `"Custom Bookshelf"` -> `custom_bookshelf_estimate.pdf`. Every character
/// outside `[a-zA-Z0-9]` becomes one underscore.
pub fn export_filename(project_name: &str) -> String {
    let stem: String = project_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect();
    format!("{stem}{EXPORT_SUFFIX}")
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Chart library not ready after {0} attempts")]
    ChartsUnavailable(u32),

    #[error("Chart rendering failed: {0}")]
    ChartRender(String),

    #[error("Printable area not found")]
    PrintableAreaMissing,

    #[error("Snapshot failed: {0}")]
    Snapshot(String),

    #[error("Failed to save document: {0}")]
    Save(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Inline display value of a view element. `Unset` means no inline override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayMode {
    Unset,
    None,
    Block,
    Flex,
    Inline,
}

pub type ElementId = usize;

/// What presentation mode does to an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportRole {
    /// Interactive chrome, hidden in the document.
    Hidden,
    /// Export-only content, shown with the given display.
    Shown(DisplayMode),
}

/// Rasterized printable area.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// Single-page document handed to the platform for saving.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub page: PageSpec,
    pub placement: Placement,
    pub image: Snapshot,
}

/// The rendered estimate view.
pub trait ViewSurface {
    fn export_elements(&self) -> Vec<(ElementId, ExportRole)>;
    fn display(&self, element: ElementId) -> DisplayMode;
    fn set_display(&mut self, element: ElementId, mode: DisplayMode);
    fn set_chart_container_visible(&mut self, visible: bool);
    fn set_progress_visible(&mut self, visible: bool);
    fn snapshot(&mut self, scale: f64) -> Result<Snapshot, ExportError>;
}

/// Chart library that may finish loading after the view does.
pub trait ChartBackend {
    fn is_ready(&self) -> bool;
    fn draw(&mut self, charts: &ChartData) -> Result<(), ExportError>;
}

/// Host services: file save, user notification, native print dialog.
pub trait Platform {
    fn save(&mut self, filename: &str, document: &Document) -> Result<(), ExportError>;
    fn notify(&mut self, message: &str);
    fn print(&mut self);
}

/// Presentation mode for the duration of a snapshot.
///
/// Entering hides interactive elements, shows export-only ones, the chart
/// container and the progress overlay. Dropping puts every touched element
/// back, whichever way the scope is left.
pub struct PresentationMode<'v, V: ViewSurface + ?Sized> {
    view: &'v mut V,
    saved: Vec<(ElementId, DisplayMode)>,
}

impl<'v, V: ViewSurface + ?Sized> PresentationMode<'v, V> {
    pub fn enter(view: &'v mut V) -> Self {
        view.set_progress_visible(true);

        let elements = view.export_elements();
        let mut saved = Vec::with_capacity(elements.len());
        for (element, role) in elements {
            saved.push((element, view.display(element)));
            let mode = match role {
                ExportRole::Hidden => DisplayMode::None,
                ExportRole::Shown(mode) => mode,
            };
            view.set_display(element, mode);
        }
        view.set_chart_container_visible(true);

        Self { view, saved }
    }
}

impl<V: ViewSurface + ?Sized> Deref for PresentationMode<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.view
    }
}

impl<V: ViewSurface + ?Sized> DerefMut for PresentationMode<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.view
    }
}

impl<V: ViewSurface + ?Sized> Drop for PresentationMode<'_, V> {
    fn drop(&mut self) {
        // Reverse order so an element listed twice ends on its first saved value.
        for (element, mode) in self.saved.drain(..).rev() {
            self.view.set_display(element, mode);
        }
        self.view.set_chart_container_visible(false);
        self.view.set_progress_visible(false);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportTimings {
    pub poll_interval: Duration,
    /// Readiness probes before giving up. At least one probe is always made.
    pub max_polls: u32,
    /// Pause after drawing charts.
    pub chart_settle: Duration,
    /// Pause before the snapshot for layout to catch up.
    pub layout_settle: Duration,
}

impl Default for ExportTimings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_polls: 100,
            chart_settle: Duration::from_millis(300),
            layout_settle: Duration::from_millis(200),
        }
    }
}

impl ExportTimings {
    /// No sleeping at all.
    pub fn immediate() -> Self {
        Self {
            poll_interval: Duration::ZERO,
            chart_settle: Duration::ZERO,
            layout_settle: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Poll until the backend is ready. Returns the probe count that succeeded.
pub fn wait_until_ready<C: ChartBackend + ?Sized>(
    backend: &C,
    timings: &ExportTimings,
) -> Result<u32, ExportError> {
    let max_polls = timings.max_polls.max(1);
    for attempt in 1..=max_polls {
        if backend.is_ready() {
            return Ok(attempt);
        }
        tracing::debug!(attempt, "chart library not ready, retrying");
        if attempt < max_polls {
            thread::sleep(timings.poll_interval);
        }
    }
    Err(ExportError::ChartsUnavailable(max_polls))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportManifest {
    pub id: String,
    pub filename: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub fingerprint: String,
    pub page: PageSpec,
    pub placement: Placement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExportOutcome {
    Saved(ExportManifest),
    /// Export failed and the native print dialog was opened instead.
    PrintFallback { reason: String },
    /// Another export was already running.
    Skipped,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Document exporter. At most one export runs at a time per exporter.
pub struct Exporter {
    page: PageSpec,
    timings: ExportTimings,
    in_flight: AtomicBool,
}

impl Exporter {
    pub fn new(page: PageSpec, timings: ExportTimings) -> Self {
        Self {
            page,
            timings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_exporting(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    /// Export the view of `project` as a document.
    ///
    /// Never fails: errors are reported through `platform` and answered with
    /// the print fallback. The view is restored on every path.
    pub fn export<V, C, P>(
        &self,
        project: &Project,
        charts: &ChartData,
        view: &mut V,
        backend: &mut C,
        platform: &mut P,
    ) -> ExportOutcome
    where
        V: ViewSurface + ?Sized,
        C: ChartBackend + ?Sized,
        P: Platform + ?Sized,
    {
        let Some(_in_flight) = self.begin() else {
            tracing::warn!("export already in progress, ignoring request");
            return ExportOutcome::Skipped;
        };

        let filename = export_filename(&project.details.name);
        tracing::info!(%filename, "exporting estimate");

        let mut view = PresentationMode::enter(view);
        match self.render(project, charts, &filename, &mut *view, &mut *backend, &mut *platform) {
            Ok(manifest) => {
                tracing::info!(filename = %manifest.filename, fingerprint = %manifest.fingerprint, "estimate exported");
                ExportOutcome::Saved(manifest)
            }
            Err(err) => {
                tracing::error!(error = %err, "export failed, falling back to print");
                platform.notify(FALLBACK_NOTICE);
                platform.print();
                ExportOutcome::PrintFallback { reason: err.to_string() }
            }
        }
    }

    fn render<V, C, P>(
        &self,
        project: &Project,
        charts: &ChartData,
        filename: &str,
        view: &mut V,
        backend: &mut C,
        platform: &mut P,
    ) -> Result<ExportManifest, ExportError>
    where
        V: ViewSurface + ?Sized,
        C: ChartBackend + ?Sized,
        P: Platform + ?Sized,
    {
        wait_until_ready(backend, &self.timings)?;
        backend.draw(charts)?;
        thread::sleep(self.timings.chart_settle);
        thread::sleep(self.timings.layout_settle);

        let image = view.snapshot(self.page.snapshot_scale)?;
        let placement = self.page.place(image.width, image.height);

        let manifest = ExportManifest {
            id: Uuid::new_v4().to_string(),
            filename: filename.to_string(),
            created_at: Utc::now(),
            engine_version: ENGINE_VERSION.to_string(),
            fingerprint: project_fingerprint(project)?,
            page: self.page,
            placement,
        };

        let document = Document {
            page: self.page,
            placement,
            image,
        };
        platform.save(filename, &document)?;

        Ok(manifest)
    }
}

impl Default for Exporter {
    fn default() -> Self {
        Self::new(PageSpec::default(), ExportTimings::default())
    }
}
