//! Estimate Invariant Tests
//!
//! These tests pin down the pricing rules and the export guarantees.

use std::collections::HashMap;

use woodworks_core::{
    chart_data, estimate,
    export::{
        ChartBackend, DisplayMode, Document, ElementId, ExportError, ExportRole, ExportTimings,
        Platform, Snapshot, ViewSurface, FALLBACK_NOTICE,
    },
    export_filename,
    print::PageSpec,
    session::{sample_project, CostField, FinancialField},
    CostSection, EstimatorConfig, ExportOutcome, Exporter, LumberType, Session,
};

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn sample_session() -> Session {
    Session::with_sample(&EstimatorConfig::default())
}

#[test]
fn invariant_end_to_end_example() {
    let mut session = sample_session();
    let totals = session.estimate().clone();

    assert!(close(totals.material_subtotal, 10.0));
    assert!(close(totals.labor_subtotal, 60.0));
    assert!(close(totals.overhead_subtotal, 20.0));

    let two_by_four = totals.cut_list(&LumberType::new("2x4")).unwrap();
    assert_eq!(two_by_four.total_length, 468.0);
    assert_eq!(two_by_four.boards_needed, 5.0);
    assert!(close(two_by_four.total_cost, 19.65));
    assert!(close(totals.cut_list_total_cost, 19.65));

    assert!(close(totals.total_material_cost, 29.65));
    assert!(close(totals.subtotal_cost, 109.65));
    assert!(close(totals.sales_tax_amount, 14.2545));
    assert!(close(totals.total_cost, 181.7645));
    assert_eq!(totals.total_hours, 4.0);
    assert!(close(totals.profit_per_hour, 18.215));
}

#[test]
fn invariant_tax_excludes_profit_and_shipping() {
    let mut session = Session::new(&EstimatorConfig::default());
    session.add_cost_row(CostSection::Materials);
    session.update_cost_row(CostSection::Materials, 0, CostField::UnitPrice, "100");
    session.update_cost_row(CostSection::Materials, 0, CostField::Quantity, "1");
    session.set_financial(FinancialField::SalesTaxRate, "13");

    for (profit, shipping) in [("0", "0"), ("500", "0"), ("0", "75"), ("1000", "250")] {
        session.set_financial(FinancialField::ProfitMargin, profit);
        session.set_financial(FinancialField::ShippingCost, shipping);
        let totals = session.estimate();
        assert!(close(totals.subtotal_cost, 100.0));
        assert!(close(totals.sales_tax_amount, 13.0));
    }
}

#[test]
fn invariant_profit_per_hour_zero_without_hours() {
    let mut project = sample_project();
    project.labor.clear();
    let totals = estimate(&project);
    assert_eq!(totals.total_hours, 0.0);
    assert_eq!(totals.profit_per_hour, 0.0);
    assert!(totals.total_cost.is_finite());
}

#[test]
fn invariant_unpriced_lumber_costs_nothing() {
    let mut session = sample_session();
    let two_by_four = LumberType::new("2x4");
    session.set_cut_list_unit_price(&two_by_four, "not a price");

    let totals = session.estimate();
    let list = totals.cut_list(&two_by_four).unwrap();
    assert_eq!(list.total_length, 468.0);
    assert_eq!(list.boards_needed, 0.0);
    assert_eq!(list.total_cost, 0.0);
}

#[test]
fn invariant_delete_preserves_order_and_ids() {
    let mut session = sample_session();
    let lumber = LumberType::new("2x4");
    let before: Vec<_> = session.project().cut_list(&lumber).unwrap().rows.clone();

    let removed = session.delete_cut_row(&lumber, 1).unwrap();
    assert_eq!(removed, before[1]);

    let after = &session.project().cut_list(&lumber).unwrap().rows;
    assert_eq!(after.len(), 2);
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1], before[2]);

    let added = session.add_cut_row(&lumber).unwrap();
    assert!(before.iter().all(|row| row.id != added));
}

#[test]
fn invariant_chart_series_filters_and_aligns() {
    let mut project = sample_project();
    project.financials.shipping_cost = 0.0;
    project.financials.profit_margin = -5.0;
    let charts = chart_data(&estimate(&project));

    let labels = charts.breakdown.labels();
    assert!(!labels.contains(&"Shipping Cost"));
    assert!(!labels.contains(&"Profit Margin"));
    assert!(charts.breakdown.values().iter().all(|v| *v > 0.0));

    assert_eq!(charts.usage.labels, vec!["2x4", "1x5", "2x8"]);
    assert_eq!(charts.usage.total_length.len(), 3);
    assert_eq!(charts.usage.total_cost.len(), 3);
    assert_eq!(charts.usage.total_length[0], 468.0);
}

#[test]
fn invariant_export_filename() {
    assert_eq!(export_filename("Custom Bookshelf"), "custom_bookshelf_estimate.pdf");
    assert_eq!(export_filename("A/B  Shelf!"), "a_b__shelf_estimate.pdf");
}

// --- Export ---

#[derive(Default, Clone, PartialEq, Debug)]
struct ViewState {
    displays: HashMap<ElementId, DisplayMode>,
    charts_visible: bool,
    progress_visible: bool,
}

struct TestView {
    state: ViewState,
    fail_snapshot: bool,
    seen_in_snapshot: Option<ViewState>,
}

impl TestView {
    fn new(fail_snapshot: bool) -> Self {
        let mut displays = HashMap::new();
        displays.insert(1, DisplayMode::Unset);
        displays.insert(2, DisplayMode::Block);
        displays.insert(3, DisplayMode::Unset);
        Self {
            state: ViewState { displays, ..Default::default() },
            fail_snapshot,
            seen_in_snapshot: None,
        }
    }
}

impl ViewSurface for TestView {
    fn export_elements(&self) -> Vec<(ElementId, ExportRole)> {
        vec![
            (1, ExportRole::Hidden),
            (2, ExportRole::Hidden),
            (3, ExportRole::Shown(DisplayMode::Flex)),
        ]
    }
    fn display(&self, element: ElementId) -> DisplayMode {
        self.state.displays[&element]
    }
    fn set_display(&mut self, element: ElementId, mode: DisplayMode) {
        self.state.displays.insert(element, mode);
    }
    fn set_chart_container_visible(&mut self, visible: bool) {
        self.state.charts_visible = visible;
    }
    fn set_progress_visible(&mut self, visible: bool) {
        self.state.progress_visible = visible;
    }
    fn snapshot(&mut self, scale: f64) -> Result<Snapshot, ExportError> {
        self.seen_in_snapshot = Some(self.state.clone());
        if self.fail_snapshot {
            return Err(ExportError::PrintableAreaMissing);
        }
        Ok(Snapshot {
            width: (1200.0 * scale) as u32,
            height: (900.0 * scale) as u32,
            png: vec![0x89, b'P', b'N', b'G'],
        })
    }
}

struct TestCharts {
    ready: bool,
    drawn: usize,
}

impl ChartBackend for TestCharts {
    fn is_ready(&self) -> bool {
        self.ready
    }
    fn draw(&mut self, _charts: &woodworks_core::ChartData) -> Result<(), ExportError> {
        self.drawn += 1;
        Ok(())
    }
}

#[derive(Default)]
struct TestPlatform {
    saved: Vec<(String, Document)>,
    notices: Vec<String>,
    prints: usize,
}

impl Platform for TestPlatform {
    fn save(&mut self, filename: &str, document: &Document) -> Result<(), ExportError> {
        self.saved.push((filename.to_string(), document.clone()));
        Ok(())
    }
    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
    fn print(&mut self) {
        self.prints += 1;
    }
}

fn exporter() -> Exporter {
    let timings = ExportTimings { max_polls: 3, ..ExportTimings::immediate() };
    Exporter::new(PageSpec::default(), timings)
}

#[test]
fn invariant_export_success_restores_view() {
    let mut session = sample_session();
    let charts = session.chart_data();
    let mut view = TestView::new(false);
    let before = view.state.clone();
    let mut backend = TestCharts { ready: true, drawn: 0 };
    let mut platform = TestPlatform::default();

    let outcome = exporter().export(session.project(), &charts, &mut view, &mut backend, &mut platform);

    let manifest = match outcome {
        ExportOutcome::Saved(manifest) => manifest,
        other => panic!("expected a saved document, got {other:?}"),
    };
    assert_eq!(manifest.filename, "custom_bookshelf_estimate.pdf");
    assert_eq!(manifest.fingerprint.len(), 64);
    assert_eq!(platform.saved.len(), 1);
    assert_eq!(platform.saved[0].0, "custom_bookshelf_estimate.pdf");
    assert_eq!(platform.saved[0].1.image.width, 1800);
    assert_eq!(platform.prints, 0);
    assert_eq!(backend.drawn, 1);

    let during = view.seen_in_snapshot.clone().unwrap();
    assert_eq!(during.displays[&1], DisplayMode::None);
    assert_eq!(during.displays[&2], DisplayMode::None);
    assert_eq!(during.displays[&3], DisplayMode::Flex);
    assert!(during.charts_visible);
    assert!(during.progress_visible);

    assert_eq!(view.state, before);
}

#[test]
fn invariant_export_failure_falls_back_and_restores() {
    let project = sample_project();
    let mut view = TestView::new(true);
    let before = view.state.clone();
    let mut backend = TestCharts { ready: true, drawn: 0 };
    let mut platform = TestPlatform::default();

    let outcome = exporter().export(&project, &Default::default(), &mut view, &mut backend, &mut platform);

    assert_eq!(
        outcome,
        ExportOutcome::PrintFallback { reason: "Printable area not found".to_string() }
    );
    assert!(platform.saved.is_empty());
    assert_eq!(platform.notices, vec![FALLBACK_NOTICE.to_string()]);
    assert_eq!(platform.prints, 1);
    assert_eq!(view.state, before);
}

#[test]
fn invariant_charts_never_ready_falls_back_and_restores() {
    let project = sample_project();
    let mut view = TestView::new(false);
    let before = view.state.clone();
    let mut backend = TestCharts { ready: false, drawn: 0 };
    let mut platform = TestPlatform::default();

    let outcome = exporter().export(&project, &Default::default(), &mut view, &mut backend, &mut platform);

    assert!(matches!(outcome, ExportOutcome::PrintFallback { ref reason } if reason.contains("3 attempts")));
    assert_eq!(backend.drawn, 0);
    assert!(view.seen_in_snapshot.is_none());
    assert_eq!(platform.prints, 1);
    assert_eq!(view.state, before);
}
