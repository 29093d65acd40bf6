//! Estimating Session
//!
//! Owns the one project being edited. Every mutation bumps a revision; the
//! derived estimate is recomputed lazily, at most once per revision.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::charts::{self, ChartData};
use crate::coerce::{coerce_number, lenient_number, lenient_optional_number};
use crate::config::EstimatorConfig;
use crate::model::{
    CostLineItem, CostSection, CutListRow, IdAllocator, LumberType, Project, ProjectDetails, RowId,
};
use crate::pricing::{self, EstimateTotals};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Failed to read project: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid project file: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostField {
    Item,
    Description,
    UnitPrice,
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutField {
    Length,
    Quantity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialField {
    ProfitMargin,
    SalesTaxRate,
    ShippingCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailField {
    Name,
    Date,
    CustomerName,
    CustomerPhone,
    CustomerEmail,
}

struct CachedEstimate {
    revision: u64,
    totals: EstimateTotals,
}

pub struct Session {
    project: Project,
    ids: IdAllocator,
    revision: u64,
    cache: Option<CachedEstimate>,
    recomputations: u64,
}

fn today() -> String {
    chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

impl Session {
    /// Empty project with one cut list per configured lumber type.
    pub fn new(config: &EstimatorConfig) -> Self {
        let project = Project {
            details: ProjectDetails {
                date: today(),
                ..Default::default()
            },
            materials: vec![],
            labor: vec![],
            overhead: vec![],
            cut_lists: config.lumber.iter().map(|spec| spec.empty_cut_list()).collect(),
            financials: config.financials,
            notes: String::new(),
        };

        Self {
            project,
            ids: IdAllocator::new(),
            revision: 0,
            cache: None,
            recomputations: 0,
        }
    }

    /// The built-in "Custom Bookshelf" project.
    pub fn with_sample(config: &EstimatorConfig) -> Self {
        let mut session = Self::new(config);
        session.project.details = ProjectDetails {
            name: "Custom Bookshelf".to_string(),
            date: today(),
            customer_name: "Jane Doe".to_string(),
            customer_phone: "555-1234".to_string(),
            customer_email: "jane.doe@example.com".to_string(),
        };

        session.push_cost_row(CostSection::Materials, "Screws", "box of screws", 10.0, 1.0);
        session.push_cost_row(CostSection::Labor, "DIY Cutting, Shopping, Assembly", "", 15.0, 2.0);
        session.push_cost_row(CostSection::Labor, "Sanding", "", 15.0, 2.0);
        session.push_cost_row(CostSection::Overhead, "Tools and equipment", "", 5.0, 4.0);

        let two_by_four = LumberType::new("2x4");
        for (length, quantity) in [(58.0, 4.0), (60.0, 2.0), (29.0, 4.0)] {
            session.push_cut_row(&two_by_four, length, quantity);
        }

        session
    }

    /// Build a session from a project file, keeping the configured catalog.
    pub fn from_file(config: &EstimatorConfig, file: ProjectFile) -> Self {
        let mut session = Self::new(config);
        let mut details = file.details;
        if details.date.is_empty() {
            details.date = today();
        }
        session.project.details = details;
        session.project.notes = file.notes;

        for (section, rows) in [
            (CostSection::Materials, file.materials),
            (CostSection::Labor, file.labor),
            (CostSection::Overhead, file.overhead),
        ] {
            for row in rows {
                session.push_cost_row(section, &row.item, &row.description, row.unit_price, row.quantity);
            }
        }

        for (key, input) in file.cut_lists {
            let lumber = LumberType::new(key);
            let Some(list) = session.project.cut_list_mut(&lumber) else {
                tracing::warn!(lumber = %lumber, "ignoring cut list for unconfigured lumber type");
                continue;
            };
            if let Some(description) = input.description {
                list.description = description;
            }
            if let Some(unit_price) = input.unit_price {
                list.unit_price = unit_price;
            }
            for row in input.rows {
                session.push_cut_row(&lumber, row.length, row.quantity);
            }
        }

        if let Some(financials) = file.financials {
            let current = &mut session.project.financials;
            current.profit_margin = financials.profit_margin.unwrap_or(current.profit_margin);
            current.sales_tax_rate = financials.sales_tax_rate.unwrap_or(current.sales_tax_rate);
            current.shipping_cost = financials.shipping_cost.unwrap_or(current.shipping_cost);
        }

        session
    }

    pub fn load_project(config: &EstimatorConfig, path: &Path) -> Result<Self, ProjectError> {
        let content = fs::read_to_string(path)?;
        let file: ProjectFile = serde_json::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded project file");
        Ok(Self::from_file(config, file))
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn into_project(self) -> Project {
        self.project
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// How many times the estimate has actually been derived.
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    /// Totals for the current revision, derived on first read after a change.
    pub fn estimate(&mut self) -> &EstimateTotals {
        let revision = self.revision;
        if self.cache.as_ref().is_some_and(|cached| cached.revision != revision) {
            self.cache = None;
        }

        let project = &self.project;
        let recomputations = &mut self.recomputations;
        &self
            .cache
            .get_or_insert_with(|| {
                tracing::debug!(revision, "recomputing estimate");
                *recomputations += 1;
                CachedEstimate {
                    revision,
                    totals: pricing::estimate(project),
                }
            })
            .totals
    }

    pub fn chart_data(&mut self) -> ChartData {
        charts::chart_data(self.estimate())
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    fn push_cost_row(&mut self, section: CostSection, item: &str, description: &str, unit_price: f64, quantity: f64) {
        let row = CostLineItem {
            id: self.ids.next_id(),
            item: item.to_string(),
            description: description.to_string(),
            unit_price,
            quantity,
        };
        self.project.section_mut(section).push(row);
        self.touch();
    }

    fn push_cut_row(&mut self, lumber: &LumberType, length: f64, quantity: f64) -> Option<RowId> {
        let list = self.project.cut_list_mut(lumber)?;
        let id = self.ids.next_id();
        list.rows.push(CutListRow { id, length, quantity });
        self.touch();
        Some(id)
    }

    // --- Line items ---

    pub fn add_cost_row(&mut self, section: CostSection) -> RowId {
        let id = self.ids.next_id();
        self.project.section_mut(section).push(CostLineItem::empty(id));
        self.touch();
        id
    }

    /// Set one field from raw input. Numeric fields are coerced.
    pub fn update_cost_row(&mut self, section: CostSection, index: usize, field: CostField, value: &str) -> bool {
        let Some(row) = self.project.section_mut(section).get_mut(index) else {
            tracing::warn!(?section, index, "cost row index out of range");
            return false;
        };
        match field {
            CostField::Item => row.item = value.to_string(),
            CostField::Description => row.description = value.to_string(),
            CostField::UnitPrice => row.unit_price = coerce_number(value),
            CostField::Quantity => row.quantity = coerce_number(value),
        }
        self.touch();
        true
    }

    pub fn delete_cost_row(&mut self, section: CostSection, index: usize) -> Option<CostLineItem> {
        let rows = self.project.section_mut(section);
        if index >= rows.len() {
            tracing::warn!(?section, index, "cost row index out of range");
            return None;
        }
        let removed = rows.remove(index);
        self.touch();
        Some(removed)
    }

    // --- Cut lists ---

    pub fn set_cut_list_description(&mut self, lumber: &LumberType, description: &str) -> bool {
        let Some(list) = self.project.cut_list_mut(lumber) else {
            tracing::warn!(lumber = %lumber, "unknown lumber type");
            return false;
        };
        list.description = description.to_string();
        self.touch();
        true
    }

    pub fn set_cut_list_unit_price(&mut self, lumber: &LumberType, value: &str) -> bool {
        let Some(list) = self.project.cut_list_mut(lumber) else {
            tracing::warn!(lumber = %lumber, "unknown lumber type");
            return false;
        };
        list.unit_price = coerce_number(value);
        self.touch();
        true
    }

    /// Append a `0 x 1` row. `None` if the lumber type is not configured.
    pub fn add_cut_row(&mut self, lumber: &LumberType) -> Option<RowId> {
        let id = self.push_cut_row(lumber, 0.0, 1.0);
        if id.is_none() {
            tracing::warn!(lumber = %lumber, "unknown lumber type");
        }
        id
    }

    pub fn update_cut_row(&mut self, lumber: &LumberType, index: usize, field: CutField, value: &str) -> bool {
        let Some(row) = self
            .project
            .cut_list_mut(lumber)
            .and_then(|list| list.rows.get_mut(index))
        else {
            tracing::warn!(lumber = %lumber, index, "cut row not found");
            return false;
        };
        match field {
            CutField::Length => row.length = coerce_number(value),
            CutField::Quantity => row.quantity = coerce_number(value),
        }
        self.touch();
        true
    }

    pub fn delete_cut_row(&mut self, lumber: &LumberType, index: usize) -> Option<CutListRow> {
        let Some(list) = self.project.cut_list_mut(lumber) else {
            tracing::warn!(lumber = %lumber, "unknown lumber type");
            return None;
        };
        if index >= list.rows.len() {
            tracing::warn!(lumber = %lumber, index, "cut row index out of range");
            return None;
        }
        let removed = list.rows.remove(index);
        self.touch();
        Some(removed)
    }

    // --- Financials and details ---

    pub fn set_financial(&mut self, field: FinancialField, value: &str) {
        let value = coerce_number(value);
        let financials = &mut self.project.financials;
        match field {
            FinancialField::ProfitMargin => financials.profit_margin = value,
            FinancialField::SalesTaxRate => financials.sales_tax_rate = value,
            FinancialField::ShippingCost => financials.shipping_cost = value,
        }
        self.touch();
    }

    pub fn set_detail(&mut self, field: DetailField, value: impl Into<String>) {
        let value = value.into();
        let details = &mut self.project.details;
        match field {
            DetailField::Name => details.name = value,
            DetailField::Date => details.date = value,
            DetailField::CustomerName => details.customer_name = value,
            DetailField::CustomerPhone => details.customer_phone = value,
            DetailField::CustomerEmail => details.customer_email = value,
        }
        self.touch();
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.project.notes = notes.into();
        self.touch();
    }
}

/// The sample project with the stock catalog.
pub fn sample_project() -> Project {
    Session::with_sample(&EstimatorConfig::default()).into_project()
}

// --- Project files ---

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemInput {
    #[serde(default)]
    pub item: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub unit_price: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutRowInput {
    #[serde(default, deserialize_with = "lenient_number")]
    pub length: f64,
    #[serde(default, deserialize_with = "lenient_number")]
    pub quantity: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutListInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_optional_number", skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default)]
    pub rows: Vec<CutRowInput>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialsInput {
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub profit_margin: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub sales_tax_rate: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_number")]
    pub shipping_cost: Option<f64>,
}

/// On-disk project input. Every field is optional; numbers may be strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectFile {
    #[serde(default)]
    pub details: ProjectDetails,
    #[serde(default)]
    pub materials: Vec<LineItemInput>,
    #[serde(default)]
    pub labor: Vec<LineItemInput>,
    #[serde(default)]
    pub overhead: Vec<LineItemInput>,
    #[serde(default)]
    pub cut_lists: BTreeMap<String, CutListInput>,
    #[serde(default)]
    pub financials: Option<FinancialsInput>,
    #[serde(default)]
    pub notes: String,
}

impl ProjectFile {
    pub fn from_project(project: &Project) -> Self {
        let items = |rows: &[CostLineItem]| {
            rows.iter()
                .map(|row| LineItemInput {
                    item: row.item.clone(),
                    description: row.description.clone(),
                    unit_price: row.unit_price,
                    quantity: row.quantity,
                })
                .collect()
        };

        Self {
            details: project.details.clone(),
            materials: items(&project.materials),
            labor: items(&project.labor),
            overhead: items(&project.overhead),
            cut_lists: project
                .cut_lists
                .iter()
                .map(|entry| {
                    let input = CutListInput {
                        description: Some(entry.list.description.clone()),
                        unit_price: Some(entry.list.unit_price),
                        rows: entry
                            .list
                            .rows
                            .iter()
                            .map(|row| CutRowInput { length: row.length, quantity: row.quantity })
                            .collect(),
                    };
                    (entry.lumber.to_string(), input)
                })
                .collect(),
            financials: Some(FinancialsInput {
                profit_margin: Some(project.financials.profit_margin),
                sales_tax_rate: Some(project.financials.sales_tax_rate),
                shipping_cost: Some(project.financials.shipping_cost),
            }),
            notes: project.notes.clone(),
        }
    }
}
