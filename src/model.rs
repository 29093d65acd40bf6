//! Project Data Model
//!
//! Line items, cut lists and the financial parameters an estimate is derived
//! from. Numeric fields are plain `f64`s that have already been coerced.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque row identifier. Unique within a session and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(u64);

impl RowId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row-{}", self.0)
    }
}

/// Hands out row ids in increasing order.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    pub fn next_id(&mut self) -> RowId {
        let id = RowId(self.next.max(1));
        self.next = id.0 + 1;
        id
    }
}

/// Lumber-type label such as `2x4`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LumberType(String);

impl LumberType {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LumberType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LumberType {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

/// One row of cost data. `quantity` counts hours in the labor and overhead
/// sections and units in the materials section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostLineItem {
    pub id: RowId,
    pub item: String,
    pub description: String,
    pub unit_price: f64,
    pub quantity: f64,
}

impl CostLineItem {
    /// A freshly added, empty row.
    pub fn empty(id: RowId) -> Self {
        Self {
            id,
            item: String::new(),
            description: String::new(),
            unit_price: 0.0,
            quantity: 0.0,
        }
    }

    pub fn line_total(&self) -> f64 {
        self.unit_price * self.quantity
    }
}

/// `quantity` pieces, each `length` inches long.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutListRow {
    pub id: RowId,
    pub length: f64,
    pub quantity: f64,
}

impl CutListRow {
    pub fn empty(id: RowId) -> Self {
        Self { id, length: 0.0, quantity: 1.0 }
    }

    pub fn run_length(&self) -> f64 {
        self.length * self.quantity
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutList {
    pub description: String,
    /// Price per standard board.
    pub unit_price: f64,
    pub rows: Vec<CutListRow>,
}

/// A cut list together with the lumber type that owns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LumberCutList {
    pub lumber: LumberType,
    pub list: CutList,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancialParameters {
    /// Flat currency amount, not a percentage.
    pub profit_margin: f64,
    /// Percent, e.g. `13.0` for 13%.
    pub sales_tax_rate: f64,
    pub shipping_cost: f64,
}

impl Default for FinancialParameters {
    fn default() -> Self {
        Self {
            profit_margin: 52.86,
            sales_tax_rate: 13.0,
            shipping_cost: 5.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectDetails {
    pub name: String,
    pub date: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: String,
}

/// The three line-item sections of an estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostSection {
    Materials,
    Labor,
    Overhead,
}

impl CostSection {
    pub const ALL: [CostSection; 3] = [Self::Materials, Self::Labor, Self::Overhead];

    pub fn title(self) -> &'static str {
        match self {
            Self::Materials => "Material Costs",
            Self::Labor => "Labour Costs",
            Self::Overhead => "Overhead Costs",
        }
    }

    pub fn quantity_label(self) -> &'static str {
        match self {
            Self::Materials => "Quantity",
            Self::Labor | Self::Overhead => "Hours",
        }
    }
}

/// Everything an estimate is computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub details: ProjectDetails,
    pub materials: Vec<CostLineItem>,
    pub labor: Vec<CostLineItem>,
    pub overhead: Vec<CostLineItem>,
    pub cut_lists: Vec<LumberCutList>,
    pub financials: FinancialParameters,
    #[serde(default)]
    pub notes: String,
}

impl Project {
    pub fn section(&self, section: CostSection) -> &[CostLineItem] {
        match section {
            CostSection::Materials => &self.materials,
            CostSection::Labor => &self.labor,
            CostSection::Overhead => &self.overhead,
        }
    }

    pub fn section_mut(&mut self, section: CostSection) -> &mut Vec<CostLineItem> {
        match section {
            CostSection::Materials => &mut self.materials,
            CostSection::Labor => &mut self.labor,
            CostSection::Overhead => &mut self.overhead,
        }
    }

    pub fn cut_list(&self, lumber: &LumberType) -> Option<&CutList> {
        self.cut_lists
            .iter()
            .find(|entry| &entry.lumber == lumber)
            .map(|entry| &entry.list)
    }

    pub fn cut_list_mut(&mut self, lumber: &LumberType) -> Option<&mut CutList> {
        self.cut_lists
            .iter_mut()
            .find(|entry| &entry.lumber == lumber)
            .map(|entry| &mut entry.list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_increase() {
        let mut ids = IdAllocator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        assert!(b > a);
        assert_eq!(a.to_string(), "row-1");
    }

    #[test]
    fn test_default_allocator_skips_zero() {
        let mut ids = IdAllocator::default();
        assert_eq!(ids.next_id().value(), 1);
        assert_eq!(ids.next_id().value(), 2);
    }

    #[test]
    fn test_new_cut_row_defaults() {
        let row = CutListRow::empty(IdAllocator::new().next_id());
        assert_eq!(row.length, 0.0);
        assert_eq!(row.quantity, 1.0);
    }
}
