//! Chart Aggregation
//!
//! Shapes estimate totals into the two series the chart renderer draws.

use serde::{Deserialize, Serialize};

use crate::pricing::EstimateTotals;

/// Slice colors, assigned by position after zero slices are dropped.
pub const BREAKDOWN_PALETTE: [&str; 6] =
    ["#5a3a22", "#e59c5c", "#a16207", "#facc15", "#eab308", "#ca8a04"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Material,
    Labor,
    Overhead,
    ProfitMargin,
    SalesTax,
    Shipping,
}

impl CostCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Material => "Material Costs",
            Self::Labor => "Labor Cost",
            Self::Overhead => "Overhead Cost",
            Self::ProfitMargin => "Profit Margin",
            Self::SalesTax => "Sales Tax",
            Self::Shipping => "Shipping Cost",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownSlice {
    pub category: CostCategory,
    pub label: String,
    pub value: f64,
    pub color: String,
}

/// Categorical cost breakdown (pie chart).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub slices: Vec<BreakdownSlice>,
}

impl CostBreakdown {
    pub fn labels(&self) -> Vec<&str> {
        self.slices.iter().map(|s| s.label.as_str()).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.slices.iter().map(|s| s.value).collect()
    }
}

pub const LENGTH_SERIES_LABEL: &str = "Total Length (in)";
pub const COST_SERIES_LABEL: &str = "Total Cost ($)";

/// Length and cost per lumber type (bar chart), aligned by index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUsage {
    pub labels: Vec<String>,
    pub length_label: String,
    pub total_length: Vec<f64>,
    pub cost_label: String,
    pub total_cost: Vec<f64>,
}

impl Default for MaterialUsage {
    fn default() -> Self {
        Self {
            labels: vec![],
            length_label: LENGTH_SERIES_LABEL.to_string(),
            total_length: vec![],
            cost_label: COST_SERIES_LABEL.to_string(),
            total_cost: vec![],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartData {
    pub breakdown: CostBreakdown,
    pub usage: MaterialUsage,
}

/// Only strictly positive contributions become slices.
pub fn cost_breakdown(totals: &EstimateTotals) -> CostBreakdown {
    let candidates = [
        (CostCategory::Material, totals.total_material_cost),
        (CostCategory::Labor, totals.labor_subtotal),
        (CostCategory::Overhead, totals.overhead_subtotal),
        (CostCategory::ProfitMargin, totals.profit_margin),
        (CostCategory::SalesTax, totals.sales_tax_amount),
        (CostCategory::Shipping, totals.shipping_cost),
    ];

    let slices = candidates
        .into_iter()
        .filter(|&(_, value)| value > 0.0)
        .zip(BREAKDOWN_PALETTE)
        .map(|((category, value), color)| BreakdownSlice {
            category,
            label: category.label().to_string(),
            value,
            color: color.to_string(),
        })
        .collect();

    CostBreakdown { slices }
}

pub fn material_usage(totals: &EstimateTotals) -> MaterialUsage {
    let mut usage = MaterialUsage::default();
    for entry in &totals.cut_lists {
        usage.labels.push(entry.lumber.to_string());
        usage.total_length.push(entry.totals.total_length);
        usage.total_cost.push(entry.totals.total_cost);
    }
    usage
}

pub fn chart_data(totals: &EstimateTotals) -> ChartData {
    ChartData {
        breakdown: cost_breakdown(totals),
        usage: material_usage(totals),
    }
}
