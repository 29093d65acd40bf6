//! Pricing Engine
//!
//! Pure derivations from a [`Project`] snapshot to estimate totals. Nothing
//! here can fail: degenerate inputs produce zero outputs.

use serde::{Deserialize, Serialize};

use crate::model::{CostLineItem, CutList, LumberType, Project};

/// Length of one raw board, in inches (an 8 ft board).
pub const STANDARD_BOARD_LENGTH: f64 = 96.0;

/// Sum of `unit_price * quantity` over a section.
pub fn subtotal(rows: &[CostLineItem]) -> f64 {
    rows.iter().map(CostLineItem::line_total).sum()
}

/// Sum of quantities over labor rows, read as hours.
pub fn total_hours(labor: &[CostLineItem]) -> f64 {
    labor.iter().map(|row| row.quantity).sum()
}

/// Derived totals for one lumber type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CutListTotals {
    pub total_length: f64,
    pub boards_needed: f64,
    pub total_cost: f64,
}

/// Naive board estimate: total run length divided by the board length,
/// rounded up. No kerf allowance and no packing of individual boards.
pub fn cut_list_totals(list: &CutList) -> CutListTotals {
    let total_length: f64 = list.rows.iter().map(|row| row.run_length()).sum();
    let boards_needed = if list.unit_price > 0.0 {
        (total_length / STANDARD_BOARD_LENGTH).ceil()
    } else {
        0.0
    };

    CutListTotals {
        total_length,
        boards_needed,
        total_cost: boards_needed * list.unit_price,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LumberTotals {
    pub lumber: LumberType,
    #[serde(flatten)]
    pub totals: CutListTotals,
}

/// Every derived value of an estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimateTotals {
    pub material_subtotal: f64,
    pub labor_subtotal: f64,
    pub overhead_subtotal: f64,
    pub cut_lists: Vec<LumberTotals>,
    pub cut_list_total_cost: f64,
    pub total_material_cost: f64,
    pub subtotal_cost: f64,
    pub profit_margin: f64,
    pub sales_tax_amount: f64,
    pub shipping_cost: f64,
    pub total_cost: f64,
    pub total_hours: f64,
    pub profit_per_hour: f64,
}

impl EstimateTotals {
    pub fn cut_list(&self, lumber: &LumberType) -> Option<&CutListTotals> {
        self.cut_lists
            .iter()
            .find(|entry| &entry.lumber == lumber)
            .map(|entry| &entry.totals)
    }
}

/// `(profit + overhead) / hours`, or zero when that is not a finite number.
pub fn profit_per_hour(profit_margin: f64, overhead_subtotal: f64, hours: f64) -> f64 {
    let rate = (profit_margin + overhead_subtotal) / hours;
    if rate.is_finite() {
        rate
    } else {
        0.0
    }
}

/// Derive all totals for a project.
///
/// Sales tax applies to the material, labor and overhead subtotal only;
/// profit margin and shipping are added untaxed.
pub fn estimate(project: &Project) -> EstimateTotals {
    let material_subtotal = subtotal(&project.materials);
    let labor_subtotal = subtotal(&project.labor);
    let overhead_subtotal = subtotal(&project.overhead);
    let hours = total_hours(&project.labor);

    let cut_lists: Vec<LumberTotals> = project
        .cut_lists
        .iter()
        .map(|entry| LumberTotals {
            lumber: entry.lumber.clone(),
            totals: cut_list_totals(&entry.list),
        })
        .collect();
    let cut_list_total_cost = cut_lists.iter().map(|entry| entry.totals.total_cost).sum::<f64>();

    let financials = project.financials;
    let total_material_cost = material_subtotal + cut_list_total_cost;
    let subtotal_cost = total_material_cost + labor_subtotal + overhead_subtotal;
    let sales_tax_amount = subtotal_cost * (financials.sales_tax_rate / 100.0);
    let total_cost =
        subtotal_cost + financials.profit_margin + sales_tax_amount + financials.shipping_cost;

    EstimateTotals {
        material_subtotal,
        labor_subtotal,
        overhead_subtotal,
        cut_lists,
        cut_list_total_cost,
        total_material_cost,
        subtotal_cost,
        profit_margin: financials.profit_margin,
        sales_tax_amount,
        shipping_cost: financials.shipping_cost,
        total_cost,
        total_hours: hours,
        profit_per_hour: profit_per_hour(financials.profit_margin, overhead_subtotal, hours),
    }
}
