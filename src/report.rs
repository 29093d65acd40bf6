//! Plain-text cost overview.

use std::fmt::Write;

use crate::format::{format_currency, format_hours, format_percent};
use crate::model::{CostSection, Project};
use crate::pricing::{subtotal, EstimateTotals};

const LABEL_WIDTH: usize = 24;

fn line(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "{label:<LABEL_WIDTH$}{value:>14}");
}

/// Render the estimate summary the way the "Cost Overview" panel shows it.
pub fn render_summary(project: &Project, totals: &EstimateTotals) -> String {
    let mut out = String::new();
    let details = &project.details;

    let _ = writeln!(out, "{}", if details.name.is_empty() { "Untitled project" } else { details.name.as_str() });
    if !details.date.is_empty() {
        let _ = writeln!(out, "Date: {}", details.date);
    }
    if !details.customer_name.is_empty() {
        let _ = writeln!(out, "Customer: {}", details.customer_name);
    }
    for contact in [&details.customer_phone, &details.customer_email] {
        if !contact.is_empty() {
            let _ = writeln!(out, "          {contact}");
        }
    }
    out.push('\n');

    for section in CostSection::ALL {
        let rows = project.section(section);
        if rows.is_empty() {
            continue;
        }
        let _ = writeln!(out, "{} ({})", section.title(), section.quantity_label());
        for row in rows {
            let label = if row.item.is_empty() { "(unnamed)" } else { row.item.as_str() };
            line(&mut out, &format!("  {label}"), &format_currency(row.line_total()));
        }
        line(&mut out, &format!("{} Subtotal", section.title()), &format_currency(subtotal(rows)));
    }

    let priced: Vec<_> = totals.cut_lists.iter().filter(|e| e.totals.total_length != 0.0).collect();
    if !priced.is_empty() {
        let _ = writeln!(out, "Cut Lists");
        for entry in priced {
            let _ = writeln!(
                out,
                "  {}: {} in, {} boards, {}",
                entry.lumber,
                entry.totals.total_length,
                entry.totals.boards_needed,
                format_currency(entry.totals.total_cost)
            );
        }
    }
    out.push('\n');

    let _ = writeln!(out, "Cost Overview");
    line(&mut out, "Material Costs", &format_currency(totals.total_material_cost));
    line(&mut out, "Labour Costs", &format_currency(totals.labor_subtotal));
    line(&mut out, "Overhead Costs", &format_currency(totals.overhead_subtotal));
    line(&mut out, "Subtotal Cost", &format_currency(totals.subtotal_cost));
    line(&mut out, "Profit Margin", &format_currency(totals.profit_margin));
    line(&mut out, "Sales Tax Rate", &format_percent(project.financials.sales_tax_rate));
    line(&mut out, "  Amount", &format_currency(totals.sales_tax_amount));
    line(&mut out, "Shipping Cost", &format_currency(totals.shipping_cost));
    line(&mut out, "Total Price", &format_currency(totals.total_cost));
    line(&mut out, "Hours worked", &format_hours(totals.total_hours));
    line(&mut out, "Profit / Hour", &format_currency(totals.profit_per_hour));

    if !project.notes.trim().is_empty() {
        let _ = writeln!(out, "\nNotes\n{}", project.notes.trim_end());
    }

    out
}
