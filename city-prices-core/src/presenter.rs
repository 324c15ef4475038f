//! Text rendering of a [`PriceReport`].
//!
//! Output is a pure function of the report: no I/O, same input gives the same bytes.

use std::{collections::HashMap, fmt};

use crate::model::{CategoryGroup, PriceItem, PriceReport};

const WIDTH: usize = 80;

pub const NO_DATA_NOTICE: &str = "No price data available.";

/// Group items by category, keeping categories and items in first-seen order.
pub fn group_by_category(items: &[PriceItem]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for item in items {
        let slot = *index.entry(item.category.as_str()).or_insert_with(|| {
            groups.push(CategoryGroup { name: item.category.as_str(), items: Vec::new() });
            groups.len() - 1
        });
        groups[slot].items.push(item);
    }

    groups
}

/// `$25.00` for US dollars, `25.00 EUR` for anything else.
pub fn format_price(amount: f64, currency: &str) -> String {
    if currency == "USD" {
        format!("${amount:.2}")
    } else {
        format!("{amount:.2} {currency}")
    }
}

pub fn render(report: &PriceReport) -> String {
    ReportView(report).to_string()
}

pub fn render_json(report: &PriceReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

struct ReportView<'a>(&'a PriceReport);

impl fmt::Display for ReportView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let heavy = "=".repeat(WIDTH);

        writeln!(f)?;
        writeln!(f, "{heavy}")?;
        writeln!(
            f,
            "COST OF LIVING DATA: {}, {}",
            report.city.as_deref().unwrap_or("Unknown"),
            report.country.as_deref().unwrap_or("Unknown"),
        )?;
        writeln!(f, "{heavy}")?;
        writeln!(f, "Currency: {}", report.currency)?;
        if let Some(n) = report.contributors {
            writeln!(f, "Contributors: {n}")?;
        }
        if let Some(date) = report.last_updated {
            writeln!(f, "Last updated: {}", date.format("%B %Y"))?;
        }
        writeln!(f)?;

        if report.is_empty() {
            return writeln!(f, "{NO_DATA_NOTICE}");
        }

        let light = "-".repeat(WIDTH);
        for group in group_by_category(&report.items) {
            writeln!(f)?;
            writeln!(f, "{}:", group.name)?;
            writeln!(f, "{light}")?;

            for item in group.items {
                write_item(f, item)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "{heavy}")?;
        writeln!(f)
    }
}

fn write_item(f: &mut fmt::Formatter<'_>, item: &PriceItem) -> fmt::Result {
    writeln!(f)?;
    writeln!(f, "  {}", item.name)?;
    writeln!(f, "    Average: {}", format_price(item.average_price, &item.currency))?;
    if let (Some(min), Some(max)) = (item.min_price, item.max_price) {
        writeln!(
            f,
            "    Range: {} - {}",
            format_price(min, &item.currency),
            format_price(max, &item.currency),
        )?;
    }
    writeln!(f, "    Data points: {}", item.data_points)
}
