use coinstreak_core::{monthly_averages, DailyRecord, PriceField};
use comfy_table::{
    modifiers::UTF8_ROUND_CORNERS, presets::UTF8_BORDERS_ONLY, Attribute, Cell, CellAlignment,
    ContentArrangement, Table,
};
use serde_json::json;

use super::CommandReport;
use crate::output::format_price;

pub fn run(records: &[DailyRecord], field: PriceField) -> CommandReport {
    let averages = monthly_averages(records, field);

    let mut table = Table::new();
    table
        .load_preset(UTF8_BORDERS_ONLY)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Date").add_attribute(Attribute::Bold),
            Cell::new("Average price ($)")
                .add_attribute(Attribute::Bold)
                .set_alignment(CellAlignment::Right),
        ]);

    for average in &averages {
        table.add_row(vec![
            Cell::new(average.label()),
            Cell::new(format_price(average.average)).set_alignment(CellAlignment::Right),
        ]);
    }

    let months: Vec<_> = averages
        .iter()
        .map(|average| {
            json!({
                "month": average.label(),
                "average": average.average,
                "days": average.days,
            })
        })
        .collect();

    CommandReport {
        text: table.to_string(),
        data: json!({
            "field": field.as_str(),
            "months": months,
        }),
    }
}
