//! Terminal rendering for the `tabula` binary.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use tabula_core::value::{record_to_value, to_display_string};
use tabula_core::Record;

/// Prints rows as a table, or as a JSON array when `format` is `json`.
pub fn print_rows(rows: &[Record], columns: &[String], format: &str) -> anyhow::Result<()> {
    if format.eq_ignore_ascii_case("json") {
        let values: Vec<Value> = rows.iter().map(record_to_value).collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }
    if rows.is_empty() {
        println!("No rows.");
        return Ok(());
    }
    println!("{}", render_table(rows, columns));
    Ok(())
}

/// Builds a table with one column per store column, nulls shown as `-`.
pub fn render_table(rows: &[Record], columns: &[String]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    let header: Vec<Cell> = columns
        .iter()
        .map(|c| Cell::new(c).fg(Color::Cyan))
        .collect();
    table.set_header(header);

    for row in rows {
        let cells: Vec<Cell> = columns
            .iter()
            .map(|column| match row.get(column) {
                None | Some(Value::Null) => Cell::new("-"),
                Some(value) => Cell::new(to_display_string(value)),
            })
            .collect();
        table.add_row(cells);
    }
    table
}

/// Progress bar for a load; a spinner until the first estimate arrives.
pub fn load_progress_bar(hidden: bool) -> ProgressBar {
    if hidden {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} rows")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}
