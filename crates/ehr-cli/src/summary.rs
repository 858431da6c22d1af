use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use ehr_cli::types::RunResult;

pub fn print_summary(result: &RunResult) {
    if result.dry_run {
        println!("Dry run: no files written");
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Collection"),
        header_cell("Rows"),
        header_cell("Placeholders"),
        header_cell("Dates parsed"),
        header_cell("Dates dropped"),
        header_cell("Amounts defaulted"),
        header_cell("Output"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }

    for summary in &result.collections {
        let stats = &summary.stats;
        let output = summary
            .output
            .as_ref()
            .map_or_else(|| dim_cell("-"), |path| Cell::new(path.display()));
        table.add_row(vec![
            Cell::new(summary.collection.label()).add_attribute(Attribute::Bold),
            Cell::new(stats.rows),
            count_cell(stats.placeholders_nulled, Color::Yellow),
            Cell::new(stats.dates_parsed),
            count_cell(stats.dates_dropped, Color::Yellow),
            count_cell(stats.amounts_defaulted, Color::Yellow),
            output,
        ]);
    }
    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(result.total_rows()).add_attribute(Attribute::Bold),
    ]);
    println!("{table}");

    for anomaly in &result.anomalies {
        if anomaly.rows > 0 {
            println!("{} ({})", anomaly.headline.trim_end_matches(':'), anomaly.collection);
        } else {
            println!("{}", anomaly.headline);
        }
    }
    if let Some(path) = &result.report_path {
        println!("Report: {}", path.display());
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).add_attribute(Attribute::Dim)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}
