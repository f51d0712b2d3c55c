//! Summary tables.
//!
//! Renders a [`RunReport`] as a two-column table of counts, followed by a
//! per-generator breakdown when a security batch ran.

use crate::report::RunReport;
use comfy_table::presets;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStyle {
    /// Box-drawing characters (default for TTY).
    #[default]
    Unicode,
    Ascii,
}

impl TableStyle {
    fn apply_preset(self, table: &mut Table) {
        match self {
            Self::Unicode => {
                table.load_preset(presets::UTF8_FULL);
            }
            Self::Ascii => {
                table.load_preset(presets::ASCII_FULL);
            }
        }
    }

    const fn colored(self) -> bool {
        matches!(self, Self::Unicode)
    }
}

fn new_table(style: TableStyle, width: u16, header: [&str; 2]) -> Table {
    let mut table = Table::new();
    style.apply_preset(&mut table);
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(width);
    let header: Vec<Cell> = header
        .into_iter()
        .map(|h| {
            let cell = Cell::new(h);
            if style.colored() {
                cell.add_attribute(Attribute::Bold)
            } else {
                cell
            }
        })
        .collect();
    table.set_header(header);
    table
}

fn count_cell(value: usize, style: TableStyle, color: Option<Color>) -> Cell {
    let cell = Cell::new(value).set_alignment(CellAlignment::Right);
    match color {
        Some(color) if style.colored() && value > 0 => cell.fg(color),
        _ => cell,
    }
}

/// Counts of both phases as a table.
#[must_use]
pub fn summary_table(report: &RunReport, style: TableStyle, width: u16) -> String {
    let mut table = new_table(style, width, ["Metric", "Value"]);

    let basic = &report.basic;
    table.add_row(vec![Cell::new("Golden tests run"), count_cell(basic.total, style, None)]);
    table.add_row(vec![
        Cell::new("Golden tests passed"),
        count_cell(basic.passed, style, Some(Color::Green)),
    ]);
    table.add_row(vec![
        Cell::new("Golden tests failed"),
        count_cell(basic.failed, style, Some(Color::Red)),
    ]);
    if basic.not_run > 0 {
        table.add_row(vec![
            Cell::new("Golden tests not run"),
            count_cell(basic.not_run, style, Some(Color::Yellow)),
        ]);
    }
    if let Some(rate) = basic.pass_rate() {
        table.add_row(vec![
            Cell::new("Golden pass rate"),
            Cell::new(format!("{rate:.2}%")).set_alignment(CellAlignment::Right),
        ]);
    }

    let mut out = table.to_string();

    if let Some(security) = &report.security {
        let mut table = new_table(style, width, ["Security batch", "Value"]);
        table.add_row(vec![Cell::new("Seed"), Cell::new(security.seed).set_alignment(CellAlignment::Right)]);
        for entry in &security.by_generator {
            table.add_row(vec![
                Cell::new(format!("Generated ({})", entry.generator)),
                count_cell(entry.count, style, None),
            ]);
        }
        table.add_row(vec![Cell::new("Executed"), count_cell(security.executed, style, None)]);
        table.add_row(vec![
            Cell::new("Dropped (time goal / launch)"),
            count_cell(security.dropped(), style, Some(Color::Yellow)),
        ]);
        table.add_row(vec![
            Cell::new("Exceptional runs"),
            count_cell(security.failed, style, Some(Color::Red)),
        ]);
        table.add_row(vec![
            Cell::new("Unique errors"),
            count_cell(security.unique_errors(), style, Some(Color::Red)),
        ]);
        out.push('\n');
        out.push_str(&table.to_string());
    }

    out
}
