//! Terminal tables for `status` and `teardown`

use super::types::{CleanupResult, TeardownReport};
use crate::aws::ClusterDescriptor;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};

fn new_table(header: [&str; 2]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.map(Cell::new));
    table
}

/// Key/value summary of a cluster
pub fn cluster_table(descriptor: &ClusterDescriptor) -> Table {
    let mut table = new_table(["Key", "Value"]);
    for (key, value) in descriptor.summary_rows() {
        table.add_row(vec![Cell::new(key), Cell::new(value)]);
    }
    table
}

/// One row per teardown step, plus the config reset when it failed
pub fn teardown_table(report: &TeardownReport) -> Table {
    let mut table = new_table(["Resource", "Result"]);
    for (kind, result) in &report.steps {
        let color = match result {
            CleanupResult::Deleted => Color::Green,
            CleanupResult::AlreadyDeleted => Color::DarkGrey,
            CleanupResult::Failed(_) => Color::Red,
        };
        table.add_row(vec![
            Cell::new(kind.as_str()),
            Cell::new(result).fg(color),
        ]);
    }
    if let Some(reason) = &report.reset_error {
        table.add_row(vec![
            Cell::new("config-reset"),
            Cell::new(format!("failed: {reason}")).fg(Color::Red),
        ]);
    }
    table
}
