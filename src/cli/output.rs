//! Output formatting utilities for the CLI.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use serde::Serialize;

pub trait CommandOutput: Serialize {
    fn to_human(&self) -> String;
    fn to_json(&self) -> serde_json::Value;
}

pub fn output<T: CommandOutput>(result: &T, json_mode: bool) {
    if let Some(text) = render(result, json_mode) {
        println!("{text}");
    }
}

/// Text `output` prints; `None` when a human rendering is empty.
pub fn render<T: CommandOutput>(result: &T, json_mode: bool) -> Option<String> {
    if json_mode {
        return Some(serde_json::to_string_pretty(&result.to_json()).unwrap_or_default());
    }
    let text = result.to_human();
    (!text.is_empty()).then_some(text)
}

/// Create a borderless table with upper-cased headers.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Right-aligned numeric cell.
pub fn number_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}
