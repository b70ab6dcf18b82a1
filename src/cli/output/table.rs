//! Table formatting for human-readable CLI output, built on `comfy-table`
//! for layout and `console` for color detection — the same pairing the
//! teacher's table formatter uses.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};

/// Render a two-column `field | value` table for a single command result.
/// `highlight`, if set, colors that row's value (e.g. green for a success
/// address, yellow for a pending amount) when the terminal supports it.
pub fn render_fields(rows: &[(&str, String)], highlight: Option<&str>) -> String {
    let mut table = base_table();
    table.set_header(vec![
        Cell::new("field").add_attribute(Attribute::Bold),
        Cell::new("value").add_attribute(Attribute::Bold),
    ]);

    let use_colors = supports_color();
    for (field, value) in rows {
        let value_cell = if use_colors && highlight == Some(*field) {
            Cell::new(value).fg(Color::Green)
        } else {
            Cell::new(value)
        };
        table.add_row(vec![Cell::new(field), value_cell]);
    }

    table.to_string()
}

fn base_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn supports_color() -> bool {
    console::colors_enabled()
}
