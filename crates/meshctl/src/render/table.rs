//! Generic aligned-table rendering for multi-record responses.
//!
//! The response shape is `category -> record key -> (field -> value)` with
//! no schema known ahead of time. Each category is processed independently:
//! columns are sampled from one record, sorted bytewise, measured against
//! their formatted cell contents, and emitted left-justified with a
//! two-space separator. The record's own key is a synthetic first column
//! with a blank header. Anything that is not shaped as expected renders as
//! an empty category rather than an error.

use std::io::{self, Write};

use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

use crate::render::RenderOptions;
use crate::render::value::{display_string, format_byte_count, format_duration};

/// Bulky or sensitive fields hidden unless verbose output is requested.
const HIDDEN_COLUMNS: &[&str] = &["box_pub_key", "box_sig_key", "nodeinfo", "was_mtu_fixed"];

pub(crate) fn render_table(
    body: &Value,
    options: &RenderOptions,
    out: &mut dyn Write,
) -> io::Result<()> {
    let Some(categories) = body.as_object() else {
        return Ok(());
    };
    for category in categories.values() {
        let Some(records) = category.as_object() else {
            continue;
        };
        render_category(records, options.verbose, out)?;
    }
    Ok(())
}

fn render_category(
    records: &Map<String, Value>,
    verbose: bool,
    out: &mut dyn Write,
) -> io::Result<()> {
    let mut rows: Vec<(&str, &Map<String, Value>)> = Vec::with_capacity(records.len());
    for (key, record) in records {
        let Some(fields) = record.as_object() else {
            // A malformed record poisons the whole category; emit nothing.
            return Ok(());
        };
        rows.push((key.as_str(), fields));
    }
    let Some((_, sample)) = rows.first() else {
        return Ok(());
    };

    // Columns are sampled from a single record, not unioned across the
    // category. Records with extra fields keep them hidden; records with
    // missing fields render blank cells.
    let mut columns: Vec<&str> = sample
        .keys()
        .map(String::as_str)
        .filter(|name| verbose || !HIDDEN_COLUMNS.contains(name))
        .collect();
    columns.sort_unstable();

    let mut key_width = 0usize;
    let mut widths: Vec<usize> = columns.iter().map(|name| name.width()).collect();
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(rows.len());
    for (key, fields) in &rows {
        key_width = key_width.max(key.width());
        let row: Vec<String> = columns
            .iter()
            .map(|name| {
                fields
                    .get(*name)
                    .map(|value| format_cell(name, value))
                    .unwrap_or_default()
            })
            .collect();
        for (width, cell) in widths.iter_mut().zip(&row) {
            *width = (*width).max(cell.width());
        }
        cells.push(row);
    }

    write_padded(out, "", key_width)?;
    for (name, width) in columns.iter().zip(&widths) {
        write_padded(out, name, *width)?;
    }
    writeln!(out)?;

    for ((key, _), row) in rows.iter().zip(&cells) {
        write_padded(out, key, key_width)?;
        for (cell, width) in row.iter().zip(&widths) {
            write_padded(out, cell, *width)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Applies field-specific unit conversions before a cell is measured.
fn format_cell(column: &str, value: &Value) -> String {
    match column {
        "bytes_sent" | "bytes_recvd" => {
            format_byte_count(value).unwrap_or_else(|| display_string(value))
        }
        "uptime" | "last_seen" => format_duration(value).unwrap_or_else(|| display_string(value)),
        _ => display_string(value),
    }
}

/// Writes `text` left-justified to `width` display columns, followed by the
/// two-space separator.
fn write_padded(out: &mut dyn Write, text: &str, width: usize) -> io::Result<()> {
    out.write_all(text.as_bytes())?;
    let padding = width.saturating_sub(text.width()) + 2;
    for _ in 0..padding {
        out.write_all(b" ")?;
    }
    Ok(())
}
