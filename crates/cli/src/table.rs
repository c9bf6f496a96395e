//! Plain-text rendering of a snapshot. Presentation only; all numbers come
//! from the model's value table.

use truthgrid_model::snapshot::{Snapshot, SnapshotEntry, Value};

/// Render the value table as aligned columns.
pub fn render(snapshot: &Snapshot) -> String {
    let mut rows: Vec<[String; 5]> = vec![[
        "KIND".into(),
        "ID".into(),
        "VALUE".into(),
        "RANGE".into(),
        "STATUS".into(),
    ]];
    for entry in &snapshot.entries {
        rows.push([
            entry.kind.to_string(),
            entry.id.clone(),
            value_cell(entry),
            entry.range.map(format_number).unwrap_or_default(),
            entry.status.to_string(),
        ]);
    }

    let mut widths = [0usize; 5];
    for row in &rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let line = row
            .iter()
            .zip(widths.iter().copied())
            .map(|(cell, w)| format!("{cell:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

fn value_cell(entry: &SnapshotEntry) -> String {
    match entry.value {
        Some(Value::Number(n)) => format_number(n),
        Some(Value::Bool(true)) => "TRUE".into(),
        Some(Value::Bool(false)) => "FALSE".into(),
        None => "-".into(),
    }
}

/// Scientific notation with ten fractional digits, the precision the
/// underlying CODATA values carry.
fn format_number(n: f64) -> String {
    if n == 0.0 {
        "0".into()
    } else {
        format!("{n:.10e}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use truthgrid_model::canonical::canonical_model;

    #[test]
    fn renders_header_and_all_entries() {
        let snap = canonical_model().snapshot();
        let text = render(&snap);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 1 + snap.entries.len());
        assert!(lines[0].starts_with("KIND"));
        assert!(text.contains("CL1"));
        assert!(text.contains("TRUE"));
    }

    #[test]
    fn numbers_render_in_scientific_notation() {
        assert_eq!(format_number(8.1871057880e-14), "8.1871057880e-14");
        assert_eq!(format_number(0.0), "0");
    }
}
