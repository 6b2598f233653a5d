//! Plain-text output for the terminal.

use products_records::{Row, spec::Column};

/// Labels and display text of `rows` for `columns`.
pub fn cells(columns: &[Column], rows: &[Row]) -> (Vec<String>, Vec<Vec<String>>) {
    let headers = columns.iter().map(|c| c.label.to_string()).collect();
    let body = rows
        .iter()
        .map(|row| columns.iter().map(|c| row.text(c.name)).collect())
        .collect();
    (headers, body)
}

/// Left-aligned columns sized to their widest cell, with a rule under the header.
pub fn table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    push_line(&mut out, headers, &widths);
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    push_line(&mut out, &rule, &widths);
    for row in rows {
        push_line(&mut out, row, &widths);
    }
    out.push_str(&format!("({} rows)\n", rows.len()));
    out
}

fn push_line(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_to_widest_cell() {
        let headers = vec!["ID".to_string(), "Name".to_string()];
        let rows = vec![
            vec!["1".to_string(), "Rahim".to_string()],
            vec!["12".to_string(), "".to_string()],
        ];
        assert_eq!(
            table(&headers, &rows),
            "ID  Name\n--  -----\n1   Rahim\n12\n(2 rows)\n"
        );
    }
}
