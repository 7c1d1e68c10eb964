// SPDX-License-Identifier: MIT OR Apache-2.0
//! Column-aligned tables with terminal-width truncation.

/// A simple left-aligned table.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Table with the given headers.
    #[must_use]
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; short rows are padded with empty cells.
    pub fn push(&mut self, mut row: Vec<String>) {
        row.resize(self.headers.len(), String::new());
        row.truncate(self.headers.len());
        self.rows.push(row);
    }

    /// Whether the table has no data rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of data rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Iterate data rows.
    pub fn rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter()
    }

    /// Render with columns sized to content, truncated to `width`.
    #[must_use]
    pub fn render(&self, width: usize) -> String {
        let cols = self.headers.len();
        let mut widths: Vec<usize> = self.headers.iter().map(String::len).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate().take(cols) {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }

        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        lines.push(render_row(&self.headers, &widths, width));
        for row in &self.rows {
            lines.push(render_row(row, &widths, width));
        }
        lines.join("\n")
    }
}

fn render_row(cells: &[String], widths: &[usize], max_width: usize) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        let padded = format!("{cell:<width$}", width = widths[i]);
        line.push_str(&padded);
    }
    let line = line.trim_end().to_string();
    truncate_line(&line, max_width)
}

fn truncate_line(line: &str, max_width: usize) -> String {
    if line.chars().count() <= max_width {
        return line.to_string();
    }
    let mut out: String = line.chars().take(max_width.saturating_sub(1)).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_widest_cell() {
        let mut t = Table::new(&["id", "name"]);
        t.push(vec!["7".into(), "Login".into()]);
        t.push(vec!["1680437".into(), "Checkout".into()]);
        let out = t.render(100);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        // Every "name" cell starts at the same column.
        let name_col = lines[0].find("name").unwrap();
        assert_eq!(lines[1].find("Login").unwrap(), name_col);
        assert_eq!(lines[2].find("Checkout").unwrap(), name_col);
    }

    #[test]
    fn long_lines_are_truncated_with_ellipsis() {
        let mut t = Table::new(&["value"]);
        t.push(vec!["x".repeat(200)]);
        let out = t.render(40);
        for line in out.lines() {
            assert!(line.chars().count() <= 40);
        }
        assert!(out.contains('…'));
    }

    #[test]
    fn short_rows_are_padded() {
        let mut t = Table::new(&["a", "b", "c"]);
        t.push(vec!["1".into()]);
        assert_eq!(t.len(), 1);
        let out = t.render(80);
        assert!(out.lines().count() == 2);
    }
}
