//! Tabular rendering of the ledger.

use serde::{Deserialize, Serialize};

/// Columns every exported row starts with.
pub const FIXED_COLUMNS: [&str; 5] = ["Emotion", "Prompt", "Story", "Characters", "Notes"];

/// A header plus one row per finished round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerTable {
    /// Column names.
    pub header: Vec<String>,
    /// Cells, one vector per round, aligned with `header`.
    pub rows: Vec<Vec<String>>,
}

impl LedgerTable {
    /// Render as CSV with a header line.
    pub fn to_csv(&self) -> String {
        let mut out = csv_line(&self.header);
        for row in &self.rows {
            out.push_str(&csv_line(row));
        }
        out
    }

    /// Cells of the column named `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.header.iter().position(|h| h == name)?;
        Some(
            self.rows
                .iter()
                .map(|row| row.get(index).map_or("", String::as_str))
                .collect(),
        )
    }
}

/// One CSV record terminated by a newline.
///
/// Fields holding a comma, quote, or line break are quoted, with inner
/// quotes doubled.
pub fn csv_line<S: AsRef<str>>(cells: &[S]) -> String {
    let mut line = cells
        .iter()
        .map(|cell| escape_csv(cell.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    line.push('\n');
    line
}

fn escape_csv(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_cells() {
        assert_eq!(csv_line(&["a", "b", ""]), "a,b,\n");
    }

    #[test]
    fn quoting() {
        assert_eq!(
            csv_line(&["Hero, Villain", "say \"hi\"", "two\nlines"]),
            "\"Hero, Villain\",\"say \"\"hi\"\"\",\"two\nlines\"\n"
        );
    }

    #[test]
    fn table_with_header() {
        let t = LedgerTable {
            header: vec!["A".to_string(), "B".to_string()],
            rows: vec![vec!["1".to_string(), "2".to_string()]],
        };
        assert_eq!(t.to_csv(), "A,B\n1,2\n");
        assert_eq!(t.column("B"), Some(vec!["2"]));
        assert_eq!(t.column("C"), None);
    }
}
