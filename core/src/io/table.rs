//! Whitespace-delimited tables whose first line names the columns.
//!
//! ```text
//! # name  aptype  s[m]  aper1[m] ...
//! IP1     CR      0.0   0.04     ...
//! ```

use crate::prelude::{ApertureError, ApertureResult};

/// A data row and the 1-based line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub line: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub columns: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Column names from a header line: drops the leading comment token and
/// strips unit annotations such as `[m]` whether attached or standalone.
pub fn parse_header(line: &str) -> Vec<String> {
    line.split_whitespace()
        .skip(1)
        .filter_map(|token| {
            let name = match token.find('[') {
                Some(pos) if token.ends_with(']') => &token[..pos],
                _ => token,
            };
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

pub fn parse_table(text: &str) -> ApertureResult<RawTable> {
    let mut lines = text.lines().enumerate();
    let header = match lines.next() {
        Some((_, line)) if !line.trim().is_empty() => line,
        _ => return Err(ApertureError::parse(1, "missing header line")),
    };
    let columns = parse_header(header);
    if columns.is_empty() {
        return Err(ApertureError::parse(1, "header names no columns"));
    }

    let mut rows = Vec::new();
    for (idx, line) in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let cells: Vec<String> = trimmed.split_whitespace().map(str::to_string).collect();
        if cells.len() != columns.len() {
            return Err(ApertureError::parse(
                idx + 1,
                format!(
                    "expected {} values to match the header, found {}",
                    columns.len(),
                    cells.len()
                ),
            ));
        }
        rows.push(RawRow {
            line: idx + 1,
            cells,
        });
    }

    Ok(RawTable { columns, rows })
}

impl RawTable {
    pub fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn require(&self, name: &str) -> ApertureResult<usize> {
        self.column(name)
            .ok_or_else(|| ApertureError::parse(1, format!("header lacks required column '{name}'")))
    }
}

impl RawRow {
    pub fn float(&self, column: usize, name: &str) -> ApertureResult<f64> {
        let cell = &self.cells[column];
        cell.parse::<f64>().map_err(|_| {
            ApertureError::parse(self.line, format!("column '{name}': '{cell}' is not a number"))
        })
    }
}
