use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use super::table::parse_table;
use crate::model::{LossEvent, LossTable};
use crate::prelude::{ApertureError, ApertureResult};
use crate::telemetry::LogManager;

const POSITION: &str = "slos";
const X: &str = "x";
const Y: &str = "y";
const TURN: &str = "turn";

pub fn load_losses(path: impl AsRef<Path>) -> ApertureResult<LossTable> {
    let path = path.as_ref();
    LogManager::new("losses").record(&format!("loading {}", path.display()));
    let text = fs::read_to_string(path)?;
    parse_losses(&text)
}

/// Reads a loss dump. Columns other than position, coordinates and turn are
/// kept when every value in them is numeric.
pub fn parse_losses(text: &str) -> ApertureResult<LossTable> {
    let table = parse_table(text)?;
    let s_col = table.require(POSITION)?;
    let x_col = table.require(X)?;
    let y_col = table.require(Y)?;
    let turn_col = table.require(TURN)?;

    let mut events = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let turn = row.float(turn_col, TURN)?;
        if turn < 0.0 || turn.fract() != 0.0 {
            return Err(ApertureError::parse(
                row.line,
                format!("turn '{}' is not a non-negative integer", row.cells[turn_col]),
            ));
        }
        events.push(LossEvent {
            s: row.float(s_col, POSITION)?,
            x: row.float(x_col, X)?,
            y: row.float(y_col, Y)?,
            turn: turn as u64,
        });
    }

    let mut extras = BTreeMap::new();
    for (idx, name) in table.columns.iter().enumerate() {
        if [s_col, x_col, y_col, turn_col].contains(&idx) {
            continue;
        }
        let values: Option<Vec<f64>> = table
            .rows
            .iter()
            .map(|row| row.cells[idx].parse::<f64>().ok())
            .collect();
        if let Some(values) = values {
            extras.insert(name.clone(), values);
        }
    }

    Ok(LossTable { events, extras })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOSSES: &str = "\
# turn block bezid bez slos[m] fluka_uid fluka_gen weight x[m] xp[rad] y[m] yp[rad] etot ion
1 10 20 TCP.D6L7 19800.5 1 1 1.0 0.0021 0.0 -0.0003 0.0 6500 p
4 10 20 TCP.C6L7 19801.0 2 1 1.0 -0.0005 0.0 0.0018 0.0 6500 p
";

    #[test]
    fn reads_required_columns() {
        let table = parse_losses(LOSSES).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.positions(), vec![19800.5, 19801.0]);
        assert_eq!(table.turns(), vec![1, 4]);
        assert_eq!(table.ys(), vec![-0.0003, 0.0018]);
    }

    #[test]
    fn numeric_extra_columns_are_kept() {
        let table = parse_losses(LOSSES).unwrap();
        assert_eq!(table.extras.get("etot"), Some(&vec![6500.0, 6500.0]));
        assert!(!table.extras.contains_key("bez"));
        assert!(!table.extras.contains_key("ion"));
    }

    #[test]
    fn missing_turn_column_fails() {
        let text = "# slos x y\n1 0 0\n";
        assert!(matches!(parse_losses(text), Err(ApertureError::Parse { .. })));
    }

    #[test]
    fn fractional_turn_fails() {
        let text = "# slos x y turn\n1 0 0 2.5\n";
        assert!(parse_losses(text).is_err());
    }
}
