use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Metres to millimetres, the unit aperture plots are drawn in.
const MM_PER_M: f64 = 1e3;

/// A single recorded particle loss.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossEvent {
    pub s: f64,
    pub x: f64,
    pub y: f64,
    pub turn: u64,
}

/// Overlay marker derived from a loss event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LossMarker {
    pub s: f64,
    pub x_mm: f64,
    pub y_mm: f64,
    /// Turn divided by the largest turn in the table, in `[0, 1]`.
    pub weight: f64,
}

/// Loss events in file order, plus any extra numeric columns by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossTable {
    pub events: Vec<LossEvent>,
    pub extras: BTreeMap<String, Vec<f64>>,
}

impl LossTable {
    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn positions(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.s).collect()
    }

    pub fn xs(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.x).collect()
    }

    pub fn ys(&self) -> Vec<f64> {
        self.events.iter().map(|e| e.y).collect()
    }

    pub fn turns(&self) -> Vec<u64> {
        self.events.iter().map(|e| e.turn).collect()
    }

    pub fn max_turn(&self) -> Option<u64> {
        self.events.iter().map(|e| e.turn).max()
    }

    pub fn normalized_turns(&self) -> Vec<f64> {
        let max = self.max_turn().unwrap_or(0);
        self.events
            .iter()
            .map(|e| if max == 0 { 0.0 } else { e.turn as f64 / max as f64 })
            .collect()
    }

    /// Markers folded into the first quadrant and scaled to millimetres.
    pub fn overlay_points(&self) -> Vec<LossMarker> {
        self.events
            .iter()
            .zip(self.normalized_turns())
            .map(|(e, weight)| LossMarker {
                s: e.s,
                x_mm: e.x.abs() * MM_PER_M,
                y_mm: e.y.abs() * MM_PER_M,
                weight,
            })
            .collect()
    }
}
