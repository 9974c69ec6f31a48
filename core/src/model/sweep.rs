use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::prelude::ApertureResult;
use crate::telemetry::SweepCounts;

/// One boundary point: longitudinal position and transverse coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub s: f64,
    pub x: f64,
    pub y: f64,
}

/// Which axes were negated to produce an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Reflection {
    #[default]
    None,
    /// x negated.
    Horizontal,
    /// y negated.
    Vertical,
    /// x and y negated.
    Both,
}

impl Reflection {
    pub(crate) fn apply(self, point: SweepPoint) -> SweepPoint {
        match self {
            Reflection::None => point,
            Reflection::Horizontal => SweepPoint { x: -point.x, ..point },
            Reflection::Vertical => SweepPoint { y: -point.y, ..point },
            Reflection::Both => SweepPoint {
                x: -point.x,
                y: -point.y,
                ..point
            },
        }
    }
}

/// Boundary points for one viewing angle, in profile order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleSweep {
    pub angle_deg: f64,
    pub reflection: Reflection,
    pub points: Vec<SweepPoint>,
}

impl AngleSweep {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub(crate) fn reflected(&self, reflection: Reflection) -> Self {
        Self {
            angle_deg: self.angle_deg,
            reflection,
            points: self.points.iter().map(|p| reflection.apply(*p)).collect(),
        }
    }
}

/// A record left out of every angle because its shape could not be resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub index: usize,
    pub name: String,
    pub s: f64,
    pub code: String,
}

/// Output of a sweep: computed entries first, mirrored copies after them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepResult {
    pub entries: Vec<AngleSweep>,
    pub rejected: Vec<RejectedRecord>,
    pub counts: SweepCounts,
}

impl SweepResult {
    pub fn get(&self, angle_deg: f64, reflection: Reflection) -> Option<&AngleSweep> {
        self.entries
            .iter()
            .find(|e| e.angle_deg == angle_deg && e.reflection == reflection)
    }

    pub fn point_count(&self) -> usize {
        self.entries.iter().map(AngleSweep::len).sum()
    }

    /// Concatenates every entry into `(s, x, y)` columns for point clouds.
    pub fn flatten(&self) -> (Array1<f64>, Array1<f64>, Array1<f64>) {
        let points = self.entries.iter().flat_map(|e| e.points.iter());
        let s: Array1<f64> = points.clone().map(|p| p.s).collect();
        let x: Array1<f64> = points.clone().map(|p| p.x).collect();
        let y: Array1<f64> = points.map(|p| p.y).collect();
        (s, x, y)
    }

    pub fn to_json(&self) -> ApertureResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(angle_deg: f64) -> AngleSweep {
        AngleSweep {
            angle_deg,
            reflection: Reflection::None,
            points: vec![
                SweepPoint { s: 0.0, x: 1.0, y: 2.0 },
                SweepPoint { s: 1.0, x: 3.0, y: 4.0 },
            ],
        }
    }

    #[test]
    fn reflection_negates_requested_axes() {
        let p = SweepPoint { s: 0.0, x: 4.0, y: 3.0 };
        assert_eq!(Reflection::Horizontal.apply(p), SweepPoint { s: 0.0, x: -4.0, y: 3.0 });
        assert_eq!(Reflection::Vertical.apply(p), SweepPoint { s: 0.0, x: 4.0, y: -3.0 });
        assert_eq!(Reflection::Both.apply(p), SweepPoint { s: 0.0, x: -4.0, y: -3.0 });
    }

    #[test]
    fn flatten_concatenates_entries_in_order() {
        let result = SweepResult {
            entries: vec![entry(0.0), entry(45.0).reflected(Reflection::Horizontal)],
            ..Default::default()
        };
        let (s, x, y) = result.flatten();
        assert_eq!(s.to_vec(), vec![0.0, 1.0, 0.0, 1.0]);
        assert_eq!(x.to_vec(), vec![1.0, 3.0, -1.0, -3.0]);
        assert_eq!(y.to_vec(), vec![2.0, 4.0, 2.0, 4.0]);
        assert_eq!(result.point_count(), 4);
    }

    #[test]
    fn json_export_contains_entries() {
        let result = SweepResult {
            entries: vec![entry(0.0)],
            ..Default::default()
        };
        let json = result.to_json().unwrap();
        assert!(json.contains("\"angle_deg\":0.0"));
    }
}
