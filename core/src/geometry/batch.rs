use ndarray::{Array1, Array2, Zip};

use super::shapes;
use crate::model::record::{ApertureRecord, ShapeKind};

/// Records of one shape kind gathered into a parameter matrix so a single
/// angle can be evaluated over the whole group in one pass.
#[derive(Debug, Clone)]
pub struct ShapeBatch {
    kind: ShapeKind,
    /// Position of each row in the originating profile.
    indices: Vec<usize>,
    /// One row per record, `kind.arity()` columns.
    params: Array2<f64>,
}

impl ShapeBatch {
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Radii of every row along `angle`, already folded into `[0, π/2]`.
    pub fn radii(&self, angle: f64) -> Array1<f64> {
        let mut out = Array1::<f64>::zeros(self.len());
        let col = |i: usize| self.params.column(i);
        match self.kind {
            ShapeKind::Circle => out.assign(&col(0)),
            ShapeKind::Ellipse => {
                let angle = shapes::snap_angle(angle);
                let (cos, sin) = (angle.cos(), angle.sin());
                Zip::from(&mut out)
                    .and(col(0))
                    .and(col(1))
                    .for_each(|r, &a, &b| {
                        *r = if a == 0.0 || b == 0.0 {
                            0.0
                        } else {
                            1.0 / ((cos / a).powi(2) + (sin / b).powi(2)).sqrt()
                        };
                    });
            }
            ShapeKind::Rectangle => Zip::from(&mut out)
                .and(col(0))
                .and(col(1))
                .for_each(|r, &a, &b| *r = shapes::rectangle(angle, a, b)),
            ShapeKind::RectEllipse => Zip::from(&mut out)
                .and(col(0))
                .and(col(1))
                .and(col(2))
                .and(col(3))
                .for_each(|r, &a, &b, &c, &d| *r = shapes::rect_ellipse(angle, a, b, c, d)),
            ShapeKind::Octagon => Zip::from(&mut out)
                .and(col(0))
                .and(col(1))
                .and(col(2))
                .and(col(3))
                .for_each(|r, &a, &b, &t1, &t2| *r = shapes::octagon(angle, a, b, t1, t2)),
            ShapeKind::Racetrack => Zip::from(&mut out)
                .and(col(0))
                .and(col(1))
                .and(col(2))
                .and(col(3))
                .for_each(|r, &x, &y, &ex, &ey| *r = shapes::racetrack(angle, x, y, ex, ey)),
            ShapeKind::Transition => Zip::from(&mut out)
                .and(self.params.rows())
                .for_each(|r, p| {
                    *r = shapes::transition(angle, p[0], p[1], p[2], p[3], p[4], p[5], p[6], p[7])
                }),
        }
        out
    }
}

/// Splits resolved records into one batch per kind, in [`ShapeKind::ALL`]
/// order. Each input pairs a profile index with its record and kind.
pub fn group_by_kind(resolved: &[(usize, &ApertureRecord, ShapeKind)]) -> Vec<ShapeBatch> {
    ShapeKind::ALL
        .iter()
        .filter_map(|&kind| {
            let members: Vec<(usize, &ApertureRecord)> = resolved
                .iter()
                .filter(|(_, _, k)| *k == kind)
                .map(|(idx, record, _)| (*idx, *record))
                .collect();
            if members.is_empty() {
                return None;
            }
            let params = Array2::from_shape_fn((members.len(), kind.arity()), |(i, j)| {
                members[i].1.params[j]
            });
            Some(ShapeBatch {
                kind,
                indices: members.iter().map(|(idx, _)| *idx).collect(),
                params,
            })
        })
        .collect()
}
