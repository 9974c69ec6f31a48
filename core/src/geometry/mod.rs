pub mod batch;
pub mod shapes;

pub use batch::{group_by_kind, ShapeBatch};
pub use shapes::{fold_to_first_quadrant, snap_angle, ANGLE_SNAP_TOLERANCE};

use crate::model::record::{Shape, ShapeKind};

/// Boundary distance of a `kind` aperture with `params` along `angle`
/// (radians). Missing trailing parameters read as zero.
pub fn radius(kind: ShapeKind, params: &[f64], angle: f64) -> f64 {
    Shape::from_params(kind, params).radius(angle)
}
