use serde::{Deserialize, Serialize};
use std::fmt;

use crate::geometry::shapes;
use crate::prelude::{ApertureError, ApertureResult};

/// Number of shape parameters carried by every record (padded with zeros).
pub const PARAM_COUNT: usize = 8;

/// Name given to rows synthesised between real aperture markers.
pub const INTERPOLATED_NAME: &str = "interpolated";

/// The closed set of aperture families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeKind {
    Circle,
    Rectangle,
    Ellipse,
    RectEllipse,
    Octagon,
    Racetrack,
    Transition,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::Circle,
        ShapeKind::Rectangle,
        ShapeKind::Ellipse,
        ShapeKind::RectEllipse,
        ShapeKind::Octagon,
        ShapeKind::Racetrack,
        ShapeKind::Transition,
    ];

    /// Resolves a two-letter dump code.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "CR" => Some(ShapeKind::Circle),
            "RE" => Some(ShapeKind::Rectangle),
            "EL" => Some(ShapeKind::Ellipse),
            "RL" => Some(ShapeKind::RectEllipse),
            "OC" => Some(ShapeKind::Octagon),
            "RT" => Some(ShapeKind::Racetrack),
            "TR" => Some(ShapeKind::Transition),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            ShapeKind::Circle => "CR",
            ShapeKind::Rectangle => "RE",
            ShapeKind::Ellipse => "EL",
            ShapeKind::RectEllipse => "RL",
            ShapeKind::Octagon => "OC",
            ShapeKind::Racetrack => "RT",
            ShapeKind::Transition => "TR",
        }
    }

    /// Number of meaningful parameters for this family.
    pub fn arity(self) -> usize {
        match self {
            ShapeKind::Circle => 1,
            ShapeKind::Rectangle | ShapeKind::Ellipse => 2,
            ShapeKind::RectEllipse | ShapeKind::Octagon | ShapeKind::Racetrack => 4,
            ShapeKind::Transition => 8,
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// An aperture cross-section with its named parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle {
        radius: f64,
    },
    Rectangle {
        half_width: f64,
        half_height: f64,
    },
    Ellipse {
        semi_x: f64,
        semi_y: f64,
    },
    RectEllipse {
        half_width: f64,
        half_height: f64,
        semi_x: f64,
        semi_y: f64,
    },
    Octagon {
        half_width: f64,
        half_height: f64,
        theta1: f64,
        theta2: f64,
    },
    Racetrack {
        aprx: f64,
        apry: f64,
        apex: f64,
        apey: f64,
    },
    Transition {
        half_width: f64,
        half_height: f64,
        apex: f64,
        apey: f64,
        aprx: f64,
        apry: f64,
        theta1: f64,
        theta2: f64,
    },
}

impl Shape {
    /// Builds the variant for `kind`; missing trailing parameters read as zero.
    pub fn from_params(kind: ShapeKind, params: &[f64]) -> Self {
        let p = |i: usize| params.get(i).copied().unwrap_or(0.0);
        match kind {
            ShapeKind::Circle => Shape::Circle { radius: p(0) },
            ShapeKind::Rectangle => Shape::Rectangle {
                half_width: p(0),
                half_height: p(1),
            },
            ShapeKind::Ellipse => Shape::Ellipse {
                semi_x: p(0),
                semi_y: p(1),
            },
            ShapeKind::RectEllipse => Shape::RectEllipse {
                half_width: p(0),
                half_height: p(1),
                semi_x: p(2),
                semi_y: p(3),
            },
            ShapeKind::Octagon => Shape::Octagon {
                half_width: p(0),
                half_height: p(1),
                theta1: p(2),
                theta2: p(3),
            },
            ShapeKind::Racetrack => Shape::Racetrack {
                aprx: p(0),
                apry: p(1),
                apex: p(2),
                apey: p(3),
            },
            ShapeKind::Transition => Shape::Transition {
                half_width: p(0),
                half_height: p(1),
                apex: p(2),
                apey: p(3),
                aprx: p(4),
                apry: p(5),
                theta1: p(6),
                theta2: p(7),
            },
        }
    }

    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::RectEllipse { .. } => ShapeKind::RectEllipse,
            Shape::Octagon { .. } => ShapeKind::Octagon,
            Shape::Racetrack { .. } => ShapeKind::Racetrack,
            Shape::Transition { .. } => ShapeKind::Transition,
        }
    }

    /// Boundary distance along `angle` (radians, folded into `[0, π/2]`
    /// by the caller for every family but the circle).
    pub fn radius(&self, angle: f64) -> f64 {
        match *self {
            Shape::Circle { radius } => shapes::circle(angle, radius),
            Shape::Rectangle {
                half_width,
                half_height,
            } => shapes::rectangle(angle, half_width, half_height),
            Shape::Ellipse { semi_x, semi_y } => shapes::ellipse(angle, semi_x, semi_y),
            Shape::RectEllipse {
                half_width,
                half_height,
                semi_x,
                semi_y,
            } => shapes::rect_ellipse(angle, half_width, half_height, semi_x, semi_y),
            Shape::Octagon {
                half_width,
                half_height,
                theta1,
                theta2,
            } => shapes::octagon(angle, half_width, half_height, theta1, theta2),
            Shape::Racetrack {
                aprx,
                apry,
                apex,
                apey,
            } => shapes::racetrack(angle, aprx, apry, apex, apey),
            Shape::Transition {
                half_width,
                half_height,
                apex,
                apey,
                aprx,
                apry,
                theta1,
                theta2,
            } => shapes::transition(
                angle,
                half_width,
                half_height,
                apex,
                apey,
                aprx,
                apry,
                theta1,
                theta2,
            ),
        }
    }
}

/// One row of an aperture dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApertureRecord {
    pub name: String,
    /// Raw shape code as read from the dump; resolved lazily.
    pub code: String,
    pub s: f64,
    pub params: [f64; PARAM_COUNT],
    pub x_offset: f64,
    pub y_offset: f64,
}

impl ApertureRecord {
    pub fn new(name: impl Into<String>, kind: ShapeKind, s: f64, params: &[f64]) -> Self {
        Self::with_code(name, kind.code(), s, params)
    }

    pub fn with_code(name: impl Into<String>, code: impl Into<String>, s: f64, params: &[f64]) -> Self {
        let mut padded = [0.0; PARAM_COUNT];
        for (slot, value) in padded.iter_mut().zip(params) {
            *slot = *value;
        }
        Self {
            name: name.into(),
            code: code.into(),
            s,
            params: padded,
            x_offset: 0.0,
            y_offset: 0.0,
        }
    }

    pub fn with_offsets(mut self, x_offset: f64, y_offset: f64) -> Self {
        self.x_offset = x_offset;
        self.y_offset = y_offset;
        self
    }

    pub fn shape_kind(&self) -> ApertureResult<ShapeKind> {
        ShapeKind::from_code(&self.code).ok_or_else(|| ApertureError::UnknownShapeKind {
            code: self.code.clone(),
            name: self.name.clone(),
            s: self.s,
        })
    }

    pub fn shape(&self) -> ApertureResult<Shape> {
        Ok(Shape::from_params(self.shape_kind()?, &self.params))
    }

    /// Boundary distance along `angle`; see [`Shape::radius`].
    pub fn radius(&self, angle: f64) -> ApertureResult<f64> {
        Ok(self.shape()?.radius(angle))
    }

    pub fn is_interpolated(&self) -> bool {
        self.name == INTERPOLATED_NAME
    }

    /// A record whose parameters are all zero describes no envelope.
    pub fn is_null(&self) -> bool {
        self.params.iter().all(|p| *p == 0.0)
    }

    /// True when both records describe the same cross-section at the same offset.
    pub fn same_section(&self, other: &ApertureRecord) -> bool {
        self.code == other.code
            && self.params == other.params
            && self.x_offset == other.x_offset
            && self.y_offset == other.y_offset
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_kinds() {
        for kind in ShapeKind::ALL {
            assert_eq!(ShapeKind::from_code(kind.code()), Some(kind));
        }
        assert_eq!(ShapeKind::from_code("XX"), None);
    }

    #[test]
    fn unknown_code_reports_record() {
        let record = ApertureRecord::with_code("MQ.12R1", "ZZ", 42.0, &[1.0]);
        match record.radius(0.0) {
            Err(ApertureError::UnknownShapeKind { code, name, s }) => {
                assert_eq!(code, "ZZ");
                assert_eq!(name, "MQ.12R1");
                assert_eq!(s, 42.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn params_are_padded_to_eight() {
        let record = ApertureRecord::new("D1", ShapeKind::Rectangle, 0.0, &[2.0, 3.0]);
        assert_eq!(record.params, [2.0, 3.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(
            record.shape().unwrap(),
            Shape::Rectangle {
                half_width: 2.0,
                half_height: 3.0
            }
        );
    }

    #[test]
    fn null_aperture_detected() {
        assert!(ApertureRecord::new("N", ShapeKind::Circle, 0.0, &[]).is_null());
        assert!(!ApertureRecord::new("N", ShapeKind::Circle, 0.0, &[1.0]).is_null());
    }

    #[test]
    fn same_section_ignores_name_and_position() {
        let a = ApertureRecord::new("A", ShapeKind::Ellipse, 0.0, &[1.0, 2.0]);
        let b = ApertureRecord::new("B", ShapeKind::Ellipse, 7.0, &[1.0, 2.0]);
        assert!(a.same_section(&b));
        assert!(!a.same_section(&b.clone().with_offsets(0.1, 0.0)));
    }
}
