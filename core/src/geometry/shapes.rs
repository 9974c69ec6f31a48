//! Closed-form radial boundaries of the aperture shape families.
//!
//! Every function returns the distance from the shape center to its boundary
//! along the direction `angle` (radians). Apart from [`circle`] and
//! [`ellipse`], callers pass angles already folded into `[0, π/2]`; use
//! [`fold_to_first_quadrant`] for arbitrary directions.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Angles this close to `0` or `π/2` are treated as lying exactly on the axis.
pub const ANGLE_SNAP_TOLERANCE: f64 = 8.0 * f64::EPSILON;

/// Snaps an angle lying within [`ANGLE_SNAP_TOLERANCE`] of an axis onto it.
pub fn snap_angle(angle: f64) -> f64 {
    if angle.abs() <= ANGLE_SNAP_TOLERANCE {
        0.0
    } else if (angle - FRAC_PI_2).abs() <= ANGLE_SNAP_TOLERANCE {
        FRAC_PI_2
    } else {
        angle
    }
}

/// Maps any direction onto `[0, π/2]` using the two-axis symmetry shared by
/// every aperture family.
pub fn fold_to_first_quadrant(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    let folded = if wrapped <= FRAC_PI_2 {
        wrapped
    } else if wrapped <= PI {
        PI - wrapped
    } else if wrapped <= 3.0 * FRAC_PI_2 {
        wrapped - PI
    } else {
        TAU - wrapped
    };
    snap_angle(folded.clamp(0.0, FRAC_PI_2))
}

pub fn circle(_angle: f64, radius: f64) -> f64 {
    radius
}

pub fn ellipse(angle: f64, a: f64, b: f64) -> f64 {
    if a == 0.0 || b == 0.0 {
        return 0.0;
    }
    let angle = snap_angle(angle);
    1.0 / ((angle.cos() / a).powi(2) + (angle.sin() / b).powi(2)).sqrt()
}

/// Axis-aligned box with half extents `a` (horizontal) and `b` (vertical).
pub fn rectangle(angle: f64, a: f64, b: f64) -> f64 {
    let angle = snap_angle(angle);
    if angle == 0.0 {
        a
    } else if angle == FRAC_PI_2 {
        b
    } else if angle < b.atan2(a) {
        a / angle.cos()
    } else {
        b / angle.sin()
    }
}

pub fn rect_ellipse(angle: f64, a: f64, b: f64, c: f64, d: f64) -> f64 {
    rectangle(angle, a, b).min(ellipse(angle, c, d))
}

/// Distance to the line `y = m·x + q` along `angle`.
pub fn line(angle: f64, m: f64, q: f64) -> f64 {
    let angle = snap_angle(angle);
    if angle == 0.0 {
        -q / m
    } else if angle == FRAC_PI_2 {
        q
    } else {
        let x = q / (angle.tan() - m);
        x / angle.cos()
    }
}

/// Box `(a, b)` with its corner cut by the chamfer through the points at
/// `theta1` on the vertical side and `theta2` on the horizontal side.
pub fn octagon(angle: f64, a: f64, b: f64, theta1: f64, theta2: f64) -> f64 {
    let slope = (b - a * theta1.tan()) / (b / theta2.tan() - a);
    let intercept = a * theta1.tan() - slope * a;
    rectangle(angle, a, b).min(line(angle, slope, intercept))
}

/// Box `(aprx + apex, apry + apey)` whose corner is rounded by an elliptic
/// arc of radii `(apex, apey)` centred at `(aprx, apry)`.
pub fn racetrack(angle: f64, aprx: f64, apry: f64, apex: f64, apey: f64) -> f64 {
    let angle = snap_angle(angle);
    if angle == 0.0 {
        return aprx + apex;
    }
    if angle == FRAC_PI_2 {
        return apry + apey;
    }

    let lower = apry.atan2(aprx + apex);
    let upper = (apry + apey).atan2(aprx);
    if angle <= lower || angle >= upper {
        return rectangle(angle, aprx + apex, apry + apey);
    }

    // ray expressed in the frame of the arc centre
    let m = angle.tan();
    let q = m * aprx - apry;
    let denom = (apex * m).powi(2) + apey.powi(2);
    let discriminant = ((apex * m).powi(2) + apey.powi(2) - q.powi(2)).max(0.0);
    let x = (-apex.powi(2) * m * q + apex * apey * discriminant.sqrt()) / denom;
    (x + aprx) / angle.cos()
}

/// Envelope of a box, a racetrack and an octagon sharing half extents `(a, b)`.
#[allow(clippy::too_many_arguments)]
pub fn transition(
    angle: f64,
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    e: f64,
    f: f64,
    theta1: f64,
    theta2: f64,
) -> f64 {
    rectangle(angle, a, b)
        .min(racetrack(angle, e, f, c, d))
        .min(octagon(angle, a, b, theta1, theta2))
}
