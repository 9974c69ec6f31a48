use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::model::Profile;

/// Common error type for loading, filtering and sweeping aperture profiles.
#[derive(thiserror::Error, Debug)]
pub enum ApertureError {
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("unknown shape kind '{code}' for record '{name}' at s = {s}")]
    UnknownShapeKind { code: String, name: String, s: f64 },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApertureError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        ApertureError::Parse {
            line,
            message: message.into(),
        }
    }
}

pub type ApertureResult<T> = Result<T, ApertureError>;

/// Default angle count used when no explicit angle list is configured.
pub const DEFAULT_ANGLE_COUNT: usize = 10;

/// Default radial cutoff, in the units of the aperture dump.
pub const DEFAULT_CUTOFF: f64 = 50.0;

/// How a consumer intends to draw the sweep. The sweep itself ignores it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderStyle {
    Point,
    #[default]
    Line,
    Surf,
}

impl FromStr for RenderStyle {
    type Err = ApertureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "point" => Ok(RenderStyle::Point),
            "line" => Ok(RenderStyle::Line),
            "surf" => Ok(RenderStyle::Surf),
            other => Err(ApertureError::InvalidConfiguration(format!(
                "unknown render style '{other}' (expected point, line or surf)"
            ))),
        }
    }
}

impl fmt::Display for RenderStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderStyle::Point => "point",
            RenderStyle::Line => "line",
            RenderStyle::Surf => "surf",
        };
        write!(f, "{name}")
    }
}

/// Whether requesting both H and V mirrors also emits the doubly reflected copy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorMode {
    /// Each requested axis reflects the original entries only.
    #[default]
    Axes,
    /// Like `Axes`, plus the (-x, -y) copy when both axes are requested.
    FullSymmetry,
}

/// Mirror request: `H` negates x, `V` negates y.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorSpec {
    pub horizontal: bool,
    pub vertical: bool,
    pub mode: MirrorMode,
}

impl MirrorSpec {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: MirrorMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn is_empty(&self) -> bool {
        !self.horizontal && !self.vertical
    }
}

impl FromStr for MirrorSpec {
    type Err = ApertureError;

    /// Accepts any combination of `H` and `V` (case-insensitive), optionally
    /// separated by commas or spaces. An empty string means no mirroring.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut mirror = MirrorSpec::default();
        for ch in s.chars().filter(|c| !c.is_whitespace() && *c != ',') {
            match ch.to_ascii_uppercase() {
                'H' => mirror.horizontal = true,
                'V' => mirror.vertical = true,
                other => {
                    return Err(ApertureError::InvalidConfiguration(format!(
                        "unknown mirror token '{other}' (expected H and/or V)"
                    )))
                }
            }
        }
        Ok(mirror)
    }
}

/// Every recognised sweep option, with the defaults of the plotting tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Viewing angles in degrees.
    pub angles: Vec<f64>,
    /// Points at or beyond this planar radius are dropped. `None` or a
    /// non-positive value disables the filter.
    pub cutoff: Option<f64>,
    /// Shift every point by its record's `xoff`/`yoff`.
    pub with_offset: bool,
    pub mirror: MirrorSpec,
    pub style: RenderStyle,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            angles: linspace_degrees(0.0, 90.0, DEFAULT_ANGLE_COUNT),
            cutoff: Some(DEFAULT_CUTOFF),
            with_offset: false,
            mirror: MirrorSpec::none(),
            style: RenderStyle::default(),
        }
    }
}

impl SweepConfig {
    pub fn with_angle_count(count: usize) -> Self {
        Self {
            angles: linspace_degrees(0.0, 90.0, count),
            ..Default::default()
        }
    }

    /// Rejects settings the sweep cannot act on before any work is done.
    pub fn validate(&self) -> ApertureResult<()> {
        if let Some(bad) = self.angles.iter().find(|a| !a.is_finite()) {
            return Err(ApertureError::InvalidConfiguration(format!(
                "sweep angle {bad} is not finite"
            )));
        }
        if let Some(cutoff) = self.cutoff {
            if cutoff.is_nan() {
                return Err(ApertureError::InvalidConfiguration(
                    "cutoff is NaN".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// The cutoff radius if the filter is active.
    pub fn active_cutoff(&self) -> Option<f64> {
        self.cutoff.filter(|c| *c > 0.0)
    }
}

/// `count` evenly spaced values from `start` to `end`, both included.
pub fn linspace_degrees(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count).map(|i| start + step * i as f64).collect()
        }
    }
}

/// A pure row-level transform over a profile.
pub trait ProfileFilter {
    fn name(&self) -> &str;
    fn apply(&self, profile: &Profile) -> Profile;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirror_spec_parses_tokens() {
        let mirror: MirrorSpec = "hv".parse().unwrap();
        assert!(mirror.horizontal && mirror.vertical);
        let mirror: MirrorSpec = "V".parse().unwrap();
        assert!(!mirror.horizontal && mirror.vertical);
        assert!("".parse::<MirrorSpec>().unwrap().is_empty());
        assert!(matches!(
            "HX".parse::<MirrorSpec>(),
            Err(ApertureError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn render_style_rejects_unknown_token() {
        assert_eq!("Surf".parse::<RenderStyle>().unwrap(), RenderStyle::Surf);
        assert!("mesh".parse::<RenderStyle>().is_err());
    }

    #[test]
    fn default_config_spans_first_quadrant() {
        let config = SweepConfig::default();
        assert_eq!(config.angles.len(), DEFAULT_ANGLE_COUNT);
        assert_eq!(config.angles[0], 0.0);
        assert_eq!(*config.angles.last().unwrap(), 90.0);
        assert_eq!(config.active_cutoff(), Some(DEFAULT_CUTOFF));
    }

    #[test]
    fn non_positive_cutoff_disables_filter() {
        let config = SweepConfig {
            cutoff: Some(0.0),
            ..Default::default()
        };
        assert_eq!(config.active_cutoff(), None);
    }

    #[test]
    fn validate_rejects_non_finite_angle() {
        let config = SweepConfig {
            angles: vec![0.0, f64::NAN],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
