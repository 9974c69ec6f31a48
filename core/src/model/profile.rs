use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::record::ApertureRecord;
use crate::prelude::{ApertureError, ApertureResult};

/// Transverse plane selector for offset queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plane {
    Horizontal,
    Vertical,
}

/// Radius of every record along one viewing angle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApertureSeries {
    pub angle_deg: f64,
    pub s: Vec<f64>,
    pub radius: Vec<f64>,
}

/// Ordered aperture table in beamline traversal order.
///
/// A profile is never modified after construction; filters build a new one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    records: Vec<ApertureRecord>,
    source: Option<PathBuf>,
}

impl Profile {
    pub fn new(records: Vec<ApertureRecord>) -> Self {
        Self {
            records,
            source: None,
        }
    }

    pub fn with_source(mut self, path: impl AsRef<Path>) -> Self {
        self.source = Some(path.as_ref().to_path_buf());
        self
    }

    /// Builds a sibling profile that keeps this one's source.
    pub(crate) fn derive(&self, records: Vec<ApertureRecord>) -> Self {
        Self {
            records,
            source: self.source.clone(),
        }
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn records(&self) -> &[ApertureRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ApertureRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Radius of each record at a single angle in `[0, 90]` degrees.
    ///
    /// Records with an unknown shape code are logged and left out.
    pub fn aperture_at(&self, angle_deg: f64) -> ApertureResult<ApertureSeries> {
        if !(0.0..=90.0).contains(&angle_deg) {
            return Err(ApertureError::InvalidConfiguration(format!(
                "angle {angle_deg} deg outside the allowed range [0, 90]"
            )));
        }
        let angle = angle_deg.to_radians();
        let mut series = ApertureSeries {
            angle_deg,
            s: Vec::with_capacity(self.len()),
            radius: Vec::with_capacity(self.len()),
        };
        for record in &self.records {
            match record.radius(angle) {
                Ok(radius) => {
                    series.s.push(record.s);
                    series.radius.push(radius);
                }
                Err(err) => warn!("skipping record: {err}"),
            }
        }
        Ok(series)
    }

    /// `(s, offset)` pairs for the requested plane.
    pub fn offsets(&self, plane: Plane) -> (Vec<f64>, Vec<f64>) {
        self.records
            .iter()
            .map(|r| {
                let offset = match plane {
                    Plane::Horizontal => r.x_offset,
                    Plane::Vertical => r.y_offset,
                };
                (r.s, offset)
            })
            .unzip()
    }
}

impl<'a> IntoIterator for &'a Profile {
    type Item = &'a ApertureRecord;
    type IntoIter = std::slice::Iter<'a, ApertureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
