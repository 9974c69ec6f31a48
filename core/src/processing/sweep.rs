#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::geometry::{fold_to_first_quadrant, group_by_kind, ShapeBatch, ANGLE_SNAP_TOLERANCE};
use crate::model::{AngleSweep, Profile, Reflection, RejectedRecord, ShapeKind, SweepPoint, SweepResult};
use crate::prelude::{ApertureResult, MirrorMode, SweepConfig};
use crate::telemetry::{LogManager, SweepMetrics};

/// Evaluates the aperture boundary of a profile over a set of viewing angles.
pub struct SweepEngine {
    config: SweepConfig,
    logger: LogManager,
}

/// Records that resolved to a known shape, grouped for batched evaluation.
struct Prepared {
    batches: Vec<ShapeBatch>,
    /// Profile indices of the resolved records, ascending.
    order: Vec<usize>,
    rejected: Vec<RejectedRecord>,
}

pub fn sweep(profile: &Profile, config: &SweepConfig) -> ApertureResult<SweepResult> {
    SweepEngine::new(config.clone()).run(profile)
}

/// Cosine and sine of `angle` with axis round-off removed.
fn direction(angle: f64) -> (f64, f64) {
    let snap = |v: f64| if v.abs() <= ANGLE_SNAP_TOLERANCE { 0.0 } else { v };
    (snap(angle.cos()), snap(angle.sin()))
}

impl SweepEngine {
    pub fn new(config: SweepConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("sweep"),
        }
    }

    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    pub fn run(&self, profile: &Profile) -> ApertureResult<SweepResult> {
        self.config.validate()?;
        let metrics = SweepMetrics::new();
        let prepared = self.prepare(profile, &metrics);

        #[cfg(feature = "parallel")]
        let mut entries: Vec<AngleSweep> = self
            .config
            .angles
            .par_iter()
            .map(|angle| self.sweep_angle(profile, &prepared, *angle, &metrics))
            .collect();
        #[cfg(not(feature = "parallel"))]
        let mut entries: Vec<AngleSweep> = self
            .config
            .angles
            .iter()
            .map(|angle| self.sweep_angle(profile, &prepared, *angle, &metrics))
            .collect();

        self.mirror(&mut entries);

        let counts = metrics.snapshot();
        self.logger.record(&format!(
            "{} records x {} angles -> {} entries, {} points cut, {} records rejected",
            profile.len(),
            self.config.angles.len(),
            entries.len(),
            counts.cut,
            counts.rejected
        ));

        Ok(SweepResult {
            entries,
            rejected: prepared.rejected,
            counts,
        })
    }

    fn prepare(&self, profile: &Profile, metrics: &SweepMetrics) -> Prepared {
        let mut resolved: Vec<(usize, _, ShapeKind)> = Vec::with_capacity(profile.len());
        let mut rejected = Vec::new();
        for (index, record) in profile.iter().enumerate() {
            match record.shape_kind() {
                Ok(kind) => resolved.push((index, record, kind)),
                Err(err) => {
                    self.logger.warn(&format!("excluding record {index}: {err}"));
                    metrics.record_rejected();
                    rejected.push(RejectedRecord {
                        index,
                        name: record.name.clone(),
                        s: record.s,
                        code: record.code.clone(),
                    });
                }
            }
        }
        Prepared {
            batches: group_by_kind(&resolved),
            order: resolved.iter().map(|(index, _, _)| *index).collect(),
            rejected,
        }
    }

    fn sweep_angle(
        &self,
        profile: &Profile,
        prepared: &Prepared,
        angle_deg: f64,
        metrics: &SweepMetrics,
    ) -> AngleSweep {
        let angle = angle_deg.to_radians();
        let folded = fold_to_first_quadrant(angle);

        let mut radii = vec![f64::NAN; profile.len()];
        for batch in &prepared.batches {
            let values = batch.radii(folded);
            for (slot, index) in batch.indices().iter().enumerate() {
                radii[*index] = values[slot];
            }
        }
        metrics.record_evaluated(prepared.order.len());

        let (cos, sin) = direction(angle);
        let cutoff = self.config.active_cutoff();
        let records = profile.records();
        let mut points = Vec::with_capacity(prepared.order.len());
        let mut cut = 0;
        for &index in &prepared.order {
            let record = &records[index];
            let radius = radii[index];
            let mut x = radius * cos;
            let mut y = radius * sin;
            if self.config.with_offset {
                x += record.x_offset;
                y += record.y_offset;
            }
            if let Some(limit) = cutoff {
                // NaN distances never count as inside
                let inside = x.hypot(y) < limit;
                if !inside {
                    cut += 1;
                    continue;
                }
            }
            points.push(SweepPoint { s: record.s, x, y });
        }
        metrics.record_cut(cut);

        AngleSweep {
            angle_deg,
            reflection: Reflection::None,
            points,
        }
    }

    /// Appends reflected copies of the computed entries.
    fn mirror(&self, entries: &mut Vec<AngleSweep>) {
        let mirror = self.config.mirror;
        if mirror.is_empty() {
            return;
        }
        let originals = entries.clone();
        if mirror.horizontal {
            entries.extend(originals.iter().map(|e| e.reflected(Reflection::Horizontal)));
        }
        if mirror.vertical {
            entries.extend(originals.iter().map(|e| e.reflected(Reflection::Vertical)));
        }
        if mirror.horizontal && mirror.vertical && mirror.mode == MirrorMode::FullSymmetry {
            entries.extend(originals.iter().map(|e| e.reflected(Reflection::Both)));
        }
    }
}
