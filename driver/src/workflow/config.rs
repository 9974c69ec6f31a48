use anyhow::Context;
use aperturecore::model::Plane;
use aperturecore::processing::{DropConsecutiveDuplicates, DropInterpolated, Slice};
use aperturecore::{FilterPipeline, LoadOptions, MirrorMode, MirrorSpec, RenderStyle, SweepConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Everything a run needs besides the input files.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    /// Number of evenly spaced angles over [0, 90] degrees.
    pub angle_count: usize,
    /// Explicit angle list; takes precedence over `angle_count`.
    pub angles: Option<Vec<f64>>,
    pub cutoff: Option<f64>,
    pub with_offset: bool,
    /// Any combination of `H` and `V`.
    pub mirror: String,
    pub full_symmetry: bool,
    pub style: String,
    pub drop_interpolated: bool,
    pub drop_duplicates: bool,
    pub slice_start: Option<isize>,
    pub slice_end: Option<isize>,
    pub invert_signs: Vec<usize>,
    pub invert_offsets: Vec<Plane>,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            angle_count: aperturecore::prelude::DEFAULT_ANGLE_COUNT,
            angles: None,
            cutoff: Some(aperturecore::prelude::DEFAULT_CUTOFF),
            with_offset: false,
            mirror: String::new(),
            full_symmetry: false,
            style: RenderStyle::default().to_string(),
            drop_interpolated: true,
            drop_duplicates: true,
            slice_start: None,
            slice_end: None,
            invert_signs: Vec::new(),
            invert_offsets: Vec::new(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(
        angle_count: usize,
        cutoff: f64,
        with_offset: bool,
        mirror: &str,
        full_symmetry: bool,
        style: &str,
    ) -> Self {
        Self {
            angle_count,
            cutoff: Some(cutoff),
            with_offset,
            mirror: mirror.to_string(),
            full_symmetry,
            style: style.to_string(),
            ..Default::default()
        }
    }

    pub fn to_sweep_config(&self) -> anyhow::Result<SweepConfig> {
        let mut mirror: MirrorSpec = self.mirror.parse().context("reading mirror specification")?;
        if self.full_symmetry {
            mirror = mirror.with_mode(MirrorMode::FullSymmetry);
        }
        let style: RenderStyle = self.style.parse().context("reading render style")?;
        let base = SweepConfig::with_angle_count(self.angle_count);
        Ok(SweepConfig {
            angles: self.angles.clone().unwrap_or(base.angles),
            cutoff: self.cutoff,
            with_offset: self.with_offset,
            mirror,
            style,
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            invert_signs: self.invert_signs.clone(),
            invert_offsets: self.invert_offsets.clone(),
        }
    }

    pub fn filter_pipeline(&self) -> FilterPipeline {
        let mut pipeline = FilterPipeline::new();
        if self.slice_start.is_some() || self.slice_end.is_some() {
            pipeline = pipeline.with(Slice {
                start: self.slice_start.unwrap_or(0),
                end: self.slice_end,
            });
        }
        if self.drop_interpolated {
            pipeline = pipeline.with(DropInterpolated);
        }
        if self.drop_duplicates {
            pipeline = pipeline.with(DropConsecutiveDuplicates);
        }
        pipeline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_produces_sweep_config() {
        let cfg = WorkflowConfig::from_args(4, 30.0, true, "H", false, "point");
        let sweep = cfg.to_sweep_config().unwrap();
        assert_eq!(sweep.angles, vec![0.0, 30.0, 60.0, 90.0]);
        assert_eq!(sweep.cutoff, Some(30.0));
        assert!(sweep.with_offset && sweep.mirror.horizontal);
        assert_eq!(sweep.style, RenderStyle::Point);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"angles: [0.0, 45.0]\ncutoff: 40.0\nmirror: HV\nfull_symmetry: true\nstyle: surf\ndrop_duplicates: false\nslice_end: -1\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert!(cfg.drop_interpolated);
        assert!(!cfg.drop_duplicates);

        let sweep = cfg.to_sweep_config().unwrap();
        assert_eq!(sweep.angles, vec![0.0, 45.0]);
        assert_eq!(sweep.mirror.mode, MirrorMode::FullSymmetry);
        assert_eq!(sweep.style, RenderStyle::Surf);
        assert_eq!(cfg.filter_pipeline().len(), 2);
    }

    #[test]
    fn load_options_carry_sign_inversions() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"invert_signs: [0, 2]\ninvert_offsets: [Vertical]\n")
            .unwrap();
        let path = temp.into_temp_path();
        let options = WorkflowConfig::load(&path).unwrap().load_options();
        assert_eq!(options.invert_signs, vec![0, 2]);
        assert_eq!(options.invert_offsets, vec![Plane::Vertical]);
    }

    #[test]
    fn bad_tokens_are_rejected() {
        let cfg = WorkflowConfig::from_args(4, 30.0, false, "X", false, "line");
        assert!(cfg.to_sweep_config().is_err());
        let cfg = WorkflowConfig::from_args(4, 30.0, false, "", false, "mesh");
        assert!(cfg.to_sweep_config().is_err());
    }
}
