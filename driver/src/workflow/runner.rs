use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use aperturecore::io::load_profile_with;
use aperturecore::{Profile, RenderStyle, SweepConfig, SweepEngine, SweepResult};
use std::path::Path;

pub struct WorkflowResult {
    /// Profile after the configured filters.
    pub profile: Profile,
    pub sweep: SweepResult,
    pub style: RenderStyle,
    pub loaded_records: usize,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    /// Loads, filters and sweeps one aperture dump.
    pub fn execute(&self, path: &Path) -> anyhow::Result<WorkflowResult> {
        let profile = load_profile_with(path, &self.config.load_options())
            .with_context(|| format!("loading aperture dump {}", path.display()))?;
        let loaded_records = profile.len();

        let filtered = self.config.filter_pipeline().apply(&profile);
        let sweep_config = self
            .config
            .to_sweep_config()
            .context("building sweep configuration")?;
        let sweep = self.sweep(&filtered, &sweep_config)?;

        Ok(WorkflowResult {
            profile: filtered,
            style: sweep_config.style,
            sweep,
            loaded_records,
        })
    }

    /// Sweeps an already filtered profile with an explicit configuration.
    pub fn sweep(&self, profile: &Profile, config: &SweepConfig) -> anyhow::Result<SweepResult> {
        SweepEngine::new(config.clone())
            .run(profile)
            .context("sweeping aperture profile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::dump::{build_dump_from_config, GeneratorConfig};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn runner_executes_workflow() {
        let generator = GeneratorConfig {
            sections: 12,
            seed: 7,
            ..Default::default()
        };
        let dump = build_dump_from_config(&generator).unwrap();
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(dump.as_bytes()).unwrap();
        let path = temp.into_temp_path();

        let cfg = WorkflowConfig::from_args(5, 0.0, false, "H", false, "line");
        let runner = Runner::new(cfg);
        let result = runner.execute(&path).unwrap();

        assert!(result.profile.len() <= result.loaded_records);
        assert!(result.profile.iter().all(|r| !r.is_interpolated()));
        assert_eq!(result.sweep.entries.len(), 10);
        assert!(result.sweep.rejected.is_empty());
        for entry in &result.sweep.entries {
            assert_eq!(entry.len(), result.profile.len());
        }
    }

    #[test]
    fn runner_reports_missing_file() {
        let runner = Runner::new(WorkflowConfig::default());
        let err = runner.execute(Path::new("/nonexistent/aperture.dat")).err().unwrap();
        assert!(format!("{err:#}").contains("loading aperture dump"));
    }
}
