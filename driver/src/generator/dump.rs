use anyhow::Context;
use aperturecore::model::{ShapeKind, INTERPOLATED_NAME, PARAM_COUNT};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::fs;
use std::path::Path;

const HEADER: &str = "# name aptype s[m] aper1[m] aper2[m] aper3[m] aper4[m] aper5[m] aper6[m] aper7[rad] aper8[rad] xoff[m] yoff[m]";

/// Configuration for generating a synthetic aperture dump.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of uniform-aperture sections.
    pub sections: usize,
    /// Longest run of identical elements inside one section.
    pub max_elements: usize,
    /// Length of one element (m).
    pub element_length: f64,
    /// Probability of an interpolated row between sections.
    pub interpolation_rate: f64,
    /// Largest absolute misalignment offset.
    pub max_offset: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            sections: 40,
            max_elements: 6,
            element_length: 2.5,
            interpolation_rate: 0.3,
            max_offset: 0.5,
            seed: 0,
        }
    }
}

fn random_params(rng: &mut StdRng, kind: ShapeKind) -> [f64; PARAM_COUNT] {
    let mut p = [0.0; PARAM_COUNT];
    match kind {
        ShapeKind::Circle => p[0] = rng.gen_range(20.0..40.0),
        ShapeKind::Rectangle | ShapeKind::Ellipse => {
            p[0] = rng.gen_range(15.0..40.0);
            p[1] = rng.gen_range(10.0..30.0);
        }
        ShapeKind::RectEllipse => {
            p[0] = rng.gen_range(18.0..25.0);
            p[1] = rng.gen_range(14.0..20.0);
            let radius = rng.gen_range(22.0..26.0);
            p[2] = radius;
            p[3] = radius;
        }
        ShapeKind::Octagon => {
            p[0] = rng.gen_range(20.0..30.0);
            p[1] = rng.gen_range(20.0..30.0);
            p[2] = rng.gen_range(0.3..0.5);
            p[3] = rng.gen_range(1.0..1.3);
        }
        ShapeKind::Racetrack => {
            p[0] = rng.gen_range(0.0..10.0);
            p[1] = rng.gen_range(0.0..5.0);
            p[2] = rng.gen_range(5.0..20.0);
            p[3] = rng.gen_range(5.0..20.0);
        }
        ShapeKind::Transition => {
            p[0] = rng.gen_range(20.0..30.0);
            p[1] = rng.gen_range(20.0..30.0);
            p[2] = rng.gen_range(2.0..6.0);
            p[3] = rng.gen_range(2.0..6.0);
            p[4] = rng.gen_range(10.0..20.0);
            p[5] = rng.gen_range(10.0..20.0);
            p[6] = rng.gen_range(0.3..0.5);
            p[7] = rng.gen_range(1.0..1.3);
        }
    }
    p
}

fn push_row(
    out: &mut String,
    name: &str,
    kind: ShapeKind,
    s: f64,
    params: &[f64],
    offsets: (f64, f64),
) -> fmt::Result {
    write!(out, "{name} {} {s:.6}", kind.code())?;
    for value in params {
        write!(out, " {value:.6}")?;
    }
    writeln!(out, " {:.6} {:.6}", offsets.0, offsets.1)
}

/// Builds dump text: sections of repeated identical elements, optionally
/// separated by interpolated rows.
pub fn build_dump_from_config(config: &GeneratorConfig) -> anyhow::Result<String> {
    if !(0.0..=1.0).contains(&config.interpolation_rate) {
        anyhow::bail!(
            "interpolation rate {} outside [0, 1]",
            config.interpolation_rate
        );
    }
    let max_elements = config.max_elements.max(1);
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut out = String::new();
    writeln!(out, "{HEADER}")?;

    let mut s = 0.0;
    for section in 0..config.sections {
        let kind = ShapeKind::ALL[rng.gen_range(0..ShapeKind::ALL.len())];
        let params = random_params(&mut rng, kind);
        let offsets = if config.max_offset > 0.0 {
            (
                rng.gen_range(-config.max_offset..config.max_offset),
                rng.gen_range(-config.max_offset..config.max_offset),
            )
        } else {
            (0.0, 0.0)
        };

        let elements = rng.gen_range(1..=max_elements);
        for element in 0..elements {
            let name = format!("S{section}.E{element}");
            push_row(&mut out, &name, kind, s, &params, offsets)?;
            s += config.element_length;
        }
        if section + 1 < config.sections && rng.gen_bool(config.interpolation_rate) {
            push_row(&mut out, INTERPOLATED_NAME, kind, s, &params, offsets)?;
            s += config.element_length / 2.0;
        }
    }

    Ok(out)
}

pub fn write_dump(path: &Path, config: &GeneratorConfig) -> anyhow::Result<()> {
    let dump = build_dump_from_config(config)?;
    fs::write(path, dump).with_context(|| format!("writing synthetic dump {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aperturecore::io::parse_profile;
    use aperturecore::LoadOptions;

    #[test]
    fn generated_dump_parses() {
        let config = GeneratorConfig {
            sections: 25,
            seed: 3,
            ..Default::default()
        };
        let dump = build_dump_from_config(&config).unwrap();
        let profile = parse_profile(&dump, &LoadOptions::default()).unwrap();
        assert!(profile.len() >= 25);
        assert!(profile.iter().all(|r| r.shape_kind().is_ok()));
    }

    #[test]
    fn same_seed_gives_same_dump() {
        let config = GeneratorConfig {
            sections: 10,
            seed: 42,
            ..Default::default()
        };
        assert_eq!(
            build_dump_from_config(&config).unwrap(),
            build_dump_from_config(&config).unwrap()
        );
    }

    #[test]
    fn sections_collapse_to_their_ends() {
        let config = GeneratorConfig {
            sections: 1,
            max_elements: 1,
            max_offset: 0.0,
            ..Default::default()
        };
        let dump = build_dump_from_config(&config).unwrap();
        let profile = parse_profile(&dump, &LoadOptions::default()).unwrap();
        assert_eq!(profile.len(), 1);
        assert_eq!(profile.drop_consecutive_duplicates().len(), 1);
    }

    #[test]
    fn every_row_matches_header_width() {
        let config = GeneratorConfig {
            sections: 8,
            interpolation_rate: 1.0,
            seed: 5,
            ..Default::default()
        };
        let dump = build_dump_from_config(&config).unwrap();
        let width = HEADER.split_whitespace().count() - 1;
        let rows: Vec<&str> = dump.lines().skip(1).collect();
        assert!(rows.len() >= 8 + 7);
        assert!(rows.iter().all(|row| row.split_whitespace().count() == width));
        assert!(dump.ends_with('\n'));
    }

    #[test]
    fn invalid_rate_is_rejected() {
        let config = GeneratorConfig {
            interpolation_rate: 1.5,
            ..Default::default()
        };
        assert!(build_dump_from_config(&config).is_err());
    }
}
