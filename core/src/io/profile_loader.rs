use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::table::{parse_table, RawTable};
use crate::model::record::{ApertureRecord, ShapeKind, PARAM_COUNT};
use crate::model::{Plane, Profile};
use crate::prelude::{ApertureError, ApertureResult};
use crate::telemetry::LogManager;

/// Knobs applied while reading an aperture dump.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadOptions {
    /// Parameter indices (0-based) whose sign is flipped on load.
    pub invert_signs: Vec<usize>,
    /// Planes whose misalignment offset is negated on load.
    pub invert_offsets: Vec<Plane>,
}

impl LoadOptions {
    fn offset_sign(&self, plane: Plane) -> f64 {
        if self.invert_offsets.contains(&plane) {
            -1.0
        } else {
            1.0
        }
    }
}

struct Columns {
    name: usize,
    aptype: usize,
    s: usize,
    xoff: usize,
    yoff: usize,
    params: Vec<usize>,
}

impl Columns {
    fn locate(table: &RawTable) -> ApertureResult<Self> {
        // only a leading run aper1..aperN counts
        let params = (1..=PARAM_COUNT)
            .map_while(|n| table.column(&format!("aper{n}")))
            .collect();
        Ok(Self {
            name: table.require("name")?,
            aptype: table.require("aptype")?,
            s: table.require("s")?,
            xoff: table.require("xoff")?,
            yoff: table.require("yoff")?,
            params,
        })
    }
}

pub fn load_profile(path: impl AsRef<Path>) -> ApertureResult<Profile> {
    load_profile_with(path, &LoadOptions::default())
}

pub fn load_profile_with(path: impl AsRef<Path>, options: &LoadOptions) -> ApertureResult<Profile> {
    let path = path.as_ref();
    let logger = LogManager::new("loader");
    logger.record(&format!("loading {}", path.display()));
    let text = fs::read_to_string(path)?;
    Ok(parse_profile(&text, options)?.with_source(path))
}

/// Parses dump text; no partial profile is produced on error.
pub fn parse_profile(text: &str, options: &LoadOptions) -> ApertureResult<Profile> {
    if let Some(bad) = options.invert_signs.iter().find(|i| **i >= PARAM_COUNT) {
        return Err(ApertureError::InvalidConfiguration(format!(
            "cannot invert parameter {bad}: records carry {PARAM_COUNT} parameters"
        )));
    }

    let logger = LogManager::new("loader");
    let table = parse_table(text)?;
    let columns = Columns::locate(&table)?;

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        let name = row.cells[columns.name].clone();
        let code = row.cells[columns.aptype].clone();

        if let Some(kind) = ShapeKind::from_code(&code) {
            if kind.arity() > columns.params.len() {
                return Err(ApertureError::parse(
                    row.line,
                    format!(
                        "record '{name}' of kind {kind} needs {} parameters but the header provides {}",
                        kind.arity(),
                        columns.params.len()
                    ),
                ));
            }
        }

        let mut params = [0.0; PARAM_COUNT];
        for (n, column) in columns.params.iter().enumerate() {
            params[n] = row.float(*column, &format!("aper{}", n + 1))?;
        }
        for idx in &options.invert_signs {
            params[*idx] = -params[*idx];
        }

        let x_offset = row.float(columns.xoff, "xoff")?;
        let y_offset = row.float(columns.yoff, "yoff")?;
        let record = ApertureRecord {
            name,
            code,
            s: row.float(columns.s, "s")?,
            params,
            x_offset: options.offset_sign(Plane::Horizontal) * x_offset,
            y_offset: options.offset_sign(Plane::Vertical) * y_offset,
        };
        if record.is_null() {
            logger.warn(&format!("aperture {} at s = {} is null", record.name, record.s));
        }
        records.push(record);
    }

    if records.is_empty() {
        logger.warn("no aperture markers found");
    } else {
        logger.record(&format!("loaded {} aperture markers", records.len()));
    }
    Ok(Profile::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const DUMP: &str = "\
# name aptype s[m] aper1[m] aper2[m] aper3[m] aper4[m] aper5[m] aper6[m] aper7[rad] aper8[rad] xoff[m] yoff[m]
IP1 CR 0.0 10 0 0 0 0 0 0 0 0.0 0.0
MB.A RE 1.0 5 8 0 0 0 0 0 0 0.1 -0.2
interpolated EL 2.0 6 3 0 0 0 0 0 0 0.0 0.0
TCP XX 3.0 1 1 0 0 0 0 0 0 0.0 0.0
";

    #[test]
    fn parses_records_in_file_order() {
        let profile = parse_profile(DUMP, &LoadOptions::default()).unwrap();
        assert_eq!(profile.len(), 4);
        let names: Vec<&str> = profile.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["IP1", "MB.A", "interpolated", "TCP"]);
        let rect = &profile.records()[1];
        assert_eq!(rect.shape_kind().unwrap(), ShapeKind::Rectangle);
        assert_eq!(rect.params[..2], [5.0, 8.0]);
        assert_eq!((rect.x_offset, rect.y_offset), (0.1, -0.2));
    }

    #[test]
    fn unknown_codes_survive_loading() {
        let profile = parse_profile(DUMP, &LoadOptions::default()).unwrap();
        assert!(profile.records()[3].shape_kind().is_err());
    }

    #[test]
    fn column_count_mismatch_fails_whole_load() {
        let text = format!("{DUMP}BROKEN CR 4.0 1 2\n");
        match parse_profile(&text, &LoadOptions::default()) {
            Err(ApertureError::Parse { line, .. }) => assert_eq!(line, 6),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_required_column_is_a_parse_error() {
        let text = "# name aptype s aper1 xoff\nA CR 0 1 0\n";
        assert!(matches!(
            parse_profile(text, &LoadOptions::default()),
            Err(ApertureError::Parse { .. })
        ));
    }

    #[test]
    fn known_kind_needs_enough_parameter_columns() {
        let text = "# name aptype s aper1 aper2 xoff yoff\nA RE 0 1 2 0 0\nB OC 1 1 2 0 0\n";
        match parse_profile(text, &LoadOptions::default()) {
            Err(ApertureError::Parse { line, message }) => {
                assert_eq!(line, 3);
                assert!(message.contains("'B'"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invert_signs_flips_selected_parameters() {
        let options = LoadOptions {
            invert_signs: vec![1],
            ..Default::default()
        };
        let profile = parse_profile(DUMP, &options).unwrap();
        assert_eq!(profile.records()[1].params[1], -8.0);
        let out_of_range = LoadOptions {
            invert_signs: vec![8],
            ..Default::default()
        };
        assert!(parse_profile(DUMP, &out_of_range).is_err());
    }

    #[test]
    fn invert_offsets_flips_selected_planes() {
        let vertical = LoadOptions {
            invert_offsets: vec![Plane::Vertical],
            ..Default::default()
        };
        let rect = parse_profile(DUMP, &vertical).unwrap().records()[1].clone();
        assert_eq!((rect.x_offset, rect.y_offset), (0.1, 0.2));
        assert_eq!(rect.params[..2], [5.0, 8.0]);

        let both = LoadOptions {
            invert_offsets: vec![Plane::Horizontal, Plane::Vertical],
            ..Default::default()
        };
        let rect = parse_profile(DUMP, &both).unwrap().records()[1].clone();
        assert_eq!((rect.x_offset, rect.y_offset), (-0.1, 0.2));
    }

    #[test]
    fn non_numeric_cell_is_reported() {
        let text = "# name aptype s aper1 xoff yoff\nA CR zero 1 0 0\n";
        assert!(matches!(
            parse_profile(text, &LoadOptions::default()),
            Err(ApertureError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn load_profile_reads_file_and_records_source() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(DUMP.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let profile = load_profile(&path).unwrap();
        assert_eq!(profile.len(), 4);
        assert_eq!(profile.source(), Some(&*path));
    }
}
