use crate::model::{ApertureRecord, Profile};
use crate::prelude::ProfileFilter;
use crate::telemetry::LogManager;

/// Resolves a possibly negative index against `len`, clamping to the table.
fn resolve_index(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        (index as usize).min(len)
    }
}

impl Profile {
    /// Records in `[start, end)`; negative bounds count from the end and
    /// `None` for `end` runs to the last record.
    pub fn slice(&self, start: isize, end: Option<isize>) -> Profile {
        let len = self.len();
        let lo = resolve_index(start, len);
        let hi = end.map_or(len, |e| resolve_index(e, len));
        let records = if lo < hi {
            self.records()[lo..hi].to_vec()
        } else {
            Vec::new()
        };
        self.derive(records)
    }

    /// Removes rows synthesised between real aperture markers.
    pub fn drop_interpolated(&self) -> Profile {
        let records = self
            .iter()
            .filter(|r| !r.is_interpolated())
            .cloned()
            .collect();
        self.derive(records)
    }

    /// Collapses each run of identical consecutive sections to its first and
    /// last record, so only the boundaries of a uniform section remain.
    pub fn drop_consecutive_duplicates(&self) -> Profile {
        let records = self.records();
        let last = records.len().saturating_sub(1);
        let kept = records
            .iter()
            .enumerate()
            .filter(|(i, record)| {
                let i = *i;
                if i == 0 || i == last {
                    return true;
                }
                !record.same_section(&records[i - 1]) || !record.same_section(&records[i + 1])
            })
            .map(|(_, record)| record.clone())
            .collect::<Vec<ApertureRecord>>();
        self.derive(kept)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Slice {
    pub start: isize,
    pub end: Option<isize>,
}

impl ProfileFilter for Slice {
    fn name(&self) -> &str {
        "slice"
    }

    fn apply(&self, profile: &Profile) -> Profile {
        profile.slice(self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DropInterpolated;

impl ProfileFilter for DropInterpolated {
    fn name(&self) -> &str {
        "drop_interpolated"
    }

    fn apply(&self, profile: &Profile) -> Profile {
        profile.drop_interpolated()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DropConsecutiveDuplicates;

impl ProfileFilter for DropConsecutiveDuplicates {
    fn name(&self) -> &str {
        "drop_consecutive_duplicates"
    }

    fn apply(&self, profile: &Profile) -> Profile {
        profile.drop_consecutive_duplicates()
    }
}

/// Ordered chain of filters applied one after the other.
pub struct FilterPipeline {
    filters: Vec<Box<dyn ProfileFilter + Send + Sync>>,
    logger: LogManager,
}

impl FilterPipeline {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            logger: LogManager::new("filter"),
        }
    }

    pub fn with(mut self, filter: impl ProfileFilter + Send + Sync + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn apply(&self, profile: &Profile) -> Profile {
        let mut current = profile.clone();
        for filter in &self.filters {
            let next = filter.apply(&current);
            self.logger.record(&format!(
                "{}: {} -> {} records",
                filter.name(),
                current.len(),
                next.len()
            ));
            current = next;
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;

    fn circle(name: &str, s: f64, r: f64) -> ApertureRecord {
        ApertureRecord::new(name, ShapeKind::Circle, s, &[r])
    }

    fn names(profile: &Profile) -> Vec<String> {
        profile.iter().map(|r| r.name.clone()).collect()
    }

    fn numbered(count: usize) -> Profile {
        Profile::new((0..count).map(|i| circle(&format!("r{i}"), i as f64, 1.0 + i as f64)).collect())
    }

    #[test]
    fn slice_supports_negative_end() {
        let profile = numbered(5);
        assert_eq!(names(&profile.slice(1, Some(3))), vec!["r1", "r2"]);
        assert_eq!(names(&profile.slice(0, Some(-2))), vec!["r0", "r1", "r2"]);
        assert_eq!(names(&profile.slice(3, None)), vec!["r3", "r4"]);
        assert!(profile.slice(4, Some(2)).is_empty());
        assert_eq!(profile.slice(0, Some(100)).len(), 5);
        assert!(profile.slice(0, Some(-10)).is_empty());
    }

    #[test]
    fn drop_interpolated_removes_sentinel_rows() {
        let profile = Profile::new(vec![
            circle("a", 0.0, 1.0),
            circle("interpolated", 0.5, 1.0),
            circle("b", 1.0, 1.0),
        ]);
        assert_eq!(names(&profile.drop_interpolated()), vec!["a", "b"]);
        assert_eq!(profile.len(), 3);
    }

    #[test]
    fn duplicate_run_collapses_to_first_and_last() {
        let profile = Profile::new(vec![
            circle("start", 0.0, 1.0),
            circle("run0", 1.0, 2.0),
            circle("run1", 2.0, 2.0),
            circle("run2", 3.0, 2.0),
            circle("run3", 4.0, 2.0),
            circle("single", 5.0, 3.0),
            circle("end", 6.0, 4.0),
        ]);
        assert_eq!(
            names(&profile.drop_consecutive_duplicates()),
            vec!["start", "run0", "run3", "single", "end"]
        );
    }

    #[test]
    fn table_ends_are_always_kept() {
        let profile = Profile::new(vec![
            circle("a", 0.0, 1.0),
            circle("b", 1.0, 1.0),
            circle("c", 2.0, 1.0),
        ]);
        assert_eq!(names(&profile.drop_consecutive_duplicates()), vec!["a", "c"]);
        let single = Profile::new(vec![circle("only", 0.0, 1.0)]);
        assert_eq!(single.drop_consecutive_duplicates().len(), 1);
        assert!(Profile::default().drop_consecutive_duplicates().is_empty());
    }

    #[test]
    fn offsets_break_duplicate_runs() {
        let profile = Profile::new(vec![
            circle("a", 0.0, 1.0),
            circle("b", 1.0, 1.0).with_offsets(0.5, 0.0),
            circle("c", 2.0, 1.0),
        ]);
        assert_eq!(profile.drop_consecutive_duplicates().len(), 3);
    }

    #[test]
    fn pipeline_applies_filters_in_order() {
        let profile = Profile::new(vec![
            circle("a", 0.0, 1.0),
            circle("interpolated", 0.5, 1.0),
            circle("b", 1.0, 1.0),
            circle("c", 2.0, 1.0),
            circle("d", 3.0, 2.0),
        ]);
        let pipeline = FilterPipeline::new()
            .with(DropInterpolated)
            .with(DropConsecutiveDuplicates)
            .with(Slice { start: 0, end: Some(-1) });
        assert_eq!(pipeline.len(), 3);
        assert_eq!(names(&pipeline.apply(&profile)), vec!["a", "c"]);
    }
}
