//! Ordering and key rules shared by every structural edit of a Type.

use crate::error::ValidationError;
use lf_protocol::{normalize_key, StageTemplate};
use std::collections::BTreeMap;

/// Assign orders 1..N following the current positions.
pub fn renumber(stages: &mut [StageTemplate]) {
    for (position, stage) in stages.iter_mut().enumerate() {
        stage.order = position as u32 + 1;
    }
}

/// Stable-sort by the declared order, then renumber densely.
///
/// Gaps and ties in the declared orders are tolerated; ties keep their
/// relative position.
pub fn sort_and_renumber(stages: &mut [StageTemplate]) {
    stages.sort_by_key(|stage| stage.order);
    renumber(stages);
}

/// Check that every template has a key and a name and that keys are unique
/// ignoring case.
///
/// Duplicates are reported together, lowercased and sorted, so the caller can
/// show the whole collision list at once.
pub fn validate_stage_keys(stages: &[StageTemplate]) -> Result<(), ValidationError> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();

    for stage in stages {
        if stage.key.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "key" });
        }
        if stage.name.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "name" });
        }
        *seen.entry(normalize_key(&stage.key)).or_default() += 1;
    }

    let duplicates: Vec<String> = seen
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| key)
        .collect();

    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::DuplicateKeys(duplicates))
    }
}
