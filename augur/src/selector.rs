use std::collections::{HashMap, HashSet};
use core::inference_type::{InferenceType, PREFERENCE_ORDER};

///
/// A caller-supplied override for one column - bypasses `candidates`/`preferred`
/// entirely and is returned verbatim, optionally carrying its own category set.
///
#[derive(Clone, Debug)]
pub struct Override {
    pub column_type: InferenceType,
    pub category_values: Option<HashSet<String>>,
}

///
/// The set of types a column's failure counters qualify for at `tolerance`.
/// `Object` is always included - it never fails, so it is always a candidate.
///
pub fn candidates(counters: &HashMap<InferenceType, u64>, tolerance: u64) -> HashSet<InferenceType> {
    let mut result: HashSet<InferenceType> = counters
        .iter()
        .filter(|(_, count)| **count <= tolerance)
        .map(|(dtype, _)| *dtype)
        .collect();

    result.insert(InferenceType::Object);
    result
}

///
/// The single most specific candidate, per the fixed preference order.
/// `Object` is last in that order, so it's the fallback when nothing else
/// qualifies - it is always present in `candidates`, so this never panics.
///
pub fn preferred(candidates: &HashSet<InferenceType>) -> InferenceType {
    PREFERENCE_ORDER
        .into_iter()
        .find(|dtype| candidates.contains(dtype))
        .unwrap_or(InferenceType::Object)
}

///
/// Resolve the type to use for reading a column back: an explicit override if
/// supplied, otherwise `preferred(candidates(counters, tolerance))`.
///
pub fn resolve(
    counters: &HashMap<InferenceType, u64>,
    tolerance: u64,
    override_: Option<&Override>,
) -> InferenceType {
    match override_ {
        Some(o) => o.column_type,
        None => preferred(&candidates(counters, tolerance)),
    }
}
