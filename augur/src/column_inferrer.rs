use std::collections::{HashMap, HashSet};
use core::inference_type::{InferenceType, NON_NUMERIC, NUMERIC_CASCADE};
use crate::convert::convert;

///
/// Result of gathering type statistics for one column batch - the updates to
/// fold into the owning `Schema` (see `FrameInferrer::process`).
///
#[derive(Debug, Default)]
pub struct GatherResult {
    pub failure_counters: HashMap<InferenceType, u64>,
    pub category_values: HashSet<String>,
}

///
/// Update `failure_counters`/`category_values` for one column's batch of raw
/// (NA-already-dropped) string values.
///
/// `rows_processed_after` is the cumulative row count including this batch -
/// used as the denominator for the category unique-ratio gate (§4.2,
/// resolved: cumulative, not batch-local).
///
pub fn gather(
    non_na_values: &[String],
    rows_processed_after: u64,
    mut failure_counters: HashMap<InferenceType, u64>,
    mut category_values: HashSet<String>,
    max_categories: u32,
) -> GatherResult {
    let cells: Vec<Option<String>> = non_na_values.iter().cloned().map(Some).collect();

    // Numeric cascade: most-restrictive-first, each type only re-evaluates the
    // residual that failed the previous (narrower) type.
    let mut residual = cells;
    for dtype in NUMERIC_CASCADE {
        failure_counters.entry(dtype).or_insert(0);

        if residual.is_empty() {
            continue;
        }

        let result = convert(&residual, dtype, None);
        *failure_counters.get_mut(&dtype).unwrap() += result.failure_count();

        residual = residual
            .into_iter()
            .zip(result.failed.iter())
            .filter_map(|(cell, failed)| if *failed { Some(cell) } else { None })
            .collect();
    }

    // Non-numeric types: evaluated independently against the full non-NA
    // residual every batch, not cascaded with the numeric ladder.
    let all_cells: Vec<Option<String>> = non_na_values.iter().cloned().map(Some).collect();
    for dtype in NON_NUMERIC {
        if all_cells.is_empty() {
            failure_counters.entry(dtype).or_insert(0);
            continue;
        }

        let result = convert(&all_cells, dtype, None);
        *failure_counters.entry(dtype).or_insert(0) += result.failure_count();
    }

    // Category: disqualified permanently once it would exceed the cap.
    failure_counters.remove(&InferenceType::Category);

    let unique: HashSet<String> = non_na_values.iter().cloned().collect();
    let candidate_set: HashSet<String> = category_values.union(&unique).cloned().collect();

    if candidate_set.len() as u32 <= max_categories {
        let unique_ratio = unique.len() as f64 / rows_processed_after.max(1) as f64;
        if unique_ratio <= 0.5 {
            category_values = candidate_set;
            failure_counters.insert(InferenceType::Category, 0);
        }
    }

    GatherResult {
        failure_counters,
        category_values,
    }
}
