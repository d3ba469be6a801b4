use std::collections::HashMap;
use core::schema::Schema;
use crate::column_inferrer::gather;

///
/// A row-aligned batch of raw cells, column name to ordered values, as handed
/// down by the driver after splitting a repository chunk on newlines/commas.
///
pub type Batch = HashMap<String, Vec<String>>;

///
/// Drive one batch of columns through `column_inferrer::gather`, folding the
/// results into `schema` and advancing `schema.position`. An empty batch is a
/// no-op (§4.4 idempotence).
///
pub fn process(schema: &mut Schema, batch: &Batch) {
    let rows = batch.values().map(|v| v.len()).max().unwrap_or(0);
    if rows == 0 {
        return;
    }

    schema.ensure_columns(&batch.keys().cloned().collect::<Vec<_>>());
    let rows_processed_after = schema.position - 1 + rows as u64;

    for (column, raw_values) in batch {
        let non_na: Vec<String> = raw_values
            .iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !schema.na_values.iter().any(|na| na == v))
            .collect();

        let counters = schema.column_types.remove(column).unwrap_or_default();
        let category_values = schema.category_values.remove(column).unwrap_or_default();

        let result = gather(
            &non_na,
            rows_processed_after,
            counters,
            category_values,
            schema.max_categories,
        );

        schema.column_types.insert(column.clone(), result.failure_counters);
        if !result.category_values.is_empty() {
            schema.category_values.insert(column.clone(), result.category_values);
        }
    }

    schema.position += rows as u64;
}
