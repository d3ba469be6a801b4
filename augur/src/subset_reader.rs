use std::collections::HashMap;
use core::inference_type::InferenceType;
use crate::convert::convert;
use crate::error::AugurError;
use crate::repository::{DatasetReader, Repository};
use crate::selector::{self, Override};

///
/// One row's positional exceptions: column name to the raw string that failed
/// to coerce to the resolved type. Empty for a clean row.
///
pub type Exceptions = HashMap<String, String>;

pub struct SubsetResult {
    pub columns: HashMap<String, Vec<crate::convert::TypedCell>>,
    pub exceptions: Vec<Exceptions>,
    pub resolved_types: HashMap<String, InferenceType>,
}

///
/// Re-materialize `num_rows` rows starting at `first_row` (1-based) as typed
/// columns, alongside a per-row map of cells that didn't fit their column's
/// resolved type.
///
pub fn read<R: Repository>(
    repository: &R,
    dataset_name: &str,
    first_row: u64,
    num_rows: u64,
    tolerance: u64,
    filter: Option<&str>,
    overrides: &HashMap<String, Override>,
) -> Result<SubsetResult, AugurError> {
    let (schema, columns) = repository
        .read_schema(dataset_name)?
        .ok_or_else(|| AugurError::DatasetNotFound { dataset: dataset_name.to_string() })?;

    let mut resolved_types = HashMap::new();
    for column in &columns {
        let counters = schema.counters_for(column).cloned().unwrap_or_default();
        let resolved = selector::resolve(&counters, tolerance, overrides.get(column));
        resolved_types.insert(column.clone(), resolved);
    }

    let mut reader = repository.get_dataset_reader(dataset_name, filter)?;
    let rows = reader.read(first_row, num_rows)?.unwrap_or_default();

    let mut raw_columns: HashMap<String, Vec<Option<String>>> =
        columns.iter().map(|c| (c.clone(), Vec::with_capacity(rows.len()))).collect();

    for row in &rows {
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(row.as_bytes());
        if let Some(Ok(record)) = reader.records().next() {
            for (column, cell) in columns.iter().zip(record.iter()) {
                let trimmed = cell.trim().to_string();
                let value = if schema.na_values.iter().any(|na| na == &trimmed) {
                    None
                } else {
                    Some(trimmed)
                };
                raw_columns.get_mut(column).unwrap().push(value);
            }
        }
    }

    let mut exceptions: Vec<Exceptions> = vec![Exceptions::new(); rows.len()];
    let mut typed_columns = HashMap::new();

    for column in &columns {
        let resolved = resolved_types[column];
        let category_values = overrides
            .get(column)
            .and_then(|o| o.category_values.as_ref())
            .or_else(|| schema.category_values_for(column));

        let raw = &raw_columns[column];
        let result = convert(raw, resolved, category_values);

        for (row_index, (failed, cell)) in result.failed.iter().zip(raw.iter()).enumerate() {
            if *failed {
                if let Some(raw_value) = cell {
                    exceptions[row_index].insert(column.clone(), raw_value.clone());
                }
            }
        }

        typed_columns.insert(column.clone(), result.values);
    }

    Ok(SubsetResult { columns: typed_columns, exceptions, resolved_types })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::schema::Schema;
    use crate::repository::{DatasetEntry, DatasetWriter, FileSession, SessionStatus, UploadStatus};
    use std::cell::RefCell;

    struct FixtureReader {
        rows: Vec<String>,
    }

    impl DatasetReader for FixtureReader {
        fn read(&mut self, start_row: u64, chunk_size: u64) -> Result<Option<Vec<String>>, AugurError> {
            let start = (start_row - 1) as usize;
            if start >= self.rows.len() {
                return Ok(None);
            }
            let end = (start + chunk_size as usize).min(self.rows.len());
            Ok(Some(self.rows[start..end].to_vec()))
        }
    }

    struct NoopWriter;
    impl DatasetWriter for NoopWriter {
        fn write_chunk(&mut self, _raw_csv: &[u8]) -> Result<u64, AugurError> {
            Ok(0)
        }
    }

    struct FixtureRepository {
        schema: Schema,
        columns: Vec<String>,
        rows: Vec<String>,
        written: RefCell<Vec<Schema>>,
    }

    impl Repository for FixtureRepository {
        type Reader = FixtureReader;
        type Writer = NoopWriter;

        fn get_dataset_reader(&self, _dataset_name: &str, _filter: Option<&str>) -> Result<Self::Reader, AugurError> {
            Ok(FixtureReader { rows: self.rows.clone() })
        }

        fn get_dataset_writer(
            &self,
            _dataset_name: &str,
            _column_types: &[String],
            _schema: Option<&Schema>,
        ) -> Result<Self::Writer, AugurError> {
            Ok(NoopWriter)
        }

        fn read_schema(&self, _dataset_name: &str) -> Result<Option<(Schema, Vec<String>)>, AugurError> {
            Ok(Some((self.schema.clone(), self.columns.clone())))
        }

        fn write_schema(&self, _dataset_name: &str, schema: &Schema) -> Result<(), AugurError> {
            self.written.borrow_mut().push(schema.clone());
            Ok(())
        }

        fn enumerate_datasets(&self, _path: &str, _depth: u32) -> Result<Vec<DatasetEntry>, AugurError> {
            Ok(vec![])
        }

        fn set_preferred_types(
            &self,
            _dataset_name: &str,
            _preferred_types: &[Override],
            _tolerance: u64,
        ) -> Result<(), AugurError> {
            Ok(())
        }

        fn try_lock(&self, _user: &str, _dataset_name: &str) -> Result<bool, AugurError> {
            Ok(true)
        }

        fn unlock(&self, _user: &str, _dataset_name: &str) -> Result<(), AugurError> {
            Ok(())
        }

        fn upload_status(&self, _dataset_name: &str) -> Result<Option<UploadStatus>, AugurError> {
            Ok(Some(UploadStatus::Ready))
        }

        fn file_sessions(&self, _dataset_name: &str) -> Result<Vec<FileSession>, AugurError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_scenario_5_from_spec_read_back_with_exception() {
        let mut schema = Schema::new(&["IntColumn".into(), "Other".into(), "Third".into()], 100, vec![]);
        schema.column_types.get_mut("IntColumn").unwrap().insert(InferenceType::Int8, 0);

        let repository = FixtureRepository {
            schema,
            columns: vec!["IntColumn".into(), "Other".into(), "Third".into()],
            rows: vec!["X,Test,TypeA".to_string()],
            written: RefCell::new(vec![]),
        };

        let result = read(&repository, "ds", 1, 10, 0, None, &HashMap::new()).unwrap();

        assert_eq!(1, result.exceptions.len());
        assert_eq!(Some(&"X".to_string()), result.exceptions[0].get("IntColumn"));
        assert!(result.exceptions[0].get("Other").is_none());
    }

    #[test]
    fn test_read_idempotence() {
        let mut schema = Schema::new(&["a".into()], 100, vec![]);
        schema.column_types.get_mut("a").unwrap().insert(InferenceType::Int8, 0);

        let repository = FixtureRepository {
            schema,
            columns: vec!["a".into()],
            rows: vec!["1".to_string(), "2".to_string()],
            written: RefCell::new(vec![]),
        };

        let first = read(&repository, "ds", 1, 10, 0, None, &HashMap::new()).unwrap();
        let second = read(&repository, "ds", 1, 10, 0, None, &HashMap::new()).unwrap();

        assert_eq!(first.columns["a"], second.columns["a"]);
        assert_eq!(first.exceptions, second.exceptions);
    }

    #[test]
    fn test_override_bypasses_selector() {
        let schema = Schema::new(&["a".into()], 100, vec![]);
        let repository = FixtureRepository {
            schema,
            columns: vec!["a".into()],
            rows: vec!["1".to_string()],
            written: RefCell::new(vec![]),
        };

        let mut overrides = HashMap::new();
        overrides.insert("a".to_string(), Override { column_type: InferenceType::Object, category_values: None });

        let result = read(&repository, "ds", 1, 10, 0, None, &overrides).unwrap();
        assert_eq!(InferenceType::Object, result.resolved_types["a"]);
    }
}
