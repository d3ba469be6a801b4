use std::collections::{HashMap, HashSet};
use serde::{Deserialize, Serialize};
use crate::inference_type::InferenceType;

///
/// Whether a dataset's type inference has finished. Once `Complete` no further
/// mutation of the owning `Schema` is permitted.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Incomplete,
    Complete,
}

///
/// Persisted per-dataset inference state. See §3/§6 - a `Schema` is created
/// empty (column names known, counters zero, position 1, status Incomplete)
/// and mutated only by `FrameInferrer::process`, under the caller's
/// per-dataset mutex.
///
/// `column_types` is the failure counter: the number of non-NA observations
/// that could not be parsed as that type. An absent `InferenceType` key means
/// the type has never been evaluated for that column - it is implicitly not a
/// candidate (as if its count were infinite). `Object` is never entered; it is
/// always a candidate regardless of what's in this map.
///
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Schema {
    pub max_categories: u32,

    #[serde(default)]
    pub na_values: Vec<String>,

    #[serde(default)]
    pub column_types: HashMap<String, HashMap<InferenceType, u64>>,

    #[serde(default)]
    pub category_values: HashMap<String, HashSet<String>>,

    pub position: u64,

    pub status: Status,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            max_categories: 100,
            na_values: Vec::new(),
            column_types: HashMap::new(),
            category_values: HashMap::new(),
            position: 1,
            status: Status::Incomplete,
        }
    }
}

impl Schema {
    ///
    /// A fresh schema for the given column names - counters all empty, position 1.
    ///
    pub fn new(columns: &[String], max_categories: u32, na_values: Vec<String>) -> Self {
        let mut column_types = HashMap::new();
        for column in columns {
            column_types.insert(column.clone(), HashMap::new());
        }

        Self {
            max_categories,
            na_values,
            column_types,
            category_values: HashMap::new(),
            position: 1,
            status: Status::Incomplete,
        }
    }

    ///
    /// Ensure every column name has a (possibly empty) counter map. Columns
    /// already tracked are left untouched - this never clears existing stats.
    ///
    pub fn ensure_columns(&mut self, columns: &[String]) {
        for column in columns {
            self.column_types.entry(column.clone()).or_default();
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == Status::Complete
    }

    ///
    /// Transition to Complete. Only valid once the upload is finalized and no
    /// further chunks are available (enforced by the caller, BatchedDriver).
    ///
    pub fn finalize(&mut self) {
        self.status = Status::Complete;
    }

    pub fn counters_for(&self, column: &str) -> Option<&HashMap<InferenceType, u64>> {
        self.column_types.get(column)
    }

    pub fn category_values_for(&self, column: &str) -> Option<&HashSet<String>> {
        self.category_values.get(column)
    }

    pub fn to_json(&self) -> Result<String, crate::error::Error> {
        serde_json::to_string(self).map_err(|source| crate::error::Error::InvalidSchema {
            dataset: "<unnamed>".into(),
            source,
        })
    }

    pub fn from_json(dataset: &str, raw: &str) -> Result<Self, crate::error::Error> {
        let schema: Self = serde_json::from_str(raw).map_err(|source| crate::error::Error::InvalidSchema {
            dataset: dataset.into(),
            source,
        })?;
        schema.validate()?;
        Ok(schema)
    }

    ///
    /// Check the invariants in §3 that aren't enforced by the type system
    /// alone - a `category_values` set can only grow larger than
    /// `max_categories` if something outside `ColumnInferrer::gather` wrote
    /// the schema directly (e.g. a hand-edited fixture, or a future
    /// persistence layer bug).
    ///
    pub fn validate(&self) -> Result<(), crate::error::Error> {
        if self.position == 0 {
            return Err(crate::error::Error::SchemaValidationError {
                reason: "position must be a 1-based row cursor, got 0".into(),
            });
        }

        for (column, values) in &self.category_values {
            if values.len() as u32 > self.max_categories {
                return Err(crate::error::Error::SchemaValidationError {
                    reason: format!(
                        "column {} has {} category values, exceeding max_categories {}",
                        column, values.len(), self.max_categories
                    ),
                });
            }
        }

        Ok(())
    }
}
