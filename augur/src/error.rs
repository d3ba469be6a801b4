use thiserror::Error;

#[derive(Error, Debug)]
pub enum AugurError {

    #[error("Dataset {dataset} was not found")]
    DatasetNotFound { dataset: String },

    #[error("Schema for {dataset} is invalid")]
    SchemaInvalid { dataset: String, source: core::error::Error },

    #[error("Unable to write schema for {dataset}")]
    UploadWriteError { dataset: String, source: std::io::Error },

    #[error("Unexpected failure inferring types for {dataset} at row {position}")]
    InferenceFailure { dataset: String, position: u64, reason: String },

    #[error(transparent)]
    CoreError(#[from] core::error::Error),

    #[error(transparent)]
    CSVError(#[from] csv::Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
