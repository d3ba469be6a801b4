use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Schema for {dataset} contains invalid configuration")]
    InvalidSchema { dataset: String, source: serde_json::Error },

    #[error("Schema configuration is invalid - {reason}")]
    SchemaValidationError { reason: String },

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
