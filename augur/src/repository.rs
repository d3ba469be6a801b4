use core::schema::Schema;
use crate::error::AugurError;

///
/// Status of an upload session for a dataset - the driver treats `Ready` on
/// any session for the dataset as the "no more rows coming" signal.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Initiated,
    Uploading,
    Ready,
    Failed,
}

///
/// A collaborator record the driver reads to decide `upload_ready` (§3). This
/// crate never creates or mutates one - it's surfaced by the upload subsystem.
///
#[derive(Clone, Debug)]
pub struct FileSession {
    pub session_id: String,
    pub user: String,
    pub dataset_name: String,
    pub status: SessionStatus,
    pub processed_rows: u64,
    pub error_message: Option<String>,
}

///
/// Upload progress as reported by the repository directly (the alternative
/// signal to a `FileSession`, per §4.5 "Upload signal").
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UploadStatus {
    InProgress,
    Ready,
}

///
/// A forward-only row source over one dataset's stored CSV rows, positioned
/// by 1-based row number.
///
pub trait DatasetReader {
    ///
    /// Read up to `chunk_size` rows starting at `start_row` (1-based,
    /// inclusive). Returns `None` once the read position is past the end of
    /// what has been stored so far - the caller (the driver) distinguishes
    /// this from an error: it means "no new data yet", not "dataset empty
    /// forever".
    ///
    fn read(&mut self, start_row: u64, chunk_size: u64) -> Result<Option<Vec<String>>, AugurError>;
}

///
/// Accepts raw CSV byte chunks for a dataset and assigns 1-based autoincrement
/// row ids as they land.
///
pub trait DatasetWriter {
    fn write_chunk(&mut self, raw_csv: &[u8]) -> Result<u64, AugurError>;
}

///
/// One entry returned by `enumerate_datasets` - a directory listing entry that
/// may or may not itself be a dataset.
///
#[derive(Clone, Debug)]
pub struct DatasetEntry {
    pub name: String,
    pub is_dataset: bool,
    pub schema_data: Option<Schema>,
    pub column_types: Vec<String>,
    pub tolerance: u64,
    pub row_count: u64,
    pub upload_status: Option<UploadStatus>,
    pub inference_status: Option<core::schema::Status>,
}

///
/// The persistence boundary this crate depends on but does not implement.
/// A real implementation lives in the host application (a database, an
/// object store, a local filesystem - whatever backs datasets there); this
/// crate only needs the contract.
///
pub trait Repository {
    type Reader: DatasetReader;
    type Writer: DatasetWriter;

    fn get_dataset_reader(&self, dataset_name: &str, filter: Option<&str>) -> Result<Self::Reader, AugurError>;

    fn get_dataset_writer(
        &self,
        dataset_name: &str,
        column_types: &[String],
        schema: Option<&Schema>,
    ) -> Result<Self::Writer, AugurError>;

    fn read_schema(&self, dataset_name: &str) -> Result<Option<(Schema, Vec<String>)>, AugurError>;

    fn write_schema(&self, dataset_name: &str, schema: &Schema) -> Result<(), AugurError>;

    fn enumerate_datasets(&self, path: &str, depth: u32) -> Result<Vec<DatasetEntry>, AugurError>;

    fn set_preferred_types(
        &self,
        dataset_name: &str,
        preferred_types: &[crate::selector::Override],
        tolerance: u64,
    ) -> Result<(), AugurError>;

    ///
    /// Acquire the per-(user, dataset) advisory lock for the duration of a
    /// driver run. Returns `false` ("miss") if another worker already holds
    /// it - the driver exits silently in that case (§4.5).
    ///
    fn try_lock(&self, user: &str, dataset_name: &str) -> Result<bool, AugurError>;

    fn unlock(&self, user: &str, dataset_name: &str) -> Result<(), AugurError>;

    fn upload_status(&self, dataset_name: &str) -> Result<Option<UploadStatus>, AugurError>;

    fn file_sessions(&self, dataset_name: &str) -> Result<Vec<FileSession>, AugurError>;
}
