use std::thread;
use std::time::{Duration, Instant};
use itertools::Itertools;
use log::{debug, error, info, warn};
use core::{blue, formatted_duration_rate, schema::Schema};
use crate::error::AugurError;
use crate::frame_inferrer::{self, Batch};
use crate::repository::{DatasetReader, Repository, SessionStatus, UploadStatus};

const CHUNK_SIZE: u64 = 1000;
const BACKOFF_INITIAL_SECS: u64 = 1;
const BACKOFF_CAP_SECS: u64 = 60;

///
/// Loop: read a chunk from the repository, run it through `FrameInferrer`,
/// persist the schema, and repeat - until the upload finishes and no more
/// rows are available, backing off on empty reads in the meantime.
///
/// Returns `Ok(true)` if this invocation reached `Complete`, `Ok(false)` if
/// it gave up after the backoff cap was reached (a later invocation resumes
/// from `schema.position`), and silently returns `Ok(false)` without doing
/// any work at all if the per-dataset lock could not be acquired.
///
pub fn do_work<R: Repository>(
    repository: &R,
    user: &str,
    dataset_name: &str,
) -> Result<bool, AugurError> {
    if !repository.try_lock(user, dataset_name)? {
        info!("dataset {} already has an inference worker running, exiting", dataset_name);
        return Ok(false);
    }

    let result = run_locked(repository, user, dataset_name);

    if let Err(e) = repository.unlock(user, dataset_name) {
        error!("failed to release lock for {}: {}", dataset_name, e);
    }

    result
}

fn run_locked<R: Repository>(repository: &R, user: &str, dataset_name: &str) -> Result<bool, AugurError> {
    let (mut schema, columns) = repository
        .read_schema(dataset_name)?
        .ok_or_else(|| AugurError::DatasetNotFound { dataset: dataset_name.to_string() })?;

    schema.ensure_columns(&columns);
    debug!("{} tracking columns: {}", dataset_name, columns.iter().join(", "));

    if schema.is_complete() {
        info!("dataset {} already complete", dataset_name);
        return Ok(true);
    }

    let mut reader = repository.get_dataset_reader(dataset_name, None)?;
    let mut backoff = BACKOFF_INITIAL_SECS;

    loop {
        let chunk = reader.read(schema.position, CHUNK_SIZE).map_err(|e| {
            error!("read failure for {} at row {}: {}", dataset_name, schema.position, e);
            AugurError::InferenceFailure {
                dataset: dataset_name.to_string(),
                position: schema.position,
                reason: e.to_string(),
            }
        })?;

        match chunk {
            Some(rows) if !rows.is_empty() => {
                debug!("{} read {} rows at position {}", dataset_name, rows.len(), schema.position);
                let row_count = rows.len();
                let started = Instant::now();
                let batch = split_columns(&columns, &rows);

                frame_inferrer::process(&mut schema, &batch);

                repository.write_schema(dataset_name, &schema).map_err(|source| {
                    if let AugurError::IOError(io) = source {
                        AugurError::UploadWriteError { dataset: dataset_name.to_string(), source: io }
                    } else {
                        source
                    }
                })?;

                backoff = BACKOFF_INITIAL_SECS;
                let (duration, rate) = formatted_duration_rate(row_count, started.elapsed());
                info!(
                    "{} rows inferred for {} in {} ({} rows processed, {} per row)",
                    row_count, blue(dataset_name), duration, schema.position - 1, rate
                );
            }
            _ => {
                if upload_ready(repository, dataset_name)? {
                    schema.finalize();
                    repository.write_schema(dataset_name, &schema)?;
                    info!("{} finalized at position {}", dataset_name, schema.position);
                    return Ok(true);
                }

                let was_at_cap = backoff >= BACKOFF_CAP_SECS;

                thread::sleep(Duration::from_secs(backoff));

                if was_at_cap {
                    warn!("{} backoff cap reached, leaving incomplete at position {}", dataset_name, schema.position);
                    return Ok(false);
                }

                backoff = (backoff * 2).min(BACKOFF_CAP_SECS);
            }
        }
    }
}

fn upload_ready<R: Repository>(repository: &R, dataset_name: &str) -> Result<bool, AugurError> {
    if repository.upload_status(dataset_name)? == Some(UploadStatus::Ready) {
        return Ok(true);
    }

    let sessions = repository.file_sessions(dataset_name)?;
    Ok(sessions.iter().any(|s| s.status == SessionStatus::Ready))
}

///
/// Split raw CSV row strings into column-aligned cells. Quoting/escaping is
/// handled by `csv` itself - this crate only needs a row-chunked splitter,
/// not the full grammar (multi-line fields, custom delimiters).
///
fn split_columns(columns: &[String], rows: &[String]) -> Batch {
    let mut batch: Batch = columns.iter().map(|c| (c.clone(), Vec::with_capacity(rows.len()))).collect();

    for row in rows {
        let mut reader = csv::ReaderBuilder::new().has_headers(false).from_reader(row.as_bytes());
        if let Some(Ok(record)) = reader.records().next() {
            for (column, cell) in columns.iter().zip(record.iter()) {
                batch.get_mut(column).unwrap().push(cell.to_string());
            }
        }
    }

    batch
}
