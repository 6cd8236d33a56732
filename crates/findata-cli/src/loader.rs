//! CSV ingestion into the upload store.
//!
//! Streams the file row by row, appending to Redis in `CHUNK_SIZE` chunks so
//! arbitrarily large files never materialize in memory. The append path
//! maintains the O(1) row counter the sync engine reads at fetch time.

use std::path::Path;

use anyhow::Context;
use tracing::info;

use findata_core::{FileType, LoanType, RawRow, Settings};
use findata_staging::UploadStore;

pub async fn load_csv(
    settings: &Settings,
    tenant_id: &str,
    loan_type: LoanType,
    file_type: FileType,
    path: &Path,
) -> anyhow::Result<()> {
    let store = UploadStore::connect(&settings.redis)
        .await
        .context("connecting to upload store")?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = reader
        .headers()
        .context("reading CSV header row")?
        .clone();

    let mut chunk: Vec<RawRow> = Vec::with_capacity(settings.chunk_size);
    let mut total = 0u64;

    for record in reader.records() {
        let record = record.context("reading CSV record")?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        chunk.push(row);

        if chunk.len() >= settings.chunk_size {
            store
                .append_rows(tenant_id, loan_type, file_type, &chunk)
                .await
                .context("appending chunk to upload store")?;
            total += chunk.len() as u64;
            chunk.clear();
        }
    }
    if !chunk.is_empty() {
        store
            .append_rows(tenant_id, loan_type, file_type, &chunk)
            .await
            .context("appending final chunk to upload store")?;
        total += chunk.len() as u64;
    }

    info!(
        tenant = tenant_id,
        loan_type = %loan_type,
        file_type = %file_type,
        rows = total,
        "CSV upload staged"
    );
    println!("Loaded {total} {file_type} rows for {tenant_id}/{loan_type}");
    Ok(())
}
