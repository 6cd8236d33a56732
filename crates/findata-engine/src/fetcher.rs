use findata_core::{AdapterError, FileType, LoanType};
use findata_staging::{ChunkCursor, UploadStore};

/// Read side of the staged-upload contract for one tenant.
///
/// `row_count` is O(1) (a counter maintained by the upload path); `chunks`
/// is a finite, single-pass stream whose memory footprint is one decoded
/// chunk.
pub struct DataFetcher {
    store: UploadStore,
    tenant_id: String,
}

impl DataFetcher {
    pub fn new(store: UploadStore, tenant_id: impl Into<String>) -> Self {
        Self {
            store,
            tenant_id: tenant_id.into(),
        }
    }

    pub async fn row_count(
        &self,
        loan_type: LoanType,
        file_type: FileType,
    ) -> Result<u64, AdapterError> {
        self.store
            .row_count(&self.tenant_id, loan_type, file_type)
            .await
    }

    pub fn chunks(&self, loan_type: LoanType, file_type: FileType) -> ChunkCursor {
        self.store.chunks(&self.tenant_id, loan_type, file_type)
    }
}
