use std::collections::HashSet;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use findata_core::{AdapterError, ClickHouseSettings, FileType, LoanType, INSERT_BATCH_SIZE};

use crate::client::ClickHouseClient;
use crate::ddl::{fact_table, staging_table};

/// Atomic loading into one tenant's warehouse database.
///
/// Flow per file type: truncate staging, bulk-insert the populated rows in
/// batches, then one `REPLACE PARTITION` swaps the loan-type partition of the
/// fact table. Readers observe either the old or the new partition, never a
/// mix.
pub struct StorageManager {
    client: ClickHouseClient,
}

impl StorageManager {
    pub fn new(settings: &ClickHouseSettings, ch_database: &str) -> Self {
        Self {
            client: ClickHouseClient::new(settings, ch_database),
        }
    }

    pub fn client(&self) -> &ClickHouseClient {
        &self.client
    }

    /// Idempotent truncate of a staging table.
    pub async fn truncate_staging(&self, file_type: FileType) -> Result<(), AdapterError> {
        self.client
            .command(&format!("TRUNCATE TABLE {}", staging_table(file_type)))
            .await
    }

    /// Bulk insert typed rows into a staging table, in batches of at most
    /// [`INSERT_BATCH_SIZE`]. Returns the number of rows written.
    pub async fn insert_staging<T: Serialize>(
        &self,
        file_type: FileType,
        rows: &[T],
    ) -> Result<u64, AdapterError> {
        let table = staging_table(file_type);
        let mut inserted = 0u64;
        for batch in rows.chunks(INSERT_BATCH_SIZE) {
            let lines: Vec<String> = batch
                .iter()
                .map(serde_json::to_string)
                .collect::<Result<_, _>>()
                .map_err(|e| AdapterError::Serialization(e.to_string()))?;
            self.client.insert_json_rows(table, &lines).await?;
            inserted += batch.len() as u64;
        }
        Ok(inserted)
    }

    /// Atomically swap the loan-type partition of the fact table with the
    /// staging table's contents.
    pub async fn replace_partition(
        &self,
        file_type: FileType,
        loan_type: LoanType,
    ) -> Result<(), AdapterError> {
        let sql = replace_partition_sql(file_type, loan_type);
        self.client.command(&sql).await?;
        info!(
            database = self.client.database(),
            table = fact_table(file_type),
            partition = %loan_type,
            "replaced fact partition from staging"
        );
        Ok(())
    }

    /// Distinct loan account numbers already committed for this loan type.
    /// Used by the cross-file validator.
    pub async fn distinct_loan_ids(
        &self,
        loan_type: LoanType,
    ) -> Result<HashSet<String>, AdapterError> {
        #[derive(Deserialize)]
        struct LoanIdRow {
            loan_account_number: String,
        }

        let rows: Vec<LoanIdRow> = self
            .query_json_rows(
                "SELECT DISTINCT loan_account_number FROM fact_credit \
                 WHERE loan_type = {loan_type:String} FORMAT JSONEachRow",
                &[("loan_type", loan_type.as_str())],
            )
            .await?;
        Ok(rows.into_iter().map(|r| r.loan_account_number).collect())
    }

    async fn query_json_rows<T: DeserializeOwned>(
        &self,
        sql: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<T>, AdapterError> {
        let body = self.client.query(sql, params).await?;
        body.lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line).map_err(|e| AdapterError::Serialization(e.to_string()))
            })
            .collect()
    }
}

fn replace_partition_sql(file_type: FileType, loan_type: LoanType) -> String {
    format!(
        "ALTER TABLE {} REPLACE PARTITION '{}' FROM {}",
        fact_table(file_type),
        loan_type.as_str(),
        staging_table(file_type)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_partition_statement_shape() {
        assert_eq!(
            replace_partition_sql(FileType::Credit, LoanType::Retail),
            "ALTER TABLE fact_credit REPLACE PARTITION 'RETAIL' FROM staging_credit"
        );
        assert_eq!(
            replace_partition_sql(FileType::PaymentPlan, LoanType::Commercial),
            "ALTER TABLE fact_payment REPLACE PARTITION 'COMMERCIAL' FROM staging_payment"
        );
    }
}
