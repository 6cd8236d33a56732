use reqwest::StatusCode;

use findata_core::{AdapterError, ClickHouseSettings};

fn warehouse_err(e: impl std::fmt::Display) -> AdapterError {
    AdapterError::Warehouse(e.to_string())
}

/// Thin client over ClickHouse's HTTP interface, scoped to one database.
///
/// Statements are POSTed as the request body; query parameters carry the
/// target database, credentials, and `param_*` bindings for `{name:Type}`
/// placeholders.
#[derive(Clone)]
pub struct ClickHouseClient {
    http: reqwest::Client,
    base_url: String,
    user: String,
    password: String,
    database: String,
}

impl ClickHouseClient {
    pub fn new(settings: &ClickHouseSettings, database: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: settings.base_url(),
            user: settings.user.clone(),
            password: settings.password.clone(),
            database: database.to_string(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    async fn post(&self, params: &[(String, String)], body: String) -> Result<String, AdapterError> {
        let mut query: Vec<(String, String)> =
            vec![("database".to_string(), self.database.clone())];
        query.extend_from_slice(params);

        let response = self
            .http
            .post(&self.base_url)
            .query(&query)
            .header("X-ClickHouse-User", &self.user)
            .header("X-ClickHouse-Key", &self.password)
            .body(body)
            .send()
            .await
            .map_err(warehouse_err)?;

        let status = response.status();
        let text = response.text().await.map_err(warehouse_err)?;
        if status != StatusCode::OK {
            return Err(AdapterError::Warehouse(format!(
                "clickhouse returned {status}: {}",
                text.trim()
            )));
        }
        Ok(text)
    }

    /// Execute a statement with no result set (DDL, TRUNCATE, ALTER).
    pub async fn command(&self, sql: &str) -> Result<(), AdapterError> {
        self.post(&[], sql.to_string()).await.map(|_| ())
    }

    /// Bulk insert pre-serialized `JSONEachRow` lines into `table`.
    pub async fn insert_json_rows(
        &self,
        table: &str,
        lines: &[String],
    ) -> Result<(), AdapterError> {
        if lines.is_empty() {
            return Ok(());
        }
        let mut body = format!("INSERT INTO {table} FORMAT JSONEachRow\n");
        body.push_str(&lines.join("\n"));
        self.post(&[], body).await.map(|_| ())
    }

    /// Run a parameterized query; `{name:Type}` placeholders bind through
    /// `param_name` request parameters. Returns the raw response body.
    pub async fn query(
        &self,
        sql: &str,
        params: &[(&str, &str)],
    ) -> Result<String, AdapterError> {
        let bound: Vec<(String, String)> = params
            .iter()
            .map(|(name, value)| (format!("param_{name}"), value.to_string()))
            .collect();
        self.post(&bound, sql.to_string()).await
    }
}
