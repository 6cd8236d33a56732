//! findata — operations CLI for the financial data ingest adapter.
//!
//! Usage:
//!   findata provision-tenants [--external-url <url>]
//!   findata init-warehouse
//!   findata load-csv --tenant <id> --loan-type <RETAIL|COMMERCIAL>
//!                    --file-type <credit|payment_plan> --path <file.csv>
//!   findata sync --tenant <id> --loan-type <RETAIL|COMMERCIAL> [--wait]
//!
//! `sync` exits 0 only when the sync log reaches COMPLETED.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use findata_core::{FileType, LoanType, Settings, SyncStatus, TenantSnapshot};
use findata_engine::{SyncEngine, SyncMetrics};
use findata_meta::{MetaStore, TenantSeed};
use findata_staging::UploadStore;
use findata_warehouse::ddl;

mod loader;

// ── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "findata",
    version,
    about = "findata — multi-tenant financial data ingest adapter"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Seed the tenant registry, per-tenant schemas, and default sync
    /// configurations.
    ProvisionTenants {
        /// Staging service base URL recorded in the default sync configs.
        #[arg(long, default_value = "http://localhost:8000/bank/api")]
        external_url: String,
    },

    /// Create each tenant's warehouse database with its fact and staging
    /// tables.
    InitWarehouse,

    /// Parse a CSV file and append its rows to a tenant's upload store.
    LoadCsv {
        #[arg(long)]
        tenant: String,
        /// RETAIL or COMMERCIAL.
        #[arg(long)]
        loan_type: LoanType,
        /// credit or payment_plan.
        #[arg(long)]
        file_type: FileType,
        #[arg(long)]
        path: PathBuf,
    },

    /// Run one sync synchronously for a tenant and loan type.
    Sync {
        #[arg(long)]
        tenant: String,
        /// RETAIL or COMMERCIAL.
        #[arg(long)]
        loan_type: LoanType,
        /// Queue behind a concurrent sync instead of failing fast.
        #[arg(long, default_value_t = false)]
        wait: bool,
    },
}

/// Default tenants, matching the seeded warehouse databases.
const DEFAULT_TENANTS: &[(&str, &str, &str, &str)] = &[
    ("BANK001", "Bank 001", "bank001", "bank001_dw"),
    ("BANK002", "Bank 002", "bank002", "bank002_dw"),
    ("BANK003", "Bank 003", "bank003", "bank003_dw"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,findata=debug".parse().unwrap()),
        )
        .init();

    let args = Args::parse();
    let settings = Settings::from_env().context("resolving settings from environment")?;

    match args.command {
        Command::ProvisionTenants { external_url } => {
            provision_tenants(&settings, &external_url).await
        }
        Command::InitWarehouse => init_warehouse(&settings).await,
        Command::LoadCsv {
            tenant,
            loan_type,
            file_type,
            path,
        } => loader::load_csv(&settings, &tenant, loan_type, file_type, &path).await,
        Command::Sync {
            tenant,
            loan_type,
            wait,
        } => run_sync(&settings, &tenant, loan_type, wait).await,
    }
}

// ── Commands ─────────────────────────────────────────────────────────────────

async fn provision_tenants(settings: &Settings, external_url: &str) -> anyhow::Result<()> {
    let meta = MetaStore::connect(&settings.pg)
        .await
        .context("connecting to metadata store")?;
    meta.init_registry().await.context("creating tenant registry")?;

    for (tenant_id, name, pg_schema, ch_database) in DEFAULT_TENANTS {
        let created = meta
            .upsert_tenant(&TenantSeed {
                tenant_id: tenant_id.to_string(),
                name: name.to_string(),
                pg_schema: pg_schema.to_string(),
                ch_database: ch_database.to_string(),
            })
            .await
            .with_context(|| format!("seeding tenant {tenant_id}"))?;
        meta.init_tenant_schema(pg_schema)
            .await
            .with_context(|| format!("creating schema {pg_schema}"))?;
        meta.ensure_default_configs(pg_schema, external_url)
            .await
            .with_context(|| format!("seeding sync configs for {tenant_id}"))?;
        info!(
            tenant = tenant_id,
            created, "tenant provisioned with RETAIL and COMMERCIAL configs"
        );
    }
    println!("Tenant seeding complete.");
    Ok(())
}

async fn init_warehouse(settings: &Settings) -> anyhow::Result<()> {
    let meta = MetaStore::connect(&settings.pg)
        .await
        .context("connecting to metadata store")?;
    meta.init_registry().await.context("creating tenant registry")?;

    let registered = meta
        .list_active_tenants()
        .await
        .context("listing tenants")?;
    let databases: Vec<String> = if registered.is_empty() {
        DEFAULT_TENANTS
            .iter()
            .map(|(_, _, _, db)| db.to_string())
            .collect()
    } else {
        registered.into_iter().map(|t| t.ch_database).collect()
    };

    for database in &databases {
        ddl::init_database(&settings.clickhouse, database)
            .await
            .with_context(|| format!("initializing warehouse database {database}"))?;
        println!("{database}: fact_credit, fact_payment, staging_credit, staging_payment");
    }
    Ok(())
}

async fn run_sync(
    settings: &Settings,
    tenant_id: &str,
    loan_type: LoanType,
    wait: bool,
) -> anyhow::Result<()> {
    let meta = MetaStore::connect(&settings.pg)
        .await
        .context("connecting to metadata store")?;
    let tenant = meta
        .get_tenant(tenant_id)
        .await
        .context("loading tenant")?
        .with_context(|| format!("tenant {tenant_id} is not registered"))?;
    if !tenant.is_active {
        bail!("tenant {tenant_id} is inactive");
    }

    let config = meta
        .get_config(&tenant.pg_schema, loan_type)
        .await
        .context("loading sync configuration")?
        .with_context(|| format!("no sync configuration for {tenant_id}/{loan_type}"))?;
    if !config.is_enabled {
        bail!("sync is disabled for {tenant_id}/{loan_type}");
    }

    let snapshot = TenantSnapshot {
        tenant_id: tenant.tenant_id.clone(),
        pg_schema: tenant.pg_schema.clone(),
        ch_database: tenant.ch_database.clone(),
        external_url: config.external_bank_url.clone(),
    };

    let uploads = UploadStore::connect(&settings.redis)
        .await
        .context("connecting to upload store")?;
    let metrics = Arc::new(SyncMetrics::new().context("registering metrics")?);
    let engine = SyncEngine::new(snapshot, settings.clone(), uploads, meta, metrics);

    let log = engine.sync(loan_type, wait).await;
    println!(
        "{}",
        serde_json::to_string_pretty(&log).context("rendering sync log")?
    );

    if log.status != SyncStatus::Completed {
        bail!("sync finished with status {}", log.status);
    }
    Ok(())
}
