//! Add a custom domain to the shared pool without going through HTTP.
//!
//! Runs pending migrations first, so it also works against a fresh database.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use clap::Parser;
use color_eyre::eyre::{Context, Result, eyre};
use mockable::DefaultClock;
use tokio::runtime::Builder;

use domain_allocation::domain::ports::{CatalogueActor, DomainCatalogueAdmin};
use domain_allocation::domain::{
    CustomDomainId, DomainAllocationService, DomainName, NewCustomDomain,
};
use domain_allocation::outbound::persistence::{
    DbPool, DieselAllocationStore, DieselMemberDirectory, PoolConfig, run_pending_migrations,
};

/// `add-domain` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "add-domain",
    about = "Add a custom domain to the shared allocation pool",
    version
)]
struct CliArgs {
    /// Fully qualified domain name, e.g. `pages.example.com`.
    #[arg(long, value_parser = parse_name)]
    name: DomainName,
    /// Expiry instant in RFC 3339 form.
    #[arg(long = "expires-at", value_name = "rfc3339", value_parser = parse_instant)]
    expires_at: DateTime<Utc>,
    /// Maximum concurrent holders; 0 means unlimited.
    #[arg(long = "max-usage", default_value_t = 0)]
    max_usage: u32,
    /// Explicit identifier; a random one is generated when omitted.
    #[arg(long, value_parser = parse_id)]
    id: Option<CustomDomainId>,
    /// Restrict the domain to premium members.
    #[arg(long = "only-premium")]
    only_premium: bool,
    /// Database connection URL. Falls back to `DOMAIN_ALLOC_DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn parse_name(raw: &str) -> std::result::Result<DomainName, String> {
    DomainName::new(raw).map_err(|err| err.to_string())
}

fn parse_id(raw: &str) -> std::result::Result<CustomDomainId, String> {
    CustomDomainId::new(raw).map_err(|err| err.to_string())
}

fn parse_instant(raw: &str) -> std::result::Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| err.to_string())
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(args))
}

async fn run(args: CliArgs) -> Result<()> {
    let database_url = args
        .database_url
        .or_else(|| env::var("DOMAIN_ALLOC_DATABASE_URL").ok())
        .ok_or_else(|| eyre!("--database-url or DOMAIN_ALLOC_DATABASE_URL is required"))?;

    run_pending_migrations(&database_url).wrap_err("apply migrations")?;
    let pool = DbPool::new(PoolConfig::new(&database_url).with_max_size(1))
        .await
        .wrap_err("create database pool")?;

    let service = DomainAllocationService::new(
        Arc::new(DieselAllocationStore::new(pool.clone())),
        Arc::new(DieselMemberDirectory::new(pool)),
        Arc::new(DefaultClock),
    );

    let created = service
        .create_domain(
            CatalogueActor::Operator,
            NewCustomDomain {
                id: args.id,
                name: args.name,
                only_premium: args.only_premium,
                max_usage: args.max_usage,
                expires_at: args.expires_at,
            },
        )
        .await
        .map_err(|err| eyre!("create domain failed: {} ({:?})", err.message(), err.code()))?;

    println!("id={}", created.id);
    println!("name={}", created.name);
    println!("expires_at={}", created.expires_at.to_rfc3339());
    Ok(())
}
