//! Shared helpers for integration tests.
//!
//! Each file under `tests/` compiles as its own crate; suites pull this module
//! in with `mod support;` and use only what they need.
#![allow(dead_code, reason = "each suite uses a different subset")]

pub mod cluster_skip;
pub mod pg_embed;

pub use cluster_skip::handle_cluster_setup_failure;

use postgres::{Client, NoTls};

/// Render a `postgres` error with its SQLSTATE and message.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    summary
}

/// Drop and recreate `name`, connecting through the `postgres` maintenance
/// database.
pub fn reset_database(maintenance_url: &str, name: &str) -> Result<(), String> {
    let mut client =
        Client::connect(maintenance_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!(
            r#"DROP DATABASE IF EXISTS "{name}" WITH (FORCE); CREATE DATABASE "{name}";"#
        ))
        .map_err(|err| format_postgres_error(&err))
}

/// Insert or replace a member's entitlements row.
pub fn seed_member(
    url: &str,
    user_id: &uuid::Uuid,
    has_premium: bool,
    is_admin: bool,
) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .execute(
            "INSERT INTO members (user_id, has_premium, is_admin) VALUES ($1, $2, $3) \
             ON CONFLICT (user_id) DO UPDATE \
             SET has_premium = EXCLUDED.has_premium, is_admin = EXCLUDED.is_admin",
            &[user_id, &has_premium, &is_admin],
        )
        .map_err(|err| format_postgres_error(&err))?;
    Ok(())
}
