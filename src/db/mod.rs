pub mod migrations;
pub mod queries;

use std::path::{Path, PathBuf};

use anyhow::Context;
use rusqlite::Connection;

/// `./migrations` when run from a deployment directory, else the crate's own copy.
fn migrations_dir() -> PathBuf {
    let local = Path::new("migrations");
    if local.is_dir() {
        local.to_path_buf()
    } else {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations")
    }
}

pub fn init_db(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open database at {path}"))?;

    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
        .context("failed to set database pragmas")?;

    let applied = migrations::run_migrations(&conn, &migrations_dir())?;
    tracing::debug!(path, applied, "database ready");

    Ok(conn)
}
