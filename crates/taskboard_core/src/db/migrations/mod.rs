//! Versioned schema steps for the taskboard database.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - After a successful run `PRAGMA user_version` equals the last applied
//!   step.
//! - All pending steps run inside one transaction; a failing step leaves
//!   the previous version in place.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, sql)` pairs; version 1 is the key-value table used by the
/// local backend, version 2 the document table used by the remote backend.
const STEPS: &[(u32, &str)] = &[
    (1, include_str!("0001_kv_entries.sql")),
    (2, include_str!("0002_documents.sql")),
];

pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Reads the version recorded in `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

fn pending(from: u32) -> impl Iterator<Item = &'static (u32, &'static str)> {
    STEPS.iter().filter(move |(version, _)| *version > from)
}

/// Brings `conn` up to `latest_version()`.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `Migration` when one step fails; nothing from this run is kept.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let latest = latest_version();
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }
    if from == latest {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, sql) in pending(from) {
        tx.execute_batch(sql)
            .and_then(|()| tx.pragma_update(None, "user_version", version))
            .map_err(|source| DbError::Migration {
                version: *version,
                source,
            })?;
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from} to_version={latest}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{pending, STEPS};

    #[test]
    fn steps_are_strictly_increasing() {
        assert!(STEPS.windows(2).all(|pair| pair[0].0 < pair[1].0));
    }

    #[test]
    fn pending_skips_applied_steps() {
        let versions: Vec<u32> = pending(1).map(|(version, _)| *version).collect();
        assert_eq!(versions, vec![2]);
        assert_eq!(pending(0).count(), STEPS.len());
    }
}
