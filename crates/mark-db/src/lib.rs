//! # mark-db
//!
//! Relation storage and relation management for marks.
//!
//! - [`MarkDb`]: libSQL-backed relation store with an embedded schema
//! - [`store::RelationStore`]: the collaborator interface the engine needs
//!   from persistence
//! - [`MarkService`]: the relation manager, which authorizes every request
//!   against the capability registry before touching the store
//! - [`existence`]: per-type entity lookups used by the orphan reclaimer
//! - [`repos`]: apply/remove, lazy queries, and the orphan sweep
//!
//! Uses the `libsql` crate (C `SQLite` fork) in local mode. The uniqueness
//! constraint on the marks table makes idempotent apply race-safe.

pub mod error;
pub mod existence;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod scan;
pub mod service;
pub mod store;

#[cfg(test)]
mod test_support;

pub use error::{DatabaseError, MarkError};
pub use existence::{EntityDirectory, EntityLookup, TableLookup};
pub use repos::query::EntityStream;
pub use service::MarkService;
pub use store::{MarkFilter, PageRequest, RelationStore, StoredMark};

use libsql::Builder;

/// Handle to the libSQL database holding the marks table.
pub struct MarkDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl MarkDb {
    /// Open a local database at the given path (`":memory:"` for tests).
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        let mark_db = Self { db, conn };
        mark_db.run_migrations().await?;
        tracing::debug!(path, "opened mark database");
        Ok(mark_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    ///
    /// Hosts that keep entity tables in the same database share this
    /// connection with [`TableLookup`].
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }
}
