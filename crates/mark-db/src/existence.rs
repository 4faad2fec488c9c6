//! Entity existence collaborators used by the orphan reclaimer.
//!
//! The engine never owns entity records. For each entity type the host
//! supplies an [`EntityLookup`] that answers "does this id still exist?", and
//! an [`EntityDirectory`] routes each reference to its type's lookup.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use mark_config::EntitiesConfig;
use mark_core::EntityRef;

use crate::error::DatabaseError;
use crate::helpers::quote_identifier;

/// Existence check for one entity type.
#[async_trait]
pub trait EntityLookup: Send + Sync {
    async fn exists(&self, id: &str) -> Result<bool, DatabaseError>;
}

/// Synchronous predicates work as lookups, for hosts that keep entities in
/// memory.
#[async_trait]
impl<F> EntityLookup for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    async fn exists(&self, id: &str) -> Result<bool, DatabaseError> {
        Ok(self(id))
    }
}

/// Lookup backed by a table in a libSQL database.
pub struct TableLookup {
    conn: libsql::Connection,
    sql: String,
}

impl TableLookup {
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` if `table` or `id_column` is not
    /// a bare SQL identifier.
    pub fn new(conn: libsql::Connection, table: &str, id_column: &str) -> Result<Self, DatabaseError> {
        let sql = format!(
            "SELECT 1 FROM {} WHERE {} = ?1 LIMIT 1",
            quote_identifier(table)?,
            quote_identifier(id_column)?
        );
        Ok(Self { conn, sql })
    }
}

impl fmt::Debug for TableLookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableLookup").field("sql", &self.sql).finish_non_exhaustive()
    }
}

#[async_trait]
impl EntityLookup for TableLookup {
    async fn exists(&self, id: &str) -> Result<bool, DatabaseError> {
        let mut rows = self.conn.query(&self.sql, [id]).await?;
        Ok(rows.next().await?.is_some())
    }
}

/// Per-type lookups keyed by entity type id.
#[derive(Clone, Default)]
pub struct EntityDirectory {
    lookups: HashMap<String, Arc<dyn EntityLookup>>,
}

impl EntityDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the lookup for `entity_type`, replacing any previous one.
    #[must_use]
    pub fn with_lookup(mut self, entity_type: impl Into<String>, lookup: impl EntityLookup + 'static) -> Self {
        self.lookups.insert(entity_type.into(), Arc::new(lookup));
        self
    }

    /// Build table lookups for every configured entity that names a table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an invalid table or column.
    pub fn from_tables(conn: &libsql::Connection, entities: &EntitiesConfig) -> Result<Self, DatabaseError> {
        let mut directory = Self::new();
        for (entity_type, entity) in entities.iter().filter(|(_, e)| e.has_table()) {
            let lookup = TableLookup::new(conn.clone(), &entity.table, &entity.id_column)?;
            directory = directory.with_lookup(entity_type.as_str(), lookup);
        }
        Ok(directory)
    }

    #[must_use]
    pub fn has_lookup(&self, entity_type: &str) -> bool {
        self.lookups.contains_key(entity_type)
    }

    /// `Some(exists)` when the type has a lookup, `None` when it does not.
    ///
    /// # Errors
    ///
    /// Propagates the lookup's storage failure.
    pub async fn resolve(&self, entity: &EntityRef) -> Result<Option<bool>, DatabaseError> {
        match self.lookups.get(&entity.entity_type) {
            Some(lookup) => Ok(Some(lookup.exists(&entity.id).await?)),
            None => Ok(None),
        }
    }
}

impl fmt::Debug for EntityDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<&String> = self.lookups.keys().collect();
        types.sort();
        f.debug_struct("EntityDirectory").field("types", &types).finish()
    }
}
