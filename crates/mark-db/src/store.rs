//! Relation store collaborator interface and its libSQL implementation.
//!
//! The store knows nothing about the capability registry: it will happily
//! persist any triple. Every legality check happens in the service before a
//! store method is called.

use async_trait::async_trait;
use mark_core::{EntityRef, MarkRelation};

use crate::MarkDb;
use crate::error::DatabaseError;
use crate::helpers::{MARK_COLUMNS, row_to_stored};

/// A relation row together with its store-assigned row id.
///
/// Row ids increase monotonically and drive keyset pagination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMark {
    pub row_id: i64,
    pub relation: MarkRelation,
}

/// Column-equality filter over the relation table. Unset fields match
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkFilter {
    pub marker_type: Option<String>,
    pub marker_id: Option<String>,
    pub markable_type: Option<String>,
    pub markable_id: Option<String>,
    pub mark: Option<String>,
}

impl MarkFilter {
    /// Matches every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Matches exactly one `(marker, markable, mark)` triple.
    #[must_use]
    pub fn exact(relation: &MarkRelation) -> Self {
        Self {
            marker_type: Some(relation.marker_type.clone()),
            marker_id: Some(relation.marker_id.clone()),
            markable_type: Some(relation.markable_type.clone()),
            markable_id: Some(relation.markable_id.clone()),
            mark: Some(relation.mark.clone()),
        }
    }

    #[must_use]
    pub fn marker(mut self, marker: &EntityRef) -> Self {
        self.marker_type = Some(marker.entity_type.clone());
        self.marker_id = Some(marker.id.clone());
        self
    }

    #[must_use]
    pub fn marker_type(mut self, marker_type: &str) -> Self {
        self.marker_type = Some(marker_type.to_string());
        self
    }

    #[must_use]
    pub fn markable(mut self, markable: &EntityRef) -> Self {
        self.markable_type = Some(markable.entity_type.clone());
        self.markable_id = Some(markable.id.clone());
        self
    }

    #[must_use]
    pub fn markable_type(mut self, markable_type: &str) -> Self {
        self.markable_type = Some(markable_type.to_string());
        self
    }

    #[must_use]
    pub fn mark(mut self, mark: &str) -> Self {
        self.mark = Some(mark.to_string());
        self
    }

    #[must_use]
    pub const fn is_unfiltered(&self) -> bool {
        self.marker_type.is_none()
            && self.marker_id.is_none()
            && self.markable_type.is_none()
            && self.markable_id.is_none()
            && self.mark.is_none()
    }

    /// Push bound values into `params` and return the matching conditions.
    fn conditions(&self, params: &mut Vec<libsql::Value>) -> Vec<String> {
        let columns = [
            ("marker_type", &self.marker_type),
            ("marker_id", &self.marker_id),
            ("markable_type", &self.markable_type),
            ("markable_id", &self.markable_id),
            ("mark", &self.mark),
        ];
        let mut conditions = Vec::new();
        for (column, value) in columns {
            if let Some(value) = value {
                params.push(libsql::Value::Text(value.clone()));
                conditions.push(format!("{column} = ?{}", params.len()));
            }
        }
        conditions
    }
}

/// One page of a keyset scan: rows with `row_id > after`, ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after: Option<i64>,
    pub limit: u32,
}

impl PageRequest {
    /// First page. A zero limit is raised to one.
    #[must_use]
    pub fn first(limit: u32) -> Self {
        Self {
            after: None,
            limit: limit.max(1),
        }
    }

    #[must_use]
    pub fn after(row_id: i64, limit: u32) -> Self {
        Self {
            after: Some(row_id),
            limit: limit.max(1),
        }
    }
}

/// What the relation manager and reclaimer require from persistence.
#[async_trait]
pub trait RelationStore: Send + Sync {
    /// Insert unless an identical triple exists. Returns whether a row was
    /// written. Must be race-safe: concurrent callers yield at most one row.
    async fn insert_if_absent(&self, relation: &MarkRelation) -> Result<bool, DatabaseError>;

    async fn exists(&self, filter: &MarkFilter) -> Result<bool, DatabaseError>;

    async fn count(&self, filter: &MarkFilter) -> Result<u64, DatabaseError>;

    /// Delete matching rows and return how many went away.
    ///
    /// An unfiltered delete is refused with `DatabaseError::InvalidState`.
    async fn delete(&self, filter: &MarkFilter) -> Result<u64, DatabaseError>;

    /// One page of matching rows in ascending row-id order.
    async fn select(&self, filter: &MarkFilter, page: PageRequest) -> Result<Vec<StoredMark>, DatabaseError>;

    /// Cascade hook: drop every row naming `entity` on either side.
    async fn on_entity_destroyed(&self, entity: &EntityRef) -> Result<u64, DatabaseError> {
        let as_marker = self.delete(&MarkFilter::all().marker(entity)).await?;
        let as_markable = self.delete(&MarkFilter::all().markable(entity)).await?;
        Ok(as_marker + as_markable)
    }
}

fn where_clause(conditions: &[String]) -> String {
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}

#[async_trait]
impl RelationStore for MarkDb {
    async fn insert_if_absent(&self, relation: &MarkRelation) -> Result<bool, DatabaseError> {
        let changed = self
            .conn()
            .execute(
                "INSERT INTO marks (marker_type, marker_id, markable_type, markable_id, mark, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (marker_type, marker_id, markable_type, markable_id, mark) DO NOTHING",
                libsql::params![
                    relation.marker_type.as_str(),
                    relation.marker_id.as_str(),
                    relation.markable_type.as_str(),
                    relation.markable_id.as_str(),
                    relation.mark.as_str(),
                    relation.created_at.to_rfc3339()
                ],
            )
            .await?;
        Ok(changed > 0)
    }

    async fn exists(&self, filter: &MarkFilter) -> Result<bool, DatabaseError> {
        let mut params = Vec::new();
        let conditions = filter.conditions(&mut params);
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM marks {})",
            where_clause(&conditions)
        );
        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)? != 0)
    }

    async fn count(&self, filter: &MarkFilter) -> Result<u64, DatabaseError> {
        let mut params = Vec::new();
        let conditions = filter.conditions(&mut params);
        let sql = format!("SELECT COUNT(*) FROM marks {}", where_clause(&conditions));
        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        u64::try_from(row.get::<i64>(0)?)
            .map_err(|e| DatabaseError::Query(format!("negative row count: {e}")))
    }

    async fn delete(&self, filter: &MarkFilter) -> Result<u64, DatabaseError> {
        if filter.is_unfiltered() {
            return Err(DatabaseError::InvalidState(
                "refusing to delete marks without a filter".into(),
            ));
        }
        let mut params = Vec::new();
        let conditions = filter.conditions(&mut params);
        let sql = format!("DELETE FROM marks {}", where_clause(&conditions));
        Ok(self
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?)
    }

    async fn select(&self, filter: &MarkFilter, page: PageRequest) -> Result<Vec<StoredMark>, DatabaseError> {
        let mut params = Vec::new();
        let mut conditions = filter.conditions(&mut params);
        if let Some(after) = page.after {
            params.push(libsql::Value::Integer(after));
            conditions.push(format!("id > ?{}", params.len()));
        }
        let sql = format!(
            "SELECT {MARK_COLUMNS} FROM marks {} ORDER BY id LIMIT {}",
            where_clause(&conditions),
            page.limit
        );

        let mut rows = self
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut marks = Vec::new();
        while let Some(row) = rows.next().await? {
            marks.push(row_to_stored(&row)?);
        }
        Ok(marks)
    }
}
