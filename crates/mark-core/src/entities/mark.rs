use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::EntityRef;

/// One persisted mark: `marker` applied `mark` to `markable` at `created_at`.
///
/// At most one row exists per `(marker, markable, mark)`; the store enforces
/// this with a uniqueness constraint on the five identifying columns.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct MarkRelation {
    pub marker_type: String,
    pub marker_id: String,
    pub markable_type: String,
    pub markable_id: String,
    pub mark: String,
    pub created_at: DateTime<Utc>,
}

impl MarkRelation {
    /// Build a row stamped with the current time.
    #[must_use]
    pub fn new(marker: &EntityRef, markable: &EntityRef, mark: &str) -> Self {
        Self {
            marker_type: marker.entity_type.clone(),
            marker_id: marker.id.clone(),
            markable_type: markable.entity_type.clone(),
            markable_id: markable.id.clone(),
            mark: mark.to_string(),
            created_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn marker(&self) -> EntityRef {
        EntityRef::new(&self.marker_type, &self.marker_id)
    }

    #[must_use]
    pub fn markable(&self) -> EntityRef {
        EntityRef::new(&self.markable_type, &self.markable_id)
    }

    /// Whether `entity` appears on either side of this row.
    #[must_use]
    pub fn references(&self, entity: &EntityRef) -> bool {
        (self.marker_type == entity.entity_type && self.marker_id == entity.id)
            || (self.markable_type == entity.entity_type && self.markable_id == entity.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_splits_references() {
        let row = MarkRelation::new(&EntityRef::new("user", "1"), &EntityRef::new("post", "9"), "like");
        assert_eq!(row.marker_type, "user");
        assert_eq!(row.marker_id, "1");
        assert_eq!(row.markable_type, "post");
        assert_eq!(row.markable_id, "9");
        assert_eq!(row.mark, "like");
        assert_eq!(row.marker(), EntityRef::new("user", "1"));
        assert_eq!(row.markable(), EntityRef::new("post", "9"));
    }

    #[test]
    fn references_checks_both_sides() {
        let row = MarkRelation::new(&EntityRef::new("user", "1"), &EntityRef::new("post", "9"), "like");
        assert!(row.references(&EntityRef::new("user", "1")));
        assert!(row.references(&EntityRef::new("post", "9")));
        assert!(!row.references(&EntityRef::new("user", "9")));
    }
}
