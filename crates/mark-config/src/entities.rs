//! Declarative entity-type registration.
//!
//! ```toml
//! [entities.user]
//! table = "users"
//! marker = true
//!
//! [entities.post]
//! table = "posts"
//! [entities.post.marks]
//! like = {}
//! flag = { by = ["admin"] }
//! ```

use std::collections::BTreeMap;

use mark_core::{AllowedMarkers, CapabilityRegistry, MAX_MARK_LEN};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_id_column() -> String {
    "id".to_string()
}

/// Allowed markers for one declared mark. An empty `by` is unrestricted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MarkRule {
    #[serde(default)]
    pub by: Vec<String>,
}

impl MarkRule {
    #[must_use]
    pub fn policy(&self) -> AllowedMarkers {
        if self.by.is_empty() {
            AllowedMarkers::Any
        } else {
            AllowedMarkers::only(self.by.iter().cloned())
        }
    }
}

/// One host entity type: where its rows live and what role it plays.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntityConfig {
    /// Backing table used for existence lookups. Empty disables the lookup.
    #[serde(default)]
    pub table: String,

    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Whether this type may apply marks.
    #[serde(default)]
    pub marker: bool,

    /// Marks this type accepts. A type with marks is markable.
    #[serde(default)]
    pub marks: BTreeMap<String, MarkRule>,
}

impl Default for EntityConfig {
    fn default() -> Self {
        Self {
            table: String::new(),
            id_column: default_id_column(),
            marker: false,
            marks: BTreeMap::new(),
        }
    }
}

impl EntityConfig {
    #[must_use]
    pub fn is_markable(&self) -> bool {
        !self.marks.is_empty()
    }

    #[must_use]
    pub fn has_table(&self) -> bool {
        !self.table.is_empty()
    }
}

/// All configured entity types keyed by type id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EntitiesConfig(pub BTreeMap<String, EntityConfig>);

impl EntitiesConfig {
    pub fn iter(&self) -> impl Iterator<Item = (&String, &EntityConfig)> {
        self.0.iter()
    }

    #[must_use]
    pub fn get(&self, entity_type: &str) -> Option<&EntityConfig> {
        self.0.get(entity_type)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check that table and column names are plain SQL identifiers and that
    /// mark names are non-empty and at most [`MAX_MARK_LEN`] characters.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (entity_type, entity) in &self.0 {
            if entity.has_table() && !is_identifier(&entity.table) {
                return Err(ConfigError::InvalidValue {
                    field: format!("entities.{entity_type}.table"),
                    reason: format!("'{}' is not a valid SQL identifier", entity.table),
                });
            }
            if !is_identifier(&entity.id_column) {
                return Err(ConfigError::InvalidValue {
                    field: format!("entities.{entity_type}.id_column"),
                    reason: format!("'{}' is not a valid SQL identifier", entity.id_column),
                });
            }
            for mark in entity.marks.keys() {
                let len = mark.chars().count();
                if len == 0 || len > MAX_MARK_LEN {
                    return Err(ConfigError::InvalidValue {
                        field: format!("entities.{entity_type}.marks.{mark}"),
                        reason: format!("mark names must be 1 to {MAX_MARK_LEN} characters, got {len}"),
                    });
                }
            }
        }
        Ok(())
    }

    /// Populate a fresh registry from the declared markers and marks.
    #[must_use]
    pub fn build_registry(&self) -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        for (entity_type, entity) in &self.0 {
            if entity.marker {
                registry.register_marker(entity_type.as_str());
            }
            if entity.is_markable() {
                registry.register_markable(
                    entity_type.as_str(),
                    entity.marks.iter().map(|(mark, rule)| (mark.as_str(), rule.policy())),
                );
            }
        }
        registry
    }
}

/// Whether `name` is a bare SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
#[must_use]
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
