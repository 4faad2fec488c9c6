//! Response types returned by the orphan reclaimer and emitted as JSON by
//! `markctl` commands.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::EntityRef;
use crate::errors::ErrorKind;
use crate::registry::Capability;

/// Outcome of one orphan-reclaim sweep.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Rows examined before the sweep finished or was cancelled.
    pub scanned: u64,
    /// Rows deleted because a referenced entity no longer exists.
    pub deleted: u64,
    /// Rows left alone because an entity type had no existence lookup.
    pub skipped: u64,
    /// Whether the sweep stopped early on a cancellation request.
    pub cancelled: bool,
}

/// Response from `markctl capabilities`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CapabilitiesResponse {
    pub marker_types: Vec<String>,
    pub markable_types: Vec<String>,
    pub capabilities: Vec<Capability>,
}

/// Response from `markctl check`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CheckResponse {
    pub marker: EntityRef,
    pub markable: EntityRef,
    pub mark: String,
    pub allowed: bool,
    pub error_kind: Option<ErrorKind>,
    pub message: Option<String>,
}

/// Response from `markctl destroy`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DestroyResponse {
    pub entity: EntityRef,
    pub deleted: u64,
}
