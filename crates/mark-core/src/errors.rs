//! Authorization error taxonomy.
//!
//! These are caller-input errors raised by the authorization resolver and
//! surfaced unchanged by the relation manager. Storage failures are defined in
//! `mark-db` and share [`ErrorKind`] so hosts can branch on one flat enum.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a (marker, markable, mark) triple was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthorizationError {
    /// The marker's type was never registered as a marker.
    #[error("Unknown marker type: {marker_type}")]
    UnknownMarkerType { marker_type: String },

    /// The markable's type was never registered as a markable.
    #[error("Unknown markable type: {markable_type}")]
    UnknownMarkableType { markable_type: String },

    /// The mark is not declared for this markable type.
    #[error("Mark '{mark}' is not supported by {markable_type}")]
    UnsupportedMark { markable_type: String, mark: String },

    /// The mark exists but its policy excludes this marker type.
    #[error("{marker_type} is not allowed to mark {markable_type} as '{mark}'")]
    MarkerNotAllowed {
        marker_type: String,
        markable_type: String,
        mark: String,
    },
}

impl AuthorizationError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownMarkerType { .. } => ErrorKind::UnknownMarkerType,
            Self::UnknownMarkableType { .. } => ErrorKind::UnknownMarkableType,
            Self::UnsupportedMark { .. } => ErrorKind::UnsupportedMark,
            Self::MarkerNotAllowed { .. } => ErrorKind::MarkerNotAllowed,
        }
    }
}

/// Flat classification of every failure the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UnknownMarkerType,
    UnknownMarkableType,
    UnsupportedMark,
    MarkerNotAllowed,
    StorageFailure,
}

impl ErrorKind {
    /// Caller-input kinds are never retried; only storage failures may be.
    #[must_use]
    pub const fn is_caller_error(self) -> bool {
        !matches!(self, Self::StorageFailure)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnknownMarkerType => "unknown_marker_type",
            Self::UnknownMarkableType => "unknown_markable_type",
            Self::UnsupportedMark => "unsupported_mark",
            Self::MarkerNotAllowed => "marker_not_allowed",
            Self::StorageFailure => "storage_failure",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
