//! Allowed-markers policy attached to every (markable type, mark) pair.

use std::collections::BTreeSet;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which marker types may apply a given mark.
///
/// `Any` is evaluated at check time against the registry's current marker
/// set, so marker types registered after the mark was declared are covered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AllowedMarkers {
    #[default]
    Any,
    Only(BTreeSet<String>),
}

impl AllowedMarkers {
    /// Restrict to an explicit set of marker type ids.
    ///
    /// An empty iterator produces a policy nobody satisfies; use
    /// [`AllowedMarkers::Any`] for the unrestricted case.
    #[must_use]
    pub fn only<I, S>(marker_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(marker_types.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Any)
    }

    /// Whether `marker_type` passes this policy.
    #[must_use]
    pub fn permits(&self, marker_type: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(allowed) => allowed.contains(marker_type),
        }
    }
}

impl fmt::Display for AllowedMarkers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Only(allowed) => {
                let names: Vec<&str> = allowed.iter().map(String::as_str).collect();
                f.write_str(&names.join(","))
            }
        }
    }
}
