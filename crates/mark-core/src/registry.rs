//! Capability registry: which marker types may apply which marks to which
//! markable types.
//!
//! The registry is populated during a single-threaded startup phase through
//! `&mut self` methods, then frozen by moving it into an `Arc` with
//! [`CapabilityRegistry::into_shared`]. Once shared there is no way to mutate
//! it, so concurrent readers never observe a half-registered type.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::policy::AllowedMarkers;

/// Longest mark name, in characters, the relation store accepts.
pub const MAX_MARK_LEN: usize = 128;

/// Marks declared by one markable type, keyed by mark name.
pub type MarkTable = BTreeMap<String, AllowedMarkers>;

/// Declared marker and markable types with their per-mark policies.
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    markers: BTreeSet<String>,
    markables: BTreeMap<String, MarkTable>,
}

/// A legal `(marker type, markable type, mark)` triple.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
pub struct Capability {
    pub marker_type: String,
    pub markable_type: String,
    pub mark: String,
}

/// A batch of marks sharing one allowed-markers policy.
///
/// ```
/// use mark_core::{CapabilityRegistry, MarkDeclaration};
///
/// let mut registry = CapabilityRegistry::new();
/// registry
///     .register_marker("user")
///     .register_marker("admin")
///     .declare("post", MarkDeclaration::marks(["like", "favorite"]))
///     .declare("post", MarkDeclaration::marks(["flag"]).by(["admin"]));
///
/// assert!(registry.policy("post", "flag").is_some_and(|p| !p.permits("user")));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MarkDeclaration {
    marks: Vec<String>,
    allowed: AllowedMarkers,
}

impl MarkDeclaration {
    /// Declare marks open to any registered marker type.
    #[must_use]
    pub fn marks<I, S>(marks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            marks: marks.into_iter().map(Into::into).collect(),
            allowed: AllowedMarkers::Any,
        }
    }

    /// Restrict the declared marks to the given marker types.
    ///
    /// An empty list leaves the marks unrestricted.
    #[must_use]
    pub fn by<I, S>(mut self, marker_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let allowed = AllowedMarkers::only(marker_types);
        self.allowed = match allowed {
            AllowedMarkers::Only(ref set) if set.is_empty() => AllowedMarkers::Any,
            other => other,
        };
        self
    }

    fn into_policies(self) -> impl Iterator<Item = (String, AllowedMarkers)> {
        let allowed = self.allowed;
        self.marks.into_iter().map(move |mark| (mark, allowed.clone()))
    }
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a marker type. Registering the same type twice is a no-op.
    pub fn register_marker(&mut self, marker_type: impl Into<String>) -> &mut Self {
        let marker_type = marker_type.into();
        tracing::debug!(%marker_type, "registering marker type");
        self.markers.insert(marker_type);
        self
    }

    /// Add or merge a markable type's marks.
    ///
    /// Marks already declared for the type keep their entry unless redeclared
    /// here, in which case the new policy replaces the old one.
    ///
    /// Mark names longer than [`MAX_MARK_LEN`] characters are not registered,
    /// so the resolver rejects them as `UnsupportedMark`.
    pub fn register_markable<I, S>(&mut self, markable_type: impl Into<String>, marks: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, AllowedMarkers)>,
        S: Into<String>,
    {
        let markable_type = markable_type.into();
        let table = self.markables.entry(markable_type.clone()).or_default();
        for (mark, policy) in marks {
            let mark = mark.into();
            if mark.chars().count() > MAX_MARK_LEN {
                tracing::warn!(%markable_type, max = MAX_MARK_LEN, "mark name too long, not registered");
                continue;
            }
            tracing::debug!(%markable_type, %mark, %policy, "registering mark");
            table.insert(mark, policy);
        }
        self
    }

    /// Register a markable type from a [`MarkDeclaration`].
    pub fn declare(&mut self, markable_type: impl Into<String>, declaration: MarkDeclaration) -> &mut Self {
        self.register_markable(markable_type, declaration.into_policies())
    }

    /// Freeze the registry for shared, read-only use.
    #[must_use]
    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    #[must_use]
    pub const fn known_marker_types(&self) -> &BTreeSet<String> {
        &self.markers
    }

    #[must_use]
    pub fn known_markable_types(&self) -> BTreeSet<&str> {
        self.markables.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn is_marker(&self, marker_type: &str) -> bool {
        self.markers.contains(marker_type)
    }

    #[must_use]
    pub fn is_markable(&self, markable_type: &str) -> bool {
        self.markables.contains_key(markable_type)
    }

    /// Marks declared by `markable_type`, or `None` if it is not registered.
    #[must_use]
    pub fn marks_for(&self, markable_type: &str) -> Option<&MarkTable> {
        self.markables.get(markable_type)
    }

    #[must_use]
    pub fn policy(&self, markable_type: &str, mark: &str) -> Option<&AllowedMarkers> {
        self.marks_for(markable_type)?.get(mark)
    }

    /// Every legal triple across all registered types, in sorted order.
    #[must_use]
    pub fn capabilities(&self) -> Vec<Capability> {
        self.markers
            .iter()
            .flat_map(|marker_type| self.capabilities_for_marker(marker_type))
            .collect()
    }

    /// Every (markable type, mark) pair the given marker type may apply.
    ///
    /// Returns an empty list for unregistered marker types.
    #[must_use]
    pub fn capabilities_for_marker(&self, marker_type: &str) -> Vec<Capability> {
        if !self.is_marker(marker_type) {
            return Vec::new();
        }
        self.markables
            .iter()
            .flat_map(|(markable_type, marks)| {
                marks
                    .iter()
                    .filter(|(_, policy)| policy.permits(marker_type))
                    .map(move |(mark, _)| Capability {
                        marker_type: marker_type.to_string(),
                        markable_type: markable_type.clone(),
                        mark: mark.clone(),
                    })
            })
            .collect()
    }
}
