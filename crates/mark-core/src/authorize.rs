//! Authorization resolver.
//!
//! Checks run in a fixed order and the first failure wins:
//!
//! ```text
//! marker type registered?      -> UnknownMarkerType
//! markable type registered?    -> UnknownMarkableType
//! mark declared for markable?  -> UnsupportedMark
//! policy admits marker type?   -> MarkerNotAllowed
//! ```
//!
//! Checking is pure: it reads the registry and never touches storage.

use crate::entities::EntityRef;
use crate::errors::AuthorizationError;
use crate::policy::AllowedMarkers;
use crate::registry::CapabilityRegistry;

impl CapabilityRegistry {
    /// Decide whether `marker` may apply `mark` to `markable`.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`AuthorizationError`] in resolver order.
    pub fn check(&self, marker: &EntityRef, markable: &EntityRef, mark: &str) -> Result<(), AuthorizationError> {
        self.check_types(&marker.entity_type, &markable.entity_type, mark)
    }

    /// Type-level form of [`check`](Self::check), for queries that name a
    /// markable type without a concrete instance.
    ///
    /// # Errors
    ///
    /// Returns the first failing [`AuthorizationError`] in resolver order.
    pub fn check_types(&self, marker_type: &str, markable_type: &str, mark: &str) -> Result<(), AuthorizationError> {
        if !self.is_marker(marker_type) {
            return Err(AuthorizationError::UnknownMarkerType {
                marker_type: marker_type.to_string(),
            });
        }
        let policy = self.markable_policy(markable_type, mark)?;
        if policy.permits(marker_type) {
            Ok(())
        } else {
            Err(AuthorizationError::MarkerNotAllowed {
                marker_type: marker_type.to_string(),
                markable_type: markable_type.to_string(),
                mark: mark.to_string(),
            })
        }
    }

    /// Markable-side checks only (steps 2 and 3), for operations that act on
    /// every marker at once.
    ///
    /// # Errors
    ///
    /// Returns `UnknownMarkableType` or `UnsupportedMark`.
    pub fn check_markable(&self, markable_type: &str, mark: &str) -> Result<(), AuthorizationError> {
        self.markable_policy(markable_type, mark).map(|_| ())
    }

    /// All-or-nothing check over every (marker, markable) pair.
    ///
    /// Bulk applies check each element independently; callers that need the
    /// whole batch to succeed or fail together run this first.
    ///
    /// # Errors
    ///
    /// Returns the first failure, scanning markers in the outer loop.
    pub fn check_all(&self, markers: &[EntityRef], markables: &[EntityRef], mark: &str) -> Result<(), AuthorizationError> {
        for marker in markers {
            for markable in markables {
                self.check(marker, markable, mark)?;
            }
        }
        Ok(())
    }

    fn markable_policy(&self, markable_type: &str, mark: &str) -> Result<&AllowedMarkers, AuthorizationError> {
        let marks = self
            .marks_for(markable_type)
            .ok_or_else(|| AuthorizationError::UnknownMarkableType {
                markable_type: markable_type.to_string(),
            })?;
        marks.get(mark).ok_or_else(|| AuthorizationError::UnsupportedMark {
            markable_type: markable_type.to_string(),
            mark: mark.to_string(),
        })
    }
}
