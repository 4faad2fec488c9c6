//! Relation operations on `MarkService`, grouped by concern.
//!
//! Each module adds methods via `impl MarkService` blocks.

pub mod mark;
pub mod query;
pub mod reclaim;
