//! # mark-core
//!
//! Core types and the authorization engine for marking relations.
//!
//! A *marker* (e.g. a user) applies a named *mark* (e.g. `like`, `flag`) to a
//! *markable* (e.g. a post). This crate owns everything that does not touch
//! storage:
//! - Entity references (`type`, `id`) and the relation row struct
//! - Allowed-markers policies attached to each (markable type, mark) pair
//! - The capability registry populated at startup
//! - The authorization resolver that gates every relation operation
//! - The authorization error taxonomy
//! - Response types shared with the maintenance CLI

pub mod authorize;
pub mod entities;
pub mod errors;
pub mod policy;
pub mod registry;
pub mod responses;

pub use entities::{EntityRef, MarkRelation};
pub use errors::{AuthorizationError, ErrorKind};
pub use policy::AllowedMarkers;
pub use registry::{Capability, CapabilityRegistry, MAX_MARK_LEN, MarkDeclaration};
pub use responses::{CapabilitiesResponse, CheckResponse, DestroyResponse, ReclaimReport};
