//! Entity structs for the marking domain.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` so relation
//! rows can be emitted by the CLI and validated against a schema in tests.

mod entity_ref;
mod mark;

pub use entity_ref::EntityRef;
pub use mark::MarkRelation;
