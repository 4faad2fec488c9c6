use clap::{Args, Subcommand};
use mark_core::EntityRef;

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Delete relation rows whose marker or markable no longer exists.
    Reclaim(ReclaimArgs),
    /// List every legal (marker type, markable type, mark) triple.
    Capabilities(CapabilitiesArgs),
    /// Ask whether a marker may apply a mark to a markable.
    Check(CheckArgs),
    /// Remove every relation row referencing an entity.
    Destroy(DestroyArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ReclaimArgs {
    /// Rows fetched per scan page (overrides `[reclaim] page_size`)
    #[arg(long)]
    pub page_size: Option<u32>,
}

#[derive(Clone, Debug, Args)]
pub struct CapabilitiesArgs {
    /// Only show capabilities of this marker type
    #[arg(long)]
    pub marker: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CheckArgs {
    /// Mark name
    pub mark: String,
    /// Marker reference as `type:id`
    #[arg(value_parser = parse_entity_ref)]
    pub marker: EntityRef,
    /// Markable reference as `type:id`
    #[arg(value_parser = parse_entity_ref)]
    pub markable: EntityRef,
}

#[derive(Clone, Debug, Args)]
pub struct DestroyArgs {
    /// Entity reference as `type:id`
    #[arg(value_parser = parse_entity_ref)]
    pub entity: EntityRef,
}

/// Parse `type:id`, splitting on the first colon so ids may contain colons.
pub fn parse_entity_ref(raw: &str) -> Result<EntityRef, String> {
    match raw.split_once(':') {
        Some((entity_type, id)) if !entity_type.is_empty() && !id.is_empty() => {
            Ok(EntityRef::new(entity_type, id))
        }
        _ => Err(format!("expected 'type:id', got '{raw}'")),
    }
}
