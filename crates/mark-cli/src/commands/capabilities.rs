use mark_config::MarkConfig;
use mark_core::{CapabilitiesResponse, CapabilityRegistry};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CapabilitiesArgs;
use crate::output::output;

/// Handle `markctl capabilities`.
pub fn handle(args: &CapabilitiesArgs, config: &MarkConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = config.entities.build_registry();
    output(&describe(&registry, args.marker.as_deref()), flags.format)
}

fn describe(registry: &CapabilityRegistry, marker: Option<&str>) -> CapabilitiesResponse {
    let capabilities = match marker {
        Some(marker_type) => registry.capabilities_for_marker(marker_type),
        None => registry.capabilities(),
    };
    CapabilitiesResponse {
        marker_types: registry.known_marker_types().iter().cloned().collect(),
        markable_types: registry
            .known_markable_types()
            .into_iter()
            .map(String::from)
            .collect(),
        capabilities,
    }
}
