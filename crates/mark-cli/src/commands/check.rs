use mark_config::MarkConfig;
use mark_core::{CapabilityRegistry, CheckResponse, EntityRef};

use crate::cli::GlobalFlags;
use crate::cli::root_commands::CheckArgs;
use crate::output::output;

/// Handle `markctl check`. A rejection is reported in the response body,
/// not as a command failure.
pub fn handle(args: &CheckArgs, config: &MarkConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let registry = config.entities.build_registry();
    let response = evaluate(&registry, &args.mark, &args.marker, &args.markable);
    output(&response, flags.format)
}

fn evaluate(registry: &CapabilityRegistry, mark: &str, marker: &EntityRef, markable: &EntityRef) -> CheckResponse {
    let outcome = registry.check(marker, markable, mark);
    CheckResponse {
        marker: marker.clone(),
        markable: markable.clone(),
        mark: mark.to_string(),
        allowed: outcome.is_ok(),
        error_kind: outcome.as_ref().err().map(mark_core::AuthorizationError::kind),
        message: outcome.err().map(|e| e.to_string()),
    }
}
