use anyhow::Context;
use mark_config::MarkConfig;
use mark_core::DestroyResponse;
use mark_db::MarkService;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::DestroyArgs;
use crate::output::output;

/// Handle `markctl destroy`: the cascade for an entity deleted outside the
/// host's normal path.
pub async fn handle(args: &DestroyArgs, config: &MarkConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let service = MarkService::from_config(config)
        .await
        .context("failed to open mark database")?;

    let deleted = service.on_entity_destroyed(&args.entity).await?;
    output(
        &DestroyResponse {
            entity: args.entity.clone(),
            deleted,
        },
        flags.format,
    )
}
