use anyhow::Context;
use mark_config::MarkConfig;
use mark_db::{EntityDirectory, MarkService};
use tokio_util::sync::CancellationToken;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReclaimArgs;
use crate::output::output;

/// Handle `markctl reclaim`. Ctrl-C stops the sweep after the current row.
pub async fn handle(args: &ReclaimArgs, config: &MarkConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut service = MarkService::from_config(config)
        .await
        .context("failed to open mark database")?;
    if let Some(page_size) = args.page_size {
        service = service.with_page_size(page_size);
    }

    let directory = EntityDirectory::from_tables(service.store().conn(), &config.entities)
        .context("failed to build entity lookups")?;

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupt received, stopping after the current row");
                cancel.cancel();
            }
        }
    });

    let report = service.reclaim_with(&directory, &cancel).await;
    interrupt.abort();

    output(&report?, flags.format)
}
