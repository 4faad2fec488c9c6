use anyhow::Context;
use mark_config::MarkConfig;

use crate::cli::GlobalFlags;

/// Load `.env`, then configuration from `--config` or the default layers.
pub fn load_config(flags: &GlobalFlags) -> anyhow::Result<MarkConfig> {
    let config = match &flags.config {
        Some(path) => {
            let _ = dotenvy::dotenv();
            MarkConfig::load_from(path).with_context(|| format!("failed to load config from {path}"))?
        }
        None => MarkConfig::load_with_dotenv().context("failed to load configuration")?,
    };

    if config.entities.is_empty() {
        tracing::warn!("no entity types configured; every check will be rejected");
    }
    Ok(config)
}
