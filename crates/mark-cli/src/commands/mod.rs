use mark_config::MarkConfig;

use crate::cli::{Commands, GlobalFlags};

pub mod capabilities;
pub mod check;
pub mod destroy;
pub mod reclaim;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, config: &MarkConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Reclaim(args) => reclaim::handle(&args, config, flags).await,
        Commands::Capabilities(args) => capabilities::handle(&args, config, flags),
        Commands::Check(args) => check::handle(&args, config, flags),
        Commands::Destroy(args) => destroy::handle(&args, config, flags).await,
    }
}
