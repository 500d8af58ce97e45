//! The subcommands for the `commit-notify` application.

use crate::ctx::AppContext;
use clap::Subcommand;

mod config;
pub use config::ConfigCmd;

mod reset;
pub use reset::ResetCmd;

mod status;
pub use status::StatusCmd;

mod watch;
pub use watch::WatchCmd;

#[derive(Debug, Clone, Eq, PartialEq, Subcommand)]
pub enum Subcommands {
    /// Poll the repository and report new commits until interrupted.
    #[clap(alias = "w")]
    Watch(WatchCmd),
    /// Enter or update the repository credentials.
    #[clap(alias = "cfg")]
    Config(ConfigCmd),
    /// Show the configured repository and the last processed commit.
    #[clap(alias = "st")]
    Status(StatusCmd),
    /// Forget the last processed commit. The next run records the current history again.
    Reset(ResetCmd),
}

impl Subcommands {
    /// Run the subcommand with the given context.
    pub async fn run(self, ctx: AppContext) -> anyhow::Result<()> {
        match self {
            Self::Watch(args) => args.run(ctx).await,
            Self::Config(args) => args.run(ctx),
            Self::Status(args) => args.run(ctx),
            Self::Reset(args) => args.run(ctx),
        }
    }
}
