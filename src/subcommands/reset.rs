//! `reset` subcommand.

use crate::ctx::AppContext;
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `reset` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ResetCmd {
    /// Do not ask for confirmation.
    #[arg(short, long)]
    yes: bool,
}

impl ResetCmd {
    /// Run the `reset` subcommand.
    pub fn run(self, ctx: AppContext) -> Result<()> {
        if !self.yes {
            let confirm = inquire::Confirm::new(
                "Forget the last processed commit? Commits made meanwhile will not be reported.",
            )
            .with_default(false)
            .prompt()?;

            if !confirm {
                return Ok(());
            }
        }

        let store = ctx.store();
        store.clear()?;
        println!(
            "Cleared {}",
            Color::Blue.paint(store.path().display().to_string())
        );
        Ok(())
    }
}
