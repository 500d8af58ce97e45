//! `config` subcommand.

use crate::{
    config::{Config, ConfigError},
    ctx::AppContext,
};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `config` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct ConfigCmd;

impl ConfigCmd {
    /// Run the `config` subcommand.
    pub fn run(self, ctx: AppContext) -> Result<()> {
        let path = ctx.config_path();
        let existing = match Config::load(path) {
            Ok(config) => Some(config),
            Err(ConfigError::Missing(_)) => None,
            Err(e) => {
                println!("{}", Color::Red.paint(format!("Ignoring stored configuration: {}", e)));
                None
            }
        };

        if let Some(existing) = existing.as_ref() {
            let keep = inquire::Confirm::new(
                format!(
                    "Do you want to use the existing credentials for `{}`?",
                    Color::Green.paint(existing.slug())
                )
                .as_str(),
            )
            .with_default(true)
            .prompt()?;

            if keep {
                return Ok(());
            }
        }

        let config = Config::prompt(existing.as_ref())?;
        config.save(path)?;

        println!(
            "Configuration for `{}` saved to {}",
            Color::Green.paint(config.slug()),
            Color::Blue.paint(path.display().to_string())
        );
        Ok(())
    }
}
