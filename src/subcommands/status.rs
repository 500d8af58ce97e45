//! `status` subcommand.

use crate::{
    config::{Config, ConfigError},
    ctx::AppContext,
};
use anyhow::Result;
use clap::Args;
use nu_ansi_term::Color;

/// CLI arguments for the `status` subcommand.
#[derive(Debug, Clone, Eq, PartialEq, Args)]
pub struct StatusCmd;

impl StatusCmd {
    /// Run the `status` subcommand.
    pub fn run(self, ctx: AppContext) -> Result<()> {
        match Config::load(ctx.config_path()) {
            Ok(config) => {
                println!("Repository:  {}", Color::Green.paint(config.slug()));
                println!("Interval:    {}s", config.interval_secs);
                println!("API:         {}", config.api_url);
            }
            Err(ConfigError::Missing(_)) => {
                println!("Repository:  {}", Color::Yellow.paint("not configured"));
            }
            Err(e) => return Err(e.into()),
        }
        println!("Config file: {}", ctx.config_path().display());

        let watermark = ctx.store().peek()?;
        println!("State file:  {}", ctx.state_path().display());
        println!(
            "Last commit: {}",
            watermark.map_or(Color::Yellow.paint("none"), |sha| Color::Blue.paint(sha))
        );

        Ok(())
    }
}
