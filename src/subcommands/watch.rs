//! `watch` subcommand.

use crate::{
    ctx::AppContext,
    fetch::GitHubClient,
    report::ConsoleReporter,
    watch::{WatchSettings, Watcher},
};
use anyhow::Result;
use clap::Args;
use futures::{Stream, StreamExt};
use nu_ansi_term::Color;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Exit status of a process stopped by SIGINT.
const INTERRUPTED_EXIT_CODE: i32 = 130;

/// CLI arguments for the `watch` subcommand.
#[derive(Default, Debug, Clone, Eq, PartialEq, Args)]
pub struct WatchCmd {
    /// Seconds between two polls, overriding the configuration.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,
    /// Prompt for credentials even if some are stored.
    #[arg(long)]
    pub reconfigure: bool,
    /// Only print reports to the terminal, without desktop notifications.
    #[arg(long)]
    pub no_desktop: bool,
}

impl WatchCmd {
    /// Run the `watch` subcommand.
    pub async fn run(self, ctx: AppContext) -> Result<()> {
        let config = ctx.load_config(self.reconfigure)?;
        let interval = self
            .interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| config.interval());

        let fetcher = GitHubClient::new(&config.api_url, &config.credentials(), config.per_page)?;
        let reporter = ConsoleReporter::new(config.slug(), !self.no_desktop);
        let settings = WatchSettings {
            interval,
            concurrency: config.concurrency,
            missing_watermark: config.missing_watermark,
        };
        let mut watcher = Watcher::new(fetcher, ctx.store(), reporter, settings);

        // Stop between cycles on Ctrl-C, immediately on the second one.
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            let signals = futures::stream::unfold((), |()| async {
                tokio::signal::ctrl_c().await.ok().map(|()| ((), ()))
            });
            if await_interrupts(Box::pin(signals), on_interrupt).await {
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        });

        println!(
            "Watching `{}` every {}s. Press Ctrl-C to stop.",
            Color::Green.paint(config.slug()),
            interval.as_secs()
        );
        watcher.run(cancel).await?;

        Ok(())
    }
}

/// Cancels `cancel` on the first interrupt. Returns `true` once a second interrupt arrives, or
/// `false` if the signal source ends first.
async fn await_interrupts<S>(mut signals: S, cancel: CancellationToken) -> bool
where
    S: Stream<Item = ()> + Unpin,
{
    if signals.next().await.is_none() {
        return false;
    }
    info!("interrupt received, stopping after the current cycle");
    cancel.cancel();

    if signals.next().await.is_none() {
        return false;
    }
    warn!("second interrupt received, exiting now");
    true
}
