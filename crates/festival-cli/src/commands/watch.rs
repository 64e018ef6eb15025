//! Notification badge watcher.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use festival_core::notification::{
    CounterBoard, CounterSlot, Counters, NotificationPoller, PollOutcome, Watermark,
};
use festival_core::{Config, FestivalClient};
use std::time::Duration;

use crate::output;

#[derive(Args)]
pub struct WatchArgs {
    /// Seconds between polls (defaults to the configured interval)
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Only fetch notifications newer than this timestamp
    #[arg(long, default_value = "0")]
    pub since: f64,

    /// Poll once and exit
    #[arg(long)]
    pub once: bool,
}

/// Badge board that prints every change.
#[derive(Default)]
struct TerminalBoard {
    counters: Counters,
}

impl CounterBoard for TerminalBoard {
    fn set_counter(&mut self, slot: CounterSlot, count: i64) {
        let before = self.counters.get(slot).clone();
        self.counters.set_counter(slot, count);
        let after = self.counters.get(slot);
        if *after != before {
            output::print_counter_change(slot, after);
        }
    }
}

pub async fn execute(args: WatchArgs, config: &Config) -> Result<()> {
    let client = FestivalClient::new(config)?;
    let interval = args
        .interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());

    let mut poller = NotificationPoller::new(client, TerminalBoard::default())
        .with_interval(interval)
        .with_watermark(Watermark::new(args.since));

    if args.once {
        if poller.poll_once().await == PollOutcome::Failed {
            anyhow::bail!("Notification poll failed (see log for details)");
        }
        output::print_counters(&poller.board().counters);
        println!("{}: {}", "Watermark".bold(), poller.watermark());
        return Ok(());
    }

    println!();
    println!("  {} {}", "Festival".cyan().bold(), "Notifications".bold());
    println!();
    println!("  {}  {}", "Server".green(), config.base_url);
    println!("  {}   every {}s", "Polls".green(), interval.as_secs_f64());
    println!();
    println!("  {}", "Ctrl+C to stop".dimmed());
    println!();

    let handle = poller.start();
    tokio::signal::ctrl_c().await?;
    let poller = handle.stop().await?;

    println!();
    output::print_counters(&poller.board().counters);
    println!("{}: {}", "Watermark".bold(), poller.watermark());
    Ok(())
}
