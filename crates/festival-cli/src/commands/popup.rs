//! User popup command.

use anyhow::Result;
use clap::Args;
use festival_core::popover::{PopoverState, ShowOutcome, UserPopover};
use festival_core::{Config, FestivalClient};

#[derive(Args)]
pub struct PopupArgs {
    /// Username to look up
    pub username: String,
}

pub async fn execute(args: PopupArgs, config: &Config) -> Result<()> {
    let client = FestivalClient::new(config)?;
    let popover = UserPopover::new(client).with_delay(config.popover_delay());

    let ticket = popover.hover_in();
    match popover.show(ticket, &args.username).await {
        ShowOutcome::Shown => {
            if let PopoverState::Shown(content) = popover.state() {
                println!("{}", content.trim());
            }
            popover.hover_out();
            Ok(())
        }
        ShowOutcome::Failed => anyhow::bail!("Could not load popup for '{}'", args.username),
        ShowOutcome::Cancelled | ShowOutcome::Discarded => Ok(()),
    }
}
