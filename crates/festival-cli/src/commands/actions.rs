//! File-action popover command.

use anyhow::Result;
use clap::Args;
use festival_core::popover::file_actions;
use festival_core::Config;

#[derive(Args)]
pub struct ActionsArgs {
    /// File name inside the chronicle
    pub file: String,
}

pub fn execute(args: ActionsArgs, config: &Config) -> Result<()> {
    println!("{}", file_actions(&args.file, &config.labels));
    Ok(())
}
