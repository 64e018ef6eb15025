//! Chronicle image deletion.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::Confirm;
use festival_core::chronicle::delete_image;
use festival_core::{Config, FestivalClient};

#[derive(Args)]
pub struct DeleteArgs {
    /// File name inside the chronicle
    pub file: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn execute(args: DeleteArgs, config: &Config) -> Result<()> {
    let file = config.chronicle_file(&args.file)?;

    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!("Sure want to delete {}?", file.file_name))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("{}", "Aborted.".dimmed());
            return Ok(());
        }
    }

    let client = FestivalClient::new(config)?;
    let outcome = delete_image(&client, &file).await?;

    if outcome.confirmed {
        println!("{} Deleted {}", "✓".green().bold(), file.file_name.cyan());
    } else {
        println!(
            "{} Server answered: {}",
            "!".yellow().bold(),
            outcome.response.trim()
        );
    }
    println!("{}", "Reload the chronicle page to see the change.".dimmed());
    Ok(())
}
