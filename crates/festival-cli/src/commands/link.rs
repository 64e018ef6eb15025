//! Chronicle snippet command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use festival_core::chronicle::clipboard::SystemClipboard;
use festival_core::chronicle::{copy_snippet, LinkStyle, PathLayout};
use festival_core::Config;

#[derive(Args)]
pub struct LinkArgs {
    /// File name inside the chronicle
    pub file: String,

    /// Snippet style (markdown, html)
    #[arg(short, long)]
    pub style: Option<LinkStyle>,

    /// Static path layout (nested, joined)
    #[arg(short, long)]
    pub layout: Option<PathLayout>,

    /// Copy the snippet to the system clipboard
    #[arg(long)]
    pub copy: bool,
}

pub fn execute(args: LinkArgs, config: &Config) -> Result<()> {
    let file = config.chronicle_file(&args.file)?;
    let mut builder = config.link_builder();
    if let Some(style) = args.style {
        builder.style = style;
    }
    if let Some(layout) = args.layout {
        builder.layout = layout;
    }

    let snippet = builder.build(&file);
    println!("{}", snippet);

    if args.copy {
        let mut clipboard = SystemClipboard::default();
        if let Some(message) = copy_snippet(&mut clipboard, &snippet, config.acknowledge)? {
            eprintln!("{} {}", "✓".green().bold(), message);
        }
    }

    Ok(())
}
