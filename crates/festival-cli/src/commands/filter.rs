//! List table filter command.

use anyhow::{Context, Result};
use clap::Args;
use festival_core::table::{Table, TableFilter, TablePreset};
use std::io::Read;
use std::path::PathBuf;

use crate::output;

#[derive(Args)]
pub struct FilterArgs {
    /// Tab-separated table file ("-" for stdin)
    pub table: PathBuf,

    /// Text to search for (empty shows all rows)
    #[arg(default_value = "")]
    pub query: String,

    /// Column to match against
    #[arg(long, conflicts_with = "preset")]
    pub column: Option<usize>,

    /// List page preset (stock, wishlist, shopping, utility)
    #[arg(short, long)]
    pub preset: Option<TablePreset>,

    /// Hide every row (reply table with "show replies" unchecked)
    #[arg(long)]
    pub collapse: bool,
}

pub fn execute(args: FilterArgs) -> Result<()> {
    let input = if args.table.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read table from stdin")?;
        buf
    } else {
        std::fs::read_to_string(&args.table)
            .with_context(|| format!("Failed to read {}", args.table.display()))?
    };

    let mut table = Table::from_tsv(&input);
    if args.collapse {
        table.set_all_visible(false);
    } else {
        let filter = match (args.column, args.preset) {
            (Some(column), _) => TableFilter::new(column),
            (None, Some(preset)) => preset.filter(),
            (None, None) => TableFilter::default(),
        };
        filter.apply(&mut table, &args.query);
    }

    output::print_table(&table);
    Ok(())
}
