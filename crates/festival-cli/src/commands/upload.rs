//! Chronicle upload command.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use festival_core::chronicle::upload::{UploadMode, UploadRequest, UploadWidget};
use festival_core::{Config, FestivalClient};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;

use crate::output;

#[derive(Args)]
pub struct UploadArgs {
    /// Files to upload
    pub files: Vec<PathBuf>,

    /// What to do after each upload (attach, reload)
    #[arg(short, long)]
    pub mode: Option<UploadMode>,
}

pub async fn execute(args: UploadArgs, config: &Config) -> Result<()> {
    if args.files.is_empty() {
        println!("{}", config.labels.hint.dimmed());
        return Ok(());
    }

    let (festival_id, user_id) = config.chronicle_owner()?;
    let client = FestivalClient::new(config)?;

    let mut requests = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Not a file path: {}", path.display()))?;
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        requests.push(UploadRequest::new(file_name, bytes));
    }

    let mut widget = UploadWidget::new(
        args.mode.unwrap_or(config.upload_mode),
        config.upload_policy(),
        config.link_builder(),
        festival_id,
        user_id,
    )
    .with_parallelism(config.upload_parallelism);

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!("Uploading {} file(s)...", requests.len()));
    spinner.enable_steady_tick(Duration::from_millis(100));

    let completions = widget.upload_all(&client, requests).await;
    spinner.finish_and_clear();

    output::print_upload_completions(&completions);
    output::print_form_fields(widget.form_fields());

    let failed = completions.iter().filter(|c| !c.is_success()).count();
    if failed > 0 {
        anyhow::bail!("{} of {} upload(s) failed", failed, completions.len());
    }
    Ok(())
}
