//! Export, import and reset.

use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use services::{ExportFormat, ProgressCoordinator, TrackerServices};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Re-importable JSON document
    Json,
    /// Printable progress report
    Report,
}

impl From<FormatArg> for ExportFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Json => ExportFormat::Json,
            FormatArg::Report => ExportFormat::Report,
        }
    }
}

/// Render stored progress and write it to `out`, or return it for stdout.
pub async fn export(
    services: &TrackerServices,
    format: FormatArg,
    out: Option<&Path>,
) -> Result<Option<String>> {
    let rendered = services.export(format.into()).await?;
    match out {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(path = %path.display(), ?format, "progress exported");
            Ok(None)
        }
        None => Ok(Some(rendered)),
    }
}

pub async fn import(coordinator: &ProgressCoordinator, file: &Path) -> Result<()> {
    let bytes =
        std::fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    coordinator
        .import_json(&bytes)
        .await
        .with_context(|| format!("failed to import {}", file.display()))?;
    Ok(())
}

/// Ask before wiping progress unless `yes` is set. Returns whether to proceed.
pub fn confirm_reset(yes: bool, input: &mut impl BufRead, output: &mut impl Write) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    write!(output, "Delete all progress and start over? (y/N) ")?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

/// Returns `false` if the user declined.
pub async fn reset(coordinator: &ProgressCoordinator, yes: bool) -> Result<bool> {
    if !confirm_reset(yes, &mut io::stdin().lock(), &mut io::stdout())? {
        return Ok(false);
    }
    coordinator.reset().await?;
    Ok(true)
}
