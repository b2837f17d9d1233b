//! Download handler.
//!
//! Runs the pipeline for one app and prints one line per outcome. Warnings
//! go to stderr; they never change the exit code.

use anyhow::Result;
use apkmd_core::{DownloadReport, Pass, VariantReport};

use crate::bootstrap::CliContext;
use crate::commands::DownloadArgs;
use crate::error::CliError;

/// Execute the download command.
pub async fn execute(ctx: &CliContext, args: &DownloadArgs) -> Result<()> {
    let app = args.app();
    let overlay = args.to_overlay()?;

    let mut report = DownloadReport::new();
    let result = ctx
        .downloader
        .download_into(&app, &overlay, &mut report)
        .await;

    match result {
        Ok(()) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            // Whatever finished before the interruption is already on disk.
            for outcome in &report.outcomes {
                println!("{}", format_outcome(outcome));
            }
            Err(CliError::from(e).into())
        }
    }
}

fn print_report(report: &DownloadReport) {
    for warning in &report.warnings {
        eprintln!("⚠️  {warning}");
    }
    for outcome in &report.outcomes {
        println!("{}", format_outcome(outcome));
    }
    if report.outcomes.is_empty() {
        println!("Nothing downloaded.");
    }
}

/// One terminal line for an outcome.
pub fn format_outcome(report: &VariantReport) -> String {
    let retry = match report.pass {
        Pass::Primary => "",
        Pass::Retry => " (retry)",
    };
    match (&report.outcome.destination_path, report.outcome.skipped) {
        (Some(path), false) => format!("✓ {}{retry}", path.display()),
        (Some(path), true) => format!("- skipped {}{retry}", path.display()),
        (None, _) => format!("- unresolved {}{retry}", report.variant_url),
    }
}
