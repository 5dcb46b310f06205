pub mod types;

pub use types::{Outcome, Report};

use crate::policy::{CommentPostIntent, JobSummary};
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Build a Report for the stale job from its summary.
pub fn from_summary(summary: JobSummary, outcome: Outcome) -> Report {
    Report {
        job: "stale pull requests".to_string(),
        outcome,
        intents: summary.intents,
        failed_repositories: summary.failed_repositories,
    }
}

/// Build a Report for one opened pull request.
pub fn from_intents(job: impl Into<String>, intents: Vec<CommentPostIntent>, outcome: Outcome) -> Report {
    Report {
        job: job.into(),
        outcome,
        intents,
        failed_repositories: Vec::new(),
    }
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(job = %report.job, comments = report.intents.len()))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

/// Format and print the report to the terminal with colors.
///
/// ═══ stale pull requests [POSTED] ═══
/// → https://api.github.com/repos/org/repo/issues/4/comments
///   first line of the comment…
///
/// Failed repositories: org/broken
fn print_terminal_report(report: &Report) {
    println!();
    println!("═══ {} [{}] ═══", report.job, colorize_outcome(report.outcome));

    if report.intents.is_empty() {
        println!("  No comments.");
    } else {
        for intent in &report.intents {
            println!("→ {}", intent.target_url.cyan());
            println!("  {}", first_line(&intent.body));
        }
    }

    if !report.failed_repositories.is_empty() {
        println!();
        println!(
            "{} {}",
            "Failed repositories:".red().bold(),
            report.failed_repositories.join(", ")
        );
    }
    println!();
}

/// Write the report as a markdown file, with every comment body in full.
fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut md = String::new();
    md.push_str(&format!("# {} ({})\n\n", report.job, report.outcome));

    if report.intents.is_empty() {
        md.push_str("No comments.\n\n");
    }
    for intent in &report.intents {
        md.push_str(&format!("## `{}`\n\n", intent.target_url));
        for line in intent.body.lines() {
            md.push_str(&format!("> {}\n", line).replace("> \n", ">\n"));
        }
        md.push('\n');
    }

    if !report.failed_repositories.is_empty() {
        md.push_str("## Failed repositories\n\n");
        for repository in &report.failed_repositories {
            md.push_str(&format!("- {}\n", repository));
        }
    }

    std::fs::write(path, md)?;
    Ok(())
}

fn first_line(body: &str) -> &str {
    body.lines().find(|line| !line.trim().is_empty()).unwrap_or("")
}

fn colorize_outcome(outcome: Outcome) -> colored::ColoredString {
    match outcome {
        Outcome::Posted => "POSTED".green().bold(),
        Outcome::DryRun => "DRY RUN".yellow().bold(),
    }
}
