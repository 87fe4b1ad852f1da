//! Terminal output: progress bars, prompts, and report rendering.

use crate::requirement::status::{OrchestrationReport, Outcome};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Build a progress bar for a download.
///
/// Falls back to a byte-counting spinner when the server omits the total.
pub fn download_bar(total: Option<u64>) -> ProgressBar {
    match total {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template(
                    "{bar:40.cyan/blue} {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
                )
                .expect("valid progress template"),
            );
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner} {bytes} ({bytes_per_sec})")
                    .expect("valid progress template"),
            );
            bar
        }
    }
}

/// Ask the user to confirm a download.
///
/// `assume_yes` (the `--yes` flag) and non-interactive contexts (CI, no
/// terminal) accept without prompting. The default answer is yes, matching
/// what an unattended setup run needs.
pub fn confirm_download(prompt: &str, assume_yes: bool) -> bool {
    if assume_yes || crate::env::is_ci() || !console::user_attended() {
        return true;
    }

    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(true)
        .interact()
        .unwrap_or(true)
}

/// Print the human-readable run summary.
pub fn print_report(report: &OrchestrationReport) {
    println!();
    for result in &report.results {
        match result.outcome {
            Outcome::Satisfied => {
                let path = result
                    .resolved_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("{} {} — {}", style("✓").green().bold(), result.name, path);
            }
            Outcome::Failed => {
                let error = result.error.as_deref().unwrap_or("unknown error");
                println!("{} {} — {}", style("✗").red().bold(), result.name, error);
            }
            Outcome::Skipped => {
                println!("{} {} — skipped", style("○").dim(), result.name);
            }
        }
    }

    let satisfied = count(report, Outcome::Satisfied);
    let failed = count(report, Outcome::Failed);
    let skipped = count(report, Outcome::Skipped);

    let summary = format!(
        "{} satisfied, {} failed, {} skipped",
        satisfied, failed, skipped
    );
    println!();
    if failed > 0 {
        println!("{}", style(summary).red());
    } else {
        println!("{}", style(summary).green());
    }
}

fn count(report: &OrchestrationReport, outcome: Outcome) -> usize {
    report
        .results
        .iter()
        .filter(|r| r.outcome == outcome)
        .count()
}
