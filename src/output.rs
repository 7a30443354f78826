//! Console rendering of migration progress and outcomes.

use crate::migrate::{MigrationEvent, MigrationOutcome};
use colored::Colorize;

/// Renders orchestrator events as step-by-step terminal output.
///
/// The orchestrator itself never prints; commands pass
/// `|ev| reporter.handle(ev)` as the event callback.
pub struct ConsoleReporter {
    quiet: bool,
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool, verbose: bool) -> Self {
        ConsoleReporter { quiet, verbose }
    }

    /// Show the store's raw response body, dimmed, under `--verbose`.
    fn raw(&self, body: &serde_json::Value) {
        if self.verbose && !body.is_null() {
            println!("{}", body.to_string().dimmed());
        }
    }

    pub fn handle(&self, event: &MigrationEvent) {
        if self.quiet {
            return;
        }
        match event {
            MigrationEvent::ConnectivityChecked { health } => {
                println!(
                    "{} connected to cluster {} ({})",
                    "✔".green(),
                    health.cluster_name.cyan(),
                    health.status
                );
                self.raw(&health.raw);
            }
            MigrationEvent::ExistenceChecked { index, exists } => {
                println!(
                    "{} {} {}",
                    "Index".bold(),
                    index.as_str().cyan(),
                    if *exists {
                        "exists".yellow()
                    } else {
                        "does not exist".green()
                    }
                );
            }
            MigrationEvent::IndexDeleted { index, ack } => {
                println!("{} deleted index {}", "✔".green(), index.as_str().cyan());
                self.raw(ack);
            }
            MigrationEvent::IndexCreated { index, ack } => {
                println!(
                    "{} created index {} with mapping",
                    "✔".green(),
                    index.as_str().cyan()
                );
                self.raw(ack);
            }
            MigrationEvent::ReindexStarted { source, dest } => {
                println!(
                    "{} {} {} {} ...",
                    "Reindexing from".bold(),
                    source.as_str().cyan(),
                    "=>".bold(),
                    dest.as_str().cyan()
                );
            }
            MigrationEvent::ReindexCompleted { stats } => {
                println!(
                    "{} copied {} documents in {:.2}s",
                    "✔".green(),
                    stats.created + stats.updated,
                    stats.took as f64 / 1000.0
                );
                self.raw(&stats.raw);
            }
            MigrationEvent::AliasMoved { report } => {
                if report.was_noop() {
                    println!(
                        "{} alias already points at {}",
                        "✔".green(),
                        report.target.as_str().cyan()
                    );
                } else {
                    let from = if report.previous.is_empty() {
                        "(unbound)".dimmed().to_string()
                    } else {
                        report
                            .previous
                            .iter()
                            .map(|i| i.as_str())
                            .collect::<Vec<_>>()
                            .join(", ")
                            .cyan()
                            .to_string()
                    };
                    println!(
                        "{} alias moved: {} {} {}",
                        "✔".green(),
                        from,
                        "=>".bold(),
                        report.target.as_str().cyan()
                    );
                }
            }
        }
    }
}

/// Print the final one-line summary for a completed run.
pub fn print_outcome(outcome: &MigrationOutcome, quiet: bool) {
    if quiet {
        return;
    }
    let mut parts = Vec::new();
    if let Some(ref index) = outcome.created_index {
        parts.push(format!("created '{index}'"));
    }
    if let Some(ref stats) = outcome.reindexed {
        parts.push(format!("copied {} documents", stats.created + stats.updated));
    }
    if let Some(ref report) = outcome.alias_update {
        parts.push(format!("alias on '{}'", report.target));
    }
    if parts.is_empty() {
        parts.push("nothing to do".to_string());
    }
    println!();
    println!(
        "{} {}",
        "Migration complete:".green().bold(),
        parts.join(", ")
    );
}
