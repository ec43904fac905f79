//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scheduled runs (--quiet flag)

use leetstats_core::sync::UserResult;
use leetstats_core::{SnapshotStatus, SyncEvent, SyncOutcome, SyncReport};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Per-user progress, human mode only
    pub fn progress(&self, event: &SyncEvent<'_>) {
        if self.format != OutputFormat::Human {
            return;
        }

        match event {
            SyncEvent::Fetching { index, total, user } => {
                println!(
                    "[{}/{}] Fetching stats for {} (@{})...",
                    index, total, user.display_name, user.handle
                );
            }
            SyncEvent::Fetched(result) => println!("{}", result_line(result)),
        }
    }

    /// Print the outcome of a sync run
    pub fn print_report(&self, report: &SyncReport) {
        match self.format {
            OutputFormat::Human => match &report.outcome {
                SyncOutcome::Skipped => {
                    println!("Already updated today ({})", report.date);
                }
                SyncOutcome::Updated { results, persisted } => {
                    let failed = results.len() - report.recorded_count();
                    let summary = format!(
                        "{} recorded, {} failed",
                        report.recorded_count(),
                        failed
                    );
                    println!();
                    if *persisted {
                        self.success(&format!(
                            "Snapshot for {} saved ({})",
                            report.date, summary
                        ));
                    } else {
                        println!("Dry run: snapshot for {} not saved ({})", report.date, summary);
                    }
                }
            },
            OutputFormat::Json => {
                println!("{}", report_json(report));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print a snapshot overview
    pub fn print_status(&self, status: &SnapshotStatus) {
        match self.format {
            OutputFormat::Human => {
                println!("leetstats Status");
                println!("================");
                println!();
                println!("Store:  {}", status.location);
                println!("Dates:  {}", status.date_count);
                if let Some(ref first) = status.first_date {
                    println!("First:  {}", first);
                }
                match &status.latest {
                    Some((date, entry)) => {
                        println!("Latest: {}", date);
                        println!();
                        if entry.is_empty() {
                            println!("  (no users recorded)");
                        }
                        let width = entry.keys().map(String::len).max().unwrap_or(0);
                        for (handle, count) in entry {
                            println!("  {:width$}  {}", handle, count, width = width);
                        }
                    }
                    None => println!("No snapshots recorded yet."),
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "location": status.location,
                        "date_count": status.date_count,
                        "first_date": status.first_date,
                        "latest": status.latest.as_ref().map(|(date, entry)| {
                            serde_json::json!({"date": date, "counts": entry})
                        }),
                    })
                );
            }
            OutputFormat::Quiet => {
                if let Some((date, _)) = &status.latest {
                    println!("{}", date);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an error (always shown, on stderr)
    pub fn error(&self, msg: &str, hint: Option<&str>) {
        match self.format {
            OutputFormat::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({"status": "error", "message": msg, "hint": hint})
                );
            }
            _ => {
                eprintln!("✗ {}", msg);
                if let Some(hint) = hint {
                    eprintln!("  {}", hint);
                }
            }
        }
    }
}

fn result_line(result: &UserResult) -> String {
    match result.value {
        Some(value) => format!("✓ {}: {}", result.display_name, value),
        None => format!("✗ {}: no data", result.display_name),
    }
}

fn report_json(report: &SyncReport) -> serde_json::Value {
    let (status, persisted) = match &report.outcome {
        SyncOutcome::Skipped => ("skipped", false),
        SyncOutcome::Updated { persisted, .. } => ("updated", *persisted),
    };

    let users: Vec<_> = report
        .results()
        .iter()
        .map(|r| {
            serde_json::json!({
                "handle": r.handle,
                "display_name": r.display_name,
                "value": r.value,
            })
        })
        .collect();

    serde_json::json!({
        "status": status,
        "date": report.date,
        "mode": report.mode.to_string(),
        "persisted": persisted,
        "users": users,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use leetstats_core::SnapshotMode;

    fn report(outcome: SyncOutcome) -> SyncReport {
        SyncReport {
            date: "2024-01-01".to_string(),
            mode: SnapshotMode::Total,
            outcome,
        }
    }

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_result_line() {
        let ok = UserResult {
            handle: "alice".to_string(),
            display_name: "Alice".to_string(),
            value: Some(10),
        };
        assert_eq!(result_line(&ok), "✓ Alice: 10");

        let failed = UserResult { value: None, ..ok };
        assert_eq!(result_line(&failed), "✗ Alice: no data");
    }

    #[test]
    fn test_report_json_updated() {
        let json = report_json(&report(SyncOutcome::Updated {
            results: vec![UserResult {
                handle: "alice".to_string(),
                display_name: "Alice".to_string(),
                value: Some(10),
            }],
            persisted: true,
        }));

        assert_eq!(json["status"], "updated");
        assert_eq!(json["mode"], "total");
        assert_eq!(json["persisted"], true);
        assert_eq!(json["users"][0]["value"], 10);
    }

    #[test]
    fn test_report_json_skipped() {
        let json = report_json(&report(SyncOutcome::Skipped));
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["users"], serde_json::json!([]));
    }
}
