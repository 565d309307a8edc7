use colored::Colorize;
use declarative::{Action, ReconcileError, Target};
use serde_json::json;

use crate::cli::OutputFormat;
use crate::commands::ensure::Report;

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.len()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Reports
// ============================================================================

/// One-line summary of a report, without colors
pub fn summary(report: &Report) -> String {
    let mut subject = format!("{} {}", report.kind, report.key);
    if let Some((parent, id)) = report.kind.parent() {
        subject.push_str(&format!(" of {parent} {id}"));
    }
    let id = report
        .resource
        .as_ref()
        .map(|r| format!(" (id {})", r.id))
        .unwrap_or_default();

    if report.check {
        return match report.action {
            Action::Noop => format!("{subject} is already {}{id}", report.target),
            action => format!("Would {} {subject}{id}", action.verb()),
        };
    }

    match report.action {
        Action::Create => format!("Created {subject}{id}"),
        Action::Update => format!("Updated {subject}{id}"),
        Action::Delete => format!("Deleted {subject}{id}"),
        Action::Noop => format!("{subject} is already {}{id}", report.target),
    }
}

/// Print a report in the chosen format
pub fn report(output: OutputFormat, report: &Report) {
    match output {
        OutputFormat::Json => println!("{}", report.to_json()),
        OutputFormat::Text => {
            let line = summary(report);
            if report.check || !report.changed {
                info(&line);
            } else {
                success(&line);
            }
            for drift in &report.drift {
                dim(&drift.to_string());
            }
            if !report.drift.is_empty() && report.target == Target::Present && !report.changed {
                dim("pass --correct-drift to update it");
            }
        }
    }
}

/// Print a fatal error in the chosen format
pub fn failure(output: OutputFormat, err: &anyhow::Error) {
    let msg = format!("{err:#}");
    match output {
        OutputFormat::Json => println!("{}", json!({ "failed": true, "msg": msg })),
        OutputFormat::Text => {
            error(&msg);
            if let Some(category) = err
                .downcast_ref::<ReconcileError>()
                .and_then(ReconcileError::api_category)
            {
                eprintln!("  {}", category.advice().dimmed());
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
