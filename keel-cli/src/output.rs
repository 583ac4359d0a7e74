//! Output helpers shared by commands

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use colored::*;
use serde::Serialize;

use keel_core::domain::deployment::{Deployment, DeploymentStatus};

/// Print `value` as pretty JSON on stdout
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

pub fn format_time(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Colorize a deployment status
pub fn colorize_status(status: &DeploymentStatus) -> ColoredString {
    let status_str = status.to_string();
    match status {
        DeploymentStatus::InProgress => status_str.cyan(),
        DeploymentStatus::Succeeded => status_str.green(),
        DeploymentStatus::Failed => status_str.red(),
        DeploymentStatus::NoChanges => status_str.dimmed(),
        DeploymentStatus::RolledBack => status_str.yellow(),
    }
}

/// One line per deployment, used by `deployment ls`
pub fn print_deployment_summary(deployment: &Deployment) {
    println!(
        "  {} {} {}",
        "▸".cyan(),
        deployment.target().bold(),
        colorize_status(&deployment.status)
    );
    println!("    ID:      {}", deployment.id.to_string().dimmed());
    println!(
        "    Started: {}",
        format_time(&deployment.started_at).dimmed()
    );
    println!();
}

pub fn print_deployment_details(deployment: &Deployment) {
    println!("{}", "Deployment Details:".bold());
    println!("  ID:          {}", deployment.id.to_string().cyan());
    println!("  Application: {}", deployment.app);
    println!("  Target:      {}", deployment.target().bold());
    println!("  Status:      {}", colorize_status(&deployment.status));
    println!("  Started:     {}", format_time(&deployment.started_at));
    if let Some(completed) = &deployment.completed_at {
        println!("  Completed:   {}", format_time(completed));
        let duration = *completed - deployment.started_at;
        println!("  Duration:    {}s", duration.num_seconds());
    }
    if let Some(message) = &deployment.message {
        println!("  Message:     {}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_time() {
        let time = Utc.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(format_time(&time), "2024-03-09 07:05:01");
    }

    #[test]
    fn test_colorize_status_keeps_text() {
        colored::control::set_override(false);
        assert_eq!(
            colorize_status(&DeploymentStatus::NoChanges).to_string(),
            "No changes"
        );
    }
}
