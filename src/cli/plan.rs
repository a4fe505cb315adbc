//! Plan and check commands

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use tracing::debug;

use super::output::Output;
use crate::config::Config;
use crate::domain::timeline::format_hours;
use crate::domain::{format_timestamp, parse_timestamp, ScheduleError, ScheduleResult, Task};
use crate::intake::{IntakeError, RequestFormat, ScheduleRequest};
use crate::planner;

/// Compute and print the execution plan
pub fn plan(
    output: &Output,
    config: &Config,
    input: &Path,
    format: Option<RequestFormat>,
    now_flag: Option<&str>,
) -> Result<()> {
    let request = load_request(output, input, format)?;

    let now = match now_flag {
        Some(raw) => {
            parse_timestamp(raw).ok_or_else(|| anyhow!("Invalid --now timestamp: {}", raw))?
        }
        None => request.now.unwrap_or_else(Utc::now),
    };
    debug!(now = %format_timestamp(&now), "timeline origin");

    let tasks = into_tasks(output, config, request, now)?;
    let result = planner::plan(tasks, now).map_err(|e| reject(output, e))?;

    if output.is_json() {
        output.data(&result);
    } else {
        print_plan(&result);
    }

    Ok(())
}

/// Validate a task set and print its order
pub fn check(
    output: &Output,
    config: &Config,
    input: &Path,
    format: Option<RequestFormat>,
) -> Result<()> {
    let request = load_request(output, input, format)?;
    let now = request.now.unwrap_or_else(Utc::now);

    let tasks = into_tasks(output, config, request, now)?;
    let count = tasks.len();
    let order = planner::order(tasks).map_err(|e| reject(output, e))?;

    if output.is_json() {
        output.data(&serde_json::json!({
            "valid": true,
            "recommendedOrder": order,
        }));
    } else {
        println!("Valid: {} task{} can be scheduled.", count, if count == 1 { "" } else { "s" });
        for (i, title) in order.iter().enumerate() {
            println!("{:>3}. {}", i + 1, title);
        }
    }

    Ok(())
}

fn load_request(
    output: &Output,
    input: &Path,
    format: Option<RequestFormat>,
) -> Result<ScheduleRequest> {
    let (content, format) = if input == Path::new("-") {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read request from stdin")?;
        (content, format.unwrap_or(RequestFormat::Json))
    } else {
        let content = fs::read_to_string(input)
            .with_context(|| format!("Failed to read request: {}", input.display()))?;
        (content, format.unwrap_or_else(|| RequestFormat::from_path(input)))
    };

    debug!(bytes = content.len(), format = ?format, "request read");
    ScheduleRequest::parse(&content, format).map_err(|e| reject_intake(output, e))
}

fn into_tasks(
    output: &Output,
    config: &Config,
    request: ScheduleRequest,
    now: DateTime<Utc>,
) -> Result<Vec<Task>> {
    request
        .into_tasks(&config.intake, now)
        .map_err(|e| reject_intake(output, e))
}

fn reject(output: &Output, err: ScheduleError) -> anyhow::Error {
    let report = err.report();
    output.failure(report.kind, &report.titles, &report.message);
    anyhow::Error::new(err).context("Task set cannot be scheduled")
}

fn reject_intake(output: &Output, err: IntakeError) -> anyhow::Error {
    output.failure(err.kind(), &[], &err.to_string());
    anyhow::Error::new(err)
}

fn short_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

fn print_plan(result: &ScheduleResult) {
    println!(
        "Recommended order ({} task{}, {}):",
        result.metrics.total_tasks,
        if result.metrics.total_tasks == 1 { "" } else { "s" },
        format_hours(result.metrics.total_estimated_hours)
    );
    println!();
    println!(
        "{:>3}  {:<28} {:>7}  {:<16}  {:<16}  NOTE",
        "#", "TITLE", "HOURS", "START (UTC)", "END (UTC)"
    );
    println!("{}", "-".repeat(86));

    for (i, entry) in result.timeline.iter().enumerate() {
        let span = entry.end_time - entry.start_time;
        let hours = format_hours(span.num_milliseconds() as f64 / 3_600_000.0);
        let note = result
            .analysis
            .at_risk
            .iter()
            .find(|r| r.title == entry.title)
            .map(|r| format!("LATE by {}", format_hours(r.hours_late)))
            .unwrap_or_default();

        println!(
            "{:>3}  {:<28} {:>7}  {:<16}  {:<16}  {}",
            i + 1,
            entry.title,
            hours,
            short_time(&entry.start_time),
            short_time(&entry.end_time),
            note
        );
    }

    println!();
    println!("Reasoning:");
    println!("  {}", result.reasoning);
}
