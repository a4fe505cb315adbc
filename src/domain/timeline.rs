//! Timeline projection and reporting
//!
//! Walks a scheduled order on a single track: each task starts when the
//! previous one ends, beginning at `now`. The projected windows are then
//! checked against deadlines and the dependency structure to produce the
//! metrics and the written rationale.

use chrono::{DateTime, Duration, Utc};
use petgraph::graph::NodeIndex;
use serde::Serialize;

use super::graph::DependencyGraph;
use super::task::{format_timestamp, serialize_timestamp};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Projected execution window of one task
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub title: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub start_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub end_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub total_tasks: usize,
    pub total_estimated_hours: f64,
}

/// Longest dependency chain by cumulative duration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CriticalPath {
    pub titles: Vec<String>,
    pub hours: f64,
}

/// A task projected to finish after its due date
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AtRisk {
    pub title: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub end_time: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub due_date: DateTime<Utc>,
    pub hours_late: f64,
}

/// A task that many others wait for
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bottleneck {
    pub title: String,
    pub dependents: usize,
}

/// The earliest deadline in the request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestDeadline {
    pub title: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub due_date: DateTime<Utc>,
    /// Hours between `now` and the deadline (negative when already past)
    pub hours_available: f64,
}

/// Structured facts behind the written rationale
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub critical_path: CriticalPath,
    pub at_risk: Vec<AtRisk>,
    pub bottlenecks: Vec<Bottleneck>,
    pub nearest_deadline: Option<NearestDeadline>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub finish_time: DateTime<Utc>,
}

/// Complete answer to a scheduling request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleResult {
    pub recommended_order: Vec<String>,
    pub metrics: Metrics,
    pub reasoning: String,
    pub timeline: Vec<TimelineEntry>,
    pub analysis: Analysis,
}

/// Converts an hour estimate to a duration, rounded to the millisecond
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * MILLIS_PER_HOUR).round() as i64)
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Projects a scheduled order onto a single-track timeline starting at `now`
///
/// Titles in `order` must come from `graph`; unknown titles are skipped.
pub fn project(order: &[String], graph: &DependencyGraph, now: DateTime<Utc>) -> ScheduleResult {
    let mut cursor = now;
    let mut timeline = Vec::with_capacity(order.len());
    let mut total_hours = 0.0;

    for title in order {
        let Some(task) = graph.task(title) else {
            continue;
        };
        let start = cursor;
        let end = start
            .checked_add_signed(hours_to_duration(task.estimated_hours))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        total_hours += task.estimated_hours;
        timeline.push(TimelineEntry {
            title: title.clone(),
            start_time: start,
            end_time: end,
        });
        cursor = end;
    }

    let analysis = Analysis {
        critical_path: critical_path(order, graph),
        at_risk: at_risk(&timeline, graph),
        bottlenecks: bottlenecks(order, graph),
        nearest_deadline: nearest_deadline(graph, now),
        finish_time: cursor,
    };

    let metrics = Metrics {
        total_tasks: timeline.len(),
        total_estimated_hours: total_hours,
    };

    let reasoning = reasoning(&metrics, &analysis, now);

    ScheduleResult {
        recommended_order: timeline.iter().map(|e| e.title.clone()).collect(),
        metrics,
        reasoning,
        timeline,
        analysis,
    }
}

/// Finds the dependency chain with the largest cumulative duration
///
/// Ties go to the chain ending earliest in `order`, and within a chain to the
/// predecessor placed earliest.
pub fn critical_path(order: &[String], graph: &DependencyGraph) -> CriticalPath {
    let placed: Vec<NodeIndex> = order.iter().filter_map(|t| graph.index_of(t)).collect();

    let mut position = vec![usize::MAX; graph.len()];
    for (pos, idx) in placed.iter().enumerate() {
        position[idx.index()] = pos;
    }

    let mut finish = vec![0.0_f64; graph.len()];
    let mut previous: Vec<Option<NodeIndex>> = vec![None; graph.len()];

    for &idx in &placed {
        let mut deps: Vec<NodeIndex> = graph.dependencies_at(idx).collect();
        deps.sort_by_key(|d| position[d.index()]);

        let mut best: Option<NodeIndex> = None;
        for dep in deps {
            if best.map_or(true, |b| finish[dep.index()] > finish[b.index()]) {
                best = Some(dep);
            }
        }

        let base = best.map_or(0.0, |b| finish[b.index()]);
        finish[idx.index()] = base + graph.task_at(idx).estimated_hours;
        previous[idx.index()] = best;
    }

    let mut tail: Option<NodeIndex> = None;
    for &idx in &placed {
        if tail.map_or(true, |t| finish[idx.index()] > finish[t.index()]) {
            tail = Some(idx);
        }
    }

    let Some(end) = tail else {
        return CriticalPath::default();
    };

    let mut titles = Vec::new();
    let mut current = Some(end);
    while let Some(idx) = current {
        titles.push(graph.task_at(idx).title.clone());
        current = previous[idx.index()];
    }
    titles.reverse();

    CriticalPath {
        titles,
        hours: finish[end.index()],
    }
}

fn at_risk(timeline: &[TimelineEntry], graph: &DependencyGraph) -> Vec<AtRisk> {
    timeline
        .iter()
        .filter_map(|entry| {
            let due = graph.task(&entry.title)?.due_date?;
            (entry.end_time > due).then(|| AtRisk {
                title: entry.title.clone(),
                end_time: entry.end_time,
                due_date: due,
                hours_late: hours_between(due, entry.end_time),
            })
        })
        .collect()
}

fn bottlenecks(order: &[String], graph: &DependencyGraph) -> Vec<Bottleneck> {
    let counts: Vec<(&String, usize)> = order
        .iter()
        .map(|title| (title, graph.dependents(title).len()))
        .collect();

    let most = counts.iter().map(|(_, n)| *n).max().unwrap_or(0);
    if most == 0 {
        return vec![];
    }

    counts
        .into_iter()
        .filter(|(_, n)| *n == most)
        .map(|(title, dependents)| Bottleneck {
            title: title.clone(),
            dependents,
        })
        .collect()
}

fn nearest_deadline(graph: &DependencyGraph, now: DateTime<Utc>) -> Option<NearestDeadline> {
    let mut nearest: Option<(&str, DateTime<Utc>)> = None;
    for task in graph.tasks() {
        if let Some(due) = task.due_date {
            if nearest.map_or(true, |(_, best)| due < best) {
                nearest = Some((task.title.as_str(), due));
            }
        }
    }

    nearest.map(|(title, due)| NearestDeadline {
        title: title.to_string(),
        due_date: due,
        hours_available: hours_between(now, due),
    })
}

/// Formats hours compactly: `7h`, `2.5h`, `0.25h`
pub fn format_hours(hours: f64) -> String {
    let text = format!("{:.2}", hours);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{}h", text)
}

fn quoted(titles: &[String]) -> String {
    titles
        .iter()
        .map(|t| format!("'{}'", t))
        .collect::<Vec<_>>()
        .join(", ")
}

fn reasoning(metrics: &Metrics, analysis: &Analysis, now: DateTime<Utc>) -> String {
    if metrics.total_tasks == 0 {
        return "No tasks were submitted, so there is nothing to schedule.".to_string();
    }

    let mut lines = Vec::new();

    lines.push(format!(
        "{} task{} totalling {} run back to back from {} to {}.",
        metrics.total_tasks,
        if metrics.total_tasks == 1 { "" } else { "s" },
        format_hours(metrics.total_estimated_hours),
        format_timestamp(&now),
        format_timestamp(&analysis.finish_time),
    ));

    let path = &analysis.critical_path;
    lines.push(format!(
        "Critical path: {} ({}); no ordering can finish this chain sooner.",
        path.titles.join(" -> "),
        format_hours(path.hours),
    ));

    match analysis.bottlenecks.as_slice() {
        [] => {}
        [single] => lines.push(format!(
            "Bottleneck: '{}' blocks {} other task{}.",
            single.title,
            single.dependents,
            if single.dependents == 1 { "" } else { "s" },
        )),
        many => {
            let titles: Vec<String> = many.iter().map(|b| b.title.clone()).collect();
            lines.push(format!(
                "Bottlenecks: {} each block {} other task{}.",
                quoted(&titles),
                many[0].dependents,
                if many[0].dependents == 1 { "" } else { "s" },
            ));
        }
    }

    if analysis.at_risk.is_empty() {
        if analysis.nearest_deadline.is_some() {
            lines.push("Every deadline is met under this plan.".to_string());
        }
    } else {
        for risk in &analysis.at_risk {
            lines.push(format!(
                "At risk: '{}' ends {} but is due {} ({} late).",
                risk.title,
                format_timestamp(&risk.end_time),
                format_timestamp(&risk.due_date),
                format_hours(risk.hours_late),
            ));
        }
    }

    let total = format_hours(metrics.total_estimated_hours);
    match &analysis.nearest_deadline {
        None => lines.push(format!(
            "Total duration is {}; no task has a due date.",
            total
        )),
        Some(nearest) => {
            let slack = nearest.hours_available - metrics.total_estimated_hours;
            let verdict = if slack >= 0.0 {
                format!("leaving {} of slack", format_hours(slack))
            } else {
                format!("overrunning it by {}", format_hours(-slack))
            };
            lines.push(format!(
                "Total duration is {} against the nearest deadline '{}' in {} ({}), {}.",
                total,
                nearest.title,
                format_hours(nearest.hours_available),
                format_timestamp(&nearest.due_date),
                verdict,
            ));
        }
    }

    lines.join(" ")
}
