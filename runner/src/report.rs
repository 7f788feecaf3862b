use std::fmt::Write;

use scheduler::{FrameName, RunReport};

const TABLE_CELL: usize = 5;
const GANTT_CELL: usize = 4;

/// Which optional process columns the table shows
#[derive(Clone, Copy, Debug, Default)]
pub struct Columns {
    pub priority: bool,
    pub queue_level: bool,
}

fn row(cells: &[String], width: usize, sep: &str) -> String {
    let mut line = String::from(sep);
    for cell in cells {
        let _ = write!(line, "{:>width$}{}", cell, sep, width = width);
    }
    line
}

fn bar(count: usize, width: usize) -> String {
    format!("{}+", format!("+{}", "-".repeat(width)).repeat(count))
}

/// Renders the process table: pid, arrival, burst, the optional columns,
/// then completion, turnaround and waiting time
pub fn process_table(report: &RunReport, columns: Columns) -> String {
    let mut headers = vec!["PID", "AT", "BT"];
    if columns.priority {
        headers.push("Prio");
    }
    if columns.queue_level {
        headers.push("QL");
    }
    headers.extend(["CT", "TAT", "WT"]);

    let headers: Vec<String> = headers.into_iter().map(String::from).collect();
    let line = bar(headers.len(), TABLE_CELL);

    let mut table = String::new();
    let _ = writeln!(table, "{}", line);
    let _ = writeln!(table, "{}", row(&headers, TABLE_CELL, "|"));
    let _ = writeln!(table, "{}", line);

    for proc in &report.processes {
        let mut cells = vec![
            proc.pid().to_string(),
            proc.arrival().to_string(),
            proc.burst().to_string(),
        ];
        if columns.priority {
            cells.push(proc.priority().to_string());
        }
        if columns.queue_level {
            cells.push(proc.queue_level().to_string());
        }

        let dash = || String::from("-");
        cells.push(proc.completion().map_or_else(dash, |ct| ct.to_string()));
        cells.push(proc.turnaround().map_or_else(dash, |tat| tat.to_string()));
        cells.push(proc.waiting().map_or_else(dash, |wt| wt.to_string()));

        let _ = writeln!(table, "{}", row(&cells, TABLE_CELL, "|"));
    }

    let _ = write!(table, "{}", line);
    table
}

/// Renders the trail as a one-line chart with the frame end times below it.
/// Frames of a multilevel policy are suffixed with their layer.
pub fn gantt(report: &RunReport) -> String {
    let labels: Vec<String> = report
        .trail
        .iter()
        .map(|frame| match (frame.name, frame.layer) {
            (FrameName::Process(pid), Some(layer)) => format!("{}:{}", pid, layer),
            (name, _) => name.to_string(),
        })
        .collect();
    let ends: Vec<String> = report.trail.iter().map(|frame| frame.end.to_string()).collect();

    let width = labels
        .iter()
        .map(String::len)
        .max()
        .map_or(GANTT_CELL, |len| len.max(GANTT_CELL));
    let line = bar(labels.len(), width);

    let start = report
        .trail
        .first()
        .map_or_else(|| String::from("0"), |frame| frame.start.to_string());

    format!(
        "{}\n{}\n{}\n{}{}",
        line,
        row(&labels, width, "|"),
        line,
        start,
        row(&ends, width, " ")
    )
}

/// Renders CPU utilization and the average times
pub fn metrics(report: &RunReport) -> String {
    format!(
        "CPU Utilization: {:.2}%\nAverage TAT: {:.2}\nAverage WT: {:.2}",
        report.metrics.cpu_utilization * 100.0,
        report.metrics.average_turnaround,
        report.metrics.average_waiting
    )
}

/// The whole text report
pub fn format_report(report: &RunReport, columns: Columns) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "===== {} =====", report.policy);
    for (level, name) in report.layers.iter().enumerate() {
        let _ = writeln!(out, "Layer {}: {}", level, name);
    }

    let _ = writeln!(out, "\n# PROCESS TABLE");
    let _ = writeln!(out, "{}", process_table(report, columns));
    let _ = writeln!(out, "\n# GANTT CHART - TIMELINE");
    let _ = writeln!(out, "{}", gantt(report));
    let _ = writeln!(out, "\n# METRICS");
    let _ = write!(out, "{}", metrics(report));

    out
}
