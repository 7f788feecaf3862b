use serde::Serialize;

use crate::{ExecutionFrame, Process, Timestamp};

/// Aggregates derived from a finished run. All of them are 0 for an empty
/// workload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Metrics {
    /// Busy share of the makespan, in `[0, 1]`
    pub cpu_utilization: f64,
    pub average_turnaround: f64,
    pub average_waiting: f64,
}

impl Metrics {
    fn compute(processes: &[Process], idle_time: usize, makespan: Timestamp) -> Metrics {
        if processes.is_empty() || makespan.get() == 0 {
            return Metrics::default();
        }

        let count = processes.len() as f64;
        let turnaround: usize = processes.iter().filter_map(Process::turnaround).sum();
        let waiting: usize = processes.iter().filter_map(Process::waiting).sum();
        let busy = makespan.get().saturating_sub(idle_time);

        Metrics {
            cpu_utilization: busy as f64 / makespan.get() as f64,
            average_turnaround: turnaround as f64 / count,
            average_waiting: waiting as f64 / count,
        }
    }
}

/// Outcome of a run: the processes with their final metrics and the trail.
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub policy: String,
    /// Layer names of a multilevel policy, top first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<String>,
    pub processes: Vec<Process>,
    pub trail: Vec<ExecutionFrame>,
    pub idle_time: usize,
    pub makespan: Timestamp,
    pub metrics: Metrics,
}

impl RunReport {
    pub fn new(
        policy: String,
        layers: Vec<String>,
        processes: Vec<Process>,
        trail: Vec<ExecutionFrame>,
        makespan: Timestamp,
    ) -> RunReport {
        let idle_time = trail
            .iter()
            .filter(|frame| frame.is_idle())
            .map(ExecutionFrame::span)
            .sum();
        let metrics = Metrics::compute(&processes, idle_time, makespan);

        RunReport {
            policy,
            layers,
            processes,
            trail,
            idle_time,
            makespan,
            metrics,
        }
    }

    /// Time the processor spent running processes
    pub fn busy_time(&self) -> usize {
        self.makespan.get().saturating_sub(self.idle_time)
    }
}
