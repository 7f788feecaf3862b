use std::collections::HashMap;

use log::trace;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::{Pid, Timestamp};

fn default_priority() -> u32 {
    1
}

/// One entry of the synthetic workload handed to the kernel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    pub id: Pid,
    #[serde(alias = "arrival_time")]
    pub arrival: Timestamp,
    #[serde(alias = "burst_time")]
    pub burst: usize,
    /// Lower number means higher precedence
    #[serde(default = "default_priority")]
    pub priority: u32,
    /// Static level used by the multilevel queue, 0 is the highest
    #[serde(default)]
    pub queue_level: usize,
}

impl Workload {
    pub fn new(id: usize, arrival: usize, burst: usize) -> Workload {
        Workload {
            id: Pid::new(id),
            arrival: Timestamp::new(arrival),
            burst,
            priority: default_priority(),
            queue_level: 0,
        }
    }

    pub fn with_priority(mut self, priority: u32) -> Workload {
        self.priority = priority;
        self
    }

    pub fn with_queue_level(mut self, queue_level: usize) -> Workload {
        self.queue_level = queue_level;
        self
    }
}

/// A simulated process: its workload plus the run state the processor
/// mutates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Process {
    pid: Pid,
    arrival: Timestamp,
    burst: usize,
    priority: u32,
    queue_level: usize,
    remaining: usize,
    completion: Option<Timestamp>,
    turnaround: Option<usize>,
    waiting: Option<usize>,
}

impl Process {
    pub fn new(workload: &Workload) -> Result<Process> {
        if workload.burst == 0 {
            return Err(SimError::ZeroBurst(workload.id));
        }

        if workload.priority == 0 {
            return Err(SimError::ZeroPriority(workload.id));
        }

        Ok(Process {
            pid: workload.id,
            arrival: workload.arrival,
            burst: workload.burst,
            priority: workload.priority,
            queue_level: workload.queue_level,
            remaining: workload.burst,
            completion: None,
            turnaround: None,
            waiting: None,
        })
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn arrival(&self) -> Timestamp {
        self.arrival
    }

    pub fn burst(&self) -> usize {
        self.burst
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn priority(&self) -> u32 {
        self.priority
    }

    pub fn queue_level(&self) -> usize {
        self.queue_level
    }

    pub fn completion(&self) -> Option<Timestamp> {
        self.completion
    }

    pub fn turnaround(&self) -> Option<usize> {
        self.turnaround
    }

    pub fn waiting(&self) -> Option<usize> {
        self.waiting
    }

    pub fn is_pending(&self) -> bool {
        self.completion.is_none()
    }

    pub fn is_completed(&self) -> bool {
        self.completion.is_some()
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining == 0
    }

    /// True until the process gets its first unit of CPU time
    pub fn is_fresh(&self) -> bool {
        self.remaining == self.burst
    }

    /// Consumes `units` of the remaining burst
    ///
    /// * `units` - time units executed, never more than what is left
    pub(crate) fn tick(&mut self, units: usize) -> Result<()> {
        if self.remaining < units || self.is_depleted() {
            return Err(SimError::TickDepleted(self.pid));
        }

        self.remaining -= units;
        trace!("{} ticked, {} left", self.pid, self.remaining);

        Ok(())
    }

    /// Stamps the completion time and derives turnaround and waiting time
    ///
    /// * `timestamp` - the time when the last unit of the burst finished
    pub(crate) fn mark_completed(&mut self, timestamp: Timestamp) -> Result<()> {
        if let Some(at) = self.completion {
            return Err(SimError::DoubleCompletion { pid: self.pid, at });
        }

        let turnaround = timestamp - self.arrival;

        self.completion = Some(timestamp);
        self.turnaround = Some(turnaround);
        self.waiting = Some(turnaround - self.burst);

        Ok(())
    }
}

/// The processes of one run, looked up by pid.
///
/// Ready queues only ever hold pids; the table is the single owner of the
/// process state.
#[derive(Clone, Debug, Default)]
pub struct ProcessTable {
    procs: Vec<Process>,
    index: HashMap<Pid, usize>,
}

impl ProcessTable {
    pub fn new(workload: &[Workload]) -> Result<ProcessTable> {
        let mut table = ProcessTable::default();

        for item in workload {
            if table.index.contains_key(&item.id) {
                return Err(SimError::DuplicatePid(item.id));
            }

            table.index.insert(item.id, table.procs.len());
            table.procs.push(Process::new(item)?);
        }

        Ok(table)
    }

    pub fn get(&self, pid: Pid) -> Result<&Process> {
        self.index
            .get(&pid)
            .map(|&i| &self.procs[i])
            .ok_or(SimError::UnknownProcess(pid))
    }

    pub(crate) fn get_mut(&mut self, pid: Pid) -> Result<&mut Process> {
        match self.index.get(&pid) {
            Some(&i) => Ok(&mut self.procs[i]),
            None => Err(SimError::UnknownProcess(pid)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Process> {
        self.procs.iter()
    }

    /// Pids in workload order
    pub fn pids(&self) -> Vec<Pid> {
        self.procs.iter().map(|p| p.pid).collect()
    }

    pub fn len(&self) -> usize {
        self.procs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.procs.is_empty()
    }

    pub fn all_completed(&self) -> bool {
        self.procs.iter().all(Process::is_completed)
    }

    pub fn total_burst(&self) -> usize {
        self.procs.iter().map(|p| p.burst).sum()
    }

    pub fn latest_arrival(&self) -> Timestamp {
        self.procs
            .iter()
            .map(|p| p.arrival)
            .max()
            .unwrap_or_default()
    }

    pub fn into_processes(self) -> Vec<Process> {
        self.procs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_derives_metrics() {
        let mut proc = Process::new(&Workload::new(1, 2, 3)).unwrap();

        proc.tick(1).unwrap();
        proc.tick(2).unwrap();
        assert!(proc.is_depleted());

        proc.mark_completed(Timestamp::new(9)).unwrap();
        assert_eq!(proc.turnaround(), Some(7));
        assert_eq!(proc.waiting(), Some(4));
        assert!(!proc.is_pending());
    }

    #[test]
    fn double_completion_is_rejected() {
        let mut proc = Process::new(&Workload::new(1, 0, 1)).unwrap();
        proc.tick(1).unwrap();
        proc.mark_completed(Timestamp::new(1)).unwrap();

        assert_eq!(
            proc.mark_completed(Timestamp::new(2)),
            Err(SimError::DoubleCompletion {
                pid: Pid::new(1),
                at: Timestamp::new(1)
            })
        );
    }

    #[test]
    fn ticking_a_depleted_process_fails() {
        let mut proc = Process::new(&Workload::new(4, 0, 1)).unwrap();
        proc.tick(1).unwrap();

        assert_eq!(proc.tick(1), Err(SimError::TickDepleted(Pid::new(4))));
        assert_eq!(proc.remaining(), 0);
    }

    #[test]
    fn table_rejects_bad_workloads() {
        let dup = [Workload::new(1, 0, 2), Workload::new(1, 3, 2)];
        assert_eq!(
            ProcessTable::new(&dup).unwrap_err(),
            SimError::DuplicatePid(Pid::new(1))
        );

        let zero = [Workload::new(2, 0, 0)];
        assert_eq!(
            ProcessTable::new(&zero).unwrap_err(),
            SimError::ZeroBurst(Pid::new(2))
        );

        let prio = [Workload::new(3, 0, 1).with_priority(0)];
        assert_eq!(
            ProcessTable::new(&prio).unwrap_err(),
            SimError::ZeroPriority(Pid::new(3))
        );
    }

    #[test]
    fn workload_defaults_from_json() {
        let item: Workload =
            serde_json::from_str(r#"{ "id": 7, "arrival_time": 1, "burst_time": 4 }"#).unwrap();

        assert_eq!(item, Workload::new(7, 1, 4));
        assert_eq!(item.priority, 1);
        assert_eq!(item.queue_level, 0);
    }
}
