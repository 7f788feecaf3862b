use std::collections::HashMap;
use std::num::NonZeroUsize;

use log::debug;

use crate::common_funcs::sort_by_arrival;
use crate::config::AtomicKind;
use crate::error::{Result, SimError};
use crate::schedulers::{AtomicPolicy, RoundRobin};
use crate::{Dispatch, Pid, ProcessTable, Processor, Scheduler, Timestamp};

/// Multilevel Feedback Queue: a cascade of round robin levels ending in one
/// non-preemptive policy.
///
/// New arrivals enter level 0. A process whose quanta expires before it is
/// done drops exactly one level; after the last round robin level it stays in
/// the terminal queue. Processes never move back up.
#[derive(Clone, Debug)]
pub struct Mlfq {
    levels: Vec<RoundRobin>,
    terminal: AtomicPolicy,
    pool: Vec<Pid>,
    /// Level every admitted process is currently assigned to
    assigned: HashMap<Pid, usize>,
    active: Option<usize>,
    ticking: Option<usize>,
}

impl Mlfq {
    /// Creates the feedback queue
    ///
    /// * `quanta` - the quanta of every round robin level, level 0 first
    /// * `terminal` - FCFS, SJF or Priority-NP
    /// * `procs` - the process table
    pub fn new(quanta: &[usize], terminal: AtomicKind, procs: &ProcessTable) -> Result<Mlfq> {
        if quanta.is_empty() {
            return Err(SimError::NoLayers);
        }

        if !terminal.is_terminal() {
            return Err(SimError::InvalidTerminal(terminal.to_string()));
        }

        let levels = quanta
            .iter()
            .map(|&q| {
                NonZeroUsize::new(q)
                    .map(|q| RoundRobin::new(q, Vec::new()))
                    .ok_or(SimError::MissingQuantum)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Mlfq {
            levels,
            terminal: terminal.build(Vec::new(), None)?,
            pool: procs.pids(),
            assigned: HashMap::new(),
            active: None,
            ticking: None,
        })
    }

    /// The level a process was last assigned to, the terminal level being
    /// the number of round robin levels
    pub fn level_of(&self, pid: Pid) -> Option<usize> {
        self.assigned.get(&pid).copied()
    }

    pub fn layer_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.levels.iter().map(|rr| rr.name()).collect();
        names.push(self.terminal.name());
        names
    }

    fn layer_count(&self) -> usize {
        self.levels.len() + 1
    }

    fn layer(&self, level: usize) -> &dyn Scheduler {
        if level < self.levels.len() {
            return &self.levels[level];
        }

        &self.terminal
    }

    fn layer_mut(&mut self, level: usize) -> &mut dyn Scheduler {
        if level < self.levels.len() {
            return &mut self.levels[level];
        }

        &mut self.terminal
    }

    fn demote(&mut self, pid: Pid, from: usize, procs: &ProcessTable) -> Result<()> {
        let to = (from + 1).min(self.levels.len());

        self.assigned.insert(pid, to);
        debug!("demote {} from level {} to {}", pid, from, to);

        self.layer_mut(to).enqueue(pid, procs)
    }

    fn admit(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.assigned.insert(pid, 0);
        self.levels[0].enqueue(pid, procs)
    }
}

impl Scheduler for Mlfq {
    fn name(&self) -> String {
        String::from("Multilevel Feedback Queue (MLFQ)")
    }

    fn pool(&self) -> &[Pid] {
        &self.pool
    }

    fn is_queued(&self, pid: Pid) -> bool {
        self.levels.iter().any(|rr| rr.is_queued(pid)) || self.terminal.is_queued(pid)
    }

    fn ready_queue(&self) -> &[Pid] {
        match self.active {
            Some(level) => self.layer(level).ready_queue(),
            None => &[],
        }
    }

    fn run(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
        _allow_preempt: bool,
    ) -> Result<&[Pid]> {
        for level in 0..self.levels.len() {
            if let Some(pid) = self.levels[level].take_preempted() {
                self.demote(pid, level, procs)?;
            }
        }

        let pending = self.pending_set(cpu, procs)?;
        let mut arrived = self.arrived(pending, procs, timestamp)?;
        arrived.retain(|pid| !self.assigned.contains_key(pid));
        sort_by_arrival(&mut arrived, procs)?;

        for pid in arrived {
            self.admit(pid, procs)?;
        }

        self.active = if cpu.is_idle() {
            (0..self.layer_count()).find(|&level| !self.layer(level).ready_queue().is_empty())
        } else {
            None
        };

        Ok(self.ready_queue())
    }

    fn take_head(&mut self) -> Option<Dispatch> {
        let level = self.active.take()?;

        self.layer_mut(level)
            .take_head()
            .map(|dispatch| Dispatch::new(dispatch.pid, Some(level)))
    }

    fn enqueue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.admit(pid, procs)
    }

    fn requeue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        let level = self.level_of(pid).unwrap_or(0);
        self.layer_mut(level).requeue(pid, procs)
    }

    fn on_load(&mut self, dispatch: Dispatch) {
        if let Some(level) = dispatch.layer {
            self.ticking = Some(level);
            self.layer_mut(level).on_load(dispatch);
        }
    }

    fn on_tick(&mut self, cpu: &mut Processor, procs: &ProcessTable) -> Result<()> {
        if let Some(level) = self.ticking {
            self.layer_mut(level).on_tick(cpu, procs)?;

            if cpu.is_idle() {
                self.ticking = None;
            }
        }

        Ok(())
    }

    fn on_clear(&mut self, dispatch: Dispatch) {
        if let Some(level) = dispatch.layer {
            self.layer_mut(level).on_clear(dispatch);
        }

        self.ticking = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Workload;

    #[test]
    fn terminal_must_be_non_preemptive() {
        let procs = ProcessTable::new(&[Workload::new(1, 0, 3)]).unwrap();

        assert_eq!(
            Mlfq::new(&[2], AtomicKind::Srtf, &procs).unwrap_err(),
            SimError::InvalidTerminal(String::from("SRTF"))
        );
        assert_eq!(
            Mlfq::new(&[], AtomicKind::Fcfs, &procs).unwrap_err(),
            SimError::NoLayers
        );
        assert_eq!(
            Mlfq::new(&[2, 0], AtomicKind::Fcfs, &procs).unwrap_err(),
            SimError::MissingQuantum
        );
    }

    #[test]
    fn arrivals_enter_level_zero() {
        let procs = ProcessTable::new(&[Workload::new(2, 0, 3), Workload::new(1, 0, 3)]).unwrap();
        let mut cpu = Processor::new();
        let mut mlfq = Mlfq::new(&[2, 4], AtomicKind::Fcfs, &procs).unwrap();

        let queue = mlfq.run(&mut cpu, &procs, Timestamp::new(0), true).unwrap();
        assert_eq!(queue, &[Pid::new(1), Pid::new(2)]);
        assert_eq!(mlfq.level_of(Pid::new(2)), Some(0));
        assert_eq!(
            mlfq.layer_names(),
            vec![
                String::from("Round Robin (RR) | q=2"),
                String::from("Round Robin (RR) | q=4"),
                String::from("First Come First Serve (FCFS)"),
            ]
        );
    }
}
