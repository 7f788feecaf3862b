use log::debug;

use crate::error::{Result, SimError};
use crate::{Pid, Process, ProcessTable, Processor, Timestamp};

/// FCFS order
pub fn arrival_key(p: &Process) -> (Timestamp, Pid) {
    (p.arrival(), p.pid())
}

/// SJF order
pub fn burst_key(p: &Process) -> (usize, Timestamp, Pid) {
    (p.burst(), p.arrival(), p.pid())
}

/// SRTF order
pub fn remaining_key(p: &Process) -> (usize, Timestamp, Pid) {
    (p.remaining(), p.arrival(), p.pid())
}

/// Priority-NP order
pub fn priority_burst_key(p: &Process) -> (u32, usize, Timestamp, Pid) {
    (p.priority(), p.burst(), p.arrival(), p.pid())
}

/// Priority-P order
pub fn priority_remaining_key(p: &Process) -> (u32, usize, Timestamp, Pid) {
    (p.priority(), p.remaining(), p.arrival(), p.pid())
}

/// Ordered list of pids waiting for the processor. A pid can appear at most
/// once.
#[derive(Clone, Debug, Default)]
pub struct ReadyQueue {
    queue: Vec<Pid>,
}

impl ReadyQueue {
    pub fn new() -> ReadyQueue {
        ReadyQueue { queue: Vec::new() }
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.queue.contains(&pid)
    }

    pub fn push_back(&mut self, pid: Pid) -> Result<()> {
        if self.contains(pid) {
            return Err(SimError::AlreadyQueued(pid));
        }

        self.queue.push(pid);
        Ok(())
    }

    pub fn push_front(&mut self, pid: Pid) -> Result<()> {
        if self.contains(pid) {
            return Err(SimError::AlreadyQueued(pid));
        }

        self.queue.insert(0, pid);
        Ok(())
    }

    pub fn extend(&mut self, pids: impl IntoIterator<Item = Pid>) -> Result<()> {
        for pid in pids {
            self.push_back(pid)?;
        }

        Ok(())
    }

    pub fn pop_front(&mut self) -> Option<Pid> {
        return if self.queue.is_empty() {
            None
        } else {
            Some(self.queue.remove(0))
        };
    }

    pub fn head(&self) -> Option<Pid> {
        self.queue.first().copied()
    }

    pub fn as_slice(&self) -> &[Pid] {
        &self.queue
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Sorts the queue by a key computed from the process table
    ///
    /// * `procs` - table used to look the pids up
    /// * `key` - sort key, expected to end with the pid so the order is total
    pub fn sort_by_process<K, F>(&mut self, procs: &ProcessTable, key: F) -> Result<()>
    where
        K: Ord,
        F: Fn(&Process) -> K,
    {
        let mut keyed = self
            .queue
            .iter()
            .map(|&pid| Ok((key(procs.get(pid)?), pid)))
            .collect::<Result<Vec<_>>>()?;

        keyed.sort_by(|a, b| a.0.cmp(&b.0));
        self.queue = keyed.into_iter().map(|(_, pid)| pid).collect();

        Ok(())
    }
}

/// Pool processes that still need the processor and that nobody holds yet
///
/// * `pool` - the processes the policy is responsible for
/// * `cpu` - the processor, its running process is excluded
/// * `procs` - the process table
/// * `is_queued` - tells whether the policy already holds a pid
pub fn pending_set<F>(pool: &[Pid], cpu: &Processor, procs: &ProcessTable, is_queued: F) -> Result<Vec<Pid>>
where
    F: Fn(Pid) -> bool,
{
    let running = cpu.running();
    let mut pending = Vec::new();

    for &pid in pool {
        if procs.get(pid)?.is_completed() || is_queued(pid) || running == Some(pid) {
            continue;
        }

        pending.push(pid);
    }

    Ok(pending)
}

/// Keeps the pending processes whose arrival time has been reached
pub fn arrived(pending: Vec<Pid>, procs: &ProcessTable, timestamp: Timestamp) -> Result<Vec<Pid>> {
    let mut arrived = Vec::with_capacity(pending.len());

    for pid in pending {
        if procs.get(pid)?.arrival() <= timestamp {
            arrived.push(pid);
        }
    }

    Ok(arrived)
}

/// Orders pids the way round robin admits them: by arrival, then pid
pub fn sort_by_arrival(pids: &mut Vec<Pid>, procs: &ProcessTable) -> Result<()> {
    let mut keyed = pids
        .iter()
        .map(|&pid| Ok((arrival_key(procs.get(pid)?), pid)))
        .collect::<Result<Vec<_>>>()?;

    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    *pids = keyed.into_iter().map(|(_, pid)| pid).collect();

    Ok(())
}

/// Clears the processor when the head of `ready` beats the running process
/// under `key`; the preempted process goes back into `ready`.
///
/// Returns the pid that was preempted, if any.
pub fn preempt_if_better<K, F>(
    ready: &mut ReadyQueue,
    cpu: &mut Processor,
    procs: &ProcessTable,
    key: F,
) -> Result<Option<Pid>>
where
    K: Ord,
    F: Fn(&Process) -> K,
{
    let (Some(running), Some(head)) = (cpu.running(), ready.head()) else {
        return Ok(None);
    };

    let current = procs.get(running)?;
    if current.is_depleted() || key(procs.get(head)?) >= key(current) {
        return Ok(None);
    }

    cpu.clear()?;
    ready.push_back(running)?;
    ready.sort_by_process(procs, key)?;
    debug!("{} preempts {}", head, running);

    Ok(Some(running))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Dispatch, Workload};

    fn table() -> ProcessTable {
        ProcessTable::new(&[
            Workload::new(1, 0, 5),
            Workload::new(2, 3, 2),
            Workload::new(3, 1, 2),
        ])
        .unwrap()
    }

    #[test]
    fn queue_rejects_duplicates() {
        let mut ready = ReadyQueue::new();
        ready.push_back(Pid::new(1)).unwrap();

        assert_eq!(ready.push_back(Pid::new(1)), Err(SimError::AlreadyQueued(Pid::new(1))));
        assert_eq!(ready.push_front(Pid::new(1)), Err(SimError::AlreadyQueued(Pid::new(1))));
        assert_eq!(ready.len(), 1);
    }

    #[test]
    fn sort_breaks_ties_on_pid() {
        let procs = table();
        let mut ready = ReadyQueue::new();
        ready.extend([Pid::new(3), Pid::new(2), Pid::new(1)]).unwrap();

        ready.sort_by_process(&procs, burst_key).unwrap();
        assert_eq!(ready.as_slice(), &[Pid::new(3), Pid::new(2), Pid::new(1)]);

        ready.sort_by_process(&procs, arrival_key).unwrap();
        assert_eq!(ready.as_slice(), &[Pid::new(1), Pid::new(3), Pid::new(2)]);
    }

    #[test]
    fn pending_excludes_running_and_queued() {
        let procs = table();
        let mut cpu = Processor::new();
        cpu.load(Dispatch::new(Pid::new(1), None)).unwrap();

        let pool = procs.pids();
        let pending = pending_set(&pool, &cpu, &procs, |pid| pid == Pid::new(3)).unwrap();
        assert_eq!(pending, vec![Pid::new(2)]);

        let none = arrived(pending, &procs, Timestamp::new(2)).unwrap();
        assert!(none.is_empty());
    }

    #[test]
    fn preemption_needs_a_strictly_better_head() {
        let procs = table();
        let mut cpu = Processor::new();
        cpu.load(Dispatch::new(Pid::new(1), None)).unwrap();

        let mut ready = ReadyQueue::new();
        ready.push_back(Pid::new(3)).unwrap();

        let preempted = preempt_if_better(&mut ready, &mut cpu, &procs, remaining_key).unwrap();
        assert_eq!(preempted, Some(Pid::new(1)));
        assert!(cpu.is_idle());
        assert_eq!(ready.as_slice(), &[Pid::new(3), Pid::new(1)]);

        let mut cpu = Processor::new();
        cpu.load(Dispatch::new(Pid::new(3), None)).unwrap();
        let mut ready = ReadyQueue::new();
        ready.push_back(Pid::new(1)).unwrap();

        let preempted = preempt_if_better(&mut ready, &mut cpu, &procs, remaining_key).unwrap();
        assert_eq!(preempted, None);
        assert_eq!(cpu.running(), Some(Pid::new(3)));
    }
}
