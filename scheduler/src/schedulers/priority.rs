use crate::common_funcs::{preempt_if_better, priority_burst_key, priority_remaining_key, ReadyQueue};
use crate::error::Result;
use crate::{Dispatch, Pid, ProcessTable, Processor, Scheduler, Timestamp};

/// Non-preemptive priority scheduling. Lower priority numbers go first, ties
/// fall back to the shorter burst.
#[derive(Clone, Debug)]
pub struct PriorityNp {
    pool: Vec<Pid>,
    ready: ReadyQueue,
}

impl PriorityNp {
    pub fn new(pool: Vec<Pid>) -> PriorityNp {
        PriorityNp {
            pool,
            ready: ReadyQueue::new(),
        }
    }

    fn admit(&mut self, pids: Vec<Pid>, procs: &ProcessTable) -> Result<()> {
        if pids.is_empty() {
            return Ok(());
        }

        self.ready.extend(pids)?;
        self.ready.sort_by_process(procs, priority_burst_key)
    }
}

impl Scheduler for PriorityNp {
    fn name(&self) -> String {
        String::from("Priority Non-Preemptive (Prio-NP)")
    }

    fn pool(&self) -> &[Pid] {
        &self.pool
    }

    fn is_queued(&self, pid: Pid) -> bool {
        self.ready.contains(pid)
    }

    fn ready_queue(&self) -> &[Pid] {
        self.ready.as_slice()
    }

    fn run(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
        _allow_preempt: bool,
    ) -> Result<&[Pid]> {
        if cpu.is_idle() {
            let pending = self.pending_set(cpu, procs)?;
            let arrived = self.arrived(pending, procs, timestamp)?;
            self.admit(arrived, procs)?;
        }

        Ok(self.ready.as_slice())
    }

    fn take_head(&mut self) -> Option<Dispatch> {
        self.ready.pop_front().map(|pid| Dispatch::new(pid, None))
    }

    fn enqueue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.admit(vec![pid], procs)
    }
}

/// Preemptive priority scheduling. An arrival with a lower priority number
/// (or equal priority and less remaining time) takes the processor.
#[derive(Clone, Debug)]
pub struct PriorityP {
    pool: Vec<Pid>,
    ready: ReadyQueue,
}

impl PriorityP {
    pub fn new(pool: Vec<Pid>) -> PriorityP {
        PriorityP {
            pool,
            ready: ReadyQueue::new(),
        }
    }

    fn admit(&mut self, pids: Vec<Pid>, procs: &ProcessTable) -> Result<()> {
        self.ready.extend(pids)?;
        self.ready.sort_by_process(procs, priority_remaining_key)
    }
}

impl Scheduler for PriorityP {
    fn name(&self) -> String {
        String::from("Priority Preemptive (Prio-P)")
    }

    fn pool(&self) -> &[Pid] {
        &self.pool
    }

    fn is_queued(&self, pid: Pid) -> bool {
        self.ready.contains(pid)
    }

    fn ready_queue(&self) -> &[Pid] {
        self.ready.as_slice()
    }

    fn run(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
        allow_preempt: bool,
    ) -> Result<&[Pid]> {
        let pending = self.pending_set(cpu, procs)?;
        let arrived = self.arrived(pending, procs, timestamp)?;

        if !arrived.is_empty() {
            self.admit(arrived, procs)?;

            if allow_preempt {
                preempt_if_better(&mut self.ready, cpu, procs, priority_remaining_key)?;
            }
        }

        Ok(self.ready.as_slice())
    }

    fn take_head(&mut self) -> Option<Dispatch> {
        self.ready.pop_front().map(|pid| Dispatch::new(pid, None))
    }

    fn enqueue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.admit(vec![pid], procs)
    }
}
