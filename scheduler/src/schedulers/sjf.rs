use crate::common_funcs::{burst_key, ReadyQueue};
use crate::error::Result;
use crate::{Dispatch, Pid, ProcessTable, Processor, Scheduler, Timestamp};

/// Shortest Job First: non-preemptive, ordered by total burst.
#[derive(Clone, Debug)]
pub struct Sjf {
    pool: Vec<Pid>,
    ready: ReadyQueue,
}

impl Sjf {
    pub fn new(pool: Vec<Pid>) -> Sjf {
        Sjf {
            pool,
            ready: ReadyQueue::new(),
        }
    }

    fn admit(&mut self, pids: Vec<Pid>, procs: &ProcessTable) -> Result<()> {
        if pids.is_empty() {
            return Ok(());
        }

        self.ready.extend(pids)?;
        self.ready.sort_by_process(procs, burst_key)
    }
}

impl Scheduler for Sjf {
    fn name(&self) -> String {
        String::from("Shortest Job First (SJF)")
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
