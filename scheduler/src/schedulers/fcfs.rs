use crate::common_funcs::{arrival_key, ReadyQueue};
use crate::error::Result;
use crate::{Dispatch, Pid, ProcessTable, Processor, Scheduler, Timestamp};

/// First Come First Serve: non-preemptive, ordered by arrival.
#[derive(Clone, Debug)]
pub struct Fcfs {
    pool: Vec<Pid>,
    ready: ReadyQueue,
}

impl Fcfs {
    /// Creates a FCFS policy
    ///
    /// * `pool` - the processes it admits by itself
    pub fn new(pool: Vec<Pid>) -> Fcfs {
        Fcfs {
            pool,
            ready: ReadyQueue::new(),
        }
    }

    fn admit(&mut self, pids: Vec<Pid>, procs: &ProcessTable) -> Result<()> {
        if pids.is_empty() {
            return Ok(());
        }

        self.ready.extend(pids)?;
        self.ready.sort_by_process(procs, arrival_key)
    }
}

impl Scheduler for Fcfs {
    fn name(&self) -> String {
        String::from("First Come First Serve (FCFS)")
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
