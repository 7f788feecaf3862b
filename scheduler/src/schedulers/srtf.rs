use crate::common_funcs::{preempt_if_better, remaining_key, ReadyQueue};
use crate::error::Result;
use crate::{Dispatch, Pid, ProcessTable, Processor, Scheduler, Timestamp};

/// Shortest Remaining Time First, the preemptive flavour of SJF.
///
/// Every tick with new arrivals the queue is resorted by remaining burst and
/// the running process is preempted if the new head needs less time.
#[derive(Clone, Debug)]
pub struct Srtf {
    pool: Vec<Pid>,
    ready: ReadyQueue,
}

impl Srtf {
    pub fn new(pool: Vec<Pid>) -> Srtf {
        Srtf {
            pool,
            ready: ReadyQueue::new(),
        }
    }

    fn admit(&mut self, pids: Vec<Pid>, procs: &ProcessTable) -> Result<()> {
        self.ready.extend(pids)?;
        self.ready.sort_by_process(procs, remaining_key)
    }
}

impl Scheduler for Srtf {
    fn name(&self) -> String {
        String::from("Shortest Remaining Time First (SRTF)")
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
                preempt_if_better(&mut self.ready, cpu, procs, remaining_key)?;
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
