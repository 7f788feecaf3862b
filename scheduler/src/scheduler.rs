use crate::common_funcs;
use crate::error::Result;
use crate::{Dispatch, Pid, ProcessTable, Processor, Timestamp};

/// The contract every scheduling policy implements, atomic or multilevel.
///
/// A policy owns its ready queue and decides dispatch order. The kernel calls
/// [`Scheduler::run`] once per tick and loads the head of the returned queue
/// through [`Scheduler::take_head`] when the processor is idle.
pub trait Scheduler {
    /// Human readable policy name, used in reports
    fn name(&self) -> String;

    /// Processes this policy admits on its own
    ///
    /// Layers fed by a multilevel feedback queue have an empty pool.
    fn pool(&self) -> &[Pid];

    /// Returns true if `pid` is held by this policy: queued, or parked waiting
    /// to be requeued
    fn is_queued(&self, pid: Pid) -> bool;

    /// The current ready queue, head first
    fn ready_queue(&self) -> &[Pid];

    /// Pool processes that are not completed, not held by this policy and not
    /// on the processor
    fn pending_set(&self, cpu: &Processor, procs: &ProcessTable) -> Result<Vec<Pid>> {
        common_funcs::pending_set(self.pool(), cpu, procs, |pid| self.is_queued(pid))
    }

    /// Narrows `pending` to the processes that arrived by `timestamp`
    fn arrived(&self, pending: Vec<Pid>, procs: &ProcessTable, timestamp: Timestamp) -> Result<Vec<Pid>> {
        common_funcs::arrived(pending, procs, timestamp)
    }

    /// Reconsiders the ready queue at `timestamp` and returns it
    ///
    /// * `cpu` - the processor, preemptive policies may clear it
    /// * `procs` - the process table
    /// * `timestamp` - the current simulated time
    /// * `allow_preempt` - false when the running process belongs to someone
    ///                     else and must not be touched
    fn run(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
        allow_preempt: bool,
    ) -> Result<&[Pid]>;

    /// Removes the head of the queue exposed by the last `run`
    fn take_head(&mut self) -> Option<Dispatch>;

    /// Admits `pid` directly, bypassing the pool
    fn enqueue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()>;

    /// Takes back a process that was preempted by a higher layer
    fn requeue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.enqueue(pid, procs)
    }

    /// A process of this policy was put on the processor
    fn on_load(&mut self, _dispatch: Dispatch) {}

    /// The loaded process consumed one unit
    fn on_tick(&mut self, _cpu: &mut Processor, _procs: &ProcessTable) -> Result<()> {
        Ok(())
    }

    /// A process of this policy was taken off the processor
    fn on_clear(&mut self, _dispatch: Dispatch) {}
}
