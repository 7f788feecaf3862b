use crate::error::Result;
use crate::schedulers::{Fcfs, Mlfq, Mlq, PriorityNp, PriorityP, RoundRobin, Sjf, Srtf};
use crate::{Dispatch, Pid, ProcessTable, Processor, Scheduler, Timestamp};

/// One of the single-queue policies. These are the building blocks of the
/// multilevel policies.
#[derive(Clone, Debug)]
pub enum AtomicPolicy {
    Fcfs(Fcfs),
    Sjf(Sjf),
    Srtf(Srtf),
    PriorityNp(PriorityNp),
    PriorityP(PriorityP),
    RoundRobin(RoundRobin),
}

impl AtomicPolicy {
    fn as_scheduler(&self) -> &dyn Scheduler {
        match self {
            AtomicPolicy::Fcfs(s) => s,
            AtomicPolicy::Sjf(s) => s,
            AtomicPolicy::Srtf(s) => s,
            AtomicPolicy::PriorityNp(s) => s,
            AtomicPolicy::PriorityP(s) => s,
            AtomicPolicy::RoundRobin(s) => s,
        }
    }

    fn as_scheduler_mut(&mut self) -> &mut dyn Scheduler {
        match self {
            AtomicPolicy::Fcfs(s) => s,
            AtomicPolicy::Sjf(s) => s,
            AtomicPolicy::Srtf(s) => s,
            AtomicPolicy::PriorityNp(s) => s,
            AtomicPolicy::PriorityP(s) => s,
            AtomicPolicy::RoundRobin(s) => s,
        }
    }

    pub fn is_preemptive(&self) -> bool {
        matches!(
            self,
            AtomicPolicy::Srtf(_) | AtomicPolicy::PriorityP(_) | AtomicPolicy::RoundRobin(_)
        )
    }

    /// Process parked by an expired quanta, only round robin parks processes
    pub fn take_preempted(&mut self) -> Option<Pid> {
        match self {
            AtomicPolicy::RoundRobin(rr) => rr.take_preempted(),
            _ => None,
        }
    }
}

impl Scheduler for AtomicPolicy {
    fn name(&self) -> String {
        self.as_scheduler().name()
    }

    fn pool(&self) -> &[Pid] {
        self.as_scheduler().pool()
    }

    fn is_queued(&self, pid: Pid) -> bool {
        self.as_scheduler().is_queued(pid)
    }

    fn ready_queue(&self) -> &[Pid] {
        self.as_scheduler().ready_queue()
    }

    fn run(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
        allow_preempt: bool,
    ) -> Result<&[Pid]> {
        self.as_scheduler_mut().run(cpu, procs, timestamp, allow_preempt)
    }

    fn take_head(&mut self) -> Option<Dispatch> {
        self.as_scheduler_mut().take_head()
    }

    fn enqueue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.as_scheduler_mut().enqueue(pid, procs)
    }

    fn requeue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.as_scheduler_mut().requeue(pid, procs)
    }

    fn on_load(&mut self, dispatch: Dispatch) {
        self.as_scheduler_mut().on_load(dispatch)
    }

    fn on_tick(&mut self, cpu: &mut Processor, procs: &ProcessTable) -> Result<()> {
        self.as_scheduler_mut().on_tick(cpu, procs)
    }

    fn on_clear(&mut self, dispatch: Dispatch) {
        self.as_scheduler_mut().on_clear(dispatch)
    }
}

/// The policy driving a whole run.
#[derive(Clone, Debug)]
pub enum Policy {
    Atomic(AtomicPolicy),
    Mlq(Mlq),
    Mlfq(Mlfq),
}

impl Policy {
    fn as_scheduler(&self) -> &dyn Scheduler {
        match self {
            Policy::Atomic(s) => s,
            Policy::Mlq(s) => s,
            Policy::Mlfq(s) => s,
        }
    }

    fn as_scheduler_mut(&mut self) -> &mut dyn Scheduler {
        match self {
            Policy::Atomic(s) => s,
            Policy::Mlq(s) => s,
            Policy::Mlfq(s) => s,
        }
    }

    pub fn is_multilevel(&self) -> bool {
        !matches!(self, Policy::Atomic(_))
    }

    /// Names of the layers, top first; empty for a single-queue policy
    pub fn layer_names(&self) -> Vec<String> {
        match self {
            Policy::Atomic(_) => Vec::new(),
            Policy::Mlq(mlq) => mlq.layer_names(),
            Policy::Mlfq(mlfq) => mlfq.layer_names(),
        }
    }
}

impl Scheduler for Policy {
    fn name(&self) -> String {
        self.as_scheduler().name()
    }

    fn pool(&self) -> &[Pid] {
        self.as_scheduler().pool()
    }

    fn is_queued(&self, pid: Pid) -> bool {
        self.as_scheduler().is_queued(pid)
    }

    fn ready_queue(&self) -> &[Pid] {
        self.as_scheduler().ready_queue()
    }

    fn run(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
        allow_preempt: bool,
    ) -> Result<&[Pid]> {
        self.as_scheduler_mut().run(cpu, procs, timestamp, allow_preempt)
    }

    fn take_head(&mut self) -> Option<Dispatch> {
        self.as_scheduler_mut().take_head()
    }

    fn enqueue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.as_scheduler_mut().enqueue(pid, procs)
    }

    fn requeue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        self.as_scheduler_mut().requeue(pid, procs)
    }

    fn on_load(&mut self, dispatch: Dispatch) {
        self.as_scheduler_mut().on_load(dispatch)
    }

    fn on_tick(&mut self, cpu: &mut Processor, procs: &ProcessTable) -> Result<()> {
        self.as_scheduler_mut().on_tick(cpu, procs)
    }

    fn on_clear(&mut self, dispatch: Dispatch) {
        self.as_scheduler_mut().on_clear(dispatch)
    }
}
