use log::{debug, info};

use crate::error::{Result, SimError};
use crate::{
    ExecutionTrail, FrameName, Policy, PolicyConfig, ProcessTable, Processor, ProcessorEvent, RunReport,
    Scheduler, Timestamp, Workload,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelState {
    NotStarted,
    Running,
    Finished,
}

/// Drives one simulation: owns the clock, the processor, the active policy,
/// the process table and the execution trail.
///
/// Every loop iteration is one time unit. The unit that ends at `now` is
/// executed first, then the policy reconsiders its queue at `now`, then an
/// idle processor is handed the head of that queue.
#[derive(Debug)]
pub struct Kernel {
    state: KernelState,
    clock: Option<Timestamp>,
    processor: Processor,
    policy: Policy,
    procs: ProcessTable,
    trail: ExecutionTrail,
}

impl Kernel {
    /// Validates the workload and builds the policy, nothing runs yet
    ///
    /// * `workload` - the processes of the run
    /// * `config` - the policy selector
    pub fn new(workload: &[Workload], config: &PolicyConfig) -> Result<Kernel> {
        let procs = ProcessTable::new(workload)?;
        let policy = config.build(&procs)?;

        Ok(Kernel::with_policy(procs, policy))
    }

    /// Runs an already built policy over `procs`
    pub fn with_policy(procs: ProcessTable, policy: Policy) -> Kernel {
        Kernel {
            state: KernelState::NotStarted,
            clock: None,
            processor: Processor::new(),
            policy,
            procs,
            trail: ExecutionTrail::new(Timestamp::default()),
        }
    }

    pub fn state(&self) -> KernelState {
        self.state
    }

    /// The last simulated timestamp, 0 before the first tick
    pub fn clock(&self) -> Timestamp {
        self.clock.unwrap_or_default()
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn processes(&self) -> &ProcessTable {
        &self.procs
    }

    pub fn trail(&self) -> &ExecutionTrail {
        &self.trail
    }

    /// Runs the simulation until every process is completed
    ///
    /// A kernel runs once; any later call fails with
    /// [`SimError::AlreadyFinished`], including after a failed run.
    pub fn run(&mut self) -> Result<RunReport> {
        if self.state != KernelState::NotStarted {
            return Err(SimError::AlreadyFinished);
        }

        self.state = KernelState::Running;
        info!(
            "running {} processes under {}",
            self.procs.len(),
            self.policy.name()
        );

        /* Nothing can run past the last arrival followed by every burst back to back */
        let deadline = self.procs.latest_arrival() + self.procs.total_burst();

        while !self.procs.all_completed() {
            let now = self.tick_clock();
            if now > deadline {
                return Err(SimError::Stalled(now));
            }

            self.step(now)?;
        }

        self.state = KernelState::Finished;
        let report = self.report();
        info!(
            "finished at {}, idle for {} units",
            report.makespan, report.idle_time
        );

        Ok(report)
    }

    /// Snapshot of the processes and the trail at the current clock
    pub fn report(&self) -> RunReport {
        RunReport::new(
            self.policy.name(),
            self.policy.layer_names(),
            self.procs.iter().cloned().collect(),
            self.trail.frames().to_vec(),
            self.clock(),
        )
    }

    fn tick_clock(&mut self) -> Timestamp {
        let now = match self.clock {
            Some(clock) => clock + 1,
            None => Timestamp::default(),
        };

        self.clock = Some(now);
        now
    }

    fn step(&mut self, now: Timestamp) -> Result<()> {
        if self.processor.is_occupied() {
            let policy = &mut self.policy;
            self.processor
                .advance(1, &mut self.procs, |cpu, procs| policy.on_tick(cpu, procs))?;
            self.drain_events(now);

            if self.processor.is_finished(&self.procs)? {
                let done = self.processor.clear()?;
                self.procs.get_mut(done.pid)?.mark_completed(now)?;
                debug!("{} completed at {}", done.pid, now);
                self.drain_events(now);
            }
        }

        let has_head = !self
            .policy
            .run(&mut self.processor, &self.procs, now, true)?
            .is_empty();
        self.drain_events(now);

        if self.processor.is_idle() && has_head {
            if let Some(dispatch) = self.policy.take_head() {
                self.processor.load(dispatch)?;
                self.drain_events(now);
            }
        }

        Ok(())
    }

    /// Routes the processor events to the trail and to the policy, oldest first
    fn drain_events(&mut self, now: Timestamp) {
        while let Some(event) = self.processor.next_event() {
            match event {
                ProcessorEvent::Loaded(dispatch) => {
                    if self.trail.last_end() < now {
                        self.trail.add_frame(FrameName::Idle, None, now);
                    }

                    self.policy.on_load(dispatch);
                }
                ProcessorEvent::Cleared(dispatch) => {
                    self.trail
                        .add_frame(FrameName::Process(dispatch.pid), dispatch.layer, now);
                    self.policy.on_clear(dispatch);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Pid;

    #[test]
    fn kernel_runs_once() {
        let mut kernel = Kernel::new(&[Workload::new(1, 0, 2)], &PolicyConfig::Fcfs).unwrap();
        assert_eq!(kernel.state(), KernelState::NotStarted);

        let report = kernel.run().unwrap();
        assert_eq!(kernel.state(), KernelState::Finished);
        assert_eq!(report.makespan, Timestamp::new(2));

        assert_eq!(kernel.run().unwrap_err(), SimError::AlreadyFinished);
    }

    #[test]
    fn empty_workload_finishes_at_zero() {
        let mut kernel = Kernel::new(&[], &PolicyConfig::Srtf).unwrap();
        let report = kernel.run().unwrap();

        assert_eq!(report.makespan, Timestamp::new(0));
        assert!(report.trail.is_empty());
        assert_eq!(report.metrics.cpu_utilization, 0.0);
    }

    #[test]
    fn idle_gap_is_recorded_before_the_first_load() {
        let mut kernel = Kernel::new(&[Workload::new(1, 3, 2)], &PolicyConfig::Fcfs).unwrap();
        let report = kernel.run().unwrap();

        assert_eq!(report.trail.len(), 2);
        assert_eq!(report.trail[0].name, FrameName::Idle);
        assert_eq!(report.trail[0].end, Timestamp::new(3));
        assert_eq!(report.trail[1].name, FrameName::Process(Pid::new(1)));
        assert_eq!(report.trail[1].end, Timestamp::new(5));
        assert_eq!(report.idle_time, 3);
    }

    #[test]
    fn bad_config_is_rejected_before_running() {
        let workload = [Workload::new(1, 0, 2).with_queue_level(3)];
        let config = PolicyConfig::Mlq {
            layers: vec![crate::LayerConfig::new(crate::AtomicKind::Fcfs, None)],
        };

        assert!(matches!(
            Kernel::new(&workload, &config),
            Err(SimError::QueueLevelOutOfRange { level: 3, .. })
        ));
    }
}
