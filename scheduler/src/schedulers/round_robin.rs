use std::num::NonZeroUsize;

use log::debug;

use crate::common_funcs::{sort_by_arrival, ReadyQueue};
use crate::error::Result;
use crate::{Dispatch, Pid, ProcessTable, Processor, Scheduler, Timestamp};

/// Round Robin: FIFO order, each slice bounded by the quanta.
///
/// The time window is reset when one of its processes is loaded and counts
/// down on every tick. When it reaches zero before the process is done, the
/// process is cleared and parked until the next `run`, where it is appended
/// after the processes that arrived meanwhile. Composite policies can take the
/// parked process with [`RoundRobin::take_preempted`] instead.
#[derive(Clone, Debug)]
pub struct RoundRobin {
	pool: Vec<Pid>,
	ready: ReadyQueue,
	/// The maximum time a process can run before being preempted
	quanta: NonZeroUsize,
	/// Units left in the current slice
	window: usize,
	/// Process cut off by the quanta, not requeued yet
	preempted: Option<Pid>,
	/// Window kept for a process preempted by a higher layer
	carried: Option<(Pid, usize)>,
}

impl RoundRobin {
	/// Creates a Round Robin policy
	///
	/// * `timeslice` - the time quanta that a process can run before it is preempted
	/// * `pool` - the processes it admits by itself
	pub fn new(timeslice: NonZeroUsize, pool: Vec<Pid>) -> RoundRobin {
		RoundRobin {
			pool,
			ready: ReadyQueue::new(),
			quanta: timeslice,
			window: timeslice.get(),
			preempted: None,
			carried: None,
		}
	}

	pub fn quanta(&self) -> NonZeroUsize {
		self.quanta
	}

	/// Units left in the current slice
	pub fn window(&self) -> usize {
		self.window
	}

	/// Hands over the process whose quanta expired, if it was not requeued yet
	pub fn take_preempted(&mut self) -> Option<Pid> {
		self.preempted.take()
	}

	fn reset_window(&mut self) {
		self.window = self.quanta.get();
	}

	fn admit(&mut self, mut arrived: Vec<Pid>, procs: &ProcessTable) -> Result<()> {
		sort_by_arrival(&mut arrived, procs)?;
		self.ready.extend(arrived)?;

		/* The expired process goes behind everything that arrived during its slice */
		if let Some(pid) = self.preempted.take() {
			self.ready.push_back(pid)?;
		}

		Ok(())
	}
}

impl Scheduler for RoundRobin {
	fn name(&self) -> String {
		format!("Round Robin (RR) | q={}", self.quanta)
	}

	fn pool(&self) -> &[Pid] {
		&self.pool
	}

	fn is_queued(&self, pid: Pid) -> bool {
		self.ready.contains(pid) || self.preempted == Some(pid)
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

	fn enqueue(&mut self, pid: Pid, _procs: &ProcessTable) -> Result<()> {
		self.ready.push_back(pid)
	}

	/// Puts the process back at the head and keeps what was left of its
	/// window for the next load
	fn requeue(&mut self, pid: Pid, _procs: &ProcessTable) -> Result<()> {
		self.carried = Some((pid, self.window));
		self.ready.push_front(pid)
	}

	fn on_load(&mut self, dispatch: Dispatch) {
		match self.carried.take() {
			Some((pid, window)) if pid == dispatch.pid => self.window = window,
			_ => self.reset_window(),
		}
	}

	fn on_tick(&mut self, cpu: &mut Processor, procs: &ProcessTable) -> Result<()> {
		self.window = self.window.saturating_sub(1);
		if self.window > 0 {
			return Ok(());
		}

		if let Some(pid) = cpu.running() {
			if !procs.get(pid)?.is_depleted() {
				cpu.clear()?;
				self.preempted = Some(pid);
				self.reset_window();
				debug!("quanta expired for {}", pid);
			}
		}

		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Workload;

	fn setup() -> (RoundRobin, ProcessTable, Processor) {
		let procs = ProcessTable::new(&[Workload::new(1, 0, 5), Workload::new(2, 0, 1)]).unwrap();
		let rr = RoundRobin::new(NonZeroUsize::new(2).unwrap(), procs.pids());

		(rr, procs, Processor::new())
	}

	#[test]
	fn expired_process_is_parked_then_appended() {
		let (mut rr, mut procs, mut cpu) = setup();

		rr.run(&mut cpu, &procs, Timestamp::new(0), true).unwrap();
		let head = rr.take_head().unwrap();
		cpu.load(head).unwrap();
		rr.on_load(head);

		cpu.advance(2, &mut procs, |cpu, procs| rr.on_tick(cpu, procs)).unwrap();
		assert!(cpu.is_idle());
		assert!(rr.is_queued(Pid::new(1)));

		let queue = rr.run(&mut cpu, &procs, Timestamp::new(2), true).unwrap();
		assert_eq!(queue, &[Pid::new(2), Pid::new(1)]);
	}

	#[test]
	fn requeue_carries_the_window_over() {
		let (mut rr, mut procs, mut cpu) = setup();

		rr.run(&mut cpu, &procs, Timestamp::new(0), true).unwrap();
		let head = rr.take_head().unwrap();
		cpu.load(head).unwrap();
		rr.on_load(head);

		cpu.advance(1, &mut procs, |cpu, procs| rr.on_tick(cpu, procs)).unwrap();
		assert_eq!(rr.window(), 1);

		let cleared = cpu.clear().unwrap();
		rr.requeue(cleared.pid, &procs).unwrap();
		assert_eq!(rr.ready_queue(), &[Pid::new(1), Pid::new(2)]);

		let head = rr.take_head().unwrap();
		cpu.load(head).unwrap();
		rr.on_load(head);
		assert_eq!(rr.window(), 1);
	}
}
