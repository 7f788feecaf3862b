//! A scheduler simulation library.
//!
//! This library provides the processor, the process table and the
//! scheduling policies needed to replay a synthetic workload on a single
//! simulated CPU, one time unit at a time.
//!

mod common_types;
pub use crate::common_types::{Pid, PidAllocator, Timestamp};

mod error;
pub use crate::error::{Result, SimError};

mod process;
pub use crate::process::{Process, ProcessTable, Workload};

mod trail;
pub use crate::trail::{ExecutionFrame, ExecutionTrail, FrameName};

mod processor;
pub use crate::processor::{Dispatch, Processor, ProcessorEvent};

mod common_funcs;

mod scheduler;
pub use crate::scheduler::Scheduler;

pub mod schedulers;
pub use schedulers::{AtomicPolicy, Policy};

mod config;
pub use crate::config::{AtomicKind, LayerConfig, PolicyConfig};

mod metrics;
pub use crate::metrics::{Metrics, RunReport};

mod kernel;
pub use crate::kernel::{Kernel, KernelState};

/// Runs `workload` to completion under the policy described by `policy`
///
/// * `workload` - the processes, ids must be unique
/// * `policy` - the policy selector
pub fn simulate(workload: &[Workload], policy: &PolicyConfig) -> Result<RunReport> {
    Kernel::new(workload, policy)?.run()
}
