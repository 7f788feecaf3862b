use thiserror::Error;

use crate::{Pid, Timestamp};

/// Everything that can stop a simulation.
///
/// The first group are configuration errors, rejected before the clock
/// starts. The second group are broken invariants inside a policy or the
/// processor; they abort the run because the metrics would be wrong.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    // === Configuration ===
    #[error("process {0} has a zero burst time")]
    ZeroBurst(Pid),
    #[error("process {0} has priority 0, priorities start at 1")]
    ZeroPriority(Pid),
    #[error("pid {0} appears more than once in the workload")]
    DuplicatePid(Pid),
    #[error("process {pid} is on queue level {level} but only {layers} layers are configured")]
    QueueLevelOutOfRange { pid: Pid, level: usize, layers: usize },
    #[error("a multilevel policy needs at least one layer")]
    NoLayers,
    #[error("round robin needs a quantum greater than zero")]
    MissingQuantum,
    #[error("{0} cannot terminate a multilevel feedback queue, use FCFS, SJF or Priority-NP")]
    InvalidTerminal(String),

    // === Invariant violations ===
    #[error("unknown process {0}")]
    UnknownProcess(Pid),
    #[error("process {0} ticked after its burst was depleted")]
    TickDepleted(Pid),
    #[error("process {pid} was already completed at {at}")]
    DoubleCompletion { pid: Pid, at: Timestamp },
    #[error("cannot load {incoming}, processor is running {running}")]
    ProcessorOccupied { incoming: Pid, running: Pid },
    #[error("processor is idle")]
    ProcessorIdle,
    #[error("process {0} is already in a ready queue")]
    AlreadyQueued(Pid),
    #[error("kernel has already run")]
    AlreadyFinished,
    #[error("simulation stalled at {0} with unfinished processes")]
    Stalled(Timestamp),
}

pub type Result<T> = std::result::Result<T, SimError>;
