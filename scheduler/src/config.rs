use std::fmt;
use std::num::NonZeroUsize;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};
use crate::schedulers::{AtomicPolicy, Fcfs, Mlfq, Mlq, Policy, PriorityNp, PriorityP, RoundRobin, Sjf, Srtf};
use crate::{Pid, ProcessTable};

/// The single-queue policies a run or a layer can use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AtomicKind {
    Fcfs,
    Sjf,
    Srtf,
    #[serde(alias = "prio_np")]
    PriorityNp,
    #[serde(alias = "prio_p")]
    PriorityP,
    #[serde(alias = "rr")]
    RoundRobin,
}

impl AtomicKind {
    /// Builds the policy over `pool`
    ///
    /// * `pool` - the processes the policy admits by itself
    /// * `quantum` - required for round robin, ignored otherwise
    pub fn build(self, pool: Vec<Pid>, quantum: Option<usize>) -> Result<AtomicPolicy> {
        let policy = match self {
            AtomicKind::Fcfs => AtomicPolicy::Fcfs(Fcfs::new(pool)),
            AtomicKind::Sjf => AtomicPolicy::Sjf(Sjf::new(pool)),
            AtomicKind::Srtf => AtomicPolicy::Srtf(Srtf::new(pool)),
            AtomicKind::PriorityNp => AtomicPolicy::PriorityNp(PriorityNp::new(pool)),
            AtomicKind::PriorityP => AtomicPolicy::PriorityP(PriorityP::new(pool)),
            AtomicKind::RoundRobin => {
                let quanta = quantum
                    .and_then(NonZeroUsize::new)
                    .ok_or(SimError::MissingQuantum)?;
                AtomicPolicy::RoundRobin(RoundRobin::new(quanta, pool))
            }
        };

        Ok(policy)
    }

    /// Whether the policy may close a multilevel feedback queue
    pub fn is_terminal(self) -> bool {
        matches!(self, AtomicKind::Fcfs | AtomicKind::Sjf | AtomicKind::PriorityNp)
    }

    pub fn uses_priority(self) -> bool {
        matches!(self, AtomicKind::PriorityNp | AtomicKind::PriorityP)
    }
}

impl fmt::Display for AtomicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AtomicKind::Fcfs => "FCFS",
            AtomicKind::Sjf => "SJF",
            AtomicKind::Srtf => "SRTF",
            AtomicKind::PriorityNp => "Prio-NP",
            AtomicKind::PriorityP => "Prio-P",
            AtomicKind::RoundRobin => "RR",
        };

        write!(f, "{}", name)
    }
}

impl FromStr for AtomicKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let kind = match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "fcfs" => AtomicKind::Fcfs,
            "sjf" => AtomicKind::Sjf,
            "srtf" => AtomicKind::Srtf,
            "prio_np" | "priority_np" => AtomicKind::PriorityNp,
            "prio_p" | "priority_p" => AtomicKind::PriorityP,
            "rr" | "round_robin" => AtomicKind::RoundRobin,
            _ => return Err(format!("unknown policy '{}'", s)),
        };

        Ok(kind)
    }
}

/// Policy of one multilevel queue level.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub policy: AtomicKind,
    #[serde(default)]
    pub quantum: Option<usize>,
}

impl LayerConfig {
    pub fn new(policy: AtomicKind, quantum: Option<usize>) -> LayerConfig {
        LayerConfig { policy, quantum }
    }

    pub fn build(&self, pool: Vec<Pid>) -> Result<AtomicPolicy> {
        self.policy.build(pool, self.quantum)
    }
}

/// Selects the policy of a run.
///
/// ```json
/// { "kind": "round_robin", "quantum": 2 }
/// { "kind": "mlq", "layers": [{ "policy": "rr", "quantum": 2 }, { "policy": "fcfs" }] }
/// { "kind": "mlfq", "quanta": [2, 4], "terminal": "fcfs" }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    Fcfs,
    Sjf,
    Srtf,
    #[serde(alias = "prio_np")]
    PriorityNp,
    #[serde(alias = "prio_p")]
    PriorityP,
    #[serde(alias = "rr")]
    RoundRobin { quantum: usize },
    Mlq { layers: Vec<LayerConfig> },
    Mlfq { quanta: Vec<usize>, terminal: AtomicKind },
}

impl PolicyConfig {
    /// Config for a single-queue policy
    ///
    /// * `kind` - the policy
    /// * `quantum` - the round robin quantum, ignored by the others
    pub fn atomic(kind: AtomicKind, quantum: Option<usize>) -> Result<PolicyConfig> {
        let config = match kind {
            AtomicKind::Fcfs => PolicyConfig::Fcfs,
            AtomicKind::Sjf => PolicyConfig::Sjf,
            AtomicKind::Srtf => PolicyConfig::Srtf,
            AtomicKind::PriorityNp => PolicyConfig::PriorityNp,
            AtomicKind::PriorityP => PolicyConfig::PriorityP,
            AtomicKind::RoundRobin => PolicyConfig::RoundRobin {
                quantum: quantum.ok_or(SimError::MissingQuantum)?,
            },
        };

        Ok(config)
    }

    fn as_atomic(&self) -> Option<(AtomicKind, Option<usize>)> {
        match self {
            PolicyConfig::Fcfs => Some((AtomicKind::Fcfs, None)),
            PolicyConfig::Sjf => Some((AtomicKind::Sjf, None)),
            PolicyConfig::Srtf => Some((AtomicKind::Srtf, None)),
            PolicyConfig::PriorityNp => Some((AtomicKind::PriorityNp, None)),
            PolicyConfig::PriorityP => Some((AtomicKind::PriorityP, None)),
            PolicyConfig::RoundRobin { quantum } => Some((AtomicKind::RoundRobin, Some(*quantum))),
            PolicyConfig::Mlq { .. } | PolicyConfig::Mlfq { .. } => None,
        }
    }

    /// True if any level orders by priority, reports show the column then
    pub fn uses_priority(&self) -> bool {
        match self {
            PolicyConfig::Mlq { layers } => layers.iter().any(|l| l.policy.uses_priority()),
            PolicyConfig::Mlfq { terminal, .. } => terminal.uses_priority(),
            _ => self.as_atomic().is_some_and(|(kind, _)| kind.uses_priority()),
        }
    }

    /// True if processes carry a static queue level
    pub fn uses_queue_level(&self) -> bool {
        matches!(self, PolicyConfig::Mlq { .. })
    }

    /// Builds the policy over the processes of `procs`
    pub fn build(&self, procs: &ProcessTable) -> Result<Policy> {
        if let Some((kind, quantum)) = self.as_atomic() {
            return Ok(Policy::Atomic(kind.build(procs.pids(), quantum)?));
        }

        let policy = match self {
            PolicyConfig::Mlq { layers } => Policy::Mlq(Mlq::new(layers, procs)?),
            PolicyConfig::Mlfq { quanta, terminal } => Policy::Mlfq(Mlfq::new(quanta, *terminal, procs)?),
            _ => unreachable!("atomic configs are built above"),
        };

        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scheduler;

    #[test]
    fn parses_tagged_policies() {
        let rr: PolicyConfig = serde_json::from_str(r#"{ "kind": "rr", "quantum": 3 }"#).unwrap();
        assert_eq!(rr, PolicyConfig::RoundRobin { quantum: 3 });

        let mlq: PolicyConfig = serde_json::from_str(
            r#"{ "kind": "mlq", "layers": [{ "policy": "rr", "quantum": 2 }, { "policy": "prio_np" }] }"#,
        )
        .unwrap();
        assert_eq!(
            mlq,
            PolicyConfig::Mlq {
                layers: vec![
                    LayerConfig::new(AtomicKind::RoundRobin, Some(2)),
                    LayerConfig::new(AtomicKind::PriorityNp, None),
                ]
            }
        );
        assert!(mlq.uses_priority());
        assert!(mlq.uses_queue_level());

        let mlfq: PolicyConfig =
            serde_json::from_str(r#"{ "kind": "mlfq", "quanta": [2, 4], "terminal": "sjf" }"#).unwrap();
        assert!(!mlfq.uses_priority());
    }

    #[test]
    fn kinds_parse_from_cli_names() {
        assert_eq!("prio-np".parse::<AtomicKind>(), Ok(AtomicKind::PriorityNp));
        assert_eq!("RR".parse::<AtomicKind>(), Ok(AtomicKind::RoundRobin));
        assert!("lottery".parse::<AtomicKind>().is_err());
    }

    #[test]
    fn round_robin_needs_a_quantum() {
        let procs = ProcessTable::default();

        assert_eq!(
            AtomicKind::RoundRobin.build(Vec::new(), None).unwrap_err(),
            SimError::MissingQuantum
        );
        assert_eq!(
            AtomicKind::RoundRobin.build(Vec::new(), Some(0)).unwrap_err(),
            SimError::MissingQuantum
        );
        assert_eq!(
            PolicyConfig::atomic(AtomicKind::RoundRobin, None).unwrap_err(),
            SimError::MissingQuantum
        );

        let policy = PolicyConfig::RoundRobin { quantum: 4 }.build(&procs).unwrap();
        assert_eq!(policy.name(), "Round Robin (RR) | q=4");
        assert!(!policy.is_multilevel());
    }
}
