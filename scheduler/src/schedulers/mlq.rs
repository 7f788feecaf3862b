use std::collections::HashMap;

use log::debug;

use crate::config::LayerConfig;
use crate::error::{Result, SimError};
use crate::schedulers::AtomicPolicy;
use crate::{Dispatch, Pid, Process, ProcessTable, Processor, Scheduler, Timestamp};

/// Multilevel Queue: processes are split once by their queue level, each
/// level runs its own atomic policy.
///
/// Only the highest non-empty level (lowest number) dispatches. An arrival on
/// a higher level than the running process preempts it; the preempted process
/// goes back to its own level, and a round robin slice keeps the window it had
/// left. Ticks are forwarded only to the level whose process is loaded.
#[derive(Clone, Debug)]
pub struct Mlq {
    layers: Vec<AtomicPolicy>,
    pool: Vec<Pid>,
    level_of: HashMap<Pid, usize>,
    /// Level whose queue the last `run` exposed
    active: Option<usize>,
    /// Level that currently receives ticks
    ticking: Option<usize>,
}

impl Mlq {
    /// Builds one atomic policy per level and partitions the processes
    ///
    /// * `configs` - the policy of every level, level 0 first
    /// * `procs` - the process table, every queue level must have a layer
    pub fn new(configs: &[LayerConfig], procs: &ProcessTable) -> Result<Mlq> {
        if configs.is_empty() {
            return Err(SimError::NoLayers);
        }

        let mut level_of = HashMap::new();
        for proc in procs.iter() {
            if proc.queue_level() >= configs.len() {
                return Err(SimError::QueueLevelOutOfRange {
                    pid: proc.pid(),
                    level: proc.queue_level(),
                    layers: configs.len(),
                });
            }

            level_of.insert(proc.pid(), proc.queue_level());
        }

        let layers = configs
            .iter()
            .enumerate()
            .map(|(level, config)| {
                let pool = procs
                    .iter()
                    .filter(|p| p.queue_level() == level)
                    .map(Process::pid)
                    .collect();
                config.build(pool)
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Mlq {
            layers,
            pool: procs.pids(),
            level_of,
            active: None,
            ticking: None,
        })
    }

    pub fn layers(&self) -> &[AtomicPolicy] {
        &self.layers
    }

    pub fn layer_names(&self) -> Vec<String> {
        self.layers.iter().map(|layer| layer.name()).collect()
    }

    fn level(&self, pid: Pid) -> Result<usize> {
        self.level_of
            .get(&pid)
            .copied()
            .ok_or(SimError::UnknownProcess(pid))
    }

    /// Clears the processor if something arrived on a higher level than the
    /// running process
    fn preempt_for_higher_level(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
    ) -> Result<()> {
        let Some(running) = cpu.running() else {
            return Ok(());
        };

        if procs.get(running)?.is_depleted() {
            return Ok(());
        }

        let current = self.level(running)?;
        let arrived = self.arrived(self.pending_set(cpu, procs)?, procs, timestamp)?;

        let mut top = None;
        for pid in arrived {
            let level = self.level(pid)?;
            top = Some(top.map_or(level, |t: usize| t.min(level)));
        }

        match top {
            Some(top) if top < current => {
                cpu.clear()?;
                self.ticking = None;
                self.layers[current].requeue(running, procs)?;
                debug!("level {} arrival preempts {} on level {}", top, running, current);
            }
            _ => (),
        }

        Ok(())
    }
}

impl Scheduler for Mlq {
    fn name(&self) -> String {
        String::from("Multilevel Queue (MLQ)")
    }

    fn pool(&self) -> &[Pid] {
        &self.pool
    }

    fn is_queued(&self, pid: Pid) -> bool {
        self.layers.iter().any(|layer| layer.is_queued(pid))
    }

    fn ready_queue(&self) -> &[Pid] {
        match self.active {
            Some(level) => self.layers[level].ready_queue(),
            None => &[],
        }
    }

    fn run(
        &mut self,
        cpu: &mut Processor,
        procs: &ProcessTable,
        timestamp: Timestamp,
        allow_preempt: bool,
    ) -> Result<&[Pid]> {
        if allow_preempt {
            self.preempt_for_higher_level(cpu, procs, timestamp)?;
        }

        let current = match cpu.running() {
            Some(pid) => Some(self.level(pid)?),
            None => None,
        };

        /* Only the level owning the running process may preempt it */
        for (level, layer) in self.layers.iter_mut().enumerate() {
            layer.run(cpu, procs, timestamp, allow_preempt && current == Some(level))?;
        }

        self.active = if cpu.is_idle() {
            self.layers
                .iter()
                .position(|layer| !layer.ready_queue().is_empty())
        } else {
            None
        };

        Ok(self.ready_queue())
    }

    fn take_head(&mut self) -> Option<Dispatch> {
        let level = self.active.take()?;

        self.layers[level]
            .take_head()
            .map(|dispatch| Dispatch::new(dispatch.pid, Some(level)))
    }

    fn enqueue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        let level = self.level(pid)?;
        self.layers[level].enqueue(pid, procs)
    }

    fn requeue(&mut self, pid: Pid, procs: &ProcessTable) -> Result<()> {
        let level = self.level(pid)?;
        self.layers[level].requeue(pid, procs)
    }

    fn on_load(&mut self, dispatch: Dispatch) {
        if let Some(level) = dispatch.layer {
            self.ticking = Some(level);
            self.layers[level].on_load(dispatch);
        }
    }

    fn on_tick(&mut self, cpu: &mut Processor, procs: &ProcessTable) -> Result<()> {
        if let Some(level) = self.ticking {
            self.layers[level].on_tick(cpu, procs)?;

            if cpu.is_idle() {
                self.ticking = None;
            }
        }

        Ok(())
    }

    fn on_clear(&mut self, dispatch: Dispatch) {
        if let Some(level) = dispatch.layer {
            self.layers[level].on_clear(dispatch);
        }

        self.ticking = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AtomicKind;
    use crate::Workload;

    fn configs() -> Vec<LayerConfig> {
        vec![
            LayerConfig::new(AtomicKind::RoundRobin, Some(2)),
            LayerConfig::new(AtomicKind::Fcfs, None),
        ]
    }

    #[test]
    fn processes_are_partitioned_by_level() {
        let procs = ProcessTable::new(&[
            Workload::new(1, 0, 3).with_queue_level(1),
            Workload::new(2, 0, 3),
            Workload::new(3, 1, 3).with_queue_level(1),
        ])
        .unwrap();

        let mlq = Mlq::new(&configs(), &procs).unwrap();

        assert_eq!(mlq.layers()[0].pool(), &[Pid::new(2)]);
        assert_eq!(mlq.layers()[1].pool(), &[Pid::new(1), Pid::new(3)]);
        assert_eq!(mlq.layer_names()[0], "Round Robin (RR) | q=2");
    }

    #[test]
    fn level_beyond_layers_is_rejected() {
        let procs = ProcessTable::new(&[Workload::new(1, 0, 3).with_queue_level(2)]).unwrap();

        assert_eq!(
            Mlq::new(&configs(), &procs).unwrap_err(),
            SimError::QueueLevelOutOfRange {
                pid: Pid::new(1),
                level: 2,
                layers: 2
            }
        );
    }

    #[test]
    fn top_level_dispatches_first() {
        let procs = ProcessTable::new(&[
            Workload::new(1, 0, 3).with_queue_level(1),
            Workload::new(2, 0, 3),
        ])
        .unwrap();
        let mut cpu = Processor::new();
        let mut mlq = Mlq::new(&configs(), &procs).unwrap();

        let queue = mlq.run(&mut cpu, &procs, Timestamp::new(0), true).unwrap();
        assert_eq!(queue, &[Pid::new(2)]);
        assert_eq!(mlq.take_head(), Some(Dispatch::new(Pid::new(2), Some(0))));
    }
}
