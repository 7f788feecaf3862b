use std::collections::VecDeque;

use log::{debug, trace};

use crate::error::{Result, SimError};
use crate::{Pid, ProcessTable};

/// A process handed to the processor together with the layer it was picked
/// from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dispatch {
    pub pid: Pid,
    pub layer: Option<usize>,
}

impl Dispatch {
    pub fn new(pid: Pid, layer: Option<usize>) -> Dispatch {
        Dispatch { pid, layer }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Idle,
    Occupied(Dispatch),
}

/// State changes of the processor, queued until the kernel drains them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProcessorEvent {
    Loaded(Dispatch),
    Cleared(Dispatch),
}

/// The single simulated CPU.
///
/// It holds at most one process and is the only component that consumes
/// burst time. Loads and clears are recorded as [`ProcessorEvent`]s in the
/// order they happened.
#[derive(Debug)]
pub struct Processor {
    slot: Slot,
    events: VecDeque<ProcessorEvent>,
}

impl Default for Processor {
    fn default() -> Self {
        Processor::new()
    }
}

impl Processor {
    pub fn new() -> Processor {
        Processor {
            slot: Slot::Idle,
            events: VecDeque::new(),
        }
    }

    pub fn is_idle(&self) -> bool {
        self.slot == Slot::Idle
    }

    pub fn is_occupied(&self) -> bool {
        !self.is_idle()
    }

    pub fn running(&self) -> Option<Pid> {
        self.current().map(|dispatch| dispatch.pid)
    }

    pub fn current(&self) -> Option<Dispatch> {
        match self.slot {
            Slot::Idle => None,
            Slot::Occupied(dispatch) => Some(dispatch),
        }
    }

    /// True if a process is loaded and has no burst left
    pub fn is_finished(&self, procs: &ProcessTable) -> Result<bool> {
        return if let Some(pid) = self.running() {
            Ok(procs.get(pid)?.is_depleted())
        } else {
            Ok(false)
        };
    }

    /// Puts a process on the processor
    ///
    /// * `dispatch` - the process to run and its layer tag
    pub fn load(&mut self, dispatch: Dispatch) -> Result<()> {
        if let Some(running) = self.running() {
            return Err(SimError::ProcessorOccupied {
                incoming: dispatch.pid,
                running,
            });
        }

        debug!("load {} (layer {:?})", dispatch.pid, dispatch.layer);
        self.slot = Slot::Occupied(dispatch);
        self.events.push_back(ProcessorEvent::Loaded(dispatch));

        Ok(())
    }

    /// Runs the loaded process for up to `units` time units
    ///
    /// `on_tick` is called after every unit and may clear the processor, so
    /// the slot is checked again before each unit. Returns the units actually
    /// executed.
    ///
    /// * `units` - the maximum number of units to execute
    /// * `procs` - the process table owning the loaded process
    /// * `on_tick` - observer for a consumed unit
    pub fn advance<F>(&mut self, units: usize, procs: &mut ProcessTable, mut on_tick: F) -> Result<usize>
    where
        F: FnMut(&mut Processor, &ProcessTable) -> Result<()>,
    {
        if self.is_idle() {
            return Err(SimError::ProcessorIdle);
        }

        let mut executed = 0;

        for _ in 0..units {
            let Some(pid) = self.running() else {
                break;
            };

            let proc = procs.get_mut(pid)?;
            if proc.is_depleted() {
                break;
            }

            proc.tick(1)?;
            executed += 1;
            trace!("tick {}", pid);

            on_tick(&mut *self, &*procs)?;
        }

        Ok(executed)
    }

    /// Takes the running process off the processor and returns it
    pub fn clear(&mut self) -> Result<Dispatch> {
        let Slot::Occupied(dispatch) = self.slot else {
            return Err(SimError::ProcessorIdle);
        };

        debug!("clear {}", dispatch.pid);
        self.slot = Slot::Idle;
        self.events.push_back(ProcessorEvent::Cleared(dispatch));

        Ok(dispatch)
    }

    /// Oldest event not yet handled
    pub fn next_event(&mut self) -> Option<ProcessorEvent> {
        self.events.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Workload;

    fn table() -> ProcessTable {
        ProcessTable::new(&[Workload::new(1, 0, 3), Workload::new(2, 0, 1)]).unwrap()
    }

    #[test]
    fn load_and_clear_emit_events_in_order() {
        let mut cpu = Processor::new();
        let one = Dispatch::new(Pid::new(1), None);

        cpu.load(one).unwrap();
        assert_eq!(cpu.running(), Some(Pid::new(1)));
        assert_eq!(cpu.clear().unwrap(), one);
        assert!(cpu.is_idle());

        assert_eq!(cpu.next_event(), Some(ProcessorEvent::Loaded(one)));
        assert_eq!(cpu.next_event(), Some(ProcessorEvent::Cleared(one)));
        assert_eq!(cpu.next_event(), None);
    }

    #[test]
    fn double_load_and_idle_clear_fail() {
        let mut cpu = Processor::new();
        cpu.load(Dispatch::new(Pid::new(1), None)).unwrap();

        assert_eq!(
            cpu.load(Dispatch::new(Pid::new(2), None)),
            Err(SimError::ProcessorOccupied {
                incoming: Pid::new(2),
                running: Pid::new(1)
            })
        );

        cpu.clear().unwrap();
        assert_eq!(cpu.clear(), Err(SimError::ProcessorIdle));
    }

    #[test]
    fn advance_stops_when_depleted() {
        let mut procs = table();
        let mut cpu = Processor::new();
        cpu.load(Dispatch::new(Pid::new(2), None)).unwrap();

        let mut ticks = 0;
        let executed = cpu
            .advance(5, &mut procs, |_, _| {
                ticks += 1;
                Ok(())
            })
            .unwrap();

        assert_eq!(executed, 1);
        assert_eq!(ticks, 1);
        assert!(cpu.is_finished(&procs).unwrap());
    }

    #[test]
    fn observer_can_clear_mid_advance() {
        let mut procs = table();
        let mut cpu = Processor::new();
        cpu.load(Dispatch::new(Pid::new(1), None)).unwrap();

        let executed = cpu
            .advance(3, &mut procs, |cpu, _| {
                cpu.clear()?;
                Ok(())
            })
            .unwrap();

        assert_eq!(executed, 1);
        assert!(cpu.is_idle());
        assert_eq!(procs.get(Pid::new(1)).unwrap().remaining(), 2);
    }
}
