use std::collections::HashSet;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// A point on the simulated clock, in time units since the run started.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(usize);

impl Timestamp {
    /// Creates a new Timestamp object
    ///
    /// * `time` - inital value of the Timestamp
    pub fn new(time: usize) -> Timestamp {
        Timestamp(time)
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// Number of time units between `earlier` and `self`, zero if `earlier`
    /// is not actually earlier.
    pub fn since(&self, earlier: Timestamp) -> usize {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<usize> for Timestamp {
    type Output = Timestamp;

    fn add(self, rhs: usize) -> Self::Output {
        Timestamp::new(self.0 + rhs)
    }
}

impl Sub<Timestamp> for Timestamp {
    type Output = usize;

    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.0 - rhs.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Caller supplied process identity. Every ordering in the simulator breaks
/// ties on ascending pid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pid(usize);

impl Pid {
    pub fn new(pid: usize) -> Pid {
        Pid(pid)
    }

    pub fn get(&self) -> usize {
        self.0
    }
}

impl Add<usize> for Pid {
    type Output = Pid;

    fn add(self, rhs: usize) -> Self::Output {
        Pid::new(self.0 + rhs)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// Hands out pids for workload entries that did not bring their own.
///
/// Pids already claimed by the caller are skipped, so explicit and generated
/// ids never collide.
pub struct PidAllocator {
    next_pid: Pid,
    reserved: HashSet<Pid>,
}

impl PidAllocator {
    /// Creates an allocator starting at pid 1
    ///
    /// * `reserved` - pids that were given explicitly and must not be reused
    pub fn new(reserved: impl IntoIterator<Item = Pid>) -> PidAllocator {
        PidAllocator {
            next_pid: Pid::new(1),
            reserved: reserved.into_iter().collect(),
        }
    }

    fn inc_pid(&mut self) {
        self.next_pid = self.next_pid.add(1);
    }

    /// Returns the lowest unused pid and marks it as taken
    pub fn next_pid(&mut self) -> Pid {
        while self.reserved.contains(&self.next_pid) {
            self.inc_pid();
        }

        let pid = self.next_pid;
        self.reserved.insert(pid);
        self.inc_pid();

        pid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocator_skips_reserved_pids() {
        let mut alloc = PidAllocator::new([Pid::new(1), Pid::new(3)]);

        assert_eq!(alloc.next_pid(), Pid::new(2));
        assert_eq!(alloc.next_pid(), Pid::new(4));
        assert_eq!(alloc.next_pid(), Pid::new(5));
    }

    #[test]
    fn timestamp_since_saturates() {
        let early = Timestamp::new(3);
        let late = Timestamp::new(7);

        assert_eq!(late.since(early), 4);
        assert_eq!(early.since(late), 0);
        assert_eq!(late - early, 4);
    }
}
