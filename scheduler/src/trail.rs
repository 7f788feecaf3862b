use std::fmt;

use serde::Serialize;

use crate::{Pid, Timestamp};

/// Who occupied the processor during a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameName {
    Process(Pid),
    Idle,
}

impl fmt::Display for FrameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameName::Process(pid) => write!(f, "{}", pid),
            FrameName::Idle => write!(f, "idle"),
        }
    }
}

/// A contiguous interval of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ExecutionFrame {
    pub name: FrameName,
    /// Layer of a multilevel policy the slice ran on
    pub layer: Option<usize>,
    pub start: Timestamp,
    pub end: Timestamp,
}

impl ExecutionFrame {
    pub fn span(&self) -> usize {
        self.end.since(self.start)
    }

    pub fn is_idle(&self) -> bool {
        self.name == FrameName::Idle
    }
}

/// Append-only log of execution frames. Every frame starts where the previous
/// one ended.
#[derive(Clone, Debug, Default)]
pub struct ExecutionTrail {
    start_time: Timestamp,
    frames: Vec<ExecutionFrame>,
}

impl ExecutionTrail {
    pub fn new(start_time: Timestamp) -> ExecutionTrail {
        ExecutionTrail {
            start_time,
            frames: Vec::new(),
        }
    }

    pub fn start_time(&self) -> Timestamp {
        self.start_time
    }

    pub fn last_end(&self) -> Timestamp {
        self.frames.last().map_or(self.start_time, |frame| frame.end)
    }

    /// Closes a frame that runs from the previous end up to `end`
    ///
    /// * `name` - the process that ran, or `Idle`
    /// * `layer` - the multilevel layer tag, if any
    /// * `end` - the timestamp when the frame stopped
    pub fn add_frame(&mut self, name: FrameName, layer: Option<usize>, end: Timestamp) {
        let frame = ExecutionFrame {
            name,
            layer,
            start: self.last_end(),
            end,
        };

        self.frames.push(frame);
    }

    /// Total time spent in idle frames
    pub fn idle_time(&self) -> usize {
        self.frames
            .iter()
            .filter(|frame| frame.is_idle())
            .map(ExecutionFrame::span)
            .sum()
    }

    pub fn frames(&self) -> &[ExecutionFrame] {
        &self.frames
    }

    pub fn into_frames(self) -> Vec<ExecutionFrame> {
        self.frames
    }
}
