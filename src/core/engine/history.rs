use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Rolling window of FPS samples, ~60 seconds at the 1 Hz poll rate.
pub const FPS_HISTORY_CAPACITY: usize = 60;

/// Bounded FIFO of the most recent FPS readings, newest at the tail.
///
/// Used by dashboard sparklines; only the frame-rate emission handler pushes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpsHistory {
    samples: VecDeque<u32>,
}

impl FpsHistory {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(FPS_HISTORY_CAPACITY),
        }
    }

    /// Append a sample, evicting the oldest once the window is full.
    pub fn push(&mut self, fps: u32) {
        if self.samples.len() >= FPS_HISTORY_CAPACITY {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
    }

    pub fn latest(&self) -> Option<u32> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples.iter().copied()
    }

    /// Contiguous copy for chart widgets.
    pub fn to_vec(&self) -> Vec<u32> {
        self.samples.iter().copied().collect()
    }
}
