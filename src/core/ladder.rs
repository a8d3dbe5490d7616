use anyhow::{Result, bail};

/// Supported memory clocks of one device, highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockLadder {
    clocks: Vec<u32>,
}

impl ClockLadder {
    /// Builds a ladder from a driver report. The report is normally already
    /// descending; it is sorted anyway so that index 0 is always the maximum.
    pub fn from_supported(mut clocks: Vec<u32>) -> Result<Self> {
        if clocks.is_empty() {
            bail!("Device reported no supported memory clocks");
        }
        clocks.sort_by(|a, b| b.cmp(a));
        Ok(Self { clocks })
    }

    pub fn len(&self) -> usize {
        self.clocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clocks.is_empty()
    }

    /// Index of the lowest clock.
    pub fn lowest_state(&self) -> usize {
        self.clocks.len() - 1
    }

    pub fn get(&self, state: usize) -> Option<u32> {
        self.clocks.get(state).copied()
    }

    pub fn highest(&self) -> u32 {
        self.clocks[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.clocks.iter().copied()
    }
}
