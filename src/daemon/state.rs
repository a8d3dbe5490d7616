use std::time::Instant;

/// Mutable part of a controller; only its own transition logic writes here.
#[derive(Debug, Clone, Copy)]
pub struct ControlState {
    /// Index into the clock ladder, 0 = highest clock.
    pub power_state: usize,
    /// Start of the current dwell window.
    pub last_update: Instant,
}

impl ControlState {
    pub fn pinned_at_max(now: Instant) -> Self {
        Self {
            power_state: 0,
            last_update: now,
        }
    }
}
