use crate::common::TickOutcome;
use crate::core::gpu::ClockDevice;
use crate::daemon::controller::DeviceController;
use std::time::Instant;
use tracing::{debug, error, trace};

impl<D: ClockDevice> DeviceController<D> {
    /// Samples utilization once and moves at most one step along the ladder.
    pub fn process(&mut self) -> TickOutcome {
        self.process_at(Instant::now())
    }

    pub fn process_at(&mut self, now: Instant) -> TickOutcome {
        let signal = self.read_signal();
        let power_state = self.state.power_state;
        let elapsed = now.saturating_duration_since(self.state.last_update);

        trace!(
            target: "memclockd::controller",
            "GPU{}: signal={}% state={} elapsed={:?}",
            self.index(),
            signal,
            power_state,
            elapsed
        );

        // Boost takes priority: while it qualifies the low power check is
        // not looked at, even if the boost is still waiting on its dwell.
        if power_state > 0 && signal >= self.policy.boost_threshold {
            if elapsed < self.policy.boost_dwell {
                return TickOutcome::Pending;
            }
            return self.step_to(power_state - 1, now);
        }

        if power_state < self.ladder.lowest_state() && signal <= self.policy.low_power_threshold {
            if elapsed < self.policy.low_power_dwell {
                return TickOutcome::Pending;
            }
            return self.step_to(power_state + 1, now);
        }

        self.state.last_update = now;
        TickOutcome::Idle
    }

    fn step_to(&mut self, target: usize, now: Instant) -> TickOutcome {
        let Some(mhz) = self.ladder.get(target) else {
            return TickOutcome::Failed;
        };
        let boosting = target < self.state.power_state;

        debug!(
            target: "memclockd::controller",
            "GPU{}: {} clock to {} MHz",
            self.index(),
            if boosting { "Boosting" } else { "Lowering" },
            mhz
        );

        if let Err(e) = self.device.pin_memory_clock(mhz) {
            error!(target: "memclockd::controller", "GPU{}: {:#}", self.index(), e);
            return TickOutcome::Failed;
        }

        self.state.power_state = target;
        self.state.last_update = now;

        if boosting {
            TickOutcome::Boosted { mhz }
        } else {
            TickOutcome::Lowered { mhz }
        }
    }

    /// Highest of the monitored utilizations. Unreadable counters count as 0.
    fn read_signal(&self) -> u32 {
        let index = self.index();
        let core = self.device.utilization().unwrap_or_else(|e| {
            error!(target: "memclockd::controller", "GPU{}: {:#}", index, e);
            0
        });

        if !self.policy.include_codec {
            return core;
        }

        let encoder = self.device.encoder_utilization().unwrap_or_else(|e| {
            error!(target: "memclockd::controller", "GPU{}: {:#}", index, e);
            0
        });
        let decoder = self.device.decoder_utilization().unwrap_or_else(|e| {
            error!(target: "memclockd::controller", "GPU{}: {:#}", index, e);
            0
        });

        core.max(encoder).max(decoder)
    }
}
