//! Drives every supported controller on one shared cadence.

use crate::common::TickOutcome;
use crate::core::gpu::{ClockDevice, GpuBackend};
use crate::core::policy::HysteresisPolicy;
use crate::daemon::controller::{DeviceController, Probe};
use anyhow::{Result, bail};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, trace, warn};

/// Per-tick tally across all devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub transitions: usize,
    pub pending: usize,
    pub failures: usize,
}

impl TickSummary {
    fn record(&mut self, outcome: TickOutcome) {
        match outcome {
            TickOutcome::Boosted { .. } | TickOutcome::Lowered { .. } => self.transitions += 1,
            TickOutcome::Pending => self.pending += 1,
            TickOutcome::Failed => self.failures += 1,
            TickOutcome::Idle => {}
        }
    }
}

pub struct ControllerSet<D: ClockDevice> {
    controllers: Vec<DeviceController<D>>,
    interval: Duration,
    tick_count: u64,
}

impl<D: ClockDevice> ControllerSet<D> {
    /// Probes every device the backend reports and keeps the supported ones.
    /// Fails when none are left.
    pub fn build<'a, B>(backend: &'a B, policy: &HysteresisPolicy) -> Result<Self>
    where
        B: GpuBackend<Device<'a> = D>,
    {
        let count = backend.device_count()?;
        info!(target: "memclockd::daemon", "Found {} GPU(s)", count);
        info!(target: "memclockd::daemon", "Initializing GPU(s)");

        let probes: Vec<Probe<D>> = (0..count)
            .map(|index| match backend.device(index) {
                Ok(device) => DeviceController::probe(index, device, policy),
                Err(reason) => Probe::Unsupported { index, reason },
            })
            .collect();

        Self::from_probes(probes, policy)
    }

    pub fn from_probes(probes: Vec<Probe<D>>, policy: &HysteresisPolicy) -> Result<Self> {
        let mut controllers = Vec::with_capacity(probes.len());
        for probe in probes {
            match probe {
                Probe::Supported(controller) => controllers.push(controller),
                Probe::Unsupported { index, reason } => {
                    warn!(target: "memclockd::daemon", "GPU{}: Not supported ({:#})", index, reason);
                }
            }
        }

        if controllers.is_empty() {
            bail!("No supported GPU found");
        }

        let interval = policy.interval();
        debug!(target: "memclockd::daemon", "Loop interval: {:?}", interval);

        Ok(Self {
            controllers,
            interval,
            tick_count: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.controllers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controllers.is_empty()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn controllers(&self) -> &[DeviceController<D>] {
        &self.controllers
    }

    /// One pass over all controllers in construction order. Each controller
    /// samples the clock itself, after the devices before it are done.
    pub fn tick(&mut self) -> TickSummary {
        self.tick_with(|controller| controller.process())
    }

    #[cfg(test)]
    pub(crate) fn tick_at(&mut self, now: std::time::Instant) -> TickSummary {
        self.tick_with(|controller| controller.process_at(now))
    }

    fn tick_with(
        &mut self,
        mut process: impl FnMut(&mut DeviceController<D>) -> TickOutcome,
    ) -> TickSummary {
        self.tick_count = self.tick_count.wrapping_add(1);

        let mut summary = TickSummary::default();
        for controller in &mut self.controllers {
            let outcome = process(controller);
            trace!(target: "memclockd::daemon", "GPU{}: {}", controller.index(), outcome);
            summary.record(outcome);
        }

        if summary.failures > 0 {
            debug!(
                target: "memclockd::daemon",
                "Tick #{}: {} of {} GPU(s) failed to switch clocks",
                self.tick_count,
                summary.failures,
                self.controllers.len()
            );
        }
        summary
    }

    /// Ticks until `shutdown` flips to true or its sender is dropped. The
    /// stop request is only seen while waiting between ticks.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(target: "memclockd::daemon", "Controller loop started ({} GPU(s))", self.controllers.len());

        loop {
            if *shutdown.borrow_and_update() {
                break;
            }

            self.tick();

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!(target: "memclockd::daemon", "Controller loop stopped after {} tick(s)", self.tick_count);
    }

    /// Releases every controller in construction order.
    pub fn close(self) {
        for controller in self.controllers {
            info!(
                target: "memclockd::daemon",
                "GPU{}: {} ({}) releasing",
                controller.index(),
                controller.name(),
                controller.bus_id()
            );
            controller.close();
        }
    }
}
