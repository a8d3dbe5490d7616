use crate::core::gpu::ClockDevice;
use crate::core::ladder::ClockLadder;
use crate::core::policy::HysteresisPolicy;
use crate::daemon::state::ControlState;
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::{debug, error, info};

/// Owns the memory clock override of one GPU.
///
/// A successfully probed controller has pinned the device to its highest
/// memory clock. The override is handed back to the driver exactly once,
/// either through [`DeviceController::close`] or when the controller is
/// dropped.
pub struct DeviceController<D: ClockDevice> {
    index: u32,
    name: String,
    bus_id: String,
    pub(crate) device: D,
    pub(crate) ladder: ClockLadder,
    pub(crate) policy: HysteresisPolicy,
    pub(crate) state: ControlState,
    released: bool,
}

/// Result of bringing up one device.
pub enum Probe<D: ClockDevice> {
    Supported(DeviceController<D>),
    Unsupported { index: u32, reason: anyhow::Error },
}

impl<D: ClockDevice> Probe<D> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }

    pub fn index(&self) -> u32 {
        match self {
            Self::Supported(c) => c.index(),
            Self::Unsupported { index, .. } => *index,
        }
    }

    pub fn into_controller(self) -> Option<DeviceController<D>> {
        match self {
            Self::Supported(c) => Some(c),
            Self::Unsupported { .. } => None,
        }
    }
}

impl<D: ClockDevice> DeviceController<D> {
    pub fn probe(index: u32, device: D, policy: &HysteresisPolicy) -> Probe<D> {
        Self::probe_at(index, device, policy, Instant::now())
    }

    /// Like [`probe`](Self::probe) with an explicit construction time, which
    /// starts the first dwell window.
    pub fn probe_at(index: u32, device: D, policy: &HysteresisPolicy, now: Instant) -> Probe<D> {
        match Self::attach(index, device, policy, now) {
            Ok(controller) => Probe::Supported(controller),
            Err(reason) => {
                error!(target: "memclockd::controller", "GPU{}: {:#}", index, reason);
                Probe::Unsupported { index, reason }
            }
        }
    }

    fn attach(index: u32, mut device: D, policy: &HysteresisPolicy, now: Instant) -> Result<Self> {
        let name = device.name()?;
        let bus_id = device.pci_bus_id()?;
        info!(target: "memclockd::controller", "GPU{}: {} ({}) initializing", index, name, bus_id);

        let ladder = ClockLadder::from_supported(device.supported_memory_clocks()?)?;
        debug!(target: "memclockd::controller", "GPU{}: Supported memory clocks:", index);
        for mhz in ladder.iter() {
            debug!(target: "memclockd::controller", "GPU{}: {} MHz", index, mhz);
        }
        debug!(target: "memclockd::controller", "GPU{}: Registered power states: {}", index, ladder.len());

        device
            .pin_memory_clock(ladder.highest())
            .context("Failed to manipulate clocks")?;

        debug!(target: "memclockd::controller", "GPU{}: Boost utilization: {}%", index, policy.boost_threshold);
        debug!(target: "memclockd::controller", "GPU{}: Low power utilization: {}%", index, policy.low_power_threshold);
        debug!(target: "memclockd::controller", "GPU{}: Boost time: {:?}", index, policy.boost_dwell);
        debug!(target: "memclockd::controller", "GPU{}: Low power time: {:?}", index, policy.low_power_dwell);
        debug!(
            target: "memclockd::controller",
            "GPU{}: Encoder and decoder utilization: {}",
            index,
            if policy.include_codec { "enabled" } else { "disabled" }
        );
        info!(target: "memclockd::controller", "GPU{}: {} ({}) initialized", index, name, bus_id);

        Ok(Self {
            index,
            name,
            bus_id,
            device,
            ladder,
            policy: policy.clone(),
            state: ControlState::pinned_at_max(now),
            released: false,
        })
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bus_id(&self) -> &str {
        &self.bus_id
    }

    pub fn ladder(&self) -> &ClockLadder {
        &self.ladder
    }

    pub fn state(&self) -> usize {
        self.state.power_state
    }

    pub fn current_clock(&self) -> Option<u32> {
        self.ladder.get(self.state.power_state)
    }

    /// Start of the current dwell window.
    pub fn dwell_since(&self) -> Instant {
        self.state.last_update
    }

    /// Hands the memory clock back to the driver.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        debug!(target: "memclockd::controller", "GPU{}: Resetting memory clocks", self.index);
        if let Err(e) = self.device.reset_memory_clock() {
            error!(target: "memclockd::controller", "GPU{}: {:#}", self.index, e);
        }
    }
}

impl<D: ClockDevice> Drop for DeviceController<D> {
    fn drop(&mut self) {
        self.release();
    }
}
