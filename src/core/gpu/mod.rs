//! Hardware access used by the controllers.
//!
//! A backend enumerates devices and hands out owned device handles. Every
//! query and command is synchronous; a slow driver call blocks the caller.

pub mod nvml;

#[cfg(test)]
pub(crate) mod mock;

use anyhow::Result;

pub use nvml::{NvmlBackend, NvmlDevice};

/// Process-wide handle to the hardware management library.
pub trait GpuBackend {
    type Device<'a>: ClockDevice
    where
        Self: 'a;

    fn device_count(&self) -> Result<u32>;

    fn device(&self, index: u32) -> Result<Self::Device<'_>>;
}

/// One GPU whose memory clock can be pinned.
pub trait ClockDevice {
    fn name(&self) -> Result<String>;

    /// Bus id for diagnostics only.
    fn pci_bus_id(&self) -> Result<String>;

    /// Supported memory clocks in MHz, highest first.
    fn supported_memory_clocks(&self) -> Result<Vec<u32>>;

    fn pin_memory_clock(&mut self, mhz: u32) -> Result<()>;

    /// Hand memory clock control back to the driver.
    fn reset_memory_clock(&mut self) -> Result<()>;

    /// Core utilization, percent.
    fn utilization(&self) -> Result<u32>;

    fn encoder_utilization(&self) -> Result<u32>;

    fn decoder_utilization(&self) -> Result<u32>;
}
