use super::{ClockDevice, GpuBackend};
use anyhow::{Context, Result};
use nvml_wrapper::{Device, Nvml};
use tracing::debug;

pub struct NvmlBackend {
    nvml: Nvml,
}

impl NvmlBackend {
    pub fn init() -> Result<Self> {
        debug!(target: "memclockd::gpu", "Initializing NVML");
        let nvml = Nvml::init().context("Failed to initialize NVML")?;
        Ok(Self { nvml })
    }

    pub fn nvml_version(&self) -> Result<String> {
        self.nvml
            .sys_nvml_version()
            .context("Failed to get NVML version")
    }

    pub fn driver_version(&self) -> Result<String> {
        self.nvml
            .sys_driver_version()
            .context("Failed to get driver version")
    }

    /// Consumes the backend; every device handle must be gone by now.
    pub fn shutdown(self) -> Result<()> {
        debug!(target: "memclockd::gpu", "Shutting down NVML");
        self.nvml.shutdown().context("Failed to shutdown NVML")
    }
}

impl GpuBackend for NvmlBackend {
    type Device<'a> = NvmlDevice<'a>;

    fn device_count(&self) -> Result<u32> {
        self.nvml
            .device_count()
            .context("Failed to get device count")
    }

    fn device(&self, index: u32) -> Result<NvmlDevice<'_>> {
        let device = self
            .nvml
            .device_by_index(index)
            .context("Failed to get device handle")?;
        Ok(NvmlDevice { device })
    }
}

pub struct NvmlDevice<'nvml> {
    device: Device<'nvml>,
}

impl ClockDevice for NvmlDevice<'_> {
    fn name(&self) -> Result<String> {
        self.device.name().context("Failed to get device name")
    }

    fn pci_bus_id(&self) -> Result<String> {
        self.device
            .pci_info()
            .map(|info| info.bus_id)
            .context("Failed to get PCI info")
    }

    fn supported_memory_clocks(&self) -> Result<Vec<u32>> {
        self.device
            .supported_memory_clocks()
            .context("Failed to get supported memory clocks")
    }

    fn pin_memory_clock(&mut self, mhz: u32) -> Result<()> {
        self.device
            .set_mem_locked_clocks(mhz, mhz)
            .with_context(|| format!("Failed to lock memory clock at {} MHz", mhz))
    }

    fn reset_memory_clock(&mut self) -> Result<()> {
        self.device
            .reset_mem_locked_clocks()
            .context("Failed to reset memory clocks")
    }

    fn utilization(&self) -> Result<u32> {
        self.device
            .utilization_rates()
            .map(|u| u.gpu)
            .context("Failed to get utilization")
    }

    fn encoder_utilization(&self) -> Result<u32> {
        self.device
            .encoder_utilization()
            .map(|u| u.utilization)
            .context("Failed to get encoder utilization")
    }

    fn decoder_utilization(&self) -> Result<u32> {
        self.device
            .decoder_utilization()
            .map(|u| u.utilization)
            .context("Failed to get decoder utilization")
    }
}
