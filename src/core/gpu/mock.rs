use super::{ClockDevice, GpuBackend};
use anyhow::{Result, bail};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Name,
    PciBusId,
    SupportedClocks,
    Pin(u32),
    Reset,
}

impl Call {
    fn is_command(&self) -> bool {
        matches!(self, Self::Pin(_) | Self::Reset)
    }
}

#[derive(Debug)]
struct MockState {
    name: Option<String>,
    clocks: Option<Vec<u32>>,
    core: Option<u32>,
    encoder: Option<u32>,
    decoder: Option<u32>,
    fail_pin: bool,
    fail_reset: bool,
    read_delay: Duration,
    calls: Vec<Call>,
}

/// Scripted device; clones share state so tests can steer a device the
/// controller already owns.
#[derive(Debug, Clone)]
pub struct MockGpu(Rc<RefCell<MockState>>);

impl MockGpu {
    pub fn with_clocks(clocks: &[u32]) -> Self {
        Self(Rc::new(RefCell::new(MockState {
            name: Some("Mock GPU".to_string()),
            clocks: Some(clocks.to_vec()),
            core: Some(0),
            encoder: Some(0),
            decoder: Some(0),
            fail_pin: false,
            fail_reset: false,
            read_delay: Duration::ZERO,
            calls: Vec::new(),
        })))
    }

    pub fn failing_clock_query() -> Self {
        let gpu = Self::with_clocks(&[]);
        gpu.0.borrow_mut().clocks = None;
        gpu
    }

    pub fn failing_name() -> Self {
        let gpu = Self::with_clocks(&[2000, 1000]);
        gpu.0.borrow_mut().name = None;
        gpu
    }

    pub fn set_core(&self, util: Option<u32>) {
        self.0.borrow_mut().core = util;
    }

    pub fn set_codec(&self, encoder: Option<u32>, decoder: Option<u32>) {
        let mut state = self.0.borrow_mut();
        state.encoder = encoder;
        state.decoder = decoder;
    }

    pub fn set_fail_pin(&self, fail: bool) {
        self.0.borrow_mut().fail_pin = fail;
    }

    pub fn set_fail_reset(&self, fail: bool) {
        self.0.borrow_mut().fail_reset = fail;
    }

    /// Makes every core utilization read block for `delay`.
    pub fn set_read_delay(&self, delay: Duration) {
        self.0.borrow_mut().read_delay = delay;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.0.borrow().calls.clone()
    }

    /// Pin and reset calls only, in issue order.
    pub fn commands(&self) -> Vec<Call> {
        self.calls().into_iter().filter(Call::is_command).collect()
    }

    pub fn clear_calls(&self) {
        self.0.borrow_mut().calls.clear();
    }

    fn record(&self, call: Call) {
        self.0.borrow_mut().calls.push(call);
    }
}

impl ClockDevice for MockGpu {
    fn name(&self) -> Result<String> {
        self.record(Call::Name);
        match self.0.borrow().name.clone() {
            Some(name) => Ok(name),
            None => bail!("Failed to get device name: mock"),
        }
    }

    fn pci_bus_id(&self) -> Result<String> {
        self.record(Call::PciBusId);
        Ok("00000000:01:00.0".to_string())
    }

    fn supported_memory_clocks(&self) -> Result<Vec<u32>> {
        self.record(Call::SupportedClocks);
        match self.0.borrow().clocks.clone() {
            Some(clocks) => Ok(clocks),
            None => bail!("Failed to get supported memory clocks: mock"),
        }
    }

    fn pin_memory_clock(&mut self, mhz: u32) -> Result<()> {
        self.record(Call::Pin(mhz));
        if self.0.borrow().fail_pin {
            bail!("Failed to lock memory clock at {} MHz: mock", mhz);
        }
        Ok(())
    }

    fn reset_memory_clock(&mut self) -> Result<()> {
        self.record(Call::Reset);
        if self.0.borrow().fail_reset {
            bail!("Failed to reset memory clocks: mock");
        }
        Ok(())
    }

    fn utilization(&self) -> Result<u32> {
        let delay = self.0.borrow().read_delay;
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        match self.0.borrow().core {
            Some(v) => Ok(v),
            None => bail!("Failed to get utilization: mock"),
        }
    }

    fn encoder_utilization(&self) -> Result<u32> {
        match self.0.borrow().encoder {
            Some(v) => Ok(v),
            None => bail!("Failed to get encoder utilization: mock"),
        }
    }

    fn decoder_utilization(&self) -> Result<u32> {
        match self.0.borrow().decoder {
            Some(v) => Ok(v),
            None => bail!("Failed to get decoder utilization: mock"),
        }
    }
}

/// Backend over a fixed list of mock devices. `None` entries fail handle
/// acquisition.
#[derive(Debug, Default)]
pub struct MockBackend {
    pub devices: Vec<Option<MockGpu>>,
    pub fail_count: bool,
}

impl MockBackend {
    pub fn new(devices: Vec<Option<MockGpu>>) -> Self {
        Self {
            devices,
            fail_count: false,
        }
    }
}

impl GpuBackend for MockBackend {
    type Device<'a> = MockGpu;

    fn device_count(&self) -> Result<u32> {
        if self.fail_count {
            bail!("Failed to get device count: mock");
        }
        Ok(self.devices.len() as u32)
    }

    fn device(&self, index: u32) -> Result<MockGpu> {
        match self.devices.get(index as usize) {
            Some(Some(gpu)) => Ok(gpu.clone()),
            _ => bail!("Failed to get device handle: mock"),
        }
    }
}
