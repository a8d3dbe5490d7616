pub mod config;
pub mod controller;
pub mod run;
pub mod scheduler;
pub mod state;
mod tick;

pub use config::DaemonConfig;
pub use controller::{DeviceController, Probe};
pub use scheduler::{ControllerSet, TickSummary};
