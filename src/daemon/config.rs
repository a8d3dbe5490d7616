use crate::cli::Cli;
use crate::core::config::Settings;
use crate::core::policy::HysteresisPolicy;
use anyhow::Result;

#[derive(Debug, Clone)]
pub struct DaemonConfig {
    pub policy: HysteresisPolicy,
}

impl DaemonConfig {
    /// Command-line values win over the settings file.
    pub fn resolve(cli: &Cli, settings: &Settings) -> Result<Self> {
        let policy = HysteresisPolicy::resolve(&cli.policy_overrides(), &settings.policy)?;
        Ok(Self { policy })
    }
}
