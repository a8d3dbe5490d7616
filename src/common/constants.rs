pub const SETTINGS_FILE: &str = "/etc/memclockd/settings.toml";

/// Floor for the polling interval when a dwell time is zero.
pub const MIN_INTERVAL_MS: u64 = 1;
