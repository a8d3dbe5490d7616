use serde::{Deserialize, Serialize};

/// What a single controller tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No condition qualified; the dwell clock moved to `now`.
    Idle,
    /// A condition qualified but its dwell time has not elapsed yet.
    Pending,
    Boosted { mhz: u32 },
    Lowered { mhz: u32 },
    /// The clock-pin command failed; state was left untouched.
    Failed,
}

impl TickOutcome {
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Boosted { .. } | Self::Lowered { .. })
    }
}

impl std::fmt::Display for TickOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Boosted { mhz } => write!(f, "boosted to {} MHz", mhz),
            Self::Lowered { mhz } => write!(f, "lowered to {} MHz", mhz),
            Self::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Level selected by the number of `-v` flags, if any were given.
    pub fn from_verbosity(count: u8) -> Option<Self> {
        match count {
            0 => None,
            1 => Some(Self::Debug),
            _ => Some(Self::Trace),
        }
    }

    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
