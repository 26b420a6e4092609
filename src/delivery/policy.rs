//! Backpressure policies
//!
//! The rule governing frame loss or coalescing when frame supply exceeds a
//! track's configured rate.

/// Backpressure policy for a track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Backpressure {
    /// Emit only frames arriving on cadence; late arrivals are dropped and
    /// counted. Preserves arrival order.
    #[default]
    DropLate,
    /// Keep the newest arrival in a single pending slot and emit it on
    /// cadence; suppressed arrivals are counted as drops. Newest wins.
    LatestWins,
    /// Same single-slot coalescing as `LatestWins`, but suppressed arrivals
    /// are not counted as drops: coalescing is lossless from the counter's
    /// perspective.
    Throttle,
}

impl Backpressure {
    /// Wire name of the policy
    pub fn as_str(&self) -> &'static str {
        match self {
            Backpressure::DropLate => "drop-late",
            Backpressure::LatestWins => "latest-wins",
            Backpressure::Throttle => "throttle",
        }
    }
}

impl std::fmt::Display for Backpressure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name
#[derive(Debug, Clone)]
pub struct ParsePolicyError(String);

impl std::fmt::Display for ParsePolicyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Unknown backpressure policy: {}", self.0)
    }
}

impl std::error::Error for ParsePolicyError {}

impl std::str::FromStr for Backpressure {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop-late" => Ok(Backpressure::DropLate),
            "latest-wins" => Ok(Backpressure::LatestWins),
            "throttle" => Ok(Backpressure::Throttle),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}
