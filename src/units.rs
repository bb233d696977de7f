use std::str::FromStr;

use crate::error::AggregateError;

/// Time units criterion reports sample measurements in.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    Milliseconds,
    Seconds,
}

impl TimeUnit {
    /// Units per second.
    pub fn scale(self) -> u64 {
        match self {
            TimeUnit::Nanoseconds => 1_000_000_000,
            TimeUnit::Microseconds => 1_000_000,
            TimeUnit::Milliseconds => 1_000,
            TimeUnit::Seconds => 1,
        }
    }
}

impl FromStr for TimeUnit {
    type Err = AggregateError;

    fn from_str(unit: &str) -> Result<Self, Self::Err> {
        match unit {
            "ns" => Ok(TimeUnit::Nanoseconds),
            "us" | "µs" => Ok(TimeUnit::Microseconds),
            "ms" => Ok(TimeUnit::Milliseconds),
            "s" => Ok(TimeUnit::Seconds),
            _ => Err(AggregateError::UnknownUnit {
                unit: unit.to_owned(),
            }),
        }
    }
}
