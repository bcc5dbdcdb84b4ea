use std::fmt;

use crate::rate::RateError;

/// Scale factor of a kibibyte per second relative to bytes per second.
pub(crate) const KIB: i64 = 1024;
/// Scale factor of a mebibyte per second relative to bytes per second.
pub(crate) const MIB: i64 = 1024 * 1024;
/// Bytes carried by one megabit (10^6 bits).
pub(crate) const BYTES_PER_MEGABIT: i64 = 125_000;

/// Fixed catalog of data-rate units accepted in configuration text.
///
/// Symbols are case-sensitive literals; anything else is rejected so that a
/// typo in a config file surfaces as an explicit error instead of a silently
/// different throughput.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateUnit {
    BytesPerSecond,
    KibibytesPerSecond,
    MebibytesPerSecond,
}

impl RateUnit {
    /// Resolve a unit from its literal symbol.
    pub fn from_symbol(symbol: &str) -> Result<Self, RateError> {
        match symbol {
            "B/s" => Ok(RateUnit::BytesPerSecond),
            "KiB/s" => Ok(RateUnit::KibibytesPerSecond),
            "MiB/s" => Ok(RateUnit::MebibytesPerSecond),
            other => Err(RateError::UnsupportedUnit(other.to_string())),
        }
    }

    /// Literal symbol used in configuration text.
    pub fn symbol(self) -> &'static str {
        match self {
            RateUnit::BytesPerSecond => "B/s",
            RateUnit::KibibytesPerSecond => "KiB/s",
            RateUnit::MebibytesPerSecond => "MiB/s",
        }
    }

    /// Exact number of bytes per second in one of this unit.
    pub fn bytes_per_unit(self) -> u64 {
        match self {
            RateUnit::BytesPerSecond => 1,
            RateUnit::KibibytesPerSecond => KIB as u64,
            RateUnit::MebibytesPerSecond => MIB as u64,
        }
    }

    /// Snake-case unit name used in ceiling error messages.
    pub(crate) fn bound_name(self) -> &'static str {
        match self {
            RateUnit::BytesPerSecond => "bytes_per_second",
            RateUnit::KibibytesPerSecond => "kibibytes_per_second",
            RateUnit::MebibytesPerSecond => "mebibytes_per_second",
        }
    }
}

impl fmt::Display for RateUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
