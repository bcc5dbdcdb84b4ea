use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::unit::{RateUnit, BYTES_PER_MEGABIT, KIB, MIB};

/// Errors surfaced when constructing or parsing a rate quantity.
///
/// All three are raised at construction time; accessor conversions never fail
/// (they saturate instead), so a value that was accepted once stays usable in
/// every output unit.
#[derive(Debug, Error)]
pub enum RateError {
    /// Negative input, ceiling exceeded, or text outside the rate grammar.
    #[error("Invalid data rate: {0}")]
    InvalidRate(String),
    /// The digit run of a textual rate is not a well-formed 64-bit integer.
    #[error("For input string: \"{0}\"")]
    NumberFormat(String),
    /// Unit symbol outside the catalog.
    #[error("Unsupported data rate unit: {0}")]
    UnsupportedUnit(String),
}

/// Split `"<digits><symbol>"` into its parts under the strict rate grammar:
/// digits only, immediately followed by a catalog symbol, nothing else.
fn split_quantity(text: &str) -> Result<(i64, RateUnit), RateError> {
    let digits_end = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, symbol) = text.split_at(digits_end);
    if digits.is_empty() {
        return Err(RateError::InvalidRate(text.to_string()));
    }
    // Symbol first: an unknown suffix invalidates the whole input, while an
    // overlong digit run with a known unit is a number-format failure.
    let unit =
        RateUnit::from_symbol(symbol).map_err(|_| RateError::InvalidRate(text.to_string()))?;
    let value = digits
        .parse::<i64>()
        .map_err(|_| RateError::NumberFormat(digits.to_string()))?;
    Ok((value, unit))
}

/// Canonical text form: the largest unit that divides the stored bytes/sec
/// exactly, so parsing the output reproduces an equal quantity.
fn canonical_form(bytes_per_second: i64) -> String {
    for unit in [RateUnit::MebibytesPerSecond, RateUnit::KibibytesPerSecond] {
        let scale = unit.bytes_per_unit() as i64;
        if bytes_per_second % scale == 0 {
            return format!("{}{}", bytes_per_second / scale, unit);
        }
    }
    format!("{bytes_per_second}B/s")
}

fn ceiling_error(value: i64, unit: RateUnit, ceiling: i64, ceiling_unit: RateUnit) -> RateError {
    RateError::InvalidRate(format!(
        "{value}{unit}. It shouldn't be more than {ceiling} in {}",
        ceiling_unit.bound_name()
    ))
}

fn negative_error() -> RateError {
    RateError::InvalidRate("value must be non-negative".to_string())
}

/// Clamp a non-negative 64-bit count into the 32-bit range.
fn saturate_i32(value: i64) -> i32 {
    value.min(i64::from(i32::MAX)) as i32
}

/// A non-negative data rate stored as exact bytes/sec in an `i64`.
///
/// Construction rejects anything above [`Self::MAX_BYTES_PER_SECOND`];
/// accessor conversions into narrower outputs saturate instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BytesPerSecondBound {
    bytes_per_second: i64,
}

impl BytesPerSecondBound {
    /// One below `i64::MAX`, reserved as a sentinel ceiling.
    pub const MAX_BYTES_PER_SECOND: i64 = i64::MAX - 1;

    pub fn new(value: i64, unit: RateUnit) -> Result<Self, RateError> {
        if value < 0 {
            return Err(negative_error());
        }
        let bytes_per_second = value
            .checked_mul(unit.bytes_per_unit() as i64)
            .filter(|bytes| *bytes <= Self::MAX_BYTES_PER_SECOND)
            .ok_or_else(|| {
                ceiling_error(
                    value,
                    unit,
                    Self::MAX_BYTES_PER_SECOND,
                    RateUnit::BytesPerSecond,
                )
            })?;
        Ok(Self { bytes_per_second })
    }

    /// Exact bytes/sec.
    pub fn to_bytes_per_second(&self) -> i64 {
        self.bytes_per_second
    }

    /// Bytes/sec clamped into 32-bit range, for callers with `i32` knobs.
    pub fn to_bytes_per_second_as_i32(&self) -> i32 {
        saturate_i32(self.bytes_per_second)
    }

    /// Whole kibibytes/sec, truncated toward zero.
    pub fn to_kibibytes_per_second(&self) -> i64 {
        self.bytes_per_second / KIB
    }

    pub fn to_kibibytes_per_second_as_i32(&self) -> i32 {
        saturate_i32(self.bytes_per_second / KIB)
    }

    /// Whole mebibytes/sec as a display value. Deliberately lossy: the count
    /// is truncated before widening, so anything under 1 MiB/s reports 0.
    pub fn to_mebibytes_per_second(&self) -> f64 {
        (self.bytes_per_second / MIB) as f64
    }

    pub fn to_mebibytes_per_second_as_i32(&self) -> i32 {
        saturate_i32(self.bytes_per_second / MIB)
    }
}

impl FromStr for BytesPerSecondBound {
    type Err = RateError;

    fn from_str(text: &str) -> Result<Self, RateError> {
        let (value, unit) = split_quantity(text)?;
        Self::new(value, unit)
    }
}

impl fmt::Display for BytesPerSecondBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical_form(self.bytes_per_second))
    }
}

/// A non-negative data rate whose whole-mebibytes/sec projection fits the
/// 32-bit signed range.
///
/// Bytes/sec are still stored exactly (a `"10B/s"` input reports 10 B/s, not
/// zero); only the acceptance ceiling is expressed in mebibytes/sec. The
/// numeric mebibytes/sec constructors normalize to a whole MiB/s count, which
/// is what the legacy megabit-valued settings convert through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MebibytesPerSecondBound {
    bytes_per_second: i64,
}

impl MebibytesPerSecondBound {
    /// One below `i32::MAX`, in mebibytes/sec.
    pub const MAX_MEBIBYTES_PER_SECOND: i64 = i32::MAX as i64 - 1;

    const MAX_BYTES_PER_SECOND: i128 = Self::MAX_MEBIBYTES_PER_SECOND as i128 * MIB as i128;

    pub fn new(value: i64, unit: RateUnit) -> Result<Self, RateError> {
        if value < 0 {
            return Err(negative_error());
        }
        // The bound check runs in i128 so the product itself cannot overflow
        // before it is compared against the ceiling.
        let bytes_per_second = i128::from(value) * i128::from(unit.bytes_per_unit());
        if bytes_per_second > Self::MAX_BYTES_PER_SECOND {
            return Err(ceiling_error(
                value,
                unit,
                Self::MAX_MEBIBYTES_PER_SECOND,
                RateUnit::MebibytesPerSecond,
            ));
        }
        Ok(Self {
            bytes_per_second: bytes_per_second as i64,
        })
    }

    /// Numeric entry point for callers holding a possibly fractional
    /// mebibytes/sec count. The value is rounded to whole mebibytes/sec
    /// before storage.
    pub fn from_mebibytes_per_second(mebibytes_per_second: f64) -> Result<Self, RateError> {
        let max = Self::MAX_MEBIBYTES_PER_SECOND as f64;
        if !(0.0..=max).contains(&mebibytes_per_second) {
            return Err(RateError::InvalidRate(format!(
                "{mebibytes_per_second} mebibytes_per_second. It shouldn't be more than {} in mebibytes_per_second",
                Self::MAX_MEBIBYTES_PER_SECOND
            )));
        }
        let whole = mebibytes_per_second.round() as i64;
        Ok(Self {
            bytes_per_second: whole * MIB,
        })
    }

    /// Convert a legacy megabits/sec setting (1 megabit = 125,000 bytes) to
    /// whole mebibytes/sec. Exists for the settings that were historically
    /// expressed in megabits, hence the key names in the error message.
    pub fn from_megabits_per_second(megabits_per_second: i64) -> Result<Self, RateError> {
        if !(0..=i64::from(i32::MAX)).contains(&megabits_per_second) {
            return Err(RateError::InvalidRate(format!(
                "{megabits_per_second} megabits per second; stream_throughput_outbound and \
                 inter_dc_stream_throughput_outbound should be between 0 and {} in megabits per second",
                i32::MAX
            )));
        }
        let bytes_per_second = megabits_per_second * BYTES_PER_MEGABIT;
        let whole_mebibytes = (bytes_per_second + MIB / 2) / MIB;
        Ok(Self {
            bytes_per_second: whole_mebibytes * MIB,
        })
    }

    /// The zero rate. Consumers of these settings read zero as "no throttle".
    pub fn unthrottled() -> Self {
        Self { bytes_per_second: 0 }
    }

    pub fn is_unthrottled(&self) -> bool {
        self.bytes_per_second == 0
    }

    /// Exact bytes/sec. Always representable: the MiB/s ceiling keeps the
    /// byte count well inside 64-bit range.
    pub fn to_bytes_per_second(&self) -> i64 {
        self.bytes_per_second
    }

    pub fn to_bytes_per_second_as_i32(&self) -> i32 {
        saturate_i32(self.bytes_per_second)
    }

    /// Whole kibibytes/sec, truncated toward zero.
    pub fn to_kibibytes_per_second(&self) -> i64 {
        self.bytes_per_second / KIB
    }

    pub fn to_kibibytes_per_second_as_i32(&self) -> i32 {
        saturate_i32(self.bytes_per_second / KIB)
    }

    /// Whole mebibytes/sec as a display value; lossy below 1 MiB/s, same as
    /// the wide representation.
    pub fn to_mebibytes_per_second(&self) -> f64 {
        (self.bytes_per_second / MIB) as f64
    }

    pub fn to_mebibytes_per_second_as_i32(&self) -> i32 {
        saturate_i32(self.bytes_per_second / MIB)
    }

    /// Whole megabits/sec, truncated toward zero. Operator-facing back-compat
    /// output for the settings converted by [`Self::from_megabits_per_second`].
    pub fn to_megabits_per_second(&self) -> i64 {
        self.bytes_per_second / BYTES_PER_MEGABIT
    }

    pub fn to_megabits_per_second_as_i32(&self) -> i32 {
        saturate_i32(self.bytes_per_second / BYTES_PER_MEGABIT)
    }
}

impl FromStr for MebibytesPerSecondBound {
    type Err = RateError;

    fn from_str(text: &str) -> Result<Self, RateError> {
        let (value, unit) = split_quantity(text)?;
        Self::new(value, unit)
    }
}

impl fmt::Display for MebibytesPerSecondBound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&canonical_form(self.bytes_per_second))
    }
}

// The two widths denote the same abstract quantity; they compare equal
// whenever their bytes/sec projections match, and both hash that projection.
impl PartialEq<MebibytesPerSecondBound> for BytesPerSecondBound {
    fn eq(&self, other: &MebibytesPerSecondBound) -> bool {
        self.bytes_per_second == other.to_bytes_per_second()
    }
}

impl PartialEq<BytesPerSecondBound> for MebibytesPerSecondBound {
    fn eq(&self, other: &BytesPerSecondBound) -> bool {
        self.bytes_per_second == other.to_bytes_per_second()
    }
}

// Rate quantities travel through config files in their canonical text form.
impl Serialize for BytesPerSecondBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for BytesPerSecondBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for MebibytesPerSecondBound {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MebibytesPerSecondBound {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_form_picks_largest_exact_unit() {
        assert_eq!(canonical_form(10), "10B/s");
        assert_eq!(canonical_form(10 * KIB), "10KiB/s");
        assert_eq!(canonical_form(10 * MIB), "10MiB/s");
        assert_eq!(canonical_form(MIB + KIB), "1025KiB/s");
        assert_eq!(canonical_form(KIB + 1), "1025B/s");
    }

    #[test]
    fn zero_formats_as_mebibytes() {
        assert_eq!(canonical_form(0), "0MiB/s");
    }

    #[test]
    fn grammar_rejects_signs_fractions_and_whitespace() {
        for bad in ["-10B/s", "+10B/s", "10.5MiB/s", "10 KiB/s", "", "MiB/s"] {
            let err = bad.parse::<BytesPerSecondBound>().unwrap_err();
            assert!(matches!(err, RateError::InvalidRate(_)), "{bad}: {err}");
        }
    }

    #[test]
    fn overlong_digit_run_is_a_number_format_failure() {
        let err = "9223372036854775809KiB/s"
            .parse::<BytesPerSecondBound>()
            .unwrap_err();
        assert_eq!(err.to_string(), "For input string: \"9223372036854775809\"");
    }

    #[test]
    fn fractional_mebibytes_round_to_whole() {
        let rate = MebibytesPerSecondBound::from_mebibytes_per_second(23.84).unwrap();
        assert_eq!(rate.to_string(), "24MiB/s");
        let rate = MebibytesPerSecondBound::from_mebibytes_per_second(23.4).unwrap();
        assert_eq!(rate.to_string(), "23MiB/s");
    }

    #[test]
    fn fractional_constructor_enforces_ceiling() {
        let err = MebibytesPerSecondBound::from_mebibytes_per_second(2_147_483_648.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid data rate: 2147483648 mebibytes_per_second. \
             It shouldn't be more than 2147483646 in mebibytes_per_second"
        );
        assert!(MebibytesPerSecondBound::from_mebibytes_per_second(-1.0).is_err());
        assert!(MebibytesPerSecondBound::from_mebibytes_per_second(f64::NAN).is_err());
    }

    #[test]
    fn saturation_clamps_to_i32_max() {
        assert_eq!(saturate_i32(i64::from(i32::MAX) + 1), i32::MAX);
        assert_eq!(saturate_i32(42), 42);
    }
}
