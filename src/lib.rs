#![deny(unused, dead_code)]
#![deny(clippy::all, clippy::pedantic)]
// Module naming: common pattern in domain-driven code
#![allow(clippy::module_name_repetitions)]
// Documentation style: many terms don't need backticks
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
// API ergonomics: prefer simplicity over must_use annotations
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
// Format strings: allow non-inlined for readability
#![allow(clippy::uninlined_format_args)]
// Numeric casts: intentional in unit-conversion code
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_lossless)]
// Error handling style
#![allow(clippy::result_large_err)]

//! Ratebound - bounded, unit-aware data-rate quantities for datastore
//! configuration.
//!
//! A rate is a non-negative count of bytes transferred per second, written in
//! configuration text as `<digits><unit>` with units `B/s`, `KiB/s` and
//! `MiB/s`. Two storage widths exist: [`rate::BytesPerSecondBound`] holds
//! exact 64-bit bytes/sec, [`rate::MebibytesPerSecondBound`] bounds its value
//! to the 32-bit mebibytes/sec range used by stream and compaction throttles.
//! Both parse the same grammar, format through the same largest-exact-unit
//! rule, and compare equal across widths whenever their bytes/sec agree.
//!
//! # Module Organization
//!
//! - `unit` - Unit catalog: symbols and exact scale factors
//! - `rate` - Bounded representations, parsing, formatting, conversions
//! - `config` - Throttle settings that consume the rate types

pub mod config;
pub mod rate;
pub mod unit;

// Re-exports for convenience
pub use config::ThrottleConfig;
pub use rate::{BytesPerSecondBound, MebibytesPerSecondBound, RateError};
pub use unit::RateUnit;
