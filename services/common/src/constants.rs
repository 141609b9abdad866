//! Common constants used across all services
//!
//! Single source of truth for contract conventions and time units.

// Options contract conventions
/// Shares delivered per standard US equity option contract
pub const CONTRACT_MULTIPLIER: f64 = 100.0;

// Time constants
pub const MILLIS_PER_SEC: i64 = 1000;
pub const SECS_PER_MIN: i64 = 60;
pub const MINS_PER_HOUR: i64 = 60;
pub const SECS_PER_HOUR: i64 = SECS_PER_MIN * MINS_PER_HOUR;
