//! Beats-per-minute value type.
//!
//! UltraStar files count four internal beats per musical beat, so all
//! beat-to-time conversions divide by `bpm * 4`. Many uploaded songs carry a
//! BPM that is too low for chart editors to handle; `make_large_enough`
//! doubles the value until it clears [`MINIMUM_BPM`] and reports the factor
//! so note timings can be scaled to match.

use serde::Serialize;
use std::fmt;

/// BPM values below this are doubled until they clear it.
pub const MINIMUM_BPM: f64 = 200.0;

/// Beats per minute of a song.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BeatsPerMinute(f64);

impl BeatsPerMinute {
    pub fn new(value: f64) -> Self {
        Self(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Parses a BPM value with either `.` or `,` as decimal separator.
    pub fn parse(value: &str) -> Result<Self, std::num::ParseFloatError> {
        Ok(Self(value.replace(',', ".").parse()?))
    }

    pub fn beats_to_secs(self, beats: i32) -> f64 {
        f64::from(beats) / (self.0 * 4.0) * 60.0
    }

    pub fn beats_to_ms(self, beats: i32) -> f64 {
        self.beats_to_secs(beats) * 1000.0
    }

    pub fn is_too_low(self) -> bool {
        self.0 < MINIMUM_BPM
    }

    /// Doubles the BPM (if necessary, multiple times) until it reaches
    /// [`MINIMUM_BPM`] and returns the applied power-of-two factor.
    ///
    /// A non-positive BPM cannot be raised by doubling; the value is left
    /// alone and the factor is 1.
    pub fn make_large_enough(&mut self) -> i32 {
        if self.0 <= 0.0 {
            return 1;
        }
        let mut factor = 1_i32;
        while self.0 < MINIMUM_BPM && factor < i32::MAX / 2 {
            self.0 *= 2.0;
            factor *= 2;
        }
        factor
    }
}

impl fmt::Display for BeatsPerMinute {
    /// Up to two decimals, trailing zeros dropped. Display only; not
    /// guaranteed to round-trip exactly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fixed = format!("{:.2}", self.0);
        let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
        write!(f, "{trimmed}")
    }
}
