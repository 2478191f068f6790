//! System configuration parameters
//!
//! All tunable periods and thresholds for the heater core. The host runner
//! can override the defaults from a JSON file.

use embassy_time::Duration;
use serde::{Deserialize, Serialize};

use crate::app::state::{Celsius, HeatingLevel, Seat};
use crate::error::{Error, Result};

/// Longest accepted task period. Keeps tick conversion and ticker
/// deadlines well inside `u64` microseconds.
pub const MAX_PERIOD_MS: u64 = 3_600_000;

/// Core controller configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    // --- Sampling ---
    /// Driver sampler period (milliseconds)
    pub sampler_base_period_ms: u64,
    /// Added per seat index so the samplers never fire together
    pub sampler_period_step_ms: u64,

    // --- Pipeline ---
    /// Control decision period (milliseconds)
    pub control_period_ms: u64,
    /// Display refresh period; paces the whole rotation (milliseconds)
    pub presentation_period_ms: u64,
    /// Load report period (milliseconds)
    pub telemetry_period_ms: u64,
    /// Per-task runtime measurement and the periodic load report
    pub telemetry_enabled: bool,

    // --- Safe band ---
    /// Lowest accepted reading (inclusive)
    pub safe_band_low_c: Celsius,
    /// First rejected reading above the band (exclusive)
    pub safe_band_high_c: Celsius,

    // --- Setpoints ---
    /// Desired temperature at level Off
    pub base_temperature_c: Celsius,
    /// Added per heating level step
    pub level_step_c: Celsius,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            // Sampling
            sampler_base_period_ms: 40,
            sampler_period_step_ms: 20,

            // Pipeline
            control_period_ms: 50,
            presentation_period_ms: 80,
            telemetry_period_ms: 450,
            telemetry_enabled: true,

            // Safe band
            safe_band_low_c: 5,
            safe_band_high_c: 40,

            // Setpoints
            base_temperature_c: 20,
            level_step_c: 5,
        }
    }
}

impl ControllerConfig {
    /// Reject values that would stall the pipeline or fault every sample.
    pub fn validate(&self) -> Result<()> {
        if self.sampler_base_period_ms == 0
            || self.control_period_ms == 0
            || self.presentation_period_ms == 0
            || self.telemetry_period_ms == 0
        {
            return Err(Error::Config("periods must be non-zero"));
        }
        if self.sampler_period_step_ms == 0 {
            return Err(Error::Config("sampler periods must differ per seat"));
        }
        let slowest_sampler = self
            .sampler_period_step_ms
            .checked_mul(Seat::ALL.len() as u64 - 1)
            .and_then(|offset| offset.checked_add(self.sampler_base_period_ms));
        let longest = [
            slowest_sampler,
            Some(self.control_period_ms),
            Some(self.presentation_period_ms),
            Some(self.telemetry_period_ms),
        ];
        if longest.into_iter().any(|p| p.is_none_or(|ms| ms > MAX_PERIOD_MS)) {
            return Err(Error::Config("period too long"));
        }
        if self.safe_band_low_c >= self.safe_band_high_c {
            return Err(Error::Config("empty safe band"));
        }
        if self.level_step_c <= 0 {
            return Err(Error::Config("level step must be positive"));
        }
        let top = Celsius::from(HeatingLevel::High.as_u8());
        if self
            .level_step_c
            .checked_mul(top)
            .and_then(|span| span.checked_add(self.base_temperature_c))
            .is_none()
        {
            return Err(Error::Config("setpoint out of range"));
        }
        Ok(())
    }

    /// Sampling period for one seat: base plus a per-seat offset.
    pub fn sampler_period(&self, seat: Seat) -> Duration {
        Duration::from_millis(
            self.sampler_period_step_ms
                .saturating_mul(seat.index() as u64)
                .saturating_add(self.sampler_base_period_ms),
        )
    }

    /// Target temperature for a heating level. Saturates on a config that
    /// failed [`validate`](Self::validate).
    pub fn desired_temperature(&self, level: HeatingLevel) -> Celsius {
        self.level_step_c
            .saturating_mul(Celsius::from(level.as_u8()))
            .saturating_add(self.base_temperature_c)
    }

    /// True if `reading` lies in `[safe_band_low_c, safe_band_high_c)`.
    pub fn in_safe_band(&self, reading: Celsius) -> bool {
        reading >= self.safe_band_low_c && reading < self.safe_band_high_c
    }
}
