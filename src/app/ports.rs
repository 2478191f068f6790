//! Port traits: the boundary between the coordination core and the drivers.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ task (domain)
//! ```
//!
//! Driven adapters (ADC, GPIO) implement these traits. Tasks consume them
//! via generics, so the core never touches hardware directly. Text output
//! goes through [`core::fmt::Write`] rather than a dedicated port.

use crate::app::state::Celsius;

// ───────────────────────────────────────────────────────────────
// Sensor port (driven adapter: hardware → domain)
// ───────────────────────────────────────────────────────────────

/// The single shared temperature channel.
///
/// Takes `&self`: both samplers hold a reference, and the rotation token
/// (not the driver) keeps them from sampling at the same time.
pub trait SensorPort {
    /// Run one conversion and return whole degrees. May block until the
    /// conversion completes; never fails.
    fn sample(&self) -> Celsius;
}

impl<S: SensorPort + ?Sized> SensorPort for &S {
    fn sample(&self) -> Celsius {
        (**self).sample()
    }
}

// ───────────────────────────────────────────────────────────────
// Actuator port (driven adapter: domain → hardware)
// ───────────────────────────────────────────────────────────────

/// Three discrete heater outputs. `true` = on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaterOutputs {
    pub green: bool,
    pub blue: bool,
    pub red: bool,
}

impl HeaterOutputs {
    pub const OFF: Self = Self {
        green: false,
        blue: false,
        red: false,
    };
}

/// Write-side port: idempotent, no acknowledgment.
pub trait ActuatorPort {
    fn apply(&mut self, outputs: HeaterOutputs);
}
