//! Simulated hardware for host runs.
//!
//! [`SimSensor`] returns whatever value was last injected, so an operator
//! (or a test) can walk a seat through the safe band and out of it.
//! [`LogActuator`] reports output changes through the logger instead of
//! driving pins.

use core::sync::atomic::{AtomicI16, Ordering};

use log::info;

use crate::app::ports::{ActuatorPort, HeaterOutputs, SensorPort};
use crate::app::state::Celsius;

/// Room temperature, inside the default safe band.
pub const DEFAULT_SIM_TEMPERATURE: Celsius = 20;

/// Shared temperature channel with an injectable value.
#[derive(Debug)]
pub struct SimSensor {
    value: AtomicI16,
}

impl Default for SimSensor {
    fn default() -> Self {
        Self::new(DEFAULT_SIM_TEMPERATURE)
    }
}

impl SimSensor {
    pub const fn new(initial: Celsius) -> Self {
        Self {
            value: AtomicI16::new(initial),
        }
    }

    /// Value returned by every following sample.
    pub fn set(&self, celsius: Celsius) {
        self.value.store(celsius, Ordering::Relaxed);
    }

    pub fn value(&self) -> Celsius {
        self.value.load(Ordering::Relaxed)
    }
}

impl SensorPort for SimSensor {
    fn sample(&self) -> Celsius {
        self.value()
    }
}

/// Actuator that logs each change of output pattern.
#[derive(Debug, Default)]
pub struct LogActuator {
    last: Option<HeaterOutputs>,
    writes: u32,
}

impl LogActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<HeaterOutputs> {
        self.last
    }

    /// Total `apply` calls, repeats included.
    pub fn writes(&self) -> u32 {
        self.writes
    }
}

impl ActuatorPort for LogActuator {
    fn apply(&mut self, outputs: HeaterOutputs) {
        self.writes = self.writes.wrapping_add(1);
        if self.last != Some(outputs) {
            info!(
                "HEATER | green={} blue={} red={}",
                on_off(outputs.green),
                on_off(outputs.blue),
                on_off(outputs.red)
            );
        }
        self.last = Some(outputs);
    }
}

fn on_off(level: bool) -> &'static str {
    if level { "on" } else { "off" }
}
