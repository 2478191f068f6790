//! Interrupt-facing and actuator-facing tasks.

pub mod buttons;
pub mod heater;
