//! GPIO heater adapter.
//!
//! Drives the three heater outputs through any `embedded-hal` 1.0
//! [`OutputPin`]. A pin error is logged and the remaining pins are still
//! written; the port has no way to report failure upward.

use embedded_hal::digital::{OutputPin, PinState};
use log::warn;

use crate::app::ports::{ActuatorPort, HeaterOutputs};

pub struct PinActuator<G, B, R> {
    green: G,
    blue: B,
    red: R,
}

impl<G, B, R> PinActuator<G, B, R>
where
    G: OutputPin,
    B: OutputPin,
    R: OutputPin,
{
    /// Take ownership of the pins and drive all three low.
    pub fn new(green: G, blue: B, red: R) -> Self {
        let mut this = Self { green, blue, red };
        this.apply(HeaterOutputs::OFF);
        this
    }

    pub fn release(self) -> (G, B, R) {
        (self.green, self.blue, self.red)
    }
}

fn drive<P: OutputPin>(pin: &mut P, name: &str, on: bool) {
    if let Err(e) = pin.set_state(PinState::from(on)) {
        warn!("gpio: {name} pin write failed: {e:?}");
    }
}

impl<G, B, R> ActuatorPort for PinActuator<G, B, R>
where
    G: OutputPin,
    B: OutputPin,
    R: OutputPin,
{
    fn apply(&mut self, outputs: HeaterOutputs) {
        drive(&mut self.green, "green", outputs.green);
        drive(&mut self.blue, "blue", outputs.blue);
        drive(&mut self.red, "red", outputs.red);
    }
}
