//! Heater actuation.
//!
//! Blocks on the intensity flag group. When several decisions are pending
//! at once, the first match in Disabled → Low → Medium → High wins and the
//! rest are discarded along with it. The label goes to the seat the control
//! task decided for, which may differ from the seat currently on screen.
//!
//! | Intensity | green | blue | red |
//! |-----------|-------|------|-----|
//! | Disabled  | off   | off  | off |
//! | Low       | on    | off  | off |
//! | Medium    | on    | on   | off |
//! | High      | on    | off  | on  |

use core::fmt::Write;

use log::debug;

use crate::app::ports::{ActuatorPort, HeaterOutputs};
use crate::app::state::{Intensity, Seat};
use crate::app::system::Controller;
use crate::events::{
    ANY_INTENSITY, DISABLED_INTENSITY, HIGH_INTENSITY, LOW_INTENSITY, MEDIUM_INTENSITY,
};
use crate::telemetry::TaskId;

/// Pick one intensity from a set of pending flag bits.
pub fn select(bits: u8) -> Option<Intensity> {
    if bits & DISABLED_INTENSITY != 0 {
        Some(Intensity::Disabled)
    } else if bits & LOW_INTENSITY != 0 {
        Some(Intensity::Low)
    } else if bits & MEDIUM_INTENSITY != 0 {
        Some(Intensity::Medium)
    } else if bits & HIGH_INTENSITY != 0 {
        Some(Intensity::High)
    } else {
        None
    }
}

/// Output pattern for an intensity.
pub const fn outputs_for(intensity: Intensity) -> HeaterOutputs {
    match intensity {
        Intensity::Disabled => HeaterOutputs::OFF,
        Intensity::Low => HeaterOutputs {
            green: true,
            blue: false,
            red: false,
        },
        Intensity::Medium => HeaterOutputs {
            green: true,
            blue: true,
            red: false,
        },
        Intensity::High => HeaterOutputs {
            green: true,
            blue: false,
            red: true,
        },
    }
}

/// Event-driven actuation task. Sole owner of the actuator.
pub struct ActuationTask<'a, C, A> {
    ctl: &'a Controller<C>,
    actuator: A,
}

impl<'a, C: Write, A: ActuatorPort> ActuationTask<'a, C, A> {
    pub fn new(ctl: &'a Controller<C>, actuator: A) -> Self {
        Self { ctl, actuator }
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Apply already-collected flag bits to the seat they were decided for.
    pub fn dispatch(&mut self, bits: u8) -> Option<(Seat, Intensity)> {
        let intensity = select(bits)?;
        let seat = self.ctl.state.decision_seat();
        self.ctl.state.set_intensity(seat, intensity);
        self.actuator.apply(outputs_for(intensity));
        debug!("actuation: {} -> {}", seat.name(), intensity.label());
        Some((seat, intensity))
    }

    /// Wait for any intensity flag and apply it.
    pub async fn cycle(&mut self) -> Option<(Seat, Intensity)> {
        let bits = self.ctl.heating.wait_any(ANY_INTENSITY).await;
        let _span = self.ctl.timings.span(TaskId::Actuation);
        self.dispatch(bits)
    }

    pub async fn run(mut self) {
        loop {
            self.cycle().await;
        }
    }
}
