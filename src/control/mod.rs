//! Heating decision.
//!
//! Runs on a fixed period, independent of the samplers: it may see the same
//! reading several times, or skip one entirely. Each cycle it compares the
//! latest reading against the seat's desired temperature and raises at most
//! one intensity flag.
//!
//! | Condition (first match wins)                   | Intensity |
//! |------------------------------------------------|-----------|
//! | measured >= desired, level Off, or seat faulted | Disabled  |
//! | difference >= 10                               | High      |
//! | 5 <= difference < 10                           | Medium    |
//! | 1 <= difference < 5                            | Low       |
//! | otherwise                                      | (none)    |

use core::fmt::Write;

use embassy_time::{Duration, Ticker};
use log::{debug, info, trace};

use crate::app::state::{Celsius, HeatingLevel, Intensity};
use crate::app::system::Controller;
use crate::config::ControllerConfig;
use crate::events::intensity_bit;
use crate::sensors::Reading;
use crate::telemetry::TaskId;

const HIGH_MARGIN_C: Celsius = 10;
const MEDIUM_MARGIN_C: Celsius = 5;
const LOW_MARGIN_C: Celsius = 1;

/// Stateless per-cycle classification.
pub fn decide(
    config: &ControllerConfig,
    level: HeatingLevel,
    measured: Celsius,
) -> Option<Intensity> {
    let desired = config.desired_temperature(level);
    if measured >= desired || level == HeatingLevel::Off {
        return Some(Intensity::Disabled);
    }
    match desired - measured {
        d if d >= HIGH_MARGIN_C => Some(Intensity::High),
        d if d >= MEDIUM_MARGIN_C => Some(Intensity::Medium),
        d if d >= LOW_MARGIN_C => Some(Intensity::Low),
        _ => None,
    }
}

/// Periodic control task. Caches the last reading it was handed.
pub struct ControlTask<'a, C> {
    ctl: &'a Controller<C>,
    latest: Option<Reading>,
}

impl<'a, C: Write> ControlTask<'a, C> {
    pub fn new(ctl: &'a Controller<C>) -> Self {
        Self { ctl, latest: None }
    }

    /// Last reading this task has consumed.
    pub fn latest(&self) -> Option<Reading> {
        self.latest
    }

    /// One decision. Returns the raised intensity, if any.
    pub fn cycle(&mut self) -> Option<Intensity> {
        let _span = self.ctl.timings.span(TaskId::Control);

        if let Some(fresh) = self.ctl.readings.try_take() {
            self.latest = Some(fresh);
        }
        let Some(reading) = self.latest else {
            trace!("control: no reading yet");
            return None;
        };

        let record = self.ctl.state.seat(reading.seat);
        let decision = if record.is_faulted() {
            Some(Intensity::Disabled)
        } else {
            decide(&self.ctl.config, record.level(), reading.temperature)
        };

        if let Some(intensity) = decision {
            self.ctl.state.set_decision_seat(reading.seat);
            self.ctl.heating.set(intensity_bit(intensity));
            debug!(
                "control: {} at {} C, level {:?} -> {}",
                reading.seat.name(),
                reading.temperature,
                record.level(),
                intensity.label()
            );
        }
        decision
    }

    pub async fn run(mut self) {
        let period = Duration::from_millis(self.ctl.config.control_period_ms);
        info!("control: deciding every {} ms", period.as_millis());
        let mut ticker = Ticker::every(period);
        loop {
            ticker.next().await;
            self.cycle();
        }
    }
}
