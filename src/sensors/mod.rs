//! Sensor rotation: one periodic sampler per seat sharing a single
//! temperature channel.
//!
//! Each sampler wakes on its own drift-free ticker (the passenger period is
//! offset from the driver's so the two never fire together), waits for the
//! rotation token, focuses the active-seat selector on itself, and takes
//! one sample.
//!
//! | Sample                      | Outcome                                          |
//! |-----------------------------|--------------------------------------------------|
//! | inside `[low, high)`        | temperature stored, [`Reading`] signalled        |
//! | outside the band            | diagnostics entry queued, seat faulted, task ends |
//!
//! The token stays held after sampling; the display task hands it back
//! once the rest of the pipeline has seen this seat.

use core::fmt::Write;

use embassy_time::{Instant, Ticker};
use log::{debug, error, info, warn};

use crate::app::ports::SensorPort;
use crate::app::state::{Celsius, Seat};
use crate::app::system::Controller;
use crate::config::ControllerConfig;
use crate::diagnostics::DiagnosticsEntry;
use crate::error::SensorError;
use crate::telemetry::TaskId;

/// Handoff from a sampler to the control task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reading {
    pub seat: Seat,
    pub temperature: Celsius,
}

/// Result of one sampler cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleOutcome {
    /// Reading accepted and handed to the control task.
    Published(Reading),
    /// Reading rejected; the sampler must stop.
    Faulted(DiagnosticsEntry),
}

/// Accept a sample inside the safe band, reject anything else.
pub fn classify(config: &ControllerConfig, sample: Celsius) -> Result<Celsius, SensorError> {
    if config.in_safe_band(sample) {
        Ok(sample)
    } else {
        Err(SensorError::OutOfRange(sample))
    }
}

/// Periodic sampler for one seat.
pub struct SeatSampler<'a, C, S> {
    seat: Seat,
    ctl: &'a Controller<C>,
    sensor: &'a S,
}

impl<'a, C: Write, S: SensorPort> SeatSampler<'a, C, S> {
    pub fn new(seat: Seat, ctl: &'a Controller<C>, sensor: &'a S) -> Self {
        Self { seat, ctl, sensor }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    /// Acquire the token and take one sample.
    pub async fn cycle(&self) -> SampleOutcome {
        let task = TaskId::sampler(self.seat);
        let timings = &self.ctl.timings;

        timings.lock_requested(task, Instant::now());
        self.ctl.rotation.acquire().await;
        let _span = timings.span(task);

        let state = &self.ctl.state;
        state.focus(self.seat);

        let sample = self.sensor.sample();
        let outcome = match classify(&self.ctl.config, sample) {
            Ok(temperature) => {
                state.publish_temperature(self.seat, temperature);
                let reading = Reading {
                    seat: self.seat,
                    temperature,
                };
                self.ctl.readings.signal(reading);
                debug!("{}: sampled {} C", self.seat.name(), temperature);
                SampleOutcome::Published(reading)
            }
            Err(e) => {
                let entry = DiagnosticsEntry {
                    timestamp_ms: Instant::now()
                        .checked_duration_since(timings.started())
                        .map_or(0, |d| d.as_millis()),
                    seat: self.seat,
                    level: state.seat(self.seat).level(),
                };
                state.mark_faulted(self.seat);
                if self.ctl.faults.try_send(entry).is_err() {
                    warn!("{}: diagnostics queue full, entry lost", self.seat.name());
                }
                error!("{}: {} - sampler stopped", self.seat.name(), e);
                SampleOutcome::Faulted(entry)
            }
        };

        timings.lock_released(task, Instant::now());
        outcome
    }

    /// Sample on the seat's period until a fault retires this sampler.
    pub async fn run(self) {
        let period = self.ctl.config.sampler_period(self.seat);
        info!(
            "{}: sampling every {} ms",
            self.seat.name(),
            period.as_millis()
        );
        let mut ticker = Ticker::every(period);
        loop {
            ticker.next().await;
            if let SampleOutcome::Faulted(_) = self.cycle().await {
                return;
            }
        }
    }
}
