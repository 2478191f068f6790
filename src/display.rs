//! Status display.
//!
//! Runs on its own period and paces the whole rotation: whatever else
//! happens in a cycle, it hands the rotation token back at the end, which
//! is what lets the next sampler run. When the focused seat is heating it
//! first prints that seat's row under the console lock.

use core::fmt::{self, Write};

use embassy_time::{Duration, Instant, Ticker};
use log::{info, trace};

use crate::app::state::{SeatLifecycle, SeatSnapshot};
use crate::app::system::Controller;
use crate::telemetry::TaskId;

/// Renders the status table for one seat.
pub struct StatusLine<'a>(pub &'a SeatSnapshot);

impl fmt::Display for StatusLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.0;
        writeln!(f)?;
        writeln!(
            f,
            "Seat:\t\tCurrent Temp:\tHeating level:\tHeating Intensity:\tSensor:"
        )?;
        writeln!(f, "{}", "-".repeat(72))?;
        writeln!(
            f,
            "{}\t\t{}\t\t{}\t\t{}\t\t\t{}",
            s.seat.name(),
            s.temperature,
            s.level.as_u8(),
            s.intensity.label(),
            match s.lifecycle {
                SeatLifecycle::Active => "OK",
                SeatLifecycle::Faulted => "FAULT",
            }
        )
    }
}

/// Periodic presentation task.
pub struct PresentationTask<'a, C> {
    ctl: &'a Controller<C>,
}

impl<'a, C: Write> PresentationTask<'a, C> {
    pub fn new(ctl: &'a Controller<C>) -> Self {
        Self { ctl }
    }

    /// Render the focused seat if it is heating, then release the token.
    /// Returns whether a row was printed.
    pub async fn cycle(&self) -> bool {
        let timings = &self.ctl.timings;

        let snapshot = self.ctl.state.snapshot(self.ctl.state.active_seat());
        let rendered = snapshot.is_active();
        let console = if rendered {
            timings.lock_requested(TaskId::Presentation, Instant::now());
            Some(self.ctl.console.lock().await)
        } else {
            None
        };

        // Time spent waiting for the console is not execution time.
        let _span = timings.span(TaskId::Presentation);
        if let Some(mut console) = console {
            let _ = write!(console, "{}", StatusLine(&snapshot));
            drop(console);
            timings.lock_released(TaskId::Presentation, Instant::now());
        }

        if !self.ctl.rotation.release() {
            trace!("display: token was already free");
        }
        rendered
    }

    pub async fn run(self) {
        let period = Duration::from_millis(self.ctl.config.presentation_period_ms);
        info!("display: refreshing every {} ms", period.as_millis());
        let mut ticker = Ticker::every(period);
        loop {
            ticker.next().await;
            self.cycle().await;
        }
    }
}
