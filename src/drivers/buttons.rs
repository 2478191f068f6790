//! Seat button coordinator.
//!
//! ## Interrupt side
//!
//! The button interrupt only calls [`notify`], which sets the seat's bit in
//! the button flag group and returns. No level arithmetic happens there.
//!
//! ## Task side
//!
//! [`ButtonTask`] blocks until either bit is set, clears what it saw, and
//! advances each pressed seat one step through Off → Low → Medium → High
//! → Off. The level write is a single atomic store with no lock; readers
//! may see the old level for one cycle.

use core::fmt::Write;

use log::{info, trace};

use crate::app::state::{HeatingLevel, Seat};
use crate::app::system::Controller;
use crate::events::{ANY_BUTTON, EventFlags, button_bit};
use crate::telemetry::TaskId;

/// Interrupt handler body: record the press and return.
pub fn notify(buttons: &EventFlags, seat: Seat) {
    buttons.set(button_bit(seat));
}

/// Level-cycling task.
pub struct ButtonTask<'a, C> {
    ctl: &'a Controller<C>,
}

impl<'a, C: Write> ButtonTask<'a, C> {
    pub fn new(ctl: &'a Controller<C>) -> Self {
        Self { ctl }
    }

    /// Wait for a press and apply it. Returns the new level of every seat
    /// that was pressed.
    pub async fn cycle(&self) -> heapless::Vec<(Seat, HeatingLevel), 2> {
        let fired = self.ctl.buttons.wait_any(ANY_BUTTON).await;
        let _span = self.ctl.timings.span(TaskId::Buttons);

        let mut changed = heapless::Vec::new();
        for seat in Seat::ALL {
            if fired & button_bit(seat) == 0 {
                continue;
            }
            let level = self.ctl.state.seat(seat).cycle_level();
            info!("{}: level -> {:?}", seat.name(), level);
            // At most one entry per seat.
            let _ = changed.push((seat, level));
        }
        trace!("buttons: handled bits 0b{:02b}", fired);
        changed
    }

    pub async fn run(self) {
        loop {
            self.cycle().await;
        }
    }
}
