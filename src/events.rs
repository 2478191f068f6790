//! Event-flag groups.
//!
//! An [`EventFlags`] group is a byte of independent bits plus a wake
//! signal. Producers (button interrupts, the control task) set bits without
//! blocking; exactly one consumer task waits for any bit in a mask and
//! clears the bits it observed.
//!
//! ```text
//! ┌─────────────┐  set(bit)  ┌──────────────┐  wait_any(mask)  ┌──────────┐
//! │ ISR / task  │──────────▶│  EventFlags  │────────────────▶│ consumer │
//! └─────────────┘            └──────────────┘                  └──────────┘
//! ```

use core::sync::atomic::{AtomicU8, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use crate::app::state::{Intensity, Seat};

// ── Bit assignments ───────────────────────────────────────────

/// Driver seat button pressed.
pub const DRIVER_BUTTON: u8 = 1 << 0;
/// Passenger seat button pressed.
pub const PASSENGER_BUTTON: u8 = 1 << 1;
/// Both seat buttons.
pub const ANY_BUTTON: u8 = DRIVER_BUTTON | PASSENGER_BUTTON;

pub const DISABLED_INTENSITY: u8 = 1 << 0;
pub const LOW_INTENSITY: u8 = 1 << 1;
pub const MEDIUM_INTENSITY: u8 = 1 << 2;
pub const HIGH_INTENSITY: u8 = 1 << 3;
/// All four intensity decisions.
pub const ANY_INTENSITY: u8 =
    DISABLED_INTENSITY | LOW_INTENSITY | MEDIUM_INTENSITY | HIGH_INTENSITY;

/// Button bit for a seat.
pub const fn button_bit(seat: Seat) -> u8 {
    match seat {
        Seat::Driver => DRIVER_BUTTON,
        Seat::Passenger => PASSENGER_BUTTON,
    }
}

/// Intensity bit for a decision.
pub const fn intensity_bit(intensity: Intensity) -> u8 {
    match intensity {
        Intensity::Disabled => DISABLED_INTENSITY,
        Intensity::Low => LOW_INTENSITY,
        Intensity::Medium => MEDIUM_INTENSITY,
        Intensity::High => HIGH_INTENSITY,
    }
}

// ── Flag group ────────────────────────────────────────────────

/// A group of event bits with a single waiting consumer.
pub struct EventFlags {
    bits: AtomicU8,
    wake: Signal<CriticalSectionRawMutex, ()>,
}

impl Default for EventFlags {
    fn default() -> Self {
        Self::new()
    }
}

impl EventFlags {
    pub const fn new() -> Self {
        Self {
            bits: AtomicU8::new(0),
            wake: Signal::new(),
        }
    }

    /// Set bits and wake the consumer. Never blocks; safe from any thread.
    pub fn set(&self, bits: u8) {
        self.bits.fetch_or(bits, Ordering::AcqRel);
        self.wake.signal(());
    }

    /// Currently pending bits, without clearing them.
    pub fn pending(&self) -> u8 {
        self.bits.load(Ordering::Acquire)
    }

    /// Clear and return whichever bits of `mask` are set, if any.
    pub fn try_take(&self, mask: u8) -> Option<u8> {
        let hit = self.bits.fetch_and(!mask, Ordering::AcqRel) & mask;
        (hit != 0).then_some(hit)
    }

    /// Wait until any bit in `mask` is set, clear those bits, and return them.
    ///
    /// Bits set between the check and the wait leave the signal raised, so
    /// the next wait returns immediately and no edge is lost.
    pub async fn wait_any(&self, mask: u8) -> u8 {
        loop {
            if let Some(hit) = self.try_take(mask) {
                return hit;
            }
            self.wake.wait().await;
        }
    }
}
