//! Seat records and the active-seat selector.
//!
//! `SharedState` is handed to every task by shared reference. Each field is
//! a single atomic: writers are partitioned by task (levels by the button
//! coordinator, temperatures and focus by the sampler holding the rotation
//! token, labels by the actuation task), and readers tolerate a value that
//! is one cycle stale. No lock is taken on this data.

use core::sync::atomic::{AtomicI16, AtomicU8, Ordering};

/// Integer degrees Celsius.
pub type Celsius = i16;

// ═══════════════════════════════════════════════════════════════
//  Enums
// ═══════════════════════════════════════════════════════════════

/// The two heated seats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Seat {
    Driver = 0,
    Passenger = 1,
}

impl Seat {
    pub const ALL: [Seat; 2] = [Seat::Driver, Seat::Passenger];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Driver => "Driver",
            Self::Passenger => "Passenger",
        }
    }

    fn from_u8(raw: u8) -> Self {
        if raw == Self::Passenger as u8 {
            Self::Passenger
        } else {
            Self::Driver
        }
    }
}

/// User-selected heating level, advanced cyclically by the seat button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum HeatingLevel {
    Off = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl HeatingLevel {
    /// Next level in the cycle Off → Low → Medium → High → Off.
    pub const fn next(self) -> Self {
        match self {
            Self::Off => Self::Low,
            Self::Low => Self::Medium,
            Self::Medium => Self::High,
            Self::High => Self::Off,
        }
    }

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(raw: u8) -> Self {
        match raw & 0b11 {
            0 => Self::Off,
            1 => Self::Low,
            2 => Self::Medium,
            _ => Self::High,
        }
    }
}

/// Heating element drive decided by the control task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Intensity {
    Disabled = 0,
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Intensity {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disabled => "DISABLED",
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
        }
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::Low,
            2 => Self::Medium,
            3 => Self::High,
            _ => Self::Disabled,
        }
    }
}

/// Per-seat sensing lifecycle. `Faulted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SeatLifecycle {
    Active = 0,
    Faulted = 1,
}

// ═══════════════════════════════════════════════════════════════
//  Seat record
// ═══════════════════════════════════════════════════════════════

/// Mutable state of one seat.
pub struct SeatRecord {
    seat: Seat,
    level: AtomicU8,
    temperature: AtomicI16,
    intensity: AtomicU8,
    lifecycle: AtomicU8,
}

/// Point-in-time copy of a [`SeatRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatSnapshot {
    pub seat: Seat,
    pub level: HeatingLevel,
    pub temperature: Celsius,
    pub intensity: Intensity,
    pub lifecycle: SeatLifecycle,
}

impl SeatSnapshot {
    /// Derived active flag: the seat is heating at any level above Off.
    pub fn is_active(&self) -> bool {
        self.level != HeatingLevel::Off
    }
}

impl SeatRecord {
    const fn new(seat: Seat) -> Self {
        Self {
            seat,
            level: AtomicU8::new(HeatingLevel::Off as u8),
            temperature: AtomicI16::new(0),
            intensity: AtomicU8::new(Intensity::Disabled as u8),
            lifecycle: AtomicU8::new(SeatLifecycle::Active as u8),
        }
    }

    pub fn seat(&self) -> Seat {
        self.seat
    }

    pub fn level(&self) -> HeatingLevel {
        HeatingLevel::from_u8(self.level.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.level() != HeatingLevel::Off
    }

    /// Advance the level one step and return the new level.
    pub fn cycle_level(&self) -> HeatingLevel {
        let prev = self
            .level
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                Some(HeatingLevel::from_u8(raw).next() as u8)
            })
            .unwrap_or(HeatingLevel::Off as u8);
        HeatingLevel::from_u8(prev).next()
    }

    pub fn temperature(&self) -> Celsius {
        self.temperature.load(Ordering::Acquire)
    }

    pub fn intensity(&self) -> Intensity {
        Intensity::from_u8(self.intensity.load(Ordering::Acquire))
    }

    pub fn lifecycle(&self) -> SeatLifecycle {
        if self.lifecycle.load(Ordering::Acquire) == SeatLifecycle::Faulted as u8 {
            SeatLifecycle::Faulted
        } else {
            SeatLifecycle::Active
        }
    }

    pub fn is_faulted(&self) -> bool {
        self.lifecycle() == SeatLifecycle::Faulted
    }

    pub fn snapshot(&self) -> SeatSnapshot {
        SeatSnapshot {
            seat: self.seat,
            level: self.level(),
            temperature: self.temperature(),
            intensity: self.intensity(),
            lifecycle: self.lifecycle(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
//  Shared state
// ═══════════════════════════════════════════════════════════════

/// Both seat records, the active-seat selector, and the seat the latest
/// heating decision applies to.
pub struct SharedState {
    seats: [SeatRecord; 2],
    active: AtomicU8,
    decided: AtomicU8,
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedState {
    pub const fn new() -> Self {
        Self {
            seats: [SeatRecord::new(Seat::Driver), SeatRecord::new(Seat::Passenger)],
            active: AtomicU8::new(Seat::Driver as u8),
            decided: AtomicU8::new(Seat::Driver as u8),
        }
    }

    pub fn seat(&self, seat: Seat) -> &SeatRecord {
        &self.seats[seat.index()]
    }

    /// Seat whose data downstream stages should consume.
    pub fn active_seat(&self) -> Seat {
        Seat::from_u8(self.active.load(Ordering::Acquire))
    }

    /// Move the selector. Only the sampler holding the rotation token calls this.
    pub fn focus(&self, seat: Seat) {
        self.active.store(seat as u8, Ordering::Release);
    }

    /// Record which seat the next intensity flag is for. Only the control
    /// task calls this, before raising the flag.
    pub fn set_decision_seat(&self, seat: Seat) {
        self.decided.store(seat as u8, Ordering::Release);
    }

    /// Seat the most recent heating decision was made for.
    pub fn decision_seat(&self) -> Seat {
        Seat::from_u8(self.decided.load(Ordering::Acquire))
    }

    pub fn publish_temperature(&self, seat: Seat, celsius: Celsius) {
        self.seat(seat).temperature.store(celsius, Ordering::Release);
    }

    pub fn set_intensity(&self, seat: Seat, intensity: Intensity) {
        self.seat(seat).intensity.store(intensity as u8, Ordering::Release);
    }

    pub fn mark_faulted(&self, seat: Seat) {
        self.seat(seat)
            .lifecycle
            .store(SeatLifecycle::Faulted as u8, Ordering::Release);
    }

    pub fn snapshot(&self, seat: Seat) -> SeatSnapshot {
        self.seat(seat).snapshot()
    }
}
