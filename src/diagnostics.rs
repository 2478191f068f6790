//! Sensor fault log.
//!
//! A sampler that reads outside the safe band queues one
//! [`DiagnosticsEntry`] and stops. The diagnostics task is the only
//! consumer: it stores each entry in a fixed ring and prints it.
//!
//! ## Ring behaviour
//!
//! The write index advances one slot per stored entry. The last slot
//! (`N - 1`) is never written: when the index reaches it, the index resets
//! to 0 and the entry that arrived is dropped without being stored or
//! printed. The drop is counted in [`DiagnosticsLog::dropped`].

use core::fmt::{self, Write};

use embassy_time::Instant;
use log::{debug, info};

use crate::app::state::{HeatingLevel, Seat};
use crate::app::system::Controller;
use crate::telemetry::TaskId;

/// Ring capacity used by the controller.
pub const DIAGNOSTICS_CAPACITY: usize = 256;

/// One sensor fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsEntry {
    /// Milliseconds since the controller started.
    pub timestamp_ms: u64,
    pub seat: Seat,
    /// Heating level at the time of the fault.
    pub level: HeatingLevel,
}

impl fmt::Display for DiagnosticsEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "Temperature Sensor Disabled:")?;
        writeln!(f, "Failure Time Stamp(ms):\t\tSeat:\t\tHeating Level:")?;
        writeln!(f, "{}", "-".repeat(60))?;
        writeln!(
            f,
            "{}\t\t\t\t{}\t\t{}",
            self.timestamp_ms,
            self.seat.name(),
            self.level.as_u8()
        )
    }
}

/// Fixed-capacity fault ring.
pub struct DiagnosticsLog<const N: usize = DIAGNOSTICS_CAPACITY> {
    slots: [Option<DiagnosticsEntry>; N],
    write_index: usize,
    dropped: u32,
}

impl<const N: usize> Default for DiagnosticsLog<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> DiagnosticsLog<N> {
    pub fn new() -> Self {
        Self {
            slots: [None; N],
            write_index: 0,
            dropped: 0,
        }
    }

    /// Store `entry` at the write index and return it for printing, or
    /// reset the index and drop the entry if the index sits on the last slot.
    pub fn record(&mut self, entry: DiagnosticsEntry) -> Option<&DiagnosticsEntry> {
        if self.write_index == N - 1 {
            self.write_index = 0;
            self.dropped = self.dropped.saturating_add(1);
            return None;
        }
        let slot = self.write_index;
        self.slots[slot] = Some(entry);
        self.write_index += 1;
        self.slots[slot].as_ref()
    }

    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Entries lost to index resets.
    pub fn dropped(&self) -> u32 {
        self.dropped
    }

    pub fn get(&self, index: usize) -> Option<&DiagnosticsEntry> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Occupied slots, lowest index first.
    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticsEntry> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Event-driven diagnostics task. Sole owner of the ring.
pub struct DiagnosticsTask<'a, C, const N: usize = DIAGNOSTICS_CAPACITY> {
    ctl: &'a Controller<C>,
    log: DiagnosticsLog<N>,
}

impl<'a, C: Write, const N: usize> DiagnosticsTask<'a, C, N> {
    pub fn new(ctl: &'a Controller<C>) -> Self {
        Self {
            ctl,
            log: DiagnosticsLog::new(),
        }
    }

    pub fn log(&self) -> &DiagnosticsLog<N> {
        &self.log
    }

    /// Wait for one fault and log it. Returns the entry if it was printed.
    pub async fn cycle(&mut self) -> Option<DiagnosticsEntry> {
        let entry = self.ctl.faults.receive().await;
        let timings = &self.ctl.timings;

        let Some(stored) = self.log.record(entry).copied() else {
            let _span = timings.span(TaskId::Diagnostics);
            debug!("diagnostics: ring index reset, {} entry dropped", entry.seat.name());
            return None;
        };

        timings.lock_requested(TaskId::Diagnostics, Instant::now());
        let mut console = self.ctl.console.lock().await;
        let _span = timings.span(TaskId::Diagnostics);
        let _ = write!(console, "{stored}");
        drop(console);
        timings.lock_released(TaskId::Diagnostics, Instant::now());
        info!(
            "diagnostics: logged {} fault at {} ms",
            stored.seat.name(),
            stored.timestamp_ms
        );
        Some(stored)
    }

    pub async fn run(mut self) {
        loop {
            self.cycle().await;
        }
    }
}
