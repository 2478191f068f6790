//! Runtime measurement and the periodic load report.
//!
//! Every task wraps its body in a [`TaskSpan`] so entry/exit timestamps and
//! accumulated execution time land in [`TaskTimings`]. Tasks that hold a
//! shared resource (the rotation token or the console lock) also stamp the
//! moment they asked for it and the moment they let go. The telemetry task
//! is the only reader: it sums execution time against uptime to estimate
//! load and prints one table per period under the console lock.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicU64, Ordering};

use embassy_time::{Duration, Instant, Ticker};
use log::{debug, info};

use crate::app::state::Seat;
use crate::app::system::Controller;

// ═══════════════════════════════════════════════════════════════
//  Task identities
// ═══════════════════════════════════════════════════════════════

/// Every instrumented task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskId {
    Buttons = 0,
    Control = 1,
    DriverSampler = 2,
    PassengerSampler = 3,
    Actuation = 4,
    Presentation = 5,
    Telemetry = 6,
    Diagnostics = 7,
}

/// Number of instrumented tasks.
pub const TASK_COUNT: usize = 8;

impl TaskId {
    pub const ALL: [TaskId; TASK_COUNT] = [
        TaskId::Buttons,
        TaskId::Control,
        TaskId::DriverSampler,
        TaskId::PassengerSampler,
        TaskId::Actuation,
        TaskId::Presentation,
        TaskId::Telemetry,
        TaskId::Diagnostics,
    ];

    pub const fn sampler(seat: Seat) -> Self {
        match seat {
            Seat::Driver => Self::DriverSampler,
            Seat::Passenger => Self::PassengerSampler,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Buttons => "Buttons",
            Self::Control => "Control",
            Self::DriverSampler => "DriverSampler",
            Self::PassengerSampler => "PassengerSampler",
            Self::Actuation => "Actuation",
            Self::Presentation => "Presentation",
            Self::Telemetry => "Telemetry",
            Self::Diagnostics => "Diagnostics",
        }
    }

    /// Tasks whose report row carries a resource hold time.
    pub const fn has_lock_window(self) -> bool {
        matches!(
            self,
            Self::DriverSampler
                | Self::PassengerSampler
                | Self::Presentation
                | Self::Telemetry
                | Self::Diagnostics
        )
    }

    const fn index(self) -> usize {
        self as usize
    }
}

// ═══════════════════════════════════════════════════════════════
//  Timing storage
// ═══════════════════════════════════════════════════════════════

/// Raw timestamps for one task, in microseconds since `TaskTimings::started`.
#[derive(Default)]
struct TimingSample {
    entered_us: AtomicU64,
    exited_us: AtomicU64,
    last_exec_us: AtomicU64,
    accumulated_us: AtomicU64,
    lock_in_us: AtomicU64,
    lock_out_us: AtomicU64,
}

/// One task's figures as shown in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFigures {
    pub task: TaskId,
    pub last_exec_us: u64,
    pub accumulated_us: u64,
    /// Lock-out minus lock-in for tasks with a lock window.
    pub lock_held_us: Option<u64>,
}

/// Per-task timing table shared by every task.
pub struct TaskTimings {
    started: Instant,
    enabled: bool,
    samples: [TimingSample; TASK_COUNT],
}

impl TaskTimings {
    pub fn new(started: Instant) -> Self {
        Self::with_enabled(started, true)
    }

    /// A disabled table ignores every hook; its figures stay at zero.
    pub fn with_enabled(started: Instant, enabled: bool) -> Self {
        Self {
            started,
            enabled,
            samples: Default::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    fn offset_us(&self, at: Instant) -> u64 {
        at.checked_duration_since(self.started)
            .map_or(0, |d| d.as_micros())
    }

    fn sample(&self, task: TaskId) -> &TimingSample {
        &self.samples[task.index()]
    }

    /// Task body started running.
    pub fn enter(&self, task: TaskId, at: Instant) {
        if !self.enabled {
            return;
        }
        self.sample(task)
            .entered_us
            .store(self.offset_us(at), Ordering::Release);
    }

    /// Task body finished; folds the run into the accumulated total.
    pub fn exit(&self, task: TaskId, at: Instant) {
        if !self.enabled {
            return;
        }
        let s = self.sample(task);
        let exited = self.offset_us(at);
        let ran = exited.saturating_sub(s.entered_us.load(Ordering::Acquire));
        s.exited_us.store(exited, Ordering::Release);
        s.last_exec_us.store(ran, Ordering::Release);
        s.accumulated_us.fetch_add(ran, Ordering::AcqRel);
    }

    /// Task started waiting for its shared resource.
    pub fn lock_requested(&self, task: TaskId, at: Instant) {
        if !self.enabled {
            return;
        }
        self.sample(task)
            .lock_in_us
            .store(self.offset_us(at), Ordering::Release);
    }

    /// Task let go of its shared resource.
    pub fn lock_released(&self, task: TaskId, at: Instant) {
        if !self.enabled {
            return;
        }
        self.sample(task)
            .lock_out_us
            .store(self.offset_us(at), Ordering::Release);
    }

    /// Start a span that records `exit` when dropped.
    pub fn span(&self, task: TaskId) -> TaskSpan<'_> {
        self.enter(task, Instant::now());
        TaskSpan {
            timings: self,
            task,
        }
    }

    pub fn figures(&self, task: TaskId) -> TaskFigures {
        let s = self.sample(task);
        let lock_held_us = task.has_lock_window().then(|| {
            s.lock_out_us
                .load(Ordering::Acquire)
                .saturating_sub(s.lock_in_us.load(Ordering::Acquire))
        });
        TaskFigures {
            task,
            last_exec_us: s.last_exec_us.load(Ordering::Acquire),
            accumulated_us: s.accumulated_us.load(Ordering::Acquire),
            lock_held_us,
        }
    }

    /// Exit timestamp of the last completed run, in microseconds since start.
    pub fn last_exit_us(&self, task: TaskId) -> u64 {
        self.sample(task).exited_us.load(Ordering::Acquire)
    }

    /// Build the report as of `now`.
    pub fn report(&self, now: Instant) -> TelemetryReport {
        let mut rows = heapless::Vec::new();
        let mut busy_us = 0u64;
        for task in TaskId::ALL {
            let f = self.figures(task);
            busy_us = busy_us.saturating_add(f.accumulated_us);
            // Capacity equals TASK_COUNT.
            let _ = rows.push(f);
        }
        TelemetryReport {
            rows,
            load_percent: load_percent(busy_us, self.offset_us(now)),
        }
    }
}

/// RAII guard from [`TaskTimings::span`].
pub struct TaskSpan<'a> {
    timings: &'a TaskTimings,
    task: TaskId,
}

impl Drop for TaskSpan<'_> {
    fn drop(&mut self) {
        self.timings.exit(self.task, Instant::now());
    }
}

/// Busy time as a share of elapsed time, clamped to 100.
pub fn load_percent(busy_us: u64, elapsed_us: u64) -> u8 {
    if elapsed_us == 0 {
        return 0;
    }
    (busy_us.saturating_mul(100) / elapsed_us).min(100) as u8
}

// ═══════════════════════════════════════════════════════════════
//  Report
// ═══════════════════════════════════════════════════════════════

/// One rendered load report.
#[derive(Debug, Clone)]
pub struct TelemetryReport {
    pub rows: heapless::Vec<TaskFigures, TASK_COUNT>,
    pub load_percent: u8,
}

impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<20}{:>12}{:>14}", "Task", "Exec (us)", "Lock (us)")?;
        writeln!(f, "{}", "-".repeat(46))?;
        for row in &self.rows {
            match row.lock_held_us {
                Some(lock) => writeln!(
                    f,
                    "{:<20}{:>12}{:>14}",
                    row.task.name(),
                    row.last_exec_us,
                    lock
                )?,
                None => writeln!(
                    f,
                    "{:<20}{:>12}{:>14}",
                    row.task.name(),
                    row.last_exec_us,
                    "-"
                )?,
            }
        }
        writeln!(f, "CPU load is {}%", self.load_percent)
    }
}

// ═══════════════════════════════════════════════════════════════
//  Task
// ═══════════════════════════════════════════════════════════════

/// Periodic load reporter.
pub struct TelemetryTask<'a, C> {
    ctl: &'a Controller<C>,
}

impl<'a, C: Write> TelemetryTask<'a, C> {
    pub fn new(ctl: &'a Controller<C>) -> Self {
        Self { ctl }
    }

    /// Build one report and print it under the console lock.
    pub async fn cycle(&self) -> TelemetryReport {
        let timings = &self.ctl.timings;
        timings.lock_requested(TaskId::Telemetry, Instant::now());
        let mut console = self.ctl.console.lock().await;

        let _span = timings.span(TaskId::Telemetry);
        let report = timings.report(Instant::now());
        let _ = write!(console, "{report}");
        drop(console);
        timings.lock_released(TaskId::Telemetry, Instant::now());

        debug!("telemetry: load {}%", report.load_percent);
        report
    }

    pub async fn run(self) {
        let period = Duration::from_millis(self.ctl.config.telemetry_period_ms);
        info!("telemetry: reporting every {} ms", period.as_millis());
        let mut ticker = Ticker::every(period);
        loop {
            ticker.next().await;
            self.cycle().await;
        }
    }
}
