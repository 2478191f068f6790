//! Controller assembly.
//!
//! [`Controller`] owns every piece of shared state and every
//! synchronization primitive. Tasks borrow it; nothing is global.
//!
//! ```text
//!  notify(seat) ─▶ buttons ─▶ ButtonTask ─▶ state.level
//!
//!  SeatSampler ×2 ──rotation.acquire──▶ sensor.sample()
//!        │ ok                      │ out of band
//!        ▼                         ▼
//!     readings ─▶ ControlTask   faults ─▶ DiagnosticsTask ─▶ console
//!                    │
//!                    ▼
//!                 heating ─▶ ActuationTask ─▶ actuator, state.intensity
//!
//!  PresentationTask ─▶ console ─▶ rotation.release()
//!  TelemetryTask ─▶ console
//! ```
//!
//! All tasks run cooperatively on one `edge-executor` [`LocalExecutor`].

use core::fmt::Write;

use edge_executor::LocalExecutor;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;
use embassy_time::{Duration, Instant, Timer};
use log::info;

use crate::app::ports::{ActuatorPort, SensorPort};
use crate::app::state::{Seat, SharedState};
use crate::config::ControllerConfig;
use crate::control::ControlTask;
use crate::diagnostics::{DiagnosticsEntry, DiagnosticsTask};
use crate::display::PresentationTask;
use crate::drivers::buttons::{self, ButtonTask};
use crate::drivers::heater::ActuationTask;
use crate::events::EventFlags;
use crate::rotation::RotationToken;
use crate::sensors::{Reading, SeatSampler};
use crate::telemetry::{TASK_COUNT, TaskTimings, TelemetryTask};

/// Pending fault entries. Each seat faults at most once.
pub const FAULT_QUEUE_DEPTH: usize = 4;

/// Executor slots: eight tasks plus headroom.
const EXECUTOR_TASKS: usize = 16;

/// Everything the tasks share.
pub struct Controller<C> {
    pub config: ControllerConfig,
    pub state: SharedState,
    pub rotation: RotationToken,
    /// Seat button bits, set from interrupt context.
    pub buttons: EventFlags,
    /// Intensity decision bits, set by the control task.
    pub heating: EventFlags,
    /// Latest accepted reading, sampler → control.
    pub readings: Signal<CriticalSectionRawMutex, Reading>,
    /// Fault entries, sampler → diagnostics.
    pub faults: Channel<CriticalSectionRawMutex, DiagnosticsEntry, FAULT_QUEUE_DEPTH>,
    /// Text output, shared by display, telemetry, and diagnostics.
    pub console: Mutex<CriticalSectionRawMutex, C>,
    pub timings: TaskTimings,
}

impl<C: Write> Controller<C> {
    pub fn new(config: ControllerConfig, console: C) -> Self {
        let timings = TaskTimings::with_enabled(Instant::now(), config.telemetry_enabled);
        Self {
            config,
            state: SharedState::new(),
            rotation: RotationToken::new(),
            buttons: EventFlags::new(),
            heating: EventFlags::new(),
            readings: Signal::new(),
            faults: Channel::new(),
            console: Mutex::new(console),
            timings,
        }
    }

    /// Button interrupt entry point.
    pub fn press(&self, seat: Seat) {
        buttons::notify(&self.buttons, seat);
    }

    /// Spawn every task onto `executor`. The telemetry task is left out
    /// when runtime measurement is switched off.
    pub fn spawn<'a, S, A, const N: usize>(
        &'a self,
        executor: &LocalExecutor<'a, N>,
        sensor: &'a S,
        actuator: A,
    ) where
        S: SensorPort,
        A: ActuatorPort + 'a,
    {
        executor.spawn(ButtonTask::new(self).run()).detach();
        for seat in Seat::ALL {
            executor.spawn(SeatSampler::new(seat, self, sensor).run()).detach();
        }
        executor.spawn(ControlTask::new(self).run()).detach();
        executor
            .spawn(ActuationTask::new(self, actuator).run())
            .detach();
        executor.spawn(PresentationTask::new(self).run()).detach();
        let diagnostics: DiagnosticsTask<'_, C> = DiagnosticsTask::new(self);
        executor.spawn(diagnostics.run()).detach();
        let mut spawned = TASK_COUNT;
        if self.config.telemetry_enabled {
            executor.spawn(TelemetryTask::new(self).run()).detach();
        } else {
            spawned -= 1;
            info!("controller: runtime measurement disabled");
        }
        info!("controller: {spawned} tasks spawned");
    }

    /// Run every task until `duration` elapses.
    pub fn run_for<S, A>(&self, sensor: &S, actuator: A, duration: Duration)
    where
        S: SensorPort,
        A: ActuatorPort,
    {
        let executor: LocalExecutor<'_, EXECUTOR_TASKS> = LocalExecutor::new();
        self.spawn(&executor, sensor, actuator);
        futures_lite::future::block_on(executor.run(Timer::after(duration)));
    }

    /// Run every task forever.
    pub fn run<S, A>(&self, sensor: &S, actuator: A)
    where
        S: SensorPort,
        A: ActuatorPort,
    {
        let executor: LocalExecutor<'_, EXECUTOR_TASKS> = LocalExecutor::new();
        self.spawn(&executor, sensor, actuator);
        futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    }
}
