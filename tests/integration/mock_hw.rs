//! Mock hardware adapters for integration tests.
//!
//! The sensor counts conversions and returns an injectable value; the
//! actuator records every output pattern so tests can assert on the full
//! history without touching real pins.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::atomic::{AtomicI16, AtomicU32, Ordering};

use seatheat::app::ports::{ActuatorPort, HeaterOutputs, SensorPort};
use seatheat::app::state::Celsius;
use seatheat::app::system::Controller;
use seatheat::config::ControllerConfig;

// ── MockSensor ────────────────────────────────────────────────

pub struct MockSensor {
    value: AtomicI16,
    samples: AtomicU32,
}

#[allow(dead_code)]
impl MockSensor {
    pub fn new(value: Celsius) -> Self {
        Self {
            value: AtomicI16::new(value),
            samples: AtomicU32::new(0),
        }
    }

    pub fn set(&self, value: Celsius) {
        self.value.store(value, Ordering::Relaxed);
    }

    /// Conversions performed so far.
    pub fn samples(&self) -> u32 {
        self.samples.load(Ordering::Relaxed)
    }
}

impl SensorPort for MockSensor {
    fn sample(&self) -> Celsius {
        self.samples.fetch_add(1, Ordering::Relaxed);
        self.value.load(Ordering::Relaxed)
    }
}

// ── RecordingActuator ─────────────────────────────────────────

/// Clones share one history, so a test can keep a handle after moving
/// the actuator into a task.
#[derive(Clone, Default)]
pub struct RecordingActuator {
    calls: Rc<RefCell<Vec<HeaterOutputs>>>,
}

#[allow(dead_code)]
impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<HeaterOutputs> {
        self.calls.borrow().clone()
    }

    pub fn last(&self) -> Option<HeaterOutputs> {
        self.calls.borrow().last().copied()
    }
}

impl ActuatorPort for RecordingActuator {
    fn apply(&mut self, outputs: HeaterOutputs) {
        self.calls.borrow_mut().push(outputs);
    }
}

// ── Helpers ───────────────────────────────────────────────────

/// Controller printing into a `String`.
pub fn controller() -> Controller<String> {
    Controller::new(ControllerConfig::default(), String::new())
}

/// Everything printed so far.
pub fn console_text(ctl: &Controller<String>) -> String {
    ctl.console
        .try_lock()
        .map(|c| c.clone())
        .unwrap_or_default()
}
