//! Dual-seat heater coordination core.
//!
//! Eight cooperative tasks share one temperature channel, one console,
//! and two event-flag groups. The library exposes every task so tests and
//! other runners can drive single cycles; [`app::system::Controller`]
//! wires them together.
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                    Adapters (outer ring)                      │
//! │   SimSensor   LogActuator   PinActuator   StdoutConsole       │
//! │                                                               │
//! │  ──────────────── Port Trait Boundary ────────────────────    │
//! │                                                               │
//! │  ┌─────────────────────────────────────────────────────────┐  │
//! │  │  buttons · samplers · control · heater · display        │  │
//! │  │  diagnostics · telemetry                                │  │
//! │  └─────────────────────────────────────────────────────────┘  │
//! │                                                               │
//! │  SharedState · RotationToken · EventFlags (no globals)        │
//! └───────────────────────────────────────────────────────────────┘
//! ```

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod diagnostics;
pub mod display;
pub mod drivers;
pub mod events;
pub mod rotation;
pub mod sensors;
pub mod telemetry;

mod error;

pub use error::{Error, Result, SensorError};
