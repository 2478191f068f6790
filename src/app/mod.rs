//! Application core: shared seat state, port traits, and the assembled
//! controller that owns every synchronization primitive.
//!
//! All interaction with hardware happens through **port traits** defined
//! in [`ports`], keeping this layer testable without real peripherals.

pub mod ports;
pub mod state;
pub mod system;
