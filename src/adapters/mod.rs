//! Adapters: concrete implementations of the port traits.
//!
//! | Adapter   | Implements          | Connects to                    |
//! |-----------|---------------------|--------------------------------|
//! | `sim`     | SensorPort          | Injected value (host runs)     |
//! |           | ActuatorPort        | `log` output                   |
//! | `gpio`    | ActuatorPort        | Three `embedded-hal` pins      |
//! | `console` | `core::fmt::Write`  | Process stdout                 |

pub mod console;
pub mod gpio;
pub mod sim;
