//! Stdout console.
//!
//! The tasks write through [`core::fmt::Write`]; this adapter forwards to
//! the process stdout and flushes after each write so rows appear as soon
//! as they are rendered.

use core::fmt;
use std::io::{self, Write as _};

#[derive(Debug, Default)]
pub struct StdoutConsole;

impl StdoutConsole {
    pub fn new() -> Self {
        Self
    }
}

impl fmt::Write for StdoutConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut out = io::stdout().lock();
        out.write_all(s.as_bytes()).map_err(|_| fmt::Error)?;
        out.flush().map_err(|_| fmt::Error)
    }
}
