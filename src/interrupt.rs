//! Process-wide interrupt flag.
//!
//! Ctrl-C sets the flag instead of killing the process outright. Running git
//! commands watch it and kill their child, and the run loop stops handing
//! out repositories and suppresses any notification still pending. A second
//! Ctrl-C exits immediately.

use crate::error::{Error, Result};
use crate::exit_codes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A cloneable handle to a shared "user asked us to stop" flag.
#[derive(Debug, Clone, Default)]
pub struct InterruptFlag {
    flag: Arc<AtomicBool>,
}

impl InterruptFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route SIGINT (Ctrl-C) to this flag.
    ///
    /// Can only be called once per process.
    pub fn install(&self) -> Result<()> {
        let flag = self.clone();
        ctrlc::set_handler(move || {
            if flag.is_set() {
                std::process::exit(exit_codes::INTERRUPTED);
            }
            flag.trigger();
        })
        .map_err(|e| Error::Io(std::io::Error::other(e.to_string())))
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Returns `Err(Error::Interrupted)` once the flag is set.
    pub fn check(&self) -> Result<()> {
        if self.is_set() {
            Err(Error::Interrupted)
        } else {
            Ok(())
        }
    }
}
