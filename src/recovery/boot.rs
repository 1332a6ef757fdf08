use super::{CrashLog, Flash};
use crate::config::Config;
use crate::hal::ScriptStore;
use crate::lang::Error;
use tracing::{info, warn};

type Result<T> = std::result::Result<T, Error>;

/// Board-level control the recovery path needs.
pub trait Board {
    /// On hardware this does not return.
    fn reboot(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootDecision {
    /// Boot goes on; `failures` earlier boots never reached the checkpoint.
    Continue { failures: usize },
    /// The store was reformatted and the board asked to reboot.
    Reformatted,
}

/// Boot-time guard against a script store that crashes the device.
#[derive(Debug)]
pub struct Recovery<F: Flash> {
    log: CrashLog<F>,
    threshold: usize,
}

impl<F: Flash> Recovery<F> {
    pub fn new(flash: F, config: &Config) -> Recovery<F> {
        Recovery {
            log: CrashLog::new(flash),
            threshold: config.crash_threshold,
        }
    }

    pub fn log(&mut self) -> &mut CrashLog<F> {
        &mut self.log
    }

    /// Runs before the risky part of initialization. At the threshold the
    /// store is reformatted, the log cleared and the board rebooted;
    /// otherwise this boot is recorded as a failure until
    /// [`boot_succeeded`](Recovery::boot_succeeded) says otherwise.
    pub fn boot(&mut self, store: &mut dyn ScriptStore, board: &mut dyn Board) -> Result<BootDecision> {
        let failures = self.log.count()?;
        if failures >= self.threshold {
            warn!("{} failed boots in a row, reformatting script store", failures);
            if let Err(e) = store.format() {
                tracing::error!("reformat failed: {}", e);
                board.reboot();
                return Err(e);
            }
            self.log.clear()?;
            board.reboot();
            return Ok(BootDecision::Reformatted);
        }
        self.log.record_failure()?;
        info!("boot attempt after {} failed boots", failures);
        Ok(BootDecision::Continue { failures })
    }

    /// The success checkpoint. Returns whether the log needed erasing.
    pub fn boot_succeeded(&mut self) -> Result<bool> {
        self.log.clear()
    }
}
