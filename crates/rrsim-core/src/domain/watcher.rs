//! Blocked Process Watcher
//!
//! Scans the blocked countdowns and moves every process whose `unblock_at`
//! has been reached back to the tail of the ready queue, one per pass.
//! The scan runs on a copy taken under the state lock; the unblock itself
//! re-acquires the lock and rechecks the countdown.

use crate::domain::error::SimResult;
use crate::domain::system::SharedSystem;
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// Watcher worker
pub struct BlockedProcessWatcher {
    system: Arc<SharedSystem>,
    unblocks: u64,
}

impl BlockedProcessWatcher {
    /// Watcher over the shared system
    pub fn new(system: Arc<SharedSystem>) -> Self {
        Self { system, unblocks: 0 }
    }

    /// Poll until the stop flag is raised, returning the number of unblocks
    pub fn run(mut self) -> SimResult<u64> {
        debug!("watcher started");

        while !self.system.stop().is_raised() {
            if !self.poll_once()? {
                thread::sleep(self.system.config().poll_interval());
            }
        }

        debug!(unblocks = self.unblocks, "watcher stopped");
        Ok(self.unblocks)
    }

    /// Unblock at most one expired process
    ///
    /// Returns `true` if a process was moved back to `ready`.
    pub fn poll_once(&mut self) -> SimResult<bool> {
        let countdowns = self.system.state.lock().countdowns();
        let now = self.system.clock().read();

        let Some((process, _)) = countdowns.into_iter().find(|(_, unblock_at)| now >= *unblock_at) else {
            return Ok(false);
        };

        let clock = {
            let mut state = self.system.state.lock();
            let clock = self.system.clock().read();
            state.unblock(process.pid(), clock)?;
            clock
        };
        self.unblocks += 1;
        self.system.sink.on_unblock(process.pid(), clock);
        Ok(true)
    }
}
