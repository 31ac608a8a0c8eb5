//! Scheduler Engine - the dispatch loop
//!
//! ```text
//! loop:
//!   wait until settled, pop head of ready ──► running
//!   │   └─ empty: idle step (tick / wait / terminate)
//!   plan = decisions.plan(..).normalize(..)
//!   for each consumed unit: clock.tick(), wait until settled
//!   lock state ── finished | blocked (+ eager admission) | re-queued
//!   sink.on_cycle(trace)
//! ```

use super::backend::DispatchDecisions;
use super::types::{BurstPlan, CycleControl, SchedulerStats};
use crate::domain::clock::Tick;
use crate::domain::error::SimResult;
use crate::domain::process::Process;
use crate::domain::state::SchedulerState;
use crate::domain::system::SharedSystem;
use crate::domain::trace::{BurstOutcome, CycleTrace};
use parking_lot::MutexGuard;
use std::sync::Arc;
use std::thread;
use tracing::{debug, info, trace};

/// Round-robin scheduler worker
pub struct Scheduler {
    system: Arc<SharedSystem>,
    decisions: Box<dyn DispatchDecisions>,
    stats: SchedulerStats,
}

impl Scheduler {
    /// Create a scheduler over the shared system
    pub fn new(system: Arc<SharedSystem>, decisions: Box<dyn DispatchDecisions>) -> Self {
        Self {
            system,
            decisions,
            stats: SchedulerStats::default(),
        }
    }

    /// Counters so far
    pub fn stats(&self) -> SchedulerStats {
        self.stats
    }

    /// Run dispatch cycles until termination or a global stop
    ///
    /// Termination (drained state plus an elapsed grace period) raises the
    /// stop flag and disconnects every device.
    pub fn run(mut self) -> SimResult<SchedulerStats> {
        info!(
            cpu_fraction = self.system.cpu_fraction,
            devices = self.system.devices.len(),
            "scheduler started"
        );

        loop {
            if self.system.stop.is_raised() {
                debug!("scheduler observed stop flag");
                break;
            }
            match self.dispatch_cycle()? {
                CycleControl::Dispatched => {}
                CycleControl::Idle => thread::sleep(self.system.config.poll_interval()),
                CycleControl::Terminated | CycleControl::Stopped => break,
            }
        }

        info!(
            cycles = self.stats.cycles,
            idle_ticks = self.stats.idle_ticks,
            clock = self.system.clock.read(),
            "scheduler stopped"
        );
        Ok(self.stats)
    }

    /// Execute one scheduler step
    pub fn dispatch_cycle(&mut self) -> SimResult<CycleControl> {
        let system = Arc::clone(&self.system);
        let Some(mut state) = await_settled(&system) else {
            return Ok(CycleControl::Stopped);
        };
        let Some(process) = state.pop_ready()? else {
            return Ok(self.idle_step(&state));
        };
        drop(state);

        self.run_burst(process)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Burst
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    fn run_burst(&mut self, process: Arc<Process>) -> SimResult<CycleControl> {
        let system = Arc::clone(&self.system);
        let cpu_fraction = system.cpu_fraction;
        let device_count = system.devices.len();
        let clock_before = system.clock.read();
        let remaining_before = process.remaining();

        let plan = self
            .decisions
            .plan(&process, cpu_fraction, device_count)
            .normalize(cpu_fraction, device_count);
        let consumed = process.consume_time(plan.cpu_budget(cpu_fraction));

        trace!(pid = %process.pid(), %plan, consumed, clock = clock_before, "dispatched");

        for _ in 0..consumed {
            pace_unit(&system);
            system.clock.tick();
            if await_settled(&system).is_none() {
                return Ok(CycleControl::Stopped);
            }
        }

        let Some(mut state) = await_settled(&system) else {
            return Ok(CycleControl::Stopped);
        };
        let now = system.clock.read();

        let outcome = if process.has_ended() {
            let completion = state.finish_running(now)?;
            info!(pid = %completion.pid, completed_at = completion.completed_at, "process finished");
            BurstOutcome::Finished { consumed }
        } else if let BurstPlan::Device { device, .. } = plan {
            self.request_device(&mut state, &process, device, consumed, now)?
        } else {
            state.requeue_running()?;
            BurstOutcome::Cpu { consumed }
        };

        self.stats.cycles += 1;
        let cycle = CycleTrace {
            cycle: self.stats.cycles,
            clock_before,
            clock_after: now,
            pid: process.pid().clone(),
            remaining_before,
            outcome,
            snapshot: state.snapshot(&system.devices),
        };
        drop(state);

        system.sink.on_cycle(&cycle);
        Ok(CycleControl::Dispatched)
    }

    /// Attach, enqueue and block, then admit what fits at `now`
    fn request_device(
        &mut self,
        state: &mut SchedulerState,
        process: &Arc<Process>,
        index: usize,
        consumed: Tick,
        now: Tick,
    ) -> SimResult<BurstOutcome> {
        let device = Arc::clone(&self.system.devices[index]);

        process.attach_device(Arc::clone(&device))?;
        device.enqueue(Arc::clone(process));
        state.block_running(Arc::clone(&device))?;
        device.admit_pending(state, now)?;

        let unblock_at = state.unblock_time(process.pid()).flatten();
        self.stats.device_requests += 1;
        debug!(
            pid = %process.pid(),
            device = %device.name(),
            clock = now,
            ?unblock_at,
            "device requested"
        );

        Ok(BurstOutcome::Blocked {
            consumed,
            device: device.name().to_string(),
            unblock_at,
        })
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    // Idle handling
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// Nothing ready: tick, wait or terminate
    ///
    /// Called on a settled state. Only acts once the clock has been idle
    /// longer than the grace period: a drained state terminates the run,
    /// anything else advances the clock by one unit.
    fn idle_step(&mut self, state: &SchedulerState) -> CycleControl {
        let reading = self.system.clock.reading();
        if !reading.is_idle_longer_than(self.system.config.idle_grace()) {
            return CycleControl::Idle;
        }

        if state.is_drained() {
            info!(clock = reading.now, "all processes finished, shutting down");
            self.system.shutdown();
            return CycleControl::Terminated;
        }

        let now = self.system.clock.tick();
        self.stats.idle_ticks += 1;
        trace!(clock = now, blocked = state.blocked_len(), "idle tick");
        CycleControl::Idle
    }
}

/// No countdown is due and no device can admit a queued request
fn is_settled(system: &SharedSystem, state: &SchedulerState) -> bool {
    !state.has_due(system.clock.read()) && !system.devices.iter().any(|device| device.has_admissible())
}

/// Wait for the watcher and device workers to catch up with the clock
///
/// Returns the state guard once settled, `None` if the stop flag is raised
/// while waiting.
fn await_settled(system: &SharedSystem) -> Option<MutexGuard<'_, SchedulerState>> {
    loop {
        let state = system.state.lock();
        if is_settled(system, &state) {
            return Some(state);
        }
        drop(state);

        if system.stop.is_raised() {
            return None;
        }
        thread::sleep(system.config.poll_interval());
    }
}

fn pace_unit(system: &SharedSystem) {
    let delay = system.config.unit_delay();
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}
