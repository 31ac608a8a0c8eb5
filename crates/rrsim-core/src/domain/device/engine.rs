//! Device Engine - queue, admission and worker loop

use super::types::{DeviceId, DeviceSnapshot, DeviceSpec};
use crate::domain::clock::Tick;
use crate::domain::error::{InvariantViolation, SimResult};
use crate::domain::process::{Pid, Process};
use crate::domain::state::SchedulerState;
use crate::domain::system::SharedSystem;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use tracing::debug;

/// I/O device with bounded concurrent service
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use rrsim_core::domain::device::{Device, DeviceSpec};
/// use rrsim_core::domain::process::{Process, ProcessSpec};
///
/// let disk = Device::new(0, DeviceSpec::new("disk", 1, 5));
/// disk.enqueue(Arc::new(Process::new(ProcessSpec::new("P1", 10, 100))));
/// disk.enqueue(Arc::new(Process::new(ProcessSpec::new("P2", 10, 100))));
///
/// // Only one slot: P1 is admitted, P2 keeps waiting
/// assert_eq!(disk.admit_next().unwrap().unwrap().pid().as_str(), "P1");
/// assert!(disk.admit_next().unwrap().is_none());
/// assert_eq!(disk.pending_len(), 1);
/// ```
pub struct Device {
    id: DeviceId,
    name: String,
    capacity: usize,
    service_time: Tick,
    queue: Mutex<DeviceQueue>,
    disconnected: AtomicBool,
    admissions: AtomicU64,
}

#[derive(Default)]
struct DeviceQueue {
    pending: VecDeque<Arc<Process>>,
    in_service: Vec<Arc<Process>>,
    peak_in_service: usize,
}

impl Device {
    /// Create a device from its descriptor
    pub fn new(id: usize, spec: DeviceSpec) -> Self {
        Self {
            id: DeviceId::new(id),
            name: spec.name,
            capacity: spec.capacity,
            service_time: spec.service_time,
            queue: Mutex::new(DeviceQueue::default()),
            disconnected: AtomicBool::new(false),
            admissions: AtomicU64::new(0),
        }
    }

    /// Device identifier
    #[inline]
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Device name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Maximum concurrent services
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Logical time cost of one request
    #[inline]
    pub fn service_time(&self) -> Tick {
        self.service_time
    }

    /// Append a request to the tail of the queue
    pub fn enqueue(&self, process: Arc<Process>) {
        self.queue.lock().pending.push_back(process);
    }

    /// Move the head request into service if a slot is free
    ///
    /// Returns the admitted process, or `None` when the queue is empty or
    /// every slot is taken. Does not touch the blocked countdown; callers
    /// holding the scheduler-state lock go through [`Device::admit_pending`].
    pub fn admit_next(&self) -> Result<Option<Arc<Process>>, InvariantViolation> {
        let mut queue = self.queue.lock();
        if queue.in_service.len() >= self.capacity {
            return Ok(None);
        }
        let Some(process) = queue.pending.pop_front() else {
            return Ok(None);
        };

        queue.in_service.push(Arc::clone(&process));
        let in_service = queue.in_service.len();
        if in_service > self.capacity {
            return Err(InvariantViolation::CapacityExceeded {
                device: self.name.clone(),
                in_service,
                capacity: self.capacity,
            });
        }
        queue.peak_in_service = queue.peak_in_service.max(in_service);
        self.admissions.fetch_add(1, Ordering::Relaxed);
        Ok(Some(process))
    }

    /// Admit every request that fits and start each countdown
    ///
    /// The caller holds the scheduler-state lock (`state`), which makes slot
    /// occupation and `unblock_at = now + service_time` (saturating) a single step for
    /// every other worker.
    ///
    /// Returns the number of admitted requests.
    pub fn admit_pending(
        &self,
        state: &mut SchedulerState,
        now: Tick,
    ) -> Result<usize, InvariantViolation> {
        let mut admitted = 0;
        while let Some(process) = self.admit_next()? {
            let unblock_at = now.saturating_add(self.service_time);
            state.start_countdown(process.pid(), unblock_at)?;
            debug!(
                device = %self.name,
                pid = %process.pid(),
                clock = now,
                unblock_at,
                "admitted into service"
            );
            admitted += 1;
        }
        Ok(admitted)
    }

    /// Free the slot held by `pid`
    ///
    /// # Errors
    /// `NotInService` if the process holds no slot on this device.
    pub fn release(&self, pid: &Pid) -> Result<(), InvariantViolation> {
        let mut queue = self.queue.lock();
        let Some(index) = queue.in_service.iter().position(|p| p.pid() == pid) else {
            return Err(InvariantViolation::NotInService {
                pid: pid.clone(),
                device: self.name.clone(),
            });
        };
        queue.in_service.remove(index);
        Ok(())
    }

    /// Check whether a queued request could be admitted right now
    pub fn has_admissible(&self) -> bool {
        let queue = self.queue.lock();
        !queue.pending.is_empty() && queue.in_service.len() < self.capacity
    }

    /// Number of processes occupying a slot
    pub fn in_service_len(&self) -> usize {
        self.queue.lock().in_service.len()
    }

    /// Number of queued requests
    pub fn pending_len(&self) -> usize {
        self.queue.lock().pending.len()
    }

    /// Highest in-service count ever observed
    pub fn peak_in_service(&self) -> usize {
        self.queue.lock().peak_in_service
    }

    /// Total number of admitted requests
    pub fn admissions(&self) -> u64 {
        self.admissions.load(Ordering::Relaxed)
    }

    /// Ask the worker loop to exit at its next iteration boundary
    pub fn disconnect(&self) {
        self.disconnected.store(true, Ordering::Release);
    }

    /// Check whether the device was disconnected
    #[inline]
    pub fn is_disconnected(&self) -> bool {
        self.disconnected.load(Ordering::Acquire)
    }

    /// Consistent view of the queues
    pub fn snapshot(&self) -> DeviceSnapshot {
        let queue = self.queue.lock();
        DeviceSnapshot {
            name: self.name.clone(),
            capacity: self.capacity,
            in_service: queue.in_service.iter().map(|p| p.pid().clone()).collect(),
            pending: queue.pending.iter().map(|p| p.pid().clone()).collect(),
        }
    }

    /// Device worker loop
    ///
    /// Polls for admissible requests until the device is disconnected or the
    /// global stop flag is raised. Admission takes the scheduler-state lock
    /// first, then this device's lock.
    pub fn run(&self, system: &SharedSystem) -> SimResult<()> {
        debug!(device = %self.name, capacity = self.capacity, "device worker started");

        while !self.is_disconnected() && !system.stop.is_raised() {
            if self.has_admissible() {
                let mut state = system.state.lock();
                let now = system.clock.read();
                self.admit_pending(&mut state, now)?;
                continue;
            }
            thread::sleep(system.config.poll_interval());
        }

        debug!(device = %self.name, admissions = self.admissions(), "device worker stopped");
        Ok(())
    }
}

impl fmt::Debug for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Device")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("service_time", &self.service_time)
            .finish()
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}|{}", self.name, self.capacity, self.service_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::process::ProcessSpec;

    fn proc(pid: &str) -> Arc<Process> {
        Arc::new(Process::new(ProcessSpec::new(pid, 10, 100)))
    }

    #[test]
    fn test_fifo_admission() {
        let device = Device::new(0, DeviceSpec::new("printer", 2, 4));
        for pid in ["A", "B", "C"] {
            device.enqueue(proc(pid));
        }

        assert_eq!(device.admit_next().unwrap().unwrap().pid().as_str(), "A");
        assert_eq!(device.admit_next().unwrap().unwrap().pid().as_str(), "B");
        assert!(device.admit_next().unwrap().is_none());

        let snapshot = device.snapshot();
        assert_eq!(snapshot.in_service, vec![Pid::new("A"), Pid::new("B")]);
        assert_eq!(snapshot.pending, vec![Pid::new("C")]);
        assert_eq!(device.peak_in_service(), 2);
    }

    #[test]
    fn test_release_frees_slot_for_next_request() {
        let device = Device::new(0, DeviceSpec::new("printer", 1, 4));
        device.enqueue(proc("A"));
        device.enqueue(proc("B"));

        device.admit_next().unwrap();
        assert!(!device.has_admissible());

        device.release(&Pid::new("A")).unwrap();
        assert!(device.has_admissible());
        assert_eq!(device.admit_next().unwrap().unwrap().pid().as_str(), "B");
        assert_eq!(device.admissions(), 2);
        assert_eq!(device.peak_in_service(), 1);
    }

    #[test]
    fn test_release_unknown_process() {
        let device = Device::new(0, DeviceSpec::new("printer", 1, 4));
        let err = device.release(&Pid::new("ghost")).unwrap_err();
        assert!(matches!(err, InvariantViolation::NotInService { .. }));
    }

    #[test]
    fn test_disconnect_flag() {
        let device = Device::new(3, DeviceSpec::new("tape", 1, 1));
        assert!(!device.is_disconnected());
        device.disconnect();
        assert!(device.is_disconnected());
        assert_eq!(device.id(), DeviceId::new(3));
        assert_eq!(device.to_string(), "tape|1|1");
    }

    #[test]
    fn test_admit_pending_starts_countdowns() {
        let a = proc("A");
        let b = proc("B");
        let device = Arc::new(Device::new(0, DeviceSpec::new("disk", 1, 5)));
        let mut state = SchedulerState::new(vec![Arc::clone(&a), Arc::clone(&b)]);

        for _ in 0..2 {
            let running = state.pop_ready().unwrap().unwrap();
            running.attach_device(Arc::clone(&device)).unwrap();
            device.enqueue(Arc::clone(&running));
            state.block_running(Arc::clone(&device)).unwrap();
        }

        assert_eq!(device.admit_pending(&mut state, 7).unwrap(), 1);
        assert_eq!(state.unblock_time(a.pid()), Some(Some(12)));
        assert_eq!(state.unblock_time(b.pid()), Some(None));
    }

    #[test]
    fn test_admit_pending_saturates_unblock_time() {
        let a = proc("A");
        let device = Arc::new(Device::new(0, DeviceSpec::new("tape", 1, Tick::MAX)));
        let mut state = SchedulerState::new(vec![Arc::clone(&a)]);

        let running = state.pop_ready().unwrap().unwrap();
        running.attach_device(Arc::clone(&device)).unwrap();
        device.enqueue(Arc::clone(&running));
        state.block_running(Arc::clone(&device)).unwrap();

        assert_eq!(device.admit_pending(&mut state, 1).unwrap(), 1);
        assert_eq!(state.unblock_time(a.pid()), Some(Some(Tick::MAX)));
        assert!(!state.has_due(Tick::MAX - 1));
    }
}
