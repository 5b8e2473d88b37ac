//! The simulation scheduler
//!
//! Owns every spawned process, the event calendar, and the exclusive
//! resources. Events are dispatched in (time, rank, insertion) order; a
//! resume runs to completion before the next event fires, so no two
//! critical sections can ever overlap structurally.
//!
//! The calendar is a keyed priority queue (one pending event per process),
//! which makes explicit reactivation a priority update and cancellation a
//! keyed removal.

use crate::process::{Priority, Process, ProcessId, Wake};
use crate::random::RandomSource;
use crate::time::SimTime;
use priority_queue::PriorityQueue;
use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};

/// Handle to an exclusive resource created with
/// [`Simulation::create_resource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceId(usize);

/// Calendar ordering: earliest time first, control rank before bidder rank
/// at tied times, FIFO within a tie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct EventKey {
    at: SimTime,
    rank: Priority,
    seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcState {
    /// Has a pending calendar event carrying this wake cause.
    Scheduled(Wake),
    /// Queued on a resource; resumed only by a grant.
    Waiting(ResourceId),
    /// Suspended with no pending event; resumed only by `activate`.
    Passive,
    /// Currently inside `resume`.
    Running,
}

struct ProcEntry {
    body: Option<Box<dyn Process>>,
    rank: Priority,
    state: ProcState,
}

#[derive(Default)]
struct Resource {
    holder: Option<ProcessId>,
    queue: VecDeque<ProcessId>,
}

/// The simulation world: virtual clock, processes, calendar, resources and
/// the run's random source.
pub struct Simulation {
    now: SimTime,
    next_pid: u64,
    next_seq: u64,
    procs: HashMap<ProcessId, ProcEntry>,
    calendar: PriorityQueue<ProcessId, Reverse<EventKey>>,
    resources: Vec<Resource>,
    rng: RandomSource,
}

impl Simulation {
    /// Create a simulation with an entropy-seeded random source.
    pub fn new() -> Self {
        Self::with_rng(RandomSource::from_entropy())
    }

    /// Create a deterministic simulation from a seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(RandomSource::from_seed(seed))
    }

    fn with_rng(rng: RandomSource) -> Self {
        Self {
            now: SimTime::ZERO,
            next_pid: 0,
            next_seq: 0,
            procs: HashMap::new(),
            calendar: PriorityQueue::new(),
            resources: Vec::new(),
            rng,
        }
    }

    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn rng(&mut self) -> &mut RandomSource {
        &mut self.rng
    }

    /// Register a new exclusive resource. Resources live for the whole run
    /// and carry no state between holds.
    pub fn create_resource(&mut self) -> ResourceId {
        self.resources.push(Resource::default());
        ResourceId(self.resources.len() - 1)
    }

    /// Spawn a process; its first resume fires at `at` (clamped to now).
    pub fn spawn(&mut self, body: Box<dyn Process>, rank: Priority, at: SimTime) -> ProcessId {
        let pid = ProcessId(self.next_pid);
        self.next_pid += 1;
        self.procs.insert(
            pid,
            ProcEntry {
                body: Some(body),
                rank,
                state: ProcState::Passive,
            },
        );
        self.schedule(pid, at, Wake::Timer);
        pid
    }

    /// Run until the calendar drains; returns the final virtual time.
    pub fn run(&mut self) -> SimTime {
        while let Some((pid, Reverse(key))) = self.calendar.pop() {
            self.now = key.at;
            let (mut body, wake) = {
                let Some(entry) = self.procs.get_mut(&pid) else {
                    continue;
                };
                let state = std::mem::replace(&mut entry.state, ProcState::Running);
                let ProcState::Scheduled(wake) = state else {
                    continue;
                };
                let Some(body) = entry.body.take() else {
                    continue;
                };
                (body, wake)
            };

            log::trace!("dispatch {} at {} ({:?})", pid, self.now, wake);
            body.resume(wake, &mut Context { sim: self, pid });

            let finished = match self.procs.get_mut(&pid) {
                // Cancelled itself during the resume; cleanup already done.
                None => false,
                Some(entry) => {
                    if entry.state == ProcState::Running {
                        true
                    } else {
                        entry.body = Some(body);
                        false
                    }
                }
            };
            if finished {
                self.procs.remove(&pid);
                self.release_all_held(pid);
            }
        }
        self.now
    }

    /// Abort a process: drop it, remove any pending event, pull it out of
    /// every wait queue, and release any resource it holds (granting the
    /// next waiter). Unknown ids are ignored, so cancelling an
    /// already-finished process is safe.
    pub fn cancel(&mut self, pid: ProcessId) {
        if self.procs.remove(&pid).is_none() {
            return;
        }
        self.calendar.remove(&pid);
        for r in &mut self.resources {
            r.queue.retain(|p| *p != pid);
        }
        self.release_all_held(pid);
    }

    fn schedule(&mut self, pid: ProcessId, at: SimTime, wake: Wake) {
        let at = at.max(self.now);
        let Some(entry) = self.procs.get_mut(&pid) else {
            return;
        };
        match entry.state {
            // Queued on a resource: only a grant may wake it.
            ProcState::Waiting(_) => return,
            // A pending grant must not be downgraded to a timer wake.
            ProcState::Scheduled(Wake::Granted(_)) if wake == Wake::Timer => return,
            _ => {}
        }
        entry.state = ProcState::Scheduled(wake);
        let rank = entry.rank;
        self.next_seq += 1;
        self.calendar.push(
            pid,
            Reverse(EventKey {
                at,
                rank,
                seq: self.next_seq,
            }),
        );
    }

    fn request(&mut self, res: ResourceId, pid: ProcessId) -> bool {
        let r = &mut self.resources[res.0];
        if r.holder.is_none() {
            r.holder = Some(pid);
            true
        } else {
            r.queue.push_back(pid);
            if let Some(entry) = self.procs.get_mut(&pid) {
                entry.state = ProcState::Waiting(res);
            }
            false
        }
    }

    fn release(&mut self, res: ResourceId, pid: ProcessId) {
        let r = &mut self.resources[res.0];
        if r.holder != Some(pid) {
            debug_assert!(false, "release by non-holder {}", pid);
            return;
        }
        r.holder = None;
        self.grant_next(res);
    }

    fn release_all_held(&mut self, pid: ProcessId) {
        for i in 0..self.resources.len() {
            if self.resources[i].holder == Some(pid) {
                self.resources[i].holder = None;
                self.grant_next(ResourceId(i));
            }
        }
    }

    /// Grant the resource to the next live waiter, scheduling its grant
    /// wake at the current instant.
    fn grant_next(&mut self, res: ResourceId) {
        loop {
            let Some(next) = self.resources[res.0].queue.pop_front() else {
                return;
            };
            let Some(entry) = self.procs.get_mut(&next) else {
                continue;
            };
            if entry.state != ProcState::Waiting(res) {
                continue;
            }
            self.resources[res.0].holder = Some(next);
            entry.state = ProcState::Scheduled(Wake::Granted(res));
            let rank = entry.rank;
            self.next_seq += 1;
            self.calendar.push(
                next,
                Reverse(EventKey {
                    at: self.now,
                    rank,
                    seq: self.next_seq,
                }),
            );
            return;
        }
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

/// The view a process gets of the simulation while inside `resume`.
pub struct Context<'a> {
    sim: &'a mut Simulation,
    pid: ProcessId,
}

impl Context<'_> {
    pub fn now(&self) -> SimTime {
        self.sim.now
    }

    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    pub fn rng(&mut self) -> &mut RandomSource {
        &mut self.sim.rng
    }

    /// Suspend the calling process for `delay` time units.
    pub fn hold(&mut self, delay: f64) {
        let at = self.sim.now + delay;
        self.sim.schedule(self.pid, at, Wake::Timer);
    }

    /// Suspend the calling process until the given instant.
    pub fn schedule_at(&mut self, at: SimTime) {
        self.sim.schedule(self.pid, at, Wake::Timer);
    }

    /// Suspend indefinitely; only [`Context::activate`] (from another
    /// process) resumes a passive process.
    pub fn passivate(&mut self) {
        if let Some(entry) = self.sim.procs.get_mut(&self.pid) {
            entry.state = ProcState::Passive;
        }
    }

    /// Reactivate a suspended process at the current instant. No-op for
    /// processes waiting on a resource or already gone.
    pub fn activate(&mut self, pid: ProcessId) {
        self.sim.schedule(pid, self.sim.now, Wake::Timer);
    }

    /// Spawn a child process whose first resume fires after `delay`.
    pub fn spawn_in(&mut self, body: Box<dyn Process>, rank: Priority, delay: f64) -> ProcessId {
        let at = self.sim.now + delay;
        self.sim.spawn(body, rank, at)
    }

    /// Abort another process (see [`Simulation::cancel`]).
    pub fn cancel(&mut self, pid: ProcessId) {
        self.sim.cancel(pid);
    }

    /// Try to acquire an exclusive resource. Returns `true` if the caller
    /// now holds it; otherwise the caller is queued and will be resumed
    /// with [`Wake::Granted`] once it reaches the front; it must return
    /// from `resume` without scheduling anything else.
    pub fn request(&mut self, res: ResourceId) -> bool {
        self.sim.request(res, self.pid)
    }

    /// Release a held resource, granting it to the next queued waiter.
    pub fn release(&mut self, res: ResourceId) {
        self.sim.release(res, self.pid);
    }
}
