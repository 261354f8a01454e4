#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Clock and timer service shared by the orchestrator and every entity.
//!
//! Timers are level-triggered ("is it still running?") while alarms are
//! edge-triggered ("did it just fire?"). Both are keyed by an owner and a
//! name, so different owners may reuse names freely.

use std::{
    cell::Cell,
    collections::HashMap,
    rc::Rc,
    time::{Duration, Instant},
};

use moon_patrol_core::EntityId;

/// Source of elapsed time consumed by [`Timers`].
pub trait ClockSource {
    /// Time elapsed since the source was created.
    fn elapsed(&self) -> Duration;
}

/// Wall clock backed by [`Instant`].
#[derive(Clone, Copy, Debug)]
pub struct SystemClock {
    started: Instant,
}

impl SystemClock {
    /// Starts a clock reading zero at the moment of construction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Simulated clock advanced explicitly by its holder.
///
/// Clones share the same reading, so a test or a headless frame pump can keep
/// one handle while [`Timers`] owns another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    reading: Rc<Cell<Duration>>,
}

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the reading forward.
    pub fn advance(&self, by: Duration) {
        self.reading.set(self.reading.get().saturating_add(by));
    }

    /// Replaces the reading.
    pub fn set(&self, at: Duration) {
        self.reading.set(at);
    }

    /// Current reading.
    #[must_use]
    pub fn reading(&self) -> Duration {
        self.reading.get()
    }
}

impl ClockSource for ManualClock {
    fn elapsed(&self) -> Duration {
        self.reading.get()
    }
}

/// Owner half of a timer key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimerOwner {
    /// Timers of the gameplay orchestrator.
    Gameplay,
    /// Timers of a registered entity.
    Entity(EntityId),
}

impl From<EntityId> for TimerOwner {
    fn from(id: EntityId) -> Self {
        Self::Entity(id)
    }
}

#[derive(Debug, Default)]
struct Schedule {
    expiries: HashMap<TimerOwner, HashMap<String, Duration>>,
}

impl Schedule {
    fn insert(&mut self, owner: TimerOwner, name: &str, expiry: Duration) {
        let _ = self
            .expiries
            .entry(owner)
            .or_default()
            .insert(name.to_owned(), expiry);
    }

    fn get(&self, owner: TimerOwner, name: &str) -> Option<Duration> {
        self.expiries
            .get(&owner)
            .and_then(|names| names.get(name))
            .copied()
    }

    fn remove(&mut self, owner: TimerOwner, name: &str) -> bool {
        let Some(names) = self.expiries.get_mut(&owner) else {
            return false;
        };
        let removed = names.remove(name).is_some();
        if names.is_empty() {
            let _ = self.expiries.remove(&owner);
        }
        removed
    }

    fn forget(&mut self, owner: TimerOwner) -> usize {
        self.expiries
            .remove(&owner)
            .map_or(0, |names| names.len())
    }

    fn len(&self) -> usize {
        self.expiries.values().map(HashMap::len).sum()
    }
}

/// Named, owner-scoped interval timers and one-shot alarms.
pub struct Timers {
    clock: Box<dyn ClockSource>,
    high_water: Cell<Duration>,
    timers: Schedule,
    alarms: Schedule,
}

impl std::fmt::Debug for Timers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timers")
            .field("now", &self.high_water.get())
            .field("timers", &self.timers)
            .field("alarms", &self.alarms)
            .finish_non_exhaustive()
    }
}

impl Timers {
    /// Creates a timer service reading time from the provided source.
    #[must_use]
    pub fn new(clock: Box<dyn ClockSource>) -> Self {
        Self {
            clock,
            high_water: Cell::new(Duration::ZERO),
            timers: Schedule::default(),
            alarms: Schedule::default(),
        }
    }

    /// Time elapsed since the clock source started; never decreases.
    #[must_use]
    pub fn now(&self) -> Duration {
        let reading = self.clock.elapsed().max(self.high_water.get());
        self.high_water.set(reading);
        reading
    }

    /// Starts or restarts an interval timer running for `duration`.
    pub fn activate_timer(&mut self, owner: TimerOwner, name: &str, duration: Duration) {
        let expiry = self.now().saturating_add(duration);
        self.timers.insert(owner, name, expiry);
    }

    /// Reports whether the timer is still running, purging it once expired.
    pub fn timer_is_active(&mut self, owner: TimerOwner, name: &str) -> bool {
        let Some(expiry) = self.timers.get(owner, name) else {
            return false;
        };
        if self.now() >= expiry {
            let _ = self.timers.remove(owner, name);
            return false;
        }
        true
    }

    /// Arms a one-shot alarm due after `duration`, replacing an earlier one.
    pub fn set_alarm(&mut self, owner: TimerOwner, name: &str, duration: Duration) {
        let expiry = self.now().saturating_add(duration);
        self.alarms.insert(owner, name, expiry);
    }

    /// Reports whether an alarm is pending, including one that is due but unconsumed.
    #[must_use]
    pub fn alarm_is_set(&self, owner: TimerOwner, name: &str) -> bool {
        self.alarms.get(owner, name).is_some()
    }

    /// Returns `true` exactly once when the alarm is due, consuming it.
    pub fn alarm(&mut self, owner: TimerOwner, name: &str) -> bool {
        let Some(expiry) = self.alarms.get(owner, name) else {
            return false;
        };
        if self.now() < expiry {
            return false;
        }
        self.alarms.remove(owner, name)
    }

    /// Removes an alarm whether or not it is due.
    pub fn cancel_alarm(&mut self, owner: TimerOwner, name: &str) {
        let _ = self.alarms.remove(owner, name);
    }

    /// Drops every timer and alarm held by `owner`, returning how many were dropped.
    pub fn forget_owner(&mut self, owner: TimerOwner) -> usize {
        self.timers.forget(owner) + self.alarms.forget(owner)
    }

    /// Number of timers and alarms currently stored, expired ones included.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.len() + self.alarms.len()
    }
}
