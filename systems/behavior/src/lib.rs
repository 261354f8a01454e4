#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Alarm-driven state machines that step through a fixed phase sequence.
//!
//! A machine idles in its first phase until triggered, then advances one
//! phase each time its alarm fires. After the last phase it returns to the
//! idle phase and stops. Each machine owns one alarm named after it, so an
//! entity may run several machines side by side.

use std::{fmt, time::Duration};

use moon_patrol_core::SimulationError;
use moon_patrol_system_timing::{TimerOwner, Timers};

/// Closed, linearly ordered set of phases driven by a [`PhaseMachine`].
pub trait Phase: Copy + Eq + fmt::Debug + 'static {
    /// Name of the machine, also used as the name of its alarm.
    const MACHINE: &'static str;

    /// Phases in the order they are visited. The first entry is the idle phase.
    const SEQUENCE: &'static [Self];

    /// Time the machine dwells in this phase before advancing.
    fn dwell(self) -> Duration;
}

/// Runtime state of one phase machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PhaseMachine<P: Phase> {
    current: Option<P>,
    running: bool,
}

impl<P: Phase> PhaseMachine<P> {
    /// Creates an idle machine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: P::SEQUENCE.first().copied(),
            running: false,
        }
    }

    /// Current phase, or `None` for a machine with an empty sequence.
    #[must_use]
    pub fn current(&self) -> Option<P> {
        self.current
    }

    /// Reports whether the machine is stepping through its sequence.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Starts the sequence from the idle phase; no effect while running.
    pub fn trigger(&mut self) {
        if self.running {
            return;
        }
        self.current = P::SEQUENCE.first().copied();
        self.running = self.current.is_some();
    }

    /// Advances the machine if its alarm is due, arming the alarm when absent.
    ///
    /// Returns the phase entered during this call, if any. At most one phase
    /// is entered per call, so the machine never skips a step.
    pub fn drive(
        &mut self,
        owner: TimerOwner,
        timers: &mut Timers,
    ) -> Result<Option<P>, SimulationError> {
        if !self.running {
            return Ok(None);
        }
        let Some(current) = self.current else {
            self.running = false;
            return Ok(None);
        };

        if !timers.alarm_is_set(owner, P::MACHINE) {
            timers.set_alarm(owner, P::MACHINE, current.dwell());
        }
        if !timers.alarm(owner, P::MACHINE) {
            return Ok(None);
        }

        let index = position_of(current)?;
        match P::SEQUENCE.get(index + 1).copied() {
            Some(next) => {
                self.current = Some(next);
                timers.set_alarm(owner, P::MACHINE, next.dwell());
            }
            None => {
                self.current = P::SEQUENCE.first().copied();
                self.running = false;
            }
        }
        Ok(self.current)
    }

    /// Stops the machine, returns it to idle and cancels its alarm.
    pub fn reset(&mut self, owner: TimerOwner, timers: &mut Timers) {
        timers.cancel_alarm(owner, P::MACHINE);
        self.current = P::SEQUENCE.first().copied();
        self.running = false;
    }

    /// Jumps straight to `phase` and keeps running from there.
    pub fn force(
        &mut self,
        phase: P,
        owner: TimerOwner,
        timers: &mut Timers,
    ) -> Result<(), SimulationError> {
        let _ = position_of(phase)?;
        timers.cancel_alarm(owner, P::MACHINE);
        self.current = Some(phase);
        self.running = true;
        Ok(())
    }
}

impl<P: Phase> Default for PhaseMachine<P> {
    fn default() -> Self {
        Self::new()
    }
}

fn position_of<P: Phase>(phase: P) -> Result<usize, SimulationError> {
    P::SEQUENCE
        .iter()
        .position(|candidate| *candidate == phase)
        .ok_or_else(|| SimulationError::UnknownPhase {
            machine: P::MACHINE,
            phase: format!("{phase:?}"),
        })
}
