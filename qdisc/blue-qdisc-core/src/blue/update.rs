// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    blue::{
        algorithm::{Algorithm, Direction, Signal},
        probability::MarkProbability,
    },
    time::{Duration, Timestamp},
};

/// The parameters of one update direction
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    /// The amount added to or subtracted from the probability
    pub amount: f64,
    /// The minimum time between two updates in this direction
    pub hold_time: Duration,
    pub algorithm: Algorithm,
}

/// A probability update that passed its gate
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Update {
    pub direction: Direction,
    pub signal: Signal,
    pub previous: f64,
    pub current: f64,
}

/// Applies gated increments and decrements to a [`MarkProbability`].
///
/// An update in a given direction fires only if more than that direction's
/// hold time has passed since the last update that fired in the same
/// direction. Every fired update moves the gate reference to `now`, even if
/// the algorithm ignores the signal or clamping leaves the value unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Updater {
    increment: Step,
    decrement: Step,
}

impl Updater {
    #[inline]
    pub fn new(increment: Step, decrement: Step) -> Self {
        Self {
            increment,
            decrement,
        }
    }

    #[inline]
    pub fn increment_step(&self) -> &Step {
        &self.increment
    }

    #[inline]
    pub fn decrement_step(&self) -> &Step {
        &self.decrement
    }

    /// Raises the probability if the increment gate is open
    #[inline]
    pub fn increment(
        &self,
        signal: Signal,
        now: Timestamp,
        state: &mut MarkProbability,
    ) -> Option<Update> {
        let elapsed = state.time_since_last_increment(now);
        if !Self::is_open(&self.increment, elapsed) {
            return None;
        }

        state.record_increment(now);

        let previous = state.get();
        let Step {
            amount, algorithm, ..
        } = self.increment;
        let next = algorithm.increment(previous, amount, signal);
        state.set(next.min(1.0));

        Some(Update {
            direction: Direction::Increment,
            signal,
            previous,
            current: state.get(),
        })
    }

    /// Lowers the probability if the decrement gate is open
    #[inline]
    pub fn decrement(
        &self,
        signal: Signal,
        now: Timestamp,
        state: &mut MarkProbability,
    ) -> Option<Update> {
        let elapsed = state.time_since_last_decrement(now);
        if !Self::is_open(&self.decrement, elapsed) {
            return None;
        }

        state.record_decrement(now);

        let previous = state.get();
        let Step {
            amount, algorithm, ..
        } = self.decrement;
        let next = algorithm.decrement(previous, amount, signal);
        state.set(next.max(0.0));

        Some(Update {
            direction: Direction::Decrement,
            signal,
            previous,
            current: state.get(),
        })
    }

    #[inline]
    fn is_open(step: &Step, elapsed: Option<Duration>) -> bool {
        // a gate that has never fired is open
        elapsed.map_or(true, |elapsed| elapsed > step.hold_time)
    }
}
