// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::time::{Duration, Timestamp};

/// The mark/drop probability along with the reference time of the last
/// update in each direction.
///
/// This type makes no decisions: it stores what the
/// [`Updater`](super::update::Updater) tells it to store and keeps the
/// probability within `[0.0, 1.0]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MarkProbability {
    value: f64,
    last_increment: Option<Timestamp>,
    last_decrement: Option<Timestamp>,
}

impl Default for MarkProbability {
    #[inline]
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl MarkProbability {
    /// Creates a state with the given probability and both gates set to "never"
    #[inline]
    pub fn new(value: f64) -> Self {
        let mut state = Self {
            value: 0.0,
            last_increment: None,
            last_decrement: None,
        };
        state.set(value);
        state
    }

    /// Seeds the gate references as if updates had happened at the given times
    #[inline]
    pub fn with_gates(
        mut self,
        last_increment: Option<Timestamp>,
        last_decrement: Option<Timestamp>,
    ) -> Self {
        self.last_increment = last_increment;
        self.last_decrement = last_decrement;
        self
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value
    }

    /// Stores `value` clamped to `[0.0, 1.0]`. NaN is stored as `0.0`.
    #[inline]
    pub fn set(&mut self, value: f64) {
        self.value = if value.is_nan() {
            0.0
        } else {
            value.clamp(0.0, 1.0)
        };
        self.invariants();
    }

    /// The time elapsed since the last increment, or `None` if there hasn't been one
    #[inline]
    pub fn time_since_last_increment(&self, now: Timestamp) -> Option<Duration> {
        self.last_increment
            .map(|last| now.saturating_duration_since(last))
    }

    /// The time elapsed since the last decrement, or `None` if there hasn't been one
    #[inline]
    pub fn time_since_last_decrement(&self, now: Timestamp) -> Option<Duration> {
        self.last_decrement
            .map(|last| now.saturating_duration_since(last))
    }

    #[inline]
    pub fn record_increment(&mut self, now: Timestamp) {
        self.last_increment = Some(now);
    }

    #[inline]
    pub fn record_decrement(&mut self, now: Timestamp) {
        self.last_decrement = Some(now);
    }

    #[inline]
    pub fn last_increment(&self) -> Option<Timestamp> {
        self.last_increment
    }

    #[inline]
    pub fn last_decrement(&self) -> Option<Timestamp> {
        self.last_decrement
    }

    #[inline]
    fn invariants(&self) {
        if cfg!(debug_assertions) {
            assert!(
                (0.0..=1.0).contains(&self.value),
                "mark probability {} out of range",
                self.value
            );
        }
    }
}
