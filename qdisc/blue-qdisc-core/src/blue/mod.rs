// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! An implementation of the BLUE active queue management algorithm.
//!
//! BLUE keeps a single mark probability that rises when the queue overflows
//! and falls when the link drains the queue empty. Every arriving unit is
//! dropped early with that probability. Updates in each direction are held
//! back for a configurable interval so a queue hovering around its limit
//! doesn't saturate the probability within a handful of events.

use crate::{
    event::{self, Meta},
    queue::{Item, Mode, Queue},
    random,
    time::Timestamp,
};

pub mod algorithm;
pub mod config;
pub mod probability;
pub mod stats;
pub mod update;


pub use algorithm::{Algorithm, Direction, Signal};
pub use config::{Config, Error};
pub use stats::Stats;

use probability::MarkProbability;
use update::{Update, Updater};

/// Why a unit was refused
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The queue was at its limit
    Forced,
    /// The unit lost the early-drop draw
    Early,
    /// The unit was admitted and then taken back out by the post-admission
    /// occupancy check
    OverLimit,
}

/// The outcome of an enqueue attempt. Dropped units are handed back.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub enum Admission<T> {
    Admitted,
    DroppedForced(T),
    DroppedEarly(T),
    DroppedOverLimit(T),
}

impl<T> Admission<T> {
    #[inline]
    fn dropped(reason: DropReason, item: T) -> Self {
        match reason {
            DropReason::Forced => Self::DroppedForced(item),
            DropReason::Early => Self::DroppedEarly(item),
            DropReason::OverLimit => Self::DroppedOverLimit(item),
        }
    }

    #[inline]
    pub fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }

    #[inline]
    pub fn drop_reason(&self) -> Option<DropReason> {
        match self {
            Self::Admitted => None,
            Self::DroppedForced(_) => Some(DropReason::Forced),
            Self::DroppedEarly(_) => Some(DropReason::Early),
            Self::DroppedOverLimit(_) => Some(DropReason::OverLimit),
        }
    }

    /// Returns the unit if it was dropped
    #[inline]
    pub fn into_dropped(self) -> Option<T> {
        match self {
            Self::Admitted => None,
            Self::DroppedForced(item) | Self::DroppedEarly(item) | Self::DroppedOverLimit(item) => {
                Some(item)
            }
        }
    }
}

/// A queue disc that admits, drops and drains units according to BLUE.
///
/// The disc exclusively owns its backing store and event subscriber. Time
/// and randomness come from the caller on every operation, so a run is
/// reproducible given the same sequence of calls and random stream.
///
/// Operations are not individually atomic; a concurrent host should guard
/// the whole disc with a single lock.
#[derive(Debug)]
pub struct BlueQueueDisc<Q, S = ()> {
    config: Config,
    updater: Updater,
    probability: MarkProbability,
    stats: Stats,
    queue: Q,
    subscriber: S,
}

impl<Q: Queue> BlueQueueDisc<Q> {
    /// Creates a disc backed by `queue`
    ///
    /// Fails if the queue measures a different unit than `config`, can't
    /// hold `config.queue_limit()` or already holds items.
    #[inline]
    pub fn new(config: Config, queue: Q) -> Result<Self, Error> {
        Self::with_subscriber(config, queue, ())
    }
}

#[cfg(feature = "alloc")]
impl<T: Item> BlueQueueDisc<crate::queue::DropTail<T>> {
    /// Creates a disc backed by a [`DropTail`](crate::queue::DropTail) store
    /// sized to the configured limit
    #[inline]
    pub fn with_drop_tail(config: Config) -> Self {
        let queue = crate::queue::DropTail::new(config.mode(), config.queue_limit());
        Self::from_parts(config, queue, ())
    }
}

impl<Q: Queue, S: event::Subscriber> BlueQueueDisc<Q, S> {
    /// Creates a disc backed by `queue` that notifies `subscriber` of every event
    #[inline]
    pub fn with_subscriber(config: Config, queue: Q, subscriber: S) -> Result<Self, Error> {
        config.validate_queue(&queue)?;
        Ok(Self::from_parts(config, queue, subscriber))
    }

    #[inline]
    fn from_parts(config: Config, queue: Q, subscriber: S) -> Self {
        Self {
            updater: config.updater(),
            probability: config.initial_state(),
            stats: Stats::default(),
            config,
            queue,
            subscriber,
        }
    }

    /// Replaces the event subscriber
    #[inline]
    pub fn with_event<E: event::Subscriber>(self, subscriber: E) -> BlueQueueDisc<Q, E> {
        let Self {
            config,
            updater,
            probability,
            stats,
            queue,
            subscriber: _,
        } = self;

        BlueQueueDisc {
            config,
            updater,
            probability,
            stats,
            queue,
            subscriber,
        }
    }

    /// Attempts to admit `item` to the queue
    pub fn try_enqueue<R: random::Generator + ?Sized>(
        &mut self,
        item: Q::Item,
        now: Timestamp,
        random_generator: &mut R,
    ) -> Admission<Q::Item> {
        let occupied = self.current_occupancy();
        let size = item.size();

        // reactive: the queue is physically full
        let is_full = match self.config.mode() {
            Mode::Packets => occupied >= self.config.queue_limit(),
            Mode::Bytes => occupied as u64 + size as u64 > self.config.queue_limit() as u64,
        };

        if is_full {
            self.on_increment(Signal::Primary, now);
            return self.on_drop(DropReason::Forced, item, occupied, now);
        }

        // proactive: drop with the mark probability, whether or not the unit fits
        if self.is_early_drop(random_generator) {
            return self.on_drop(DropReason::Early, item, occupied, now);
        }

        if let Err(item) = self.queue.push(item) {
            self.on_increment(Signal::Primary, now);
            return self.on_drop(DropReason::Forced, item, occupied, now);
        }

        // The store is re-checked in bytes against `queue_limit * mean_packet_size`,
        // even in packet mode. Units that pass the hard limit can still be taken
        // back out here.
        if self.queue.occupied_bytes() as u64 > self.config.overlimit_bytes() {
            if let Some(item) = self.queue.pop_back() {
                self.on_increment(Signal::Primary, now);
                let occupied = self.current_occupancy();
                return self.on_drop(DropReason::OverLimit, item, occupied, now);
            }
        }

        self.subscriber.on_packet_enqueued(
            &Meta::new(now),
            &event::PacketEnqueued {
                size,
                occupancy: self.current_occupancy(),
            },
        );

        Admission::Admitted
    }

    /// Pops the unit at the front of the queue.
    ///
    /// Finding the queue empty means the link has gone idle, which triggers a
    /// decrement. Popping a unit leaves the probability alone.
    pub fn dequeue(&mut self, now: Timestamp) -> Option<Q::Item> {
        let Some(item) = self.queue.pop() else {
            self.on_decrement(Signal::Primary, now);
            return None;
        };

        self.subscriber.on_packet_dequeued(
            &Meta::new(now),
            &event::PacketDequeued {
                size: item.size(),
                occupancy: self.current_occupancy(),
            },
        );

        Some(item)
    }

    /// Returns the unit at the front of the queue without removing it
    #[inline]
    pub fn peek(&self) -> Option<&Q::Item> {
        self.queue.peek_front()
    }

    /// Raises the mark probability if the increment gate is open.
    ///
    /// Returns `true` if the update fired.
    #[inline]
    pub fn increment(&mut self, signal: Signal, now: Timestamp) -> bool {
        self.on_increment(signal, now)
    }

    /// Lowers the mark probability if the decrement gate is open.
    ///
    /// Returns `true` if the update fired.
    #[inline]
    pub fn decrement(&mut self, signal: Signal, now: Timestamp) -> bool {
        self.on_decrement(signal, now)
    }

    /// The occupancy of the queue in the configured unit
    #[inline]
    pub fn current_occupancy(&self) -> u32 {
        self.queue.occupancy(self.config.mode())
    }

    /// A snapshot of the drop counters
    #[inline]
    pub fn stats(&self) -> Stats {
        self.stats
    }

    #[inline]
    pub fn mark_probability(&self) -> f64 {
        self.probability.get()
    }

    /// Overrides the mark probability, clamped to `[0.0, 1.0]`.
    ///
    /// The gate references are left untouched.
    #[inline]
    pub fn set_mark_probability(&mut self, probability: f64) {
        self.probability.set(probability);
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.config.mode()
    }

    #[inline]
    pub fn queue_limit(&self) -> u32 {
        self.config.queue_limit()
    }

    /// The number of units in the queue, regardless of mode
    #[inline]
    pub fn len(&self) -> u32 {
        self.queue.occupied_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn queue(&self) -> &Q {
        &self.queue
    }

    #[inline]
    pub fn subscriber(&self) -> &S {
        &self.subscriber
    }

    #[inline]
    pub fn subscriber_mut(&mut self) -> &mut S {
        &mut self.subscriber
    }

    #[inline]
    fn is_early_drop<R: random::Generator + ?Sized>(&mut self, random_generator: &mut R) -> bool {
        let u = random::gen_unit_interval(random_generator);
        u <= self.probability.get()
    }

    #[inline]
    fn on_increment(&mut self, signal: Signal, now: Timestamp) -> bool {
        let update = self.updater.increment(signal, now, &mut self.probability);
        self.on_update(update, now)
    }

    #[inline]
    fn on_decrement(&mut self, signal: Signal, now: Timestamp) -> bool {
        let update = self.updater.decrement(signal, now, &mut self.probability);
        self.on_update(update, now)
    }

    #[inline]
    fn on_update(&mut self, update: Option<Update>, now: Timestamp) -> bool {
        let Some(Update {
            direction,
            signal,
            previous,
            current,
        }) = update
        else {
            return false;
        };

        self.subscriber.on_mark_probability_updated(
            &Meta::new(now),
            &event::MarkProbabilityUpdated {
                direction,
                signal,
                previous,
                current,
            },
        );

        true
    }

    #[inline]
    fn on_drop(
        &mut self,
        reason: DropReason,
        item: Q::Item,
        occupancy: u32,
        now: Timestamp,
    ) -> Admission<Q::Item> {
        self.stats.on_drop(reason);

        self.subscriber.on_packet_dropped(
            &Meta::new(now),
            &event::PacketDropped {
                reason,
                size: item.size(),
                occupancy,
            },
        );

        Admission::dropped(reason, item)
    }
}
