// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Structured events emitted by the queue disc.
//!
//! A [`Subscriber`] is owned by the disc and notified synchronously from
//! within each operation. Every callback has an empty default so
//! subscribers only implement what they observe.

use crate::{
    blue::{
        algorithm::{Direction, Signal},
        DropReason,
    },
    time::Timestamp,
};

#[cfg(feature = "event-tracing")]
pub mod tracing;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// Fields common to all events
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct Meta {
    /// The time the host passed to the operation that emitted the event
    pub timestamp: Timestamp,
}

impl Meta {
    #[inline]
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }
}

/// A unit was admitted to the backing store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct PacketEnqueued {
    pub size: u32,
    /// Occupancy after the push, in the disc's unit
    pub occupancy: u32,
}

/// A unit left the backing store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct PacketDequeued {
    pub size: u32,
    /// Occupancy after the pop, in the disc's unit
    pub occupancy: u32,
}

/// A unit was rejected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct PacketDropped {
    pub reason: DropReason,
    pub size: u32,
    /// Occupancy at the time of the decision, in the disc's unit
    pub occupancy: u32,
}

/// A gated probability update fired.
///
/// Emitted whenever the hold time allowed the update, even if clamping left
/// the value unchanged.
#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub struct MarkProbabilityUpdated {
    pub direction: Direction,
    pub signal: Signal,
    pub previous: f64,
    pub current: f64,
}

pub trait Subscriber {
    #[inline]
    fn on_packet_enqueued(&mut self, meta: &Meta, event: &PacketEnqueued) {
        let _ = meta;
        let _ = event;
    }

    #[inline]
    fn on_packet_dequeued(&mut self, meta: &Meta, event: &PacketDequeued) {
        let _ = meta;
        let _ = event;
    }

    #[inline]
    fn on_packet_dropped(&mut self, meta: &Meta, event: &PacketDropped) {
        let _ = meta;
        let _ = event;
    }

    #[inline]
    fn on_mark_probability_updated(&mut self, meta: &Meta, event: &MarkProbabilityUpdated) {
        let _ = meta;
        let _ = event;
    }
}

impl Subscriber for () {}

impl<A, B> Subscriber for (A, B)
where
    A: Subscriber,
    B: Subscriber,
{
    #[inline]
    fn on_packet_enqueued(&mut self, meta: &Meta, event: &PacketEnqueued) {
        self.0.on_packet_enqueued(meta, event);
        self.1.on_packet_enqueued(meta, event);
    }

    #[inline]
    fn on_packet_dequeued(&mut self, meta: &Meta, event: &PacketDequeued) {
        self.0.on_packet_dequeued(meta, event);
        self.1.on_packet_dequeued(meta, event);
    }

    #[inline]
    fn on_packet_dropped(&mut self, meta: &Meta, event: &PacketDropped) {
        self.0.on_packet_dropped(meta, event);
        self.1.on_packet_dropped(meta, event);
    }

    #[inline]
    fn on_mark_probability_updated(&mut self, meta: &Meta, event: &MarkProbabilityUpdated) {
        self.0.on_mark_probability_updated(meta, event);
        self.1.on_mark_probability_updated(meta, event);
    }
}

impl<T: Subscriber + ?Sized> Subscriber for &mut T {
    #[inline]
    fn on_packet_enqueued(&mut self, meta: &Meta, event: &PacketEnqueued) {
        (**self).on_packet_enqueued(meta, event);
    }

    #[inline]
    fn on_packet_dequeued(&mut self, meta: &Meta, event: &PacketDequeued) {
        (**self).on_packet_dequeued(meta, event);
    }

    #[inline]
    fn on_packet_dropped(&mut self, meta: &Meta, event: &PacketDropped) {
        (**self).on_packet_dropped(meta, event);
    }

    #[inline]
    fn on_mark_probability_updated(&mut self, meta: &Meta, event: &MarkProbabilityUpdated) {
        (**self).on_mark_probability_updated(meta, event);
    }
}
