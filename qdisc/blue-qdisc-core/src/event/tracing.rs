// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Meta, MarkProbabilityUpdated, PacketDequeued, PacketDropped, PacketEnqueued};

/// Forwards every event to `tracing` at DEBUG level under a `blue_qdisc` span
#[derive(Clone, Debug)]
pub struct Subscriber {
    root: tracing::Span,
}

impl Default for Subscriber {
    fn default() -> Self {
        let root = tracing::span!(target: "blue_qdisc", tracing::Level::DEBUG, "blue_qdisc");
        Self { root }
    }
}

impl super::Subscriber for Subscriber {
    #[inline]
    fn on_packet_enqueued(&mut self, meta: &Meta, event: &PacketEnqueued) {
        let id = self.root.id();
        let PacketEnqueued { size, occupancy } = event;
        tracing::event!(
            target: "packet_enqueued",
            parent: id,
            tracing::Level::DEBUG,
            timestamp = tracing::field::display(meta.timestamp),
            size,
            occupancy
        );
    }

    #[inline]
    fn on_packet_dequeued(&mut self, meta: &Meta, event: &PacketDequeued) {
        let id = self.root.id();
        let PacketDequeued { size, occupancy } = event;
        tracing::event!(
            target: "packet_dequeued",
            parent: id,
            tracing::Level::DEBUG,
            timestamp = tracing::field::display(meta.timestamp),
            size,
            occupancy
        );
    }

    #[inline]
    fn on_packet_dropped(&mut self, meta: &Meta, event: &PacketDropped) {
        let id = self.root.id();
        let PacketDropped {
            reason,
            size,
            occupancy,
        } = event;
        tracing::event!(
            target: "packet_dropped",
            parent: id,
            tracing::Level::DEBUG,
            timestamp = tracing::field::display(meta.timestamp),
            reason = tracing::field::debug(reason),
            size,
            occupancy
        );
    }

    #[inline]
    fn on_mark_probability_updated(&mut self, meta: &Meta, event: &MarkProbabilityUpdated) {
        let id = self.root.id();
        let MarkProbabilityUpdated {
            direction,
            signal,
            previous,
            current,
        } = event;
        tracing::event!(
            target: "mark_probability_updated",
            parent: id,
            tracing::Level::DEBUG,
            timestamp = tracing::field::display(meta.timestamp),
            direction = tracing::field::debug(direction),
            signal = tracing::field::debug(signal),
            previous,
            current
        );
    }
}
