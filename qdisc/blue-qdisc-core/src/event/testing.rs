// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Meta, MarkProbabilityUpdated, PacketDequeued, PacketDropped, PacketEnqueued};
use std::vec::Vec;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Event {
    PacketEnqueued(PacketEnqueued),
    PacketDequeued(PacketDequeued),
    PacketDropped(PacketDropped),
    MarkProbabilityUpdated(MarkProbabilityUpdated),
}

/// Records every event in order of emission
#[derive(Clone, Debug, Default)]
pub struct Subscriber {
    pub events: Vec<(Meta, Event)>,
}

impl Subscriber {
    pub fn drops(&self) -> impl Iterator<Item = &PacketDropped> + '_ {
        self.events.iter().filter_map(|(_, event)| match event {
            Event::PacketDropped(event) => Some(event),
            _ => None,
        })
    }

    pub fn probability_updates(&self) -> impl Iterator<Item = &MarkProbabilityUpdated> + '_ {
        self.events.iter().filter_map(|(_, event)| match event {
            Event::MarkProbabilityUpdated(event) => Some(event),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl super::Subscriber for Subscriber {
    fn on_packet_enqueued(&mut self, meta: &Meta, event: &PacketEnqueued) {
        self.events.push((*meta, Event::PacketEnqueued(*event)));
    }

    fn on_packet_dequeued(&mut self, meta: &Meta, event: &PacketDequeued) {
        self.events.push((*meta, Event::PacketDequeued(*event)));
    }

    fn on_packet_dropped(&mut self, meta: &Meta, event: &PacketDropped) {
        self.events.push((*meta, Event::PacketDropped(*event)));
    }

    fn on_mark_probability_updated(&mut self, meta: &Meta, event: &MarkProbabilityUpdated) {
        self.events.push((*meta, Event::MarkProbabilityUpdated(*event)));
    }
}
