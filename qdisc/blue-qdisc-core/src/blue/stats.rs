// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::DropReason;

/// Drop counters for a queue disc.
///
/// Counters only grow; they're reset by building a new disc.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct Stats {
    /// Units dropped by the early-drop test while there was room for them
    pub unforced_drops: u64,
    /// Units dropped because the queue was at its limit
    pub forced_drops: u64,
    /// Admitted units taken back out by the post-admission occupancy check
    pub overlimit_drops: u64,
}

impl Stats {
    #[inline]
    pub fn total_drops(&self) -> u64 {
        self.unforced_drops
            .saturating_add(self.forced_drops)
            .saturating_add(self.overlimit_drops)
    }

    #[inline]
    pub(crate) fn on_drop(&mut self, reason: DropReason) {
        let counter = match reason {
            DropReason::Early => &mut self.unforced_drops,
            DropReason::Forced => &mut self.forced_drops,
            DropReason::OverLimit => &mut self.overlimit_drops,
        };
        *counter = counter.saturating_add(1);
    }
}
