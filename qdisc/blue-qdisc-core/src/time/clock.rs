// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::time::timestamp::Timestamp;
use core::time::Duration;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

/// A `Clock` is a source of [`Timestamp`]s.
///
/// The queue disc never reads a clock itself; hosts query one and pass
/// the result to each operation.
pub trait Clock {
    /// Returns the current [`Timestamp`]
    fn get_time(&self) -> Timestamp;
}

/// A clock which always returns a Timestamp of value 1us
#[derive(Clone, Copy, Debug)]
pub struct NoopClock;

impl Clock for NoopClock {
    fn get_time(&self) -> Timestamp {
        Timestamp::from_duration(Duration::from_micros(1))
    }
}

impl Clock for Timestamp {
    #[inline]
    fn get_time(&self) -> Timestamp {
        *self
    }
}
