// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::{fmt, num::NonZeroU64, time::Duration};

/// An absolute point in virtual time.
///
/// The value is measured in microseconds relative to the epoch of the
/// [`Clock`](crate::time::Clock) that produced it. Timestamps from different
/// clocks can't be meaningfully compared.
///
/// The inner value is non-zero so `Option<Timestamp>` has the same size as
/// `Timestamp`; a duration of zero maps to the first representable microsecond.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NonZeroU64);

impl Timestamp {
    /// Creates a `Timestamp` from a duration since the clock epoch
    #[inline]
    pub fn from_duration(duration: Duration) -> Self {
        let micros = duration.as_micros().min(u64::MAX as u128) as u64;
        Self(NonZeroU64::new(micros).unwrap_or(NonZeroU64::MIN))
    }

    /// Returns the duration since the clock epoch
    #[inline]
    pub const fn as_duration(self) -> Duration {
        Duration::from_micros(self.0.get())
    }

    /// Returns true if `self` is at or before `now`
    #[inline]
    pub fn has_elapsed(self, now: Timestamp) -> bool {
        self <= now
    }

    /// Returns the time elapsed from `earlier` to `self`, or zero if
    /// `earlier` is later than `self`
    #[inline]
    pub fn saturating_duration_since(self, earlier: Timestamp) -> Duration {
        self.checked_duration_since(earlier).unwrap_or_default()
    }

    #[inline]
    pub fn checked_duration_since(self, earlier: Timestamp) -> Option<Duration> {
        let micros = self.0.get().checked_sub(earlier.0.get())?;
        Some(Duration::from_micros(micros))
    }

    #[inline]
    pub fn checked_add(self, duration: Duration) -> Option<Self> {
        let micros = u64::try_from(duration.as_micros()).ok()?;
        let value = self.0.get().checked_add(micros)?;
        // adding to a non-zero value can't produce zero without overflowing
        NonZeroU64::new(value).map(Self)
    }

    #[inline]
    pub fn checked_sub(self, duration: Duration) -> Option<Self> {
        let micros = u64::try_from(duration.as_micros()).ok()?;
        let value = self.0.get().checked_sub(micros)?;
        NonZeroU64::new(value).map(Self)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let duration = self.as_duration();
        let micros = duration.subsec_micros();
        let secs = duration.as_secs() % 60;
        let mins = duration.as_secs() / 60 % 60;
        let hours = duration.as_secs() / 60 / 60;
        if micros != 0 {
            write!(f, "{hours}:{mins:02}:{secs:02}.{micros:06}")
        } else {
            write!(f, "{hours}:{mins:02}:{secs:02}")
        }
    }
}

impl core::ops::Add<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    #[track_caller]
    fn add(self, rhs: Duration) -> Self::Output {
        self.checked_add(rhs)
            .expect("timestamp overflow when adding duration")
    }
}

impl core::ops::AddAssign<Duration> for Timestamp {
    #[inline]
    #[track_caller]
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl core::ops::Sub for Timestamp {
    type Output = Duration;

    #[inline]
    #[track_caller]
    fn sub(self, rhs: Timestamp) -> Self::Output {
        self.checked_duration_since(rhs)
            .expect("timestamp underflow when subtracting timestamps")
    }
}

impl core::ops::Sub<Duration> for Timestamp {
    type Output = Timestamp;

    #[inline]
    #[track_caller]
    fn sub(self, rhs: Duration) -> Self::Output {
        self.checked_sub(rhs)
            .expect("timestamp underflow when subtracting duration")
    }
}

impl core::ops::SubAssign<Duration> for Timestamp {
    #[inline]
    #[track_caller]
    fn sub_assign(&mut self, rhs: Duration) {
        *self = *self - rhs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_is_niche_optimized() {
        assert_eq!(
            core::mem::size_of::<Option<Timestamp>>(),
            core::mem::size_of::<Timestamp>()
        );
    }

    #[test]
    fn zero_duration_maps_to_first_microsecond() {
        let ts = Timestamp::from_duration(Duration::ZERO);
        assert_eq!(ts.as_duration(), Duration::from_micros(1));
    }

    #[test]
    fn arithmetic_test() {
        let base = Timestamp::from_duration(Duration::from_secs(1));
        let later = base + Duration::from_millis(250);

        assert_eq!(later - base, Duration::from_millis(250));
        assert_eq!(later - Duration::from_millis(250), base);
        assert!(base.has_elapsed(later));
        assert!(!later.has_elapsed(base));
        assert_eq!(base.saturating_duration_since(later), Duration::ZERO);
        assert_eq!(base.checked_duration_since(later), None);
        assert_eq!(base.checked_sub(Duration::from_secs(2)), None);
    }

    #[test]
    fn display_test() {
        let ts = Timestamp::from_duration(Duration::from_millis(3_723_500));
        assert_eq!(ts.to_string(), "1:02:03.500000");

        let ts = Timestamp::from_duration(Duration::from_secs(61));
        assert_eq!(ts.to_string(), "0:01:01");
    }

    #[test]
    fn ordering_test() {
        bolero::check!()
            .with_type::<(u32, u32)>()
            .cloned()
            .for_each(|(a, b)| {
                let a_ts = Timestamp::from_duration(Duration::from_micros(a as u64 + 1));
                let b_ts = Timestamp::from_duration(Duration::from_micros(b as u64 + 1));
                assert_eq!(a.cmp(&b), a_ts.cmp(&b_ts));
                assert_eq!(
                    a_ts.saturating_duration_since(b_ts),
                    Duration::from_micros(a.saturating_sub(b) as u64)
                );
            });
    }
}
