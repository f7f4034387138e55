// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use core::fmt;

/// The congestion signal that triggered a probability update
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "generator"), derive(bolero_generator::TypeGenerator))]
pub enum Signal {
    /// The queue overflowed on enqueue, or was found empty on dequeue
    #[default]
    Primary,
    /// An ECN-style signal. The admission paths never produce it; it is only
    /// reachable through [`BlueQueueDisc::increment`](super::BlueQueueDisc::increment)
    /// and [`BlueQueueDisc::decrement`](super::BlueQueueDisc::decrement).
    Secondary,
}

/// Which way a probability update moves the mark probability
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Increment,
    Decrement,
}

/// The rule used to apply a step to the mark probability
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "generator"), derive(bolero_generator::TypeGenerator))]
pub enum Algorithm {
    /// `p ± step` on a primary signal; secondary signals are ignored
    #[default]
    Additive,
    /// `p = 2p + step` on a primary increment; secondary signals are ignored.
    ///
    /// Decrements have no multiplicative form and fall back to [`Algorithm::Additive`].
    Dual,
    /// `p ± step` on a primary signal and `p ± step / 10` on a secondary one
    EcnSplit,
}

impl Algorithm {
    /// Maps a numeric algorithm selector onto an algorithm
    ///
    /// `0` selects additive, `2` selects dual and every other value selects
    /// the ECN split.
    #[inline]
    pub const fn from_code(code: u32) -> Self {
        match code {
            0 => Self::Additive,
            2 => Self::Dual,
            _ => Self::EcnSplit,
        }
    }

    /// Returns the probability after an increment of `step`, before clamping
    #[inline]
    pub fn increment(self, probability: f64, step: f64, signal: Signal) -> f64 {
        match (self, signal) {
            (Self::Additive, Signal::Primary) => probability + step,
            (Self::Dual, Signal::Primary) => 2.0 * probability + step,
            (Self::EcnSplit, Signal::Primary) => probability + step,
            (Self::EcnSplit, Signal::Secondary) => probability + step / 10.0,
            (Self::Additive | Self::Dual, Signal::Secondary) => probability,
        }
    }

    /// Returns the probability after a decrement of `step`, before clamping
    #[inline]
    pub fn decrement(self, probability: f64, step: f64, signal: Signal) -> f64 {
        match (self, signal) {
            (Self::Additive | Self::Dual, Signal::Primary) => probability - step,
            (Self::EcnSplit, Signal::Primary) => probability - step,
            (Self::EcnSplit, Signal::Secondary) => probability - step / 10.0,
            (Self::Additive | Self::Dual, Signal::Secondary) => probability,
        }
    }

    #[inline]
    pub fn apply(self, direction: Direction, probability: f64, step: f64, signal: Signal) -> f64 {
        match direction {
            Direction::Increment => self.increment(probability, step, signal),
            Direction::Decrement => self.decrement(probability, step, signal),
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Additive => write!(f, "additive"),
            Self::Dual => write!(f, "dual"),
            Self::EcnSplit => write!(f, "ecn-split"),
        }
    }
}

impl core::str::FromStr for Algorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "additive" => Ok(Self::Additive),
            "dual" => Ok(Self::Dual),
            "ecn-split" | "ecn_split" => Ok(Self::EcnSplit),
            _ => match s.parse::<u32>() {
                Ok(code) => Ok(Self::from_code(code)),
                Err(_) => Err(UnknownAlgorithm),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownAlgorithm;

impl fmt::Display for UnknownAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "expected one of `additive`, `dual`, `ecn-split` or a numeric selector"
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownAlgorithm {}
