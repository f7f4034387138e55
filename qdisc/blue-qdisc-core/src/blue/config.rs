// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    blue::{
        algorithm::Algorithm,
        probability::MarkProbability,
        update::{Step, Updater},
    },
    queue::{Mode, Queue},
    time::{Duration, Timestamp},
};
use core::fmt;

pub const DEFAULT_QUEUE_LIMIT: u32 = 25;
pub const DEFAULT_MEAN_PACKET_SIZE: u32 = 1000;
pub const DEFAULT_INCREMENT: f64 = 0.0025;
pub const DEFAULT_DECREMENT: f64 = 0.00025;
pub const DEFAULT_HOLD_TIME: Duration = Duration::from_millis(100);

/// The validated, immutable parameters of a queue disc
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    mode: Mode,
    queue_limit: u32,
    mean_packet_size: u32,
    increment: Step,
    decrement: Step,
    increment_freeze_time: Option<Duration>,
    decrement_freeze_time: Option<Duration>,
    mark_probability: f64,
}

impl Default for Config {
    #[inline]
    fn default() -> Self {
        Builder::default().assemble()
    }
}

impl Config {
    #[inline]
    pub fn builder() -> Builder {
        Builder::default()
    }

    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The occupancy limit, in [`Config::mode`] units
    #[inline]
    pub fn queue_limit(&self) -> u32 {
        self.queue_limit
    }

    #[inline]
    pub fn mean_packet_size(&self) -> u32 {
        self.mean_packet_size
    }

    /// The byte limit used by the post-admission occupancy check.
    ///
    /// This is `queue_limit * mean_packet_size` regardless of the mode, so in
    /// byte mode it is far larger than the hard limit.
    #[inline]
    pub fn overlimit_bytes(&self) -> u64 {
        self.queue_limit as u64 * self.mean_packet_size as u64
    }

    #[inline]
    pub fn increment(&self) -> &Step {
        &self.increment
    }

    #[inline]
    pub fn decrement(&self) -> &Step {
        &self.decrement
    }

    #[inline]
    pub fn increment_freeze_time(&self) -> Option<Duration> {
        self.increment_freeze_time
    }

    #[inline]
    pub fn decrement_freeze_time(&self) -> Option<Duration> {
        self.decrement_freeze_time
    }

    /// The probability the disc starts with
    #[inline]
    pub fn initial_mark_probability(&self) -> f64 {
        self.mark_probability
    }

    #[inline]
    pub(crate) fn updater(&self) -> Updater {
        Updater::new(self.increment, self.decrement)
    }

    #[inline]
    pub(crate) fn initial_state(&self) -> MarkProbability {
        let seed = |freeze: Option<Duration>| freeze.map(Timestamp::from_duration);
        MarkProbability::new(self.mark_probability).with_gates(
            seed(self.increment_freeze_time),
            seed(self.decrement_freeze_time),
        )
    }

    /// Checks that `queue` can back a disc with this configuration
    pub fn validate_queue<Q: Queue>(&self, queue: &Q) -> Result<(), Error> {
        if queue.mode() != self.mode {
            return Err(Error::ModeMismatch {
                disc: self.mode,
                queue: queue.mode(),
            });
        }

        if queue.capacity() < self.queue_limit {
            return Err(Error::InsufficientCapacity {
                limit: self.queue_limit,
                capacity: queue.capacity(),
            });
        }

        if !queue.is_empty() {
            return Err(Error::QueueNotEmpty);
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Builder {
    mode: Mode,
    queue_limit: u32,
    mean_packet_size: u32,
    increment: f64,
    decrement: f64,
    increment_hold_time: Duration,
    decrement_hold_time: Duration,
    increment_freeze_time: Option<Duration>,
    decrement_freeze_time: Option<Duration>,
    increment_algorithm: Algorithm,
    decrement_algorithm: Algorithm,
    mark_probability: f64,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            mode: Mode::Packets,
            queue_limit: DEFAULT_QUEUE_LIMIT,
            mean_packet_size: DEFAULT_MEAN_PACKET_SIZE,
            increment: DEFAULT_INCREMENT,
            decrement: DEFAULT_DECREMENT,
            increment_hold_time: DEFAULT_HOLD_TIME,
            decrement_hold_time: DEFAULT_HOLD_TIME,
            increment_freeze_time: None,
            decrement_freeze_time: None,
            increment_algorithm: Algorithm::Additive,
            decrement_algorithm: Algorithm::Additive,
            mark_probability: 0.0,
        }
    }
}

impl Builder {
    /// Sets the unit that occupancy and the queue limit are measured in
    #[inline]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the queue limit, in packets or bytes depending on the mode
    #[inline]
    pub fn with_queue_limit(mut self, limit: u32) -> Self {
        self.queue_limit = limit;
        self
    }

    #[inline]
    pub fn with_mean_packet_size(mut self, size: u32) -> Self {
        self.mean_packet_size = size;
        self
    }

    #[inline]
    pub fn with_increment(mut self, increment: f64) -> Self {
        self.increment = increment;
        self
    }

    #[inline]
    pub fn with_decrement(mut self, decrement: f64) -> Self {
        self.decrement = decrement;
        self
    }

    #[inline]
    pub fn with_increment_hold_time(mut self, hold_time: Duration) -> Self {
        self.increment_hold_time = hold_time;
        self
    }

    #[inline]
    pub fn with_decrement_hold_time(mut self, hold_time: Duration) -> Self {
        self.decrement_hold_time = hold_time;
        self
    }

    /// Treats the clock epoch plus `freeze_time` as the time of the last increment
    #[inline]
    pub fn with_increment_freeze_time(mut self, freeze_time: Duration) -> Self {
        self.increment_freeze_time = Some(freeze_time);
        self
    }

    /// Treats the clock epoch plus `freeze_time` as the time of the last decrement
    #[inline]
    pub fn with_decrement_freeze_time(mut self, freeze_time: Duration) -> Self {
        self.decrement_freeze_time = Some(freeze_time);
        self
    }

    #[inline]
    pub fn with_increment_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.increment_algorithm = algorithm;
        self
    }

    #[inline]
    pub fn with_decrement_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.decrement_algorithm = algorithm;
        self
    }

    /// Sets the probability the disc starts with
    #[inline]
    pub fn with_mark_probability(mut self, probability: f64) -> Self {
        self.mark_probability = probability;
        self
    }

    pub fn build(self) -> Result<Config, Error> {
        if self.queue_limit == 0 {
            return Err(Error::InvalidQueueLimit);
        }

        if self.mean_packet_size == 0 {
            return Err(Error::InvalidMeanPacketSize);
        }

        if !is_positive(self.increment) {
            return Err(Error::InvalidIncrement(self.increment));
        }

        if !is_positive(self.decrement) {
            return Err(Error::InvalidDecrement(self.decrement));
        }

        if !(0.0..=1.0).contains(&self.mark_probability) {
            return Err(Error::InvalidMarkProbability(self.mark_probability));
        }

        Ok(self.assemble())
    }

    #[inline]
    fn assemble(self) -> Config {
        let Self {
            mode,
            queue_limit,
            mean_packet_size,
            increment,
            decrement,
            increment_hold_time,
            decrement_hold_time,
            increment_freeze_time,
            decrement_freeze_time,
            increment_algorithm,
            decrement_algorithm,
            mark_probability,
        } = self;

        Config {
            mode,
            queue_limit,
            mean_packet_size,
            increment: Step {
                amount: increment,
                hold_time: increment_hold_time,
                algorithm: increment_algorithm,
            },
            decrement: Step {
                amount: decrement,
                hold_time: decrement_hold_time,
                algorithm: decrement_algorithm,
            },
            increment_freeze_time,
            decrement_freeze_time,
            mark_probability,
        }
    }
}

#[inline]
fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

#[derive(Clone, Copy, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// The queue limit was zero
    InvalidQueueLimit,
    /// The mean packet size was zero
    InvalidMeanPacketSize,
    /// The increment was not a positive, finite value
    InvalidIncrement(f64),
    /// The decrement was not a positive, finite value
    InvalidDecrement(f64),
    /// The initial mark probability was outside of `[0.0, 1.0]`
    InvalidMarkProbability(f64),
    /// The backing store measures occupancy in a different unit than the disc
    ModeMismatch { disc: Mode, queue: Mode },
    /// The backing store can't hold as much as the disc's limit
    InsufficientCapacity { limit: u32, capacity: u32 },
    /// The backing store already held items
    QueueNotEmpty,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::InvalidQueueLimit => write!(f, "the queue limit must be greater than zero"),
            Self::InvalidMeanPacketSize => {
                write!(f, "the mean packet size must be greater than zero")
            }
            Self::InvalidIncrement(value) => {
                write!(f, "the increment must be positive and finite; got {value}")
            }
            Self::InvalidDecrement(value) => {
                write!(f, "the decrement must be positive and finite; got {value}")
            }
            Self::InvalidMarkProbability(value) => write!(
                f,
                "the initial mark probability must be within [0, 1]; got {value}"
            ),
            Self::ModeMismatch { disc, queue } => write!(
                f,
                "the queue measures {queue} but the queue disc measures {disc}"
            ),
            Self::InsufficientCapacity { limit, capacity } => write!(
                f,
                "the queue capacity ({capacity}) is less than the queue disc limit ({limit})"
            ),
            Self::QueueNotEmpty => write!(f, "the queue must be empty"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::DropTail;

    #[test]
    fn defaults_test() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.mode(), Mode::Packets);
        assert_eq!(config.queue_limit(), 25);
        assert_eq!(config.mean_packet_size(), 1000);
        assert_eq!(config.increment().amount, 0.0025);
        assert_eq!(config.decrement().amount, 0.00025);
        assert_eq!(config.increment().hold_time, Duration::from_millis(100));
        assert_eq!(config.decrement().hold_time, Duration::from_millis(100));
        assert_eq!(config.increment().algorithm, Algorithm::Additive);
        assert_eq!(config.decrement().algorithm, Algorithm::Additive);
        assert_eq!(config.increment_freeze_time(), None);
        assert_eq!(config.initial_mark_probability(), 0.0);

        let state = config.initial_state();
        assert_eq!(state.get(), 0.0);
        assert_eq!(state.last_increment(), None);
        assert_eq!(state.last_decrement(), None);
    }

    #[test]
    fn invalid_values_test() {
        let builder = Config::builder();

        assert_eq!(
            builder.with_queue_limit(0).build(),
            Err(Error::InvalidQueueLimit)
        );
        assert_eq!(
            builder.with_mean_packet_size(0).build(),
            Err(Error::InvalidMeanPacketSize)
        );
        assert_eq!(
            builder.with_increment(0.0).build(),
            Err(Error::InvalidIncrement(0.0))
        );
        assert_eq!(
            builder.with_decrement(-1.0).build(),
            Err(Error::InvalidDecrement(-1.0))
        );
        assert!(matches!(
            builder.with_increment(f64::NAN).build(),
            Err(Error::InvalidIncrement(_))
        ));
        assert!(matches!(
            builder.with_decrement(f64::INFINITY).build(),
            Err(Error::InvalidDecrement(_))
        ));
        assert_eq!(
            builder.with_mark_probability(1.5).build(),
            Err(Error::InvalidMarkProbability(1.5))
        );
        assert!(matches!(
            builder.with_mark_probability(f64::NAN).build(),
            Err(Error::InvalidMarkProbability(_))
        ));
    }

    #[test]
    fn freeze_time_seeds_gates_test() {
        let config = Config::builder()
            .with_increment_freeze_time(Duration::from_millis(100))
            .with_decrement_freeze_time(Duration::from_millis(200))
            .with_mark_probability(0.5)
            .build()
            .unwrap();

        let state = config.initial_state();
        assert_eq!(state.get(), 0.5);
        assert_eq!(
            state.last_increment(),
            Some(Timestamp::from_duration(Duration::from_millis(100)))
        );
        assert_eq!(
            state.last_decrement(),
            Some(Timestamp::from_duration(Duration::from_millis(200)))
        );
    }

    #[test]
    fn overlimit_bytes_test() {
        let config = Config::builder()
            .with_queue_limit(u32::MAX)
            .with_mean_packet_size(u32::MAX)
            .build()
            .unwrap();

        assert_eq!(
            config.overlimit_bytes(),
            u32::MAX as u64 * u32::MAX as u64
        );
    }

    #[test]
    fn validate_queue_test() {
        let config = Config::builder()
            .with_mode(Mode::Bytes)
            .with_queue_limit(3000)
            .build()
            .unwrap();

        assert_eq!(
            config.validate_queue(&DropTail::<u32>::with_max_packets(3000)),
            Err(Error::ModeMismatch {
                disc: Mode::Bytes,
                queue: Mode::Packets
            })
        );
        assert_eq!(
            config.validate_queue(&DropTail::<u32>::with_max_bytes(2999)),
            Err(Error::InsufficientCapacity {
                limit: 3000,
                capacity: 2999
            })
        );

        let mut queue = DropTail::with_max_bytes(4000);
        assert_eq!(config.validate_queue(&queue), Ok(()));

        queue.push(100u32).unwrap();
        assert_eq!(config.validate_queue(&queue), Err(Error::QueueNotEmpty));
    }

    #[test]
    fn display_test() {
        let error = Error::ModeMismatch {
            disc: Mode::Bytes,
            queue: Mode::Packets,
        };
        assert_eq!(
            error.to_string(),
            "the queue measures packets but the queue disc measures bytes"
        );
    }
}
