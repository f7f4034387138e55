// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{random::Random, Error, Result};
use anyhow::{anyhow, ensure};
use blue_qdisc_core::{
    blue::{Algorithm, Config},
    queue::Mode,
};
use core::{fmt, str::FromStr, time::Duration};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use structopt::StructOpt;

/// An inclusive range of values, written as `start..end` or a single value
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CliRange<T> {
    pub start: T,
    pub end: T,
}

impl CliRange<u32> {
    pub fn gen(&self, random: &mut Random) -> u32 {
        if self.start == self.end {
            return self.start;
        }
        random.gen_range_inclusive(self.start, self.end)
    }
}

impl<T: Copy> From<T> for CliRange<T> {
    fn from(value: T) -> Self {
        Self {
            start: value,
            end: value,
        }
    }
}

impl<T: FromStr + PartialOrd> FromStr for CliRange<T>
where
    T::Err: fmt::Display,
{
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parse = |v: &str| v.trim().parse::<T>().map_err(|err| anyhow!("{err}"));

        let (start, end) = if let Some((start, end)) = s.split_once("..") {
            (parse(start)?, parse(end)?)
        } else {
            (parse(s)?, parse(s)?)
        };

        ensure!(start <= end, "range start must not exceed its end: {s:?}");

        Ok(Self { start, end })
    }
}

impl<T: fmt::Display + PartialEq> fmt::Display for CliRange<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

/// Serializes a value through its `Display` and `FromStr` impls
mod text {
    use core::{fmt, str::FromStr};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T: fmt::Display, S: Serializer>(value: &T, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(d: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: fmt::Display,
        D: Deserializer<'de>,
    {
        let value = String::deserialize(d)?;
        value.parse().map_err(de::Error::custom)
    }
}

/// A traffic scenario driven through a single queue disc
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Scenario {
    #[serde(with = "text")]
    pub mode: Mode,
    pub queue_limit: u32,
    pub mean_packet_size: u32,
    pub increment: f64,
    pub decrement: f64,
    #[serde(with = "text")]
    pub increment_hold_time: humantime::Duration,
    #[serde(with = "text")]
    pub decrement_hold_time: humantime::Duration,
    #[serde(with = "text")]
    pub increment_algorithm: Algorithm,
    #[serde(with = "text")]
    pub decrement_algorithm: Algorithm,
    pub mark_probability: f64,

    /// The virtual time the scenario runs for
    #[serde(with = "text")]
    pub duration: humantime::Duration,
    /// Units offered per second
    pub arrival_rate: f64,
    /// The fraction by which each inter-arrival gap may deviate, in `[0, 1]`
    pub arrival_jitter: f64,
    /// The size of each offered unit, in bytes
    #[serde(with = "text")]
    pub packet_size: CliRange<u32>,
    /// The rate the link drains the queue, in bytes per second
    pub link_rate: u64,
    #[serde(with = "text")]
    pub sample_interval: humantime::Duration,
}

impl Default for Scenario {
    fn default() -> Self {
        let config = Config::default();

        Self {
            mode: config.mode(),
            queue_limit: config.queue_limit(),
            mean_packet_size: config.mean_packet_size(),
            increment: config.increment().amount,
            decrement: config.decrement().amount,
            increment_hold_time: config.increment().hold_time.into(),
            decrement_hold_time: config.decrement().hold_time.into(),
            increment_algorithm: config.increment().algorithm,
            decrement_algorithm: config.decrement().algorithm,
            mark_probability: config.initial_mark_probability(),
            duration: Duration::from_secs(10).into(),
            arrival_rate: 1000.0,
            arrival_jitter: 0.0,
            packet_size: 1000.into(),
            link_rate: 800_000,
            sample_interval: Duration::from_millis(100).into(),
        }
    }
}

impl Scenario {
    pub fn config(&self) -> Result<Config> {
        let config = Config::builder()
            .with_mode(self.mode)
            .with_queue_limit(self.queue_limit)
            .with_mean_packet_size(self.mean_packet_size)
            .with_increment(self.increment)
            .with_decrement(self.decrement)
            .with_increment_hold_time(*self.increment_hold_time)
            .with_decrement_hold_time(*self.decrement_hold_time)
            .with_increment_algorithm(self.increment_algorithm)
            .with_decrement_algorithm(self.decrement_algorithm)
            .with_mark_probability(self.mark_probability)
            .build()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result {
        self.config()?;

        ensure!(
            self.arrival_rate.is_finite() && self.arrival_rate > 0.0,
            "the arrival rate must be positive"
        );
        ensure!(
            (0.0..=1.0).contains(&self.arrival_jitter),
            "the arrival jitter must be within [0, 1]"
        );
        ensure!(self.packet_size.start > 0, "packets must be non-empty");
        ensure!(self.link_rate > 0, "the link rate must be positive");
        ensure!(
            !self.sample_interval.is_zero(),
            "the sample interval must be positive"
        );

        Ok(())
    }

    /// The mean gap between two arrivals
    pub fn arrival_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.arrival_rate)
    }

    /// The time the link spends transmitting `size` bytes
    pub fn transmission_time(&self, size: u32) -> Duration {
        Duration::from_secs_f64(size as f64 / self.link_rate as f64)
    }
}

/// Scenario flags shared by every command.
///
/// Flags override the values read from `--scenario`.
#[derive(Debug, Default, StructOpt)]
pub struct Args {
    /// A TOML file describing the scenario
    #[structopt(long)]
    scenario: Option<PathBuf>,

    #[structopt(long)]
    mode: Option<Mode>,

    #[structopt(long)]
    queue_limit: Option<u32>,

    #[structopt(long)]
    mean_packet_size: Option<u32>,

    #[structopt(long)]
    increment: Option<f64>,

    #[structopt(long)]
    decrement: Option<f64>,

    /// Sets both hold times
    #[structopt(long)]
    hold_time: Option<humantime::Duration>,

    #[structopt(long)]
    increment_hold_time: Option<humantime::Duration>,

    #[structopt(long)]
    decrement_hold_time: Option<humantime::Duration>,

    #[structopt(long)]
    increment_algorithm: Option<Algorithm>,

    #[structopt(long)]
    decrement_algorithm: Option<Algorithm>,

    #[structopt(long)]
    mark_probability: Option<f64>,

    #[structopt(long)]
    duration: Option<humantime::Duration>,

    #[structopt(long)]
    arrival_rate: Option<f64>,

    #[structopt(long)]
    arrival_jitter: Option<f64>,

    #[structopt(long)]
    packet_size: Option<CliRange<u32>>,

    #[structopt(long)]
    link_rate: Option<u64>,

    #[structopt(long)]
    sample_interval: Option<humantime::Duration>,
}

impl Args {
    pub fn load(&self) -> Result<Scenario> {
        let mut scenario = if let Some(path) = self.scenario.as_ref() {
            let contents = fs::read_to_string(path)
                .map_err(|err| anyhow!("could not read {}: {err}", path.display()))?;
            toml::from_str(&contents)?
        } else {
            Scenario::default()
        };

        self.apply(&mut scenario);
        scenario.validate()?;

        Ok(scenario)
    }

    fn apply(&self, scenario: &mut Scenario) {
        macro_rules! set {
            ($($field:ident),* $(,)?) => {
                $(
                    if let Some(value) = self.$field {
                        scenario.$field = value;
                    }
                )*
            };
        }

        if let Some(hold_time) = self.hold_time {
            scenario.increment_hold_time = hold_time;
            scenario.decrement_hold_time = hold_time;
        }

        set!(
            mode,
            queue_limit,
            mean_packet_size,
            increment,
            decrement,
            increment_hold_time,
            decrement_hold_time,
            increment_algorithm,
            decrement_algorithm,
            mark_probability,
            duration,
            arrival_rate,
            arrival_jitter,
            packet_size,
            link_rate,
            sample_interval,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_range_test() {
        let range: CliRange<u32> = "500..1500".parse().unwrap();
        assert_eq!(range, CliRange { start: 500, end: 1500 });
        assert_eq!(range.to_string(), "500..1500");

        let single: CliRange<u32> = "1000".parse().unwrap();
        assert_eq!(single, 1000.into());
        assert_eq!(single.gen(&mut Random::new(0)), 1000);

        assert!("1500..500".parse::<CliRange<u32>>().is_err());
        assert!("big".parse::<CliRange<u32>>().is_err());

        let mut random = Random::new(1);
        for _ in 0..100 {
            assert!((500..=1500).contains(&range.gen(&mut random)));
        }
    }

    #[test]
    fn defaults_test() {
        let scenario = Scenario::default();
        scenario.validate().unwrap();
        assert_eq!(scenario.config().unwrap(), Config::default());
        assert_eq!(scenario.arrival_interval(), Duration::from_millis(1));
        assert_eq!(scenario.transmission_time(1000), Duration::from_micros(1250));
    }

    #[test]
    fn toml_test() {
        let scenario: Scenario = toml::from_str(
            r#"
            mode = "bytes"
            queue_limit = 30000
            increment_hold_time = "50ms"
            increment_algorithm = "dual"
            decrement_algorithm = "3"
            packet_size = "64..1500"
            duration = "1m"
            "#,
        )
        .unwrap();

        assert_eq!(scenario.mode, Mode::Bytes);
        assert_eq!(scenario.queue_limit, 30000);
        assert_eq!(*scenario.increment_hold_time, Duration::from_millis(50));
        assert_eq!(*scenario.decrement_hold_time, Duration::from_millis(100));
        assert_eq!(scenario.increment_algorithm, Algorithm::Dual);
        assert_eq!(scenario.decrement_algorithm, Algorithm::EcnSplit);
        assert_eq!(scenario.packet_size, CliRange { start: 64, end: 1500 });
        assert_eq!(*scenario.duration, Duration::from_secs(60));
        assert_eq!(scenario.link_rate, Scenario::default().link_rate);

        assert!(toml::from_str::<Scenario>("queue_limt = 5").is_err());
        assert!(toml::from_str::<Scenario>("mode = \"frames\"").is_err());
    }

    #[test]
    fn overrides_test() {
        let args = Args::from_iter_safe([
            "run",
            "--queue-limit",
            "8",
            "--hold-time",
            "10ms",
            "--decrement-hold-time",
            "20ms",
            "--packet-size",
            "100..200",
        ])
        .unwrap();

        let scenario = args.load().unwrap();
        assert_eq!(scenario.queue_limit, 8);
        assert_eq!(*scenario.increment_hold_time, Duration::from_millis(10));
        assert_eq!(*scenario.decrement_hold_time, Duration::from_millis(20));
        assert_eq!(scenario.packet_size, CliRange { start: 100, end: 200 });
    }

    #[test]
    fn invalid_scenario_test() {
        let args = Args {
            queue_limit: Some(0),
            ..Default::default()
        };
        assert!(args.load().is_err());

        let args = Args {
            arrival_jitter: Some(2.0),
            ..Default::default()
        };
        assert!(args.load().is_err());
    }
}
