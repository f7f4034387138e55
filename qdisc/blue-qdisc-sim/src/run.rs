// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    random::Random,
    scenario::{self, Scenario},
    stats::{Sample, Setup, Stats, Summary},
    Result,
};
use blue_qdisc_core::{
    event::tracing::Subscriber as Tracing,
    time::{testing as clock, Duration, Timestamp},
    BlueQueueDisc,
};
use std::io;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct Run {
    #[structopt(flatten)]
    scenario: scenario::Args,

    #[structopt(long, default_value = "0")]
    seed: u64,
}

impl Run {
    pub fn run(&self) -> Result {
        let scenario = self.scenario.load()?;

        let stdout = io::stdout();
        let mut out = stdout.lock();

        Stats::Setup(Setup {
            args: std::env::args().collect(),
            scenario: scenario.clone(),
        })
        .write(&mut out)?;

        let summary = simulate(&scenario, self.seed, |sample| {
            Stats::Sample(sample.clone()).write(&mut out)
        })?;

        Stats::Summary(summary).write(&mut out)?;

        Ok(())
    }
}

/// Drives `scenario` to completion in virtual time.
///
/// Units arrive at the scenario's rate and a link drains the disc at a fixed
/// byte rate. An idle link polls the disc again when the next unit arrives.
/// `on_sample` is called every sample interval.
pub fn simulate<F>(scenario: &Scenario, seed: u64, mut on_sample: F) -> Result<Summary>
where
    F: FnMut(&Sample) -> Result,
{
    let config = scenario.config()?;
    let mut disc = BlueQueueDisc::with_drop_tail(config).with_event(Tracing::default());
    let mut random = Random::new(seed);

    clock::reset();
    let start = clock::now();
    let end = start + *scenario.duration;
    let interval = scenario.arrival_interval();
    let sample_interval = *scenario.sample_interval;

    let mut next_arrival = start;
    let mut link_ready = start;
    let mut next_sample = start + sample_interval;

    let mut summary = Summary {
        seed,
        mark_probability: disc.mark_probability(),
        max_mark_probability: disc.mark_probability(),
        ..Default::default()
    };

    loop {
        let now = next_arrival.min(link_ready).min(next_sample);
        if now > end {
            break;
        }
        advance_to(now);

        if now == next_arrival {
            let size = scenario.packet_size.gen(&mut random);
            summary.offered += 1;

            if disc.try_enqueue(size, now, &mut random).is_admitted() {
                summary.admitted += 1;
            }

            let gap = random.jitter(interval.as_secs_f64(), scenario.arrival_jitter);
            next_arrival = now + Duration::from_secs_f64(gap).max(Duration::from_micros(1));
        }

        if now == link_ready {
            if let Some(size) = disc.dequeue(now) {
                summary.transmitted += 1;
                summary.transmitted_bytes += size as u64;
                link_ready = now + scenario.transmission_time(size);
            } else {
                link_ready = next_arrival;
            }
        }

        if now == next_sample {
            let sample = sample(seed, start, now, &disc);
            summary.max_mark_probability = summary.max_mark_probability.max(sample.mark_probability);
            on_sample(&sample)?;
            next_sample = now + sample_interval;
        }
    }

    let stats = disc.stats();
    summary.forced_drops = stats.forced_drops;
    summary.unforced_drops = stats.unforced_drops;
    summary.overlimit_drops = stats.overlimit_drops;
    summary.mark_probability = disc.mark_probability();
    summary.max_mark_probability = summary.max_mark_probability.max(summary.mark_probability);

    let capacity = scenario.link_rate as f64 * scenario.duration.as_secs_f64();
    summary.utilization = (summary.transmitted_bytes as f64 / capacity).min(1.0);

    tracing::info!(
        seed,
        offered = summary.offered,
        drops = summary.drops(),
        mark_probability = summary.mark_probability,
        "complete"
    );

    Ok(summary)
}

fn advance_to(now: Timestamp) {
    let elapsed = now.saturating_duration_since(clock::now());
    clock::advance(elapsed);
}

fn sample<Q, S>(seed: u64, start: Timestamp, now: Timestamp, disc: &BlueQueueDisc<Q, S>) -> Sample
where
    Q: blue_qdisc_core::queue::Queue,
    S: blue_qdisc_core::event::Subscriber,
{
    let stats = disc.stats();

    Sample {
        seed,
        elapsed_us: now.saturating_duration_since(start).as_micros() as u64,
        occupancy: disc.current_occupancy(),
        len: disc.len(),
        mark_probability: disc.mark_probability(),
        forced_drops: stats.forced_drops,
        unforced_drops: stats.unforced_drops,
        overlimit_drops: stats.overlimit_drops,
    }
}
