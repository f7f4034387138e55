// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{
    run::simulate,
    scenario::{self, Scenario},
    stats::{Setup, Stats, Summary},
    Result,
};
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
pub struct Batch {
    #[structopt(flatten)]
    scenario: scenario::Args,

    /// The first seed to run
    #[structopt(long, default_value = "0")]
    seed: u64,

    /// The number of seeds to run
    #[structopt(long, default_value = "100")]
    count: u64,

    #[structopt(long)]
    no_progress: bool,
}

impl Batch {
    pub fn run(&self) -> Result {
        let scenario = self.scenario.load()?;

        let progress = if self.no_progress {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(self.count)
        };
        progress.set_style(ProgressStyle::with_template(
            "{elapsed_precise} {bar:40} {pos}/{len} seeds",
        )?);

        let summaries = run_seeds(&scenario, self.seed, self.count, progress)?;

        let stdout = io::stdout();
        let mut out = stdout.lock();

        Stats::Setup(Setup {
            args: std::env::args().collect(),
            scenario,
        })
        .write(&mut out)?;

        for summary in summaries {
            Stats::Summary(summary).write(&mut out)?;
        }

        Ok(())
    }
}

/// Runs `count` seeds starting at `seed` in parallel, returning the summaries in seed order
fn run_seeds(
    scenario: &Scenario,
    seed: u64,
    count: u64,
    progress: ProgressBar,
) -> Result<Vec<Summary>> {
    let end = seed.saturating_add(count);

    let mut summaries = (seed..end)
        .into_par_iter()
        .progress_with(progress.clone())
        .map(|seed| simulate(scenario, seed, |_| Ok(())))
        .collect::<Result<Vec<_>>>()?;

    progress.finish_and_clear();

    summaries.sort_by_key(|summary| summary.seed);

    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;

    #[test]
    fn run_seeds_test() {
        let scenario = Scenario {
            duration: Duration::from_secs(1).into(),
            ..Default::default()
        };

        let summaries = run_seeds(&scenario, 10, 8, ProgressBar::hidden()).unwrap();
        let seeds: Vec<_> = summaries.iter().map(|summary| summary.seed).collect();
        assert_eq!(seeds, (10..18).collect::<Vec<_>>());

        // every seed matches a sequential run on the same seed
        for summary in &summaries {
            let expected = simulate(&scenario, summary.seed, |_| Ok(())).unwrap();
            assert_eq!(summary, &expected);
        }
    }
}
