// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

pub use anyhow::Error;
use structopt::StructOpt;

pub type Result<T = (), E = Error> = core::result::Result<T, E>;

mod batch;
mod random;
mod run;
mod scenario;
mod stats;

#[derive(Debug, StructOpt)]
enum Args {
    Run(Box<run::Run>),
    Batch(batch::Batch),
}

fn main() -> Result {
    let format = tracing_subscriber::fmt::format()
        .with_level(false) // don't include levels in formatted output
        .with_timer(Uptime)
        .with_ansi(false)
        .compact(); // Use a less verbose output format.

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .event_format(format)
        .with_writer(std::io::stderr)
        .init();

    match Args::from_args() {
        Args::Run(args) => args.run(),
        Args::Batch(args) => args.run(),
    }
}

/// Prints the simulation's virtual time rather than the wall clock
struct Uptime;

impl tracing_subscriber::fmt::time::FormatTime for Uptime {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(w, "{}", blue_qdisc_core::time::testing::now())
    }
}
