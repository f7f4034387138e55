// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use crate::{scenario::Scenario, Result};
use serde::{Deserialize, Serialize};
use std::io;

/// A single line of simulation output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stats {
    Setup(Setup),
    Sample(Sample),
    Summary(Summary),
}

impl Stats {
    pub fn write<W: io::Write>(&self, mut w: W) -> Result {
        serde_json::to_writer(&mut w, self)?;
        writeln!(w)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Setup {
    pub args: Vec<String>,
    pub scenario: Scenario,
}

/// The state of the disc at a point in virtual time
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub seed: u64,
    pub elapsed_us: u64,
    pub occupancy: u32,
    pub len: u32,
    pub mark_probability: f64,
    pub forced_drops: u64,
    pub unforced_drops: u64,
    pub overlimit_drops: u64,
}

/// Totals for a completed run
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub seed: u64,
    pub offered: u64,
    pub admitted: u64,
    pub transmitted: u64,
    pub transmitted_bytes: u64,
    pub forced_drops: u64,
    pub unforced_drops: u64,
    pub overlimit_drops: u64,
    pub mark_probability: f64,
    pub max_mark_probability: f64,
    /// The share of the link's capacity spent transmitting
    pub utilization: f64,
}

impl Summary {
    pub fn drops(&self) -> u64 {
        self.forced_drops + self.unforced_drops + self.overlimit_drops
    }
}
