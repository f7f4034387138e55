// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use blue_qdisc_core::random::Generator;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};

/// A seeded random stream shared by the traffic model and the queue disc
#[derive(Debug)]
pub struct Random(StdRng);

impl Random {
    pub fn new(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Returns a value in `start..=end`
    pub fn gen_range_inclusive(&mut self, start: u32, end: u32) -> u32 {
        self.0.gen_range(start..=end)
    }

    /// Scales `value` by a uniform factor within `1 ± jitter`
    pub fn jitter(&mut self, value: f64, jitter: f64) -> f64 {
        if jitter <= 0.0 {
            return value;
        }
        let factor = self.0.gen_range(-jitter..=jitter);
        value * (1.0 + factor)
    }
}

impl Generator for Random {
    #[inline]
    fn public_random_fill(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }

    #[inline]
    fn private_random_fill(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest);
    }
}
