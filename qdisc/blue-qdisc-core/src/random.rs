// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

/// A generator of random data. The two methods provide the same functionality for
/// different use cases. One for "public" randomly generated data that may appear
/// in the clear, and one for "private" data that should remain secret.
///
/// The queue disc only draws public values. Hosts that need reproducible runs
/// should hand the disc a seeded generator dedicated to it.
pub trait Generator {
    /// Fills `dest` with unpredictable bits that may be
    /// observed outside of the component.
    fn public_random_fill(&mut self, dest: &mut [u8]);

    /// Fills `dest` with unpredictable bits that will only be
    /// used internally, remaining secret.
    fn private_random_fill(&mut self, dest: &mut [u8]);
}

impl<G: Generator + ?Sized> Generator for &mut G {
    #[inline]
    fn public_random_fill(&mut self, dest: &mut [u8]) {
        (**self).public_random_fill(dest)
    }

    #[inline]
    fn private_random_fill(&mut self, dest: &mut [u8]) {
        (**self).private_random_fill(dest)
    }
}

/// The number of mantissa bits in an `f64`, including the implicit bit
const F64_PRECISION: u32 = f64::MANTISSA_DIGITS;

/// Generates a uniformly distributed `f64` in `[0, 1)`
///
/// The upper 53 bits of a random `u64` are scaled by `2^-53`, so every
/// representable result is equally likely and `1.0` is never produced.
#[inline]
pub fn gen_unit_interval<R: Generator + ?Sized>(random_generator: &mut R) -> f64 {
    let mut dest = [0; core::mem::size_of::<u64>()];
    random_generator.public_random_fill(&mut dest);
    let bits = u64::from_le_bytes(dest) >> (u64::BITS - F64_PRECISION);
    bits as f64 / (1u64 << F64_PRECISION) as f64
}

#[cfg(any(test, feature = "testing"))]
pub mod testing {
    use crate::random;

    #[derive(Debug, Default)]
    pub struct Generator(pub u8);

    impl random::Generator for Generator {
        fn public_random_fill(&mut self, dest: &mut [u8]) {
            let seed = self.0;

            for (i, elem) in dest.iter_mut().enumerate() {
                *elem = seed ^ i as u8;
            }

            self.0 = self.0.wrapping_add(1)
        }

        fn private_random_fill(&mut self, dest: &mut [u8]) {
            let seed = u8::MAX - self.0;

            for (i, elem) in dest.iter_mut().enumerate() {
                *elem = seed ^ i as u8;
            }

            self.0 = self.0.wrapping_add(1)
        }
    }

    /// Fills every request so [`gen_unit_interval`](super::gen_unit_interval)
    /// returns the value closest to the configured one
    #[derive(Clone, Copy, Debug)]
    pub struct Fixed(pub f64);

    impl Fixed {
        /// Never triggers an early drop for any probability below 1.0
        pub const NEVER: Self = Self(1.0);
        /// Triggers an early drop for any probability, including 0.0
        pub const ALWAYS: Self = Self(0.0);

        fn bits(&self) -> u64 {
            let max = (1u64 << super::F64_PRECISION) - 1;
            let scaled = self.0.clamp(0.0, 1.0) * (1u64 << super::F64_PRECISION) as f64;
            let value = (scaled as u64).min(max);
            value << (u64::BITS - super::F64_PRECISION)
        }
    }

    impl random::Generator for Fixed {
        fn public_random_fill(&mut self, dest: &mut [u8]) {
            let bytes = self.bits().to_le_bytes();
            for (elem, byte) in dest.iter_mut().zip(bytes.iter().cycle()) {
                *elem = *byte;
            }
        }

        fn private_random_fill(&mut self, dest: &mut [u8]) {
            self.public_random_fill(dest)
        }
    }
}
