// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The FIFO backing store that a queue disc drains into and out of.

use core::fmt;

#[cfg(feature = "alloc")]
mod drop_tail;

#[cfg(feature = "alloc")]
pub use drop_tail::DropTail;

/// The unit in which occupancy and limits are measured
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(any(test, feature = "generator"), derive(bolero_generator::TypeGenerator))]
pub enum Mode {
    #[default]
    Packets,
    Bytes,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Packets => write!(f, "packets"),
            Self::Bytes => write!(f, "bytes"),
        }
    }
}

impl core::str::FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "packets" => Ok(Self::Packets),
            "bytes" => Ok(Self::Bytes),
            _ => Err(UnknownMode),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownMode;

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "expected `packets` or `bytes`")
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownMode {}

/// A unit of traffic held by a [`Queue`].
///
/// The disc never looks past the size of an item.
pub trait Item {
    /// The size of the item in bytes
    fn size(&self) -> u32;
}

impl Item for u32 {
    #[inline]
    fn size(&self) -> u32 {
        *self
    }
}

#[cfg(feature = "alloc")]
impl Item for alloc::vec::Vec<u8> {
    #[inline]
    fn size(&self) -> u32 {
        self.len().try_into().unwrap_or(u32::MAX)
    }
}

/// An ordered store of items, reporting its occupancy in packets and bytes
pub trait Queue {
    type Item: Item;

    /// The unit that bounds the store's own admission
    fn mode(&self) -> Mode;

    /// The maximum occupancy of the store, in [`Queue::mode`] units
    fn capacity(&self) -> u32;

    /// Pushes an item to the back of the store.
    ///
    /// The item is handed back if the store refuses it.
    fn push(&mut self, item: Self::Item) -> Result<(), Self::Item>;

    /// Pops the item at the front of the store
    fn pop(&mut self) -> Option<Self::Item>;

    /// Takes back the most recently pushed item
    fn pop_back(&mut self) -> Option<Self::Item>;

    /// Returns the item at the front of the store, if any
    fn peek_front(&self) -> Option<&Self::Item>;

    /// The number of items held
    fn occupied_count(&self) -> u32;

    /// The sum of the sizes of the items held
    fn occupied_bytes(&self) -> u32;

    #[inline]
    fn is_empty(&self) -> bool {
        self.occupied_count() == 0
    }

    /// The occupancy of the store measured in `mode` units
    #[inline]
    fn occupancy(&self, mode: Mode) -> u32 {
        match mode {
            Mode::Packets => self.occupied_count(),
            Mode::Bytes => self.occupied_bytes(),
        }
    }
}
