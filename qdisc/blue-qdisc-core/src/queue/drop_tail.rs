// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use super::{Item, Mode, Queue};
use alloc::collections::VecDeque;

/// A bounded FIFO that refuses items once its capacity would be exceeded
#[derive(Clone, Debug)]
pub struct DropTail<T> {
    items: VecDeque<T>,
    mode: Mode,
    capacity: u32,
    bytes: u32,
}

impl<T: Item> DropTail<T> {
    /// Creates a store bounded to `capacity` packets
    #[inline]
    pub fn with_max_packets(capacity: u32) -> Self {
        Self::new(Mode::Packets, capacity)
    }

    /// Creates a store bounded to `capacity` bytes
    #[inline]
    pub fn with_max_bytes(capacity: u32) -> Self {
        Self::new(Mode::Bytes, capacity)
    }

    #[inline]
    pub fn new(mode: Mode, capacity: u32) -> Self {
        Self {
            items: VecDeque::new(),
            mode,
            capacity,
            bytes: 0,
        }
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }

    #[inline]
    fn fits(&self, size: u32) -> bool {
        match self.mode {
            Mode::Packets => {
                (self.items.len() as u64) < self.capacity as u64
                    && self.bytes.checked_add(size).is_some()
            }
            Mode::Bytes => self.bytes as u64 + size as u64 <= self.capacity as u64,
        }
    }

    #[inline]
    fn invariants(&self) {
        if cfg!(debug_assertions) {
            let bytes: u64 = self.items.iter().map(|item| item.size() as u64).sum();
            assert_eq!(bytes, self.bytes as u64);
            assert!(self.occupancy(self.mode) <= self.capacity);
        }
    }
}

impl<T: Item> Queue for DropTail<T> {
    type Item = T;

    #[inline]
    fn mode(&self) -> Mode {
        self.mode
    }

    #[inline]
    fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    fn push(&mut self, item: T) -> Result<(), T> {
        let size = item.size();

        if !self.fits(size) {
            return Err(item);
        }

        self.bytes += size;
        self.items.push_back(item);

        self.invariants();

        Ok(())
    }

    #[inline]
    fn pop(&mut self) -> Option<T> {
        let item = self.items.pop_front()?;
        self.bytes -= item.size();

        self.invariants();

        Some(item)
    }

    #[inline]
    fn pop_back(&mut self) -> Option<T> {
        let item = self.items.pop_back()?;
        self.bytes -= item.size();

        self.invariants();

        Some(item)
    }

    #[inline]
    fn peek_front(&self) -> Option<&T> {
        self.items.front()
    }

    #[inline]
    fn occupied_count(&self) -> u32 {
        self.items.len() as u32
    }

    #[inline]
    fn occupied_bytes(&self) -> u32 {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use bolero::{check, generator::*};

    #[test]
    fn packets_capacity_test() {
        let mut queue = DropTail::with_max_packets(2);

        assert!(queue.is_empty());
        assert_eq!(queue.push(100u32), Ok(()));
        assert_eq!(queue.push(200u32), Ok(()));
        assert_eq!(queue.push(300u32), Err(300));

        assert_eq!(queue.occupied_count(), 2);
        assert_eq!(queue.occupied_bytes(), 300);
        assert_eq!(queue.peek_front(), Some(&100));

        assert_eq!(queue.pop_back(), Some(200));
        assert_eq!(queue.push(300u32), Ok(()));

        assert_eq!(queue.pop(), Some(100));
        assert_eq!(queue.pop(), Some(300));
        assert_eq!(queue.pop(), None);
        assert_eq!(queue.pop_back(), None);
        assert!(queue.is_empty());
    }

    #[test]
    fn bytes_capacity_test() {
        let mut queue = DropTail::with_max_bytes(1000);

        assert_eq!(queue.push(600u32), Ok(()));
        assert_eq!(queue.push(500u32), Err(500));
        assert_eq!(queue.push(400u32), Ok(()));
        assert_eq!(queue.occupancy(Mode::Bytes), 1000);
        assert_eq!(queue.occupancy(Mode::Packets), 2);

        // zero-sized items always fit in byte mode
        assert_eq!(queue.push(0u32), Ok(()));
        assert_eq!(queue.occupied_count(), 3);
    }

    #[derive(Clone, Copy, Debug, TypeGenerator)]
    enum Operation {
        Push {
            #[generator(0..2000)]
            size: u32,
        },
        Pop,
        PopBack,
    }

    #[test]
    fn differential_test() {
        check!()
            .with_type::<(Mode, u16, Vec<Operation>)>()
            .for_each(|(mode, capacity, ops)| {
                let capacity = *capacity as u32;
                let mut subject = DropTail::new(*mode, capacity);
                let mut oracle = alloc::collections::VecDeque::new();

                for op in ops.iter().copied() {
                    match op {
                        Operation::Push { size } => {
                            let occupied = match mode {
                                Mode::Packets => oracle.len() as u64,
                                Mode::Bytes => oracle.iter().map(|v: &u32| *v as u64).sum(),
                            };
                            let fits = match mode {
                                Mode::Packets => occupied < capacity as u64,
                                Mode::Bytes => occupied + size as u64 <= capacity as u64,
                            };
                            if fits {
                                oracle.push_back(size);
                                assert_eq!(subject.push(size), Ok(()));
                            } else {
                                assert_eq!(subject.push(size), Err(size));
                            }
                        }
                        Operation::Pop => {
                            assert_eq!(subject.pop(), oracle.pop_front());
                        }
                        Operation::PopBack => {
                            assert_eq!(subject.pop_back(), oracle.pop_back());
                        }
                    }

                    assert_eq!(subject.occupied_count() as usize, oracle.len());
                    assert_eq!(subject.peek_front(), oracle.front());
                }
            });
    }
}
