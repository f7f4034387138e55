// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod blue;
pub mod event;
pub mod queue;
pub mod random;
pub mod time;

pub use blue::{Admission, BlueQueueDisc};
