// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core data structures and kernels for ingesting, resampling, and
//! downsampling dense multi-channel time-series at interactive rates.

pub mod backend;
pub mod buffer;
pub mod dsp;
pub mod errors;
pub mod events;
pub mod layout;
pub mod units;
pub mod util;
