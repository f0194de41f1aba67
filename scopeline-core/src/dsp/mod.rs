// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `dsp` module implements the two compute engines: sample-rate conversion and min/max
//! envelope aggregation.

pub mod aggregate;
pub mod resample;
