// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `units` module provides engineering-scaled presentation of the time grid of a buffer.

use crate::buffer::ValueBuffer;

const FREQ_UNITS: [&str; 6] = ["Hz", "kHz", "MHz", "GHz", "THz", "PHz"];

/// The sample rate of the buffer scaled to the nearest 10³ frequency unit.
///
/// Computes `1 / (time_step × 10^time_exponent)` and divides by 1000 while the value is at least
/// 1000, advancing along Hz, kHz, MHz, GHz, THz, and stopping at PHz.
pub fn sample_rate(buf: &ValueBuffer) -> (f64, &'static str) {
    let mut freq = 1.0 / (f64::from(buf.time_step()) * 10f64.powi(i32::from(buf.time_exponent())));
    let mut index = 0;

    while freq >= 1000.0 && index < FREQ_UNITS.len() - 1 {
        freq /= 1000.0;
        index += 1;
    }

    (freq, FREQ_UNITS[index])
}

/// Fit an interval in seconds onto the engineering time grid: the first exponent, scanning
/// 15 down to −15 in steps of 3, whose mantissa lands in `[1, 2³² − 1]`, with the mantissa
/// rounded to the nearest integer.
pub(crate) fn fit_time_base(interval_sec: f64) -> (u32, i8) {
    for exponent in (-5..=5).map(|e| e * 3).rev() {
        let candidate = interval_sec / 10f64.powi(exponent);
        if candidate >= 1.0 && candidate <= f64::from(u32::MAX) {
            return ((candidate + 0.5) as u32, exponent as i8);
        }
    }
    (0, 0)
}

/// The per-sample time interval of the buffer paired with a symbolic time unit.
///
/// The returned value is `time_step` itself; the unit is derived from `time_exponent`. Exponents
/// outside the engineering map yield the literal `"?s"`.
pub fn time_interval(buf: &ValueBuffer) -> (f64, &'static str) {
    let unit = match buf.time_exponent() {
        0 => "s",
        -3 => "ms",
        -6 => "us",
        -9 => "ns",
        -12 => "ps",
        -15 => "fs",
        _ => "?s",
    };

    (f64::from(buf.time_step()), unit)
}
