// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `resample` module converts a buffer from its source rate to a target rate given in hertz,
//! linearly interpolating between adjacent source samples.
//!
//! A conversion is split into two calls: [`prepare`] sizes and allocates the destination, fixes
//! its time base, and attaches the auxiliary resampling state; [`convert`] then executes the
//! kernel for the source's value format. Only linear interpolation is performed; no anti-alias
//! filtering is applied ahead of a downsampling conversion.

use crate::backend;
use crate::buffer::{SampleInterp, SampleRateInfo, ValueBuffer, ValueFormat};
use crate::errors::{alloc_error, invalid_argument_error, unsupported_error, Result};
use crate::units;

/// Prepare `dst` as the destination for resampling `src` to `new_rate_hz`.
///
/// The destination keeps the source's geometry and value format, receives
/// `floor(src_samples × rate_ratio)` samples, and a time base chosen as the largest engineering
/// exponent for which the target interval mantissa is representable. The rate-ratio record, and
/// for the wide layout the per-output-sample interpolation table, are attached to the
/// destination and released together with it.
///
/// On failure the destination must be released by the caller before reuse.
pub fn prepare(src: &ValueBuffer, new_rate_hz: u32, dst: &mut ValueBuffer) -> Result<()> {
    if new_rate_hz == 0 {
        return invalid_argument_error("resample: target rate must be positive");
    }
    if src.time_step() == 0 {
        return invalid_argument_error("resample: source buffer has no time base");
    }

    let time_unit = 10f64.powi(i32::from(src.time_exponent()));
    let old_rate = 1.0 / (f64::from(src.time_step()) * time_unit);
    let rate_ratio = f64::from(new_rate_hz) / old_rate;
    let new_num_samples = (f64::from(src.num_samples()) * rate_ratio) as u32;

    let (time_step, time_exponent) = units::fit_time_base(1.0 / f64::from(new_rate_hz));
    dst.set_time_base(time_step, time_exponent);

    dst.alloc(
        new_num_samples,
        src.num_channels(),
        src.bitwidth(),
        src.bytes_per_sample(),
        src.value_type(),
    );

    let interp = if src.value_type() == ValueFormat::SimdS16x8 {
        Some(build_interp_table(src, new_num_samples)?)
    } else {
        None
    };

    dst.set_resample_state(SampleRateInfo { rate_ratio }, interp);
    Ok(())
}

/// Build the per-output-sample interpolation table for a wide-layout conversion.
///
/// Each record holds the two source indicies bracketing the output instant, the Q0.16 fraction
/// between them, and its one's complement. The lower index is clamped to the penultimate source
/// sample so neither kernel shape can read past the source region.
fn build_interp_table(src: &ValueBuffer, out_samples: u32) -> Result<Box<[SampleInterp]>> {
    if src.num_channels() != 8 {
        return invalid_argument_error("resample: the wide layout carries eight channels");
    }

    let in_samples = src.num_samples();
    let mut table = Vec::new();
    if table.try_reserve_exact(out_samples as usize).is_err() {
        return alloc_error("resample: interpolation table");
    }

    for i in 0..out_samples {
        let original_index = f64::from(i) * f64::from(in_samples) / f64::from(out_samples);
        let mut idx0 = original_index as u32;
        if in_samples < 2 {
            idx0 = 0;
        } else if idx0 > in_samples - 2 {
            idx0 = in_samples - 2;
        }
        let idx1 = if idx0 + 1 < in_samples { idx0 + 1 } else { idx0 };

        // Saturating cast: a fraction pushed past 1.0 by the index clamp pins to the top of the
        // Q0.16 range.
        let frac = ((original_index - f64::from(idx0)) * 65536.0) as u16;

        table.push(SampleInterp { idx0, idx1, frac, inv_frac: !frac });
    }

    Ok(table.into_boxed_slice())
}

/// Execute the conversion from `src` into the prepared destination `dst`.
///
/// `AnalogS8` runs the scalar reference kernel; `SimdS16x8` dispatches through the active
/// backend table. Every other format is rejected.
pub fn convert(src: &ValueBuffer, dst: &mut ValueBuffer) -> Result<()> {
    match src.value_type() {
        ValueFormat::AnalogS8 => convert_s8(src, dst),
        ValueFormat::SimdS16x8 => backend::active().convert_sample_rate_s16x8(src, dst),
        _ => {
            src.log_unsupported("resample");
            unsupported_error("resample: value format has no conversion kernel")
        }
    }
}

/// Scalar reference kernel for packed 8-bit analog buffers.
fn convert_s8(src: &ValueBuffer, dst: &mut ValueBuffer) -> Result<()> {
    let rate_ratio = match dst.rate_info() {
        Some(info) => info.rate_ratio,
        None => return invalid_argument_error("resample: destination was not prepared"),
    };

    let channels = usize::from(src.num_channels());
    let in_samples = src.num_samples();
    let out_samples = dst.num_samples();
    if in_samples == 0 || out_samples == 0 {
        return Ok(());
    }

    let src_s8 = src.samples_s8();
    let dst_s8 = dst.samples_s8_mut();

    for i in 0..out_samples {
        let original_index = f64::from(i) / rate_ratio;
        let idx0 = original_index as u32;
        let idx1 = if idx0 + 1 < in_samples { idx0 + 1 } else { idx0 };
        let frac = original_index - f64::from(idx0);

        for ch in 0..channels {
            let v0 = f64::from(src_s8[idx0 as usize * channels + ch]);
            let v1 = f64::from(src_s8[idx1 as usize * channels + ch]);
            let interpolated = (1.0 - frac) * v0 + frac * v1;
            dst_s8[i as usize * channels + ch] = interpolated.round() as i8;
        }
    }

    Ok(())
}
