// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `layout` module converts between the narrow per-channel packed format and the
//! eight-channel-wide interleaved format required by the vector kernels.

use crate::buffer::{ValueBuffer, ValueFormat};
use crate::errors::{invalid_argument_error, out_of_range_error, unsupported_error, Result};

/// The channel count of the wide SIMD layout.
const WIDE_CHANNELS: u8 = 8;

/// Prepare `dst` as a wide-layout destination for the packed 8-bit buffer `src`.
///
/// The destination receives the source's time base and sample count, eight 16-bit channels, and
/// a 16-byte-aligned backing store.
pub fn prepare_wide(src: &ValueBuffer, dst: &mut ValueBuffer) -> Result<()> {
    if src.value_type() != ValueFormat::AnalogS8 || src.bitwidth() != 8 {
        return unsupported_error("layout: wide preparation requires a packed 8-bit analog source");
    }

    dst.set_time_base(src.time_step(), src.time_exponent());
    dst.alloc(src.num_samples(), WIDE_CHANNELS, 16, 16, ValueFormat::SimdS16x8);
    Ok(())
}

/// Copy one logical channel of a packed 8-bit buffer into one channel of a wide-layout buffer,
/// sign-extending each value to 16 bits.
///
/// Call once per logical channel to populate a wide buffer.
pub fn convert_to_wide(
    src: &ValueBuffer,
    dst: &mut ValueBuffer,
    src_channel: u8,
    dst_channel: u8,
) -> Result<()> {
    if src.value_type() != ValueFormat::AnalogS8 || src.bitwidth() != 8 {
        return unsupported_error("layout: source is not a packed 8-bit analog buffer");
    }
    if dst.value_type() != ValueFormat::SimdS16x8 || dst.bitwidth() != 16 {
        return unsupported_error("layout: destination is not a wide 16-bit buffer");
    }
    if dst.num_samples() != src.num_samples() {
        return invalid_argument_error("layout: source and destination sample counts differ");
    }
    if dst.num_channels() > WIDE_CHANNELS {
        return invalid_argument_error("layout: destination exceeds eight wide channels");
    }

    if src_channel >= src.num_channels() || dst_channel >= dst.num_channels() {
        return out_of_range_error("layout: channel index beyond buffer extents");
    }

    let num_samples = src.num_samples();
    let stride = u32::from(dst.bytes_per_sample()) / 2;
    let wide = dst.samples_s16_mut();

    for i in 0..num_samples {
        let value = src.sample_s8(i, src_channel)?;
        wide[(i * stride + u32::from(dst_channel)) as usize] = i16::from(value);
    }

    Ok(())
}

/// Narrow a wide-layout buffer back into a packed 8-bit buffer.
///
/// Only channel 0 is carried: source channel 0 is read, truncated to 8 bits, and written to
/// destination channel 0. The destination sample count is set to the source's on success.
pub fn convert_from_wide(src: &ValueBuffer, dst: &mut ValueBuffer) -> Result<()> {
    if src.value_type() != ValueFormat::SimdS16x8 || src.bitwidth() != 16 {
        return unsupported_error("layout: source is not a wide 16-bit buffer");
    }
    if dst.value_type() != ValueFormat::AnalogS8 || dst.bitwidth() != 8 {
        return unsupported_error("layout: destination is not a packed 8-bit analog buffer");
    }

    for i in 0..src.num_samples() {
        let value = src.sample_s16x8(i, 0)?;
        let offset = dst.sample_byte_offset(i, 0)? as usize;
        dst.samples_s8_mut()[offset] = value as i8;
    }

    dst.num_samples = src.num_samples();
    Ok(())
}
