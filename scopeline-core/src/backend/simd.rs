// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Vector kernel table built on portable eight-lane integer vectors.
//!
//! The wide layout stores one full time step in a single 16-byte lane, so every kernel here
//! processes all eight channels of a sample per operation.

use wide::{i16x8, i32x8};

use crate::backend::Backend;
use crate::buffer::ValueBuffer;
use crate::errors::{invalid_argument_error, Result};

/// The vector kernel table. The instruction set is fixed at build time.
pub(crate) struct SimdBackend;

#[cfg(target_arch = "aarch64")]
const NAME: &str = "Neon SIMD Backend";
#[cfg(all(target_arch = "x86_64", any(target_feature = "avx2", target_feature = "avx")))]
const NAME: &str = "Intel AVX2 SIMD Backend";
#[cfg(all(target_arch = "x86_64", not(any(target_feature = "avx2", target_feature = "avx"))))]
const NAME: &str = "Intel SSE2 SIMD Backend";
#[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
const NAME: &str = "Fallback C Backend";

#[inline]
fn load_s16x8(samples: &[i16], base: usize) -> i16x8 {
    let mut lane = [0i16; 8];
    lane.copy_from_slice(&samples[base..base + 8]);
    i16x8::from(lane)
}

#[inline]
fn widen(lane: i16x8) -> i32x8 {
    i32x8::from(lane.as_array_ref().map(i32::from))
}

impl Backend for SimdBackend {
    fn name(&self) -> &'static str {
        NAME
    }

    fn convert_sample_rate_s16x8(&self, src: &ValueBuffer, dst: &mut ValueBuffer) -> Result<()> {
        if src.num_channels() != 8 {
            return invalid_argument_error("backend: wide kernels require eight channels");
        }

        let src_s16 = src.samples_s16();
        let (table, dst_s16) = dst.interp_split_mut();
        let table = match table {
            Some(table) => table,
            None => {
                return invalid_argument_error(
                    "backend: destination has no prepared interpolation table",
                )
            }
        };

        let round = i32x8::splat(0x8000);

        for (i, p) in table.iter().enumerate() {
            let v0 = widen(load_s16x8(src_s16, p.idx0 as usize * 8));
            let v1 = widen(load_s16x8(src_s16, p.idx1 as usize * 8));
            let inv = i32x8::splat(i32::from(p.inv_frac));
            let frac = i32x8::splat(i32::from(p.frac));

            // (v0 × inv_frac + v1 × frac) in Q0.16, then a rounding arithmetic shift back down.
            let interp: i32x8 = (v0 * inv + v1 * frac + round) >> 16;

            let narrowed = interp.as_array_ref();
            for (ch, value) in narrowed.iter().enumerate() {
                dst_s16[i * 8 + ch] = *value as i16;
            }
        }

        Ok(())
    }

    fn aggregate_minmax_s8(
        &self,
        src: &ValueBuffer,
        out_min: &mut ValueBuffer,
        out_max: &mut ValueBuffer,
        index: u32,
        start: u32,
        end: u32,
    ) -> Result<()> {
        let channels = usize::from(src.num_channels());
        let stride = usize::from(src.bytes_per_sample());
        let src_s8 = src.samples_s8();
        let min_s8 = out_min.samples_s8_mut();
        let max_s8 = out_max.samples_s8_mut();

        if channels == 1 {
            // Consecutive samples are consecutive bytes; run eight lanes widened to 16 bits and
            // fold the lanes down at the end.
            let bucket = &src_s8[start as usize..end as usize];
            let mut min_lanes = i16x8::splat(i16::from(i8::MAX));
            let mut max_lanes = i16x8::splat(i16::from(i8::MIN));

            let mut chunks = bucket.chunks_exact(8);
            for chunk in chunks.by_ref() {
                let mut lane = [0i16; 8];
                for (l, v) in lane.iter_mut().zip(chunk) {
                    *l = i16::from(*v);
                }
                let lane = i16x8::from(lane);
                min_lanes = min_lanes.min(lane);
                max_lanes = max_lanes.max(lane);
            }

            let mut min_val = min_lanes.as_array_ref().iter().copied().min().unwrap_or(i16::MAX);
            let mut max_val = max_lanes.as_array_ref().iter().copied().max().unwrap_or(i16::MIN);

            for &value in chunks.remainder() {
                min_val = min_val.min(i16::from(value));
                max_val = max_val.max(i16::from(value));
            }

            min_s8[index as usize * stride] = min_val as i8;
            max_s8[index as usize * stride] = max_val as i8;
            return Ok(());
        }

        // Channel-interleaved narrow data has no lane-friendly stride; fall back to the scalar
        // walk per channel.
        for ch in 0..channels {
            let mut min_val = i8::MAX;
            let mut max_val = i8::MIN;

            for j in start as usize..end as usize {
                let value = src_s8[j * stride + ch];
                if value < min_val {
                    min_val = value;
                }
                if value > max_val {
                    max_val = value;
                }
            }

            min_s8[index as usize * stride + ch] = min_val;
            max_s8[index as usize * stride + ch] = max_val;
        }

        Ok(())
    }

    fn aggregate_minmax_s16x8(
        &self,
        src: &ValueBuffer,
        out_min: &mut ValueBuffer,
        out_max: &mut ValueBuffer,
        index: u32,
        start: u32,
        end: u32,
    ) -> Result<()> {
        let channels = usize::from(src.num_channels());
        if channels != 8 {
            return invalid_argument_error("backend: wide kernels require eight channels");
        }

        let src_s16 = src.samples_s16();
        let mut min_lanes = i16x8::splat(i16::MAX);
        let mut max_lanes = i16x8::splat(i16::MIN);

        for j in start as usize..end as usize {
            let sample = load_s16x8(src_s16, j * 8);
            min_lanes = min_lanes.min(sample);
            max_lanes = max_lanes.max(sample);
        }

        let base = index as usize * 8;
        out_min.samples_s16_mut()[base..base + 8].copy_from_slice(min_lanes.as_array_ref());
        out_max.samples_s16_mut()[base..base + 8].copy_from_slice(max_lanes.as_array_ref());

        Ok(())
    }
}
