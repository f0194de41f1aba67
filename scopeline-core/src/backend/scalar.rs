// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scalar reference kernels. The vector table must reproduce these results.

use crate::backend::Backend;
use crate::buffer::ValueBuffer;
use crate::errors::{invalid_argument_error, Result};

/// The scalar kernel table.
pub(crate) struct ScalarBackend;

impl Backend for ScalarBackend {
    fn name(&self) -> &'static str {
        "C Backend"
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

        // Lane-by-lane restatement of the vector kernel's Q0.16 arithmetic so the two tables
        // produce identical samples.
        for (i, p) in table.iter().enumerate() {
            let base0 = p.idx0 as usize * 8;
            let base1 = p.idx1 as usize * 8;
            let inv = i32::from(p.inv_frac);
            let frac = i32::from(p.frac);

            for ch in 0..8 {
                let v0 = i32::from(src_s16[base0 + ch]);
                let v1 = i32::from(src_s16[base1 + ch]);
                let interp = (v0 * inv + v1 * frac + 0x8000) >> 16;
                dst_s16[i * 8 + ch] = interp as i16;
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
        let src_s16 = src.samples_s16();
        let min_s16 = out_min.samples_s16_mut();
        let max_s16 = out_max.samples_s16_mut();

        for ch in 0..channels {
            let mut min_val = i16::MAX;
            let mut max_val = i16::MIN;

            for j in start as usize..end as usize {
                let value = src_s16[j * channels + ch];
                if value < min_val {
                    min_val = value;
                }
                if value > max_val {
                    max_val = value;
                }
            }

            min_s16[index as usize * channels + ch] = min_val;
            max_s16[index as usize * channels + ch] = max_val;
        }

        Ok(())
    }
}
