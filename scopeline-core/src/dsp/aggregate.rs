// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `aggregate` module collapses a long source buffer into per-bucket (min, max) envelope
//! pairs, one bucket per destination sample.
//!
//! This is the operation that turns a million-sample capture into a pixel-wide envelope at
//! interactive rates: each destination index holds, per channel, the extremes of the source
//! interval it covers. Aggregation may be invoked repeatedly over arbitrary sub-ranges of the
//! same source without re-preparing the destinations.

use crate::backend;
use crate::buffer::{ValueBuffer, ValueFormat};
use crate::errors::{invalid_argument_error, out_of_range_error, unsupported_error, Result};

fn supported(format: ValueFormat) -> bool {
    matches!(format, ValueFormat::AnalogS8 | ValueFormat::SimdS16x8)
}

/// Prepare `out_min` and `out_max` as envelope destinations of `out_samples` buckets each.
///
/// Both destinations take the source's value format, channel count, bit width, and per-sample
/// stride. The source's time base is copied as a starting point; callers downsampling onto a
/// coarser grid are free to overwrite it afterwards.
pub fn prepare(
    src: &ValueBuffer,
    out_min: &mut ValueBuffer,
    out_max: &mut ValueBuffer,
    out_samples: u32,
) -> Result<()> {
    if !supported(src.value_type()) {
        src.log_unsupported("aggregate");
        return unsupported_error("aggregate: value format has no min/max kernel");
    }

    for out in [&mut *out_min, &mut *out_max] {
        out.set_time_base(src.time_step(), src.time_exponent());
        out.alloc(
            out_samples,
            src.num_channels(),
            src.bitwidth(),
            src.bytes_per_sample(),
            src.value_type(),
        );
    }

    Ok(())
}

/// Aggregate the source window of `in_samples` samples starting at `in_offset` into the
/// prepared destinations.
///
/// `in_samples == 0` selects the entire source. The bucket count is the destination sample
/// count; bucket `i` covers source indicies `in_offset + [floor(i × stride),
/// floor((i + 1) × stride))` with `stride = in_samples / out_samples`. Empty buckets are widened
/// to a single sample and the final bucket is clamped to the end of the window. A zero-bucket
/// destination is a no-op.
pub fn aggregate(
    src: &ValueBuffer,
    out_min: &mut ValueBuffer,
    out_max: &mut ValueBuffer,
    in_samples: u32,
    in_offset: u32,
) -> Result<()> {
    let format = src.value_type();
    if !supported(format) {
        src.log_unsupported("aggregate");
        return unsupported_error("aggregate: value format has no min/max kernel");
    }

    let in_samples = if in_samples > 0 { in_samples } else { src.num_samples() };
    let out_samples = out_min.num_samples();
    if in_samples == 0 || out_samples == 0 {
        return Ok(());
    }
    if u64::from(in_offset) + u64::from(in_samples) > u64::from(src.num_samples()) {
        return out_of_range_error("aggregate: window extends beyond the source buffer");
    }
    if out_max.num_samples() != out_samples {
        return invalid_argument_error("aggregate: min and max destinations differ in size");
    }

    let table = backend::active();
    let stride = f64::from(in_samples) / f64::from(out_samples);

    for i in 0..out_samples {
        let start = in_offset + (f64::from(i) * stride) as u32;
        let mut end = in_offset + (f64::from(i + 1) * stride) as u32;
        if end <= start {
            end = start + 1;
        }
        if end > in_offset + in_samples {
            end = in_offset + in_samples;
        }

        match format {
            ValueFormat::AnalogS8 => {
                table.aggregate_minmax_s8(src, out_min, out_max, i, start, end)?
            }
            ValueFormat::SimdS16x8 => {
                table.aggregate_minmax_s16x8(src, out_min, out_max, i, start, end)?
            }
            _ => unreachable!(),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{aggregate, prepare};
    use crate::buffer::{ValueBuffer, ValueFormat};
    use crate::errors::Error;
    use crate::util;

    fn sine_wide(num_samples: u32) -> ValueBuffer {
        util::sine_wave(ValueFormat::SimdS16x8, num_samples, 8, 25.0, 10_000.0, 1_500_000)
            .unwrap()
    }

    #[test]
    fn verify_bucket_envelope_bounds() {
        let src = sine_wide(1000);
        let mut out_min = ValueBuffer::new();
        let mut out_max = ValueBuffer::new();
        prepare(&src, &mut out_min, &mut out_max, 13).unwrap();
        aggregate(&src, &mut out_min, &mut out_max, 0, 0).unwrap();

        let stride = 1000.0f64 / 13.0;
        for i in 0..13u32 {
            let start = (f64::from(i) * stride) as u32;
            let end = ((f64::from(i + 1) * stride) as u32).max(start + 1).min(1000);
            for ch in 0..8 {
                let lo = out_min.sample_s16x8(i, ch).unwrap();
                let hi = out_max.sample_s16x8(i, ch).unwrap();
                assert!(lo <= hi);
                for j in start..end {
                    let s = src.sample_s16x8(j, ch).unwrap();
                    assert!(lo <= s && s <= hi, "bucket {} channel {} sample {}", i, ch, j);
                }
            }
        }
    }

    #[test]
    fn verify_identity_bucket_count() {
        // One bucket per source sample reproduces the source in both outputs.
        let src = sine_wide(64);
        let mut out_min = ValueBuffer::new();
        let mut out_max = ValueBuffer::new();
        prepare(&src, &mut out_min, &mut out_max, 64).unwrap();
        aggregate(&src, &mut out_min, &mut out_max, 0, 0).unwrap();

        for i in 0..64 {
            for ch in 0..8 {
                let s = src.sample_s16x8(i, ch).unwrap();
                assert_eq!(out_min.sample_s16x8(i, ch).unwrap(), s);
                assert_eq!(out_max.sample_s16x8(i, ch).unwrap(), s);
            }
        }
    }

    #[test]
    fn verify_single_bucket_is_global_extreme() {
        let src = util::sine_wave(ValueFormat::AnalogS8, 300, 2, 30.0, 90.0, 48_000).unwrap();
        let mut out_min = ValueBuffer::new();
        let mut out_max = ValueBuffer::new();
        prepare(&src, &mut out_min, &mut out_max, 1).unwrap();
        aggregate(&src, &mut out_min, &mut out_max, 300, 0).unwrap();

        for ch in 0..2 {
            let mut lo = i8::MAX;
            let mut hi = i8::MIN;
            for i in 0..300 {
                let s = src.sample_s8(i, ch).unwrap();
                lo = lo.min(s);
                hi = hi.max(s);
            }
            assert_eq!(out_min.sample_s8(0, ch).unwrap(), lo);
            assert_eq!(out_max.sample_s8(0, ch).unwrap(), hi);
        }
    }

    #[test]
    fn verify_window_advance_matches_single_shot() {
        // Aggregating a window bucket-by-bucket while advancing the offset must equal one
        // aggregation of the same window: the scroll path of an envelope view.
        let src = sine_wide(2048);
        let screen_width = 16u32;
        let visible = 512u32;
        let start = 256u32;
        let bucket = visible / screen_width;

        let mut one_min = ValueBuffer::new();
        let mut one_max = ValueBuffer::new();
        prepare(&src, &mut one_min, &mut one_max, screen_width).unwrap();
        aggregate(&src, &mut one_min, &mut one_max, visible, start).unwrap();

        let mut step_min = ValueBuffer::new();
        let mut step_max = ValueBuffer::new();
        prepare(&src, &mut step_min, &mut step_max, 1).unwrap();

        for i in 0..screen_width {
            aggregate(&src, &mut step_min, &mut step_max, bucket, start + i * bucket).unwrap();
            for ch in 0..8 {
                assert_eq!(
                    step_min.sample_s16x8(0, ch).unwrap(),
                    one_min.sample_s16x8(i, ch).unwrap()
                );
                assert_eq!(
                    step_max.sample_s16x8(0, ch).unwrap(),
                    one_max.sample_s16x8(i, ch).unwrap()
                );
            }
        }
    }

    #[test]
    fn verify_zero_bucket_and_window_validation() {
        let src = sine_wide(100);
        let mut out_min = ValueBuffer::new();
        let mut out_max = ValueBuffer::new();
        prepare(&src, &mut out_min, &mut out_max, 0).unwrap();
        // Zero buckets is a no-op.
        aggregate(&src, &mut out_min, &mut out_max, 0, 0).unwrap();

        prepare(&src, &mut out_min, &mut out_max, 4).unwrap();
        assert!(matches!(
            aggregate(&src, &mut out_min, &mut out_max, 64, 64),
            Err(Error::OutOfRange(_))
        ));
    }

    #[test]
    fn verify_unsupported_format_is_rejected() {
        let mut src = ValueBuffer::new();
        src.alloc(10, 1, 64, 8, ValueFormat::AnalogF64);
        let mut out_min = ValueBuffer::new();
        let mut out_max = ValueBuffer::new();
        assert!(matches!(
            prepare(&src, &mut out_min, &mut out_max, 2),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            aggregate(&src, &mut out_min, &mut out_max, 0, 0),
            Err(Error::Unsupported(_))
        ));
    }
}
