// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `backend` module provides the process-wide registry of compute kernel tables.
//!
//! Two tables are built in: a scalar table and a vector table whose instruction set is chosen at
//! build time. Selection is configuration performed at startup; the registry never locks, and
//! callers must not switch backends concurrently with a running compute operation.

mod scalar;
mod simd;

use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;

use crate::buffer::ValueBuffer;
use crate::errors::{invalid_argument_error, Result};

/// A `Backend` is a fixed table of per-format compute kernels.
///
/// The scalar and vector tables must produce byte-identical min/max aggregations on the same
/// inputs, and sample-rate conversions that agree to within one least-significant bit.
pub trait Backend: Sync {
    /// Human-readable name of the kernel table.
    fn name(&self) -> &'static str;

    /// Resample a wide-layout buffer through the prepared interpolation table attached to the
    /// destination.
    fn convert_sample_rate_s16x8(&self, src: &ValueBuffer, dst: &mut ValueBuffer) -> Result<()>;

    /// Compute the per-channel minimum and maximum of one bucket of a packed 8-bit buffer and
    /// store them at `index` in the two destinations.
    fn aggregate_minmax_s8(
        &self,
        src: &ValueBuffer,
        out_min: &mut ValueBuffer,
        out_max: &mut ValueBuffer,
        index: u32,
        start: u32,
        end: u32,
    ) -> Result<()>;

    /// Compute the per-channel minimum and maximum of one bucket of a wide-layout buffer and
    /// store them at `index` in the two destinations.
    fn aggregate_minmax_s16x8(
        &self,
        src: &ValueBuffer,
        out_min: &mut ValueBuffer,
        out_max: &mut ValueBuffer,
        index: u32,
        start: u32,
        end: u32,
    ) -> Result<()>;
}

static BACKENDS: [&dyn Backend; 2] = [&scalar::ScalarBackend, &simd::SimdBackend];

/// Index of the active backend table. Read-only after startup configuration in practice.
static ACTIVE: AtomicUsize = AtomicUsize::new(0);

/// The number of built-in backend tables.
pub fn count() -> u8 {
    BACKENDS.len() as u8
}

/// The selection label of the backend at `index`.
///
/// Index 0 is the scalar table and index 1 the vector table. Any other index yields the name of
/// the currently active backend.
pub fn name(index: u8) -> &'static str {
    match index {
        0 => "C Backend",
        1 => "SIMD Backend",
        _ => active().name(),
    }
}

/// Select the backend table at `index`: 0 for the scalar table, 1 for the vector table.
///
/// Must not be called concurrently with a compute operation; treat selection as configuration
/// performed at startup.
pub fn select(index: u8) -> Result<()> {
    let index = usize::from(index);
    if index >= BACKENDS.len() {
        return invalid_argument_error("backend: no backend table with the requested index");
    }

    ACTIVE.store(index, Ordering::Relaxed);
    info!("backend: selected {}", BACKENDS[index].name());
    Ok(())
}

/// The currently active backend table.
pub fn active() -> &'static dyn Backend {
    BACKENDS[ACTIVE.load(Ordering::Relaxed)]
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use super::{count, name, scalar::ScalarBackend, select, simd::SimdBackend, Backend};
    use crate::buffer::{ValueBuffer, ValueFormat};
    use crate::dsp::resample;
    use crate::errors::Error;

    #[test]
    fn verify_registry() {
        assert_eq!(count(), 2);
        assert_eq!(name(0), "C Backend");
        assert_eq!(name(1), "SIMD Backend");
        // Out-of-table indicies name whichever backend is active.
        assert!(!name(200).is_empty());
        assert!(matches!(select(2), Err(Error::InvalidArgument(_))));
    }

    fn random_wide_buffer(rng: &mut SmallRng, num_samples: u32) -> ValueBuffer {
        let mut buf = ValueBuffer::new();
        buf.alloc(num_samples, 8, 16, 16, ValueFormat::SimdS16x8);
        buf.set_time_base(1, -6);
        for s in &mut buf.samples_s16_mut()[..num_samples as usize * 8] {
            *s = rng.random_range(i16::MIN..=i16::MAX);
        }
        buf
    }

    #[test]
    fn verify_backends_agree_on_resampling() {
        let mut rng = SmallRng::seed_from_u64(0x5c0fe11e);
        let src = random_wide_buffer(&mut rng, 4096);

        for new_rate in [250_000, 800_000, 1_000_000, 1_700_000, 3_000_000] {
            let mut dst_c = ValueBuffer::new();
            resample::prepare(&src, new_rate, &mut dst_c).unwrap();
            ScalarBackend.convert_sample_rate_s16x8(&src, &mut dst_c).unwrap();

            let mut dst_v = ValueBuffer::new();
            resample::prepare(&src, new_rate, &mut dst_v).unwrap();
            SimdBackend.convert_sample_rate_s16x8(&src, &mut dst_v).unwrap();

            assert_eq!(dst_c.num_samples(), dst_v.num_samples());
            let n = dst_c.num_samples() as usize * 8;
            for (a, b) in dst_c.samples_s16()[..n].iter().zip(&dst_v.samples_s16()[..n]) {
                let delta = (i32::from(*a) - i32::from(*b)).abs();
                assert!(delta <= 1, "rate {}: {} vs {}", new_rate, a, b);
            }
        }
    }

    #[test]
    fn verify_backends_identical_on_aggregation() {
        let mut rng = SmallRng::seed_from_u64(0xa66);
        let src = random_wide_buffer(&mut rng, 3000);

        let mut packed = ValueBuffer::new();
        packed.alloc(3000, 3, 8, 1, ValueFormat::AnalogS8);
        for s in packed.samples_s8_mut() {
            *s = rng.random_range(i8::MIN..=i8::MAX);
        }

        let buckets = [(0u32, 100u32), (100, 357), (2950, 3000), (123, 124)];

        for (start, end) in buckets {
            let mut min_c = ValueBuffer::new();
            let mut max_c = ValueBuffer::new();
            let mut min_v = ValueBuffer::new();
            let mut max_v = ValueBuffer::new();
            crate::dsp::aggregate::prepare(&src, &mut min_c, &mut max_c, 1).unwrap();
            crate::dsp::aggregate::prepare(&src, &mut min_v, &mut max_v, 1).unwrap();

            ScalarBackend.aggregate_minmax_s16x8(&src, &mut min_c, &mut max_c, 0, start, end).unwrap();
            SimdBackend.aggregate_minmax_s16x8(&src, &mut min_v, &mut max_v, 0, start, end).unwrap();

            assert_eq!(&min_c.samples_s16()[..8], &min_v.samples_s16()[..8]);
            assert_eq!(&max_c.samples_s16()[..8], &max_v.samples_s16()[..8]);

            let mut pmin_c = ValueBuffer::new();
            let mut pmax_c = ValueBuffer::new();
            let mut pmin_v = ValueBuffer::new();
            let mut pmax_v = ValueBuffer::new();
            crate::dsp::aggregate::prepare(&packed, &mut pmin_c, &mut pmax_c, 1).unwrap();
            crate::dsp::aggregate::prepare(&packed, &mut pmin_v, &mut pmax_v, 1).unwrap();

            ScalarBackend.aggregate_minmax_s8(&packed, &mut pmin_c, &mut pmax_c, 0, start, end).unwrap();
            SimdBackend.aggregate_minmax_s8(&packed, &mut pmin_v, &mut pmax_v, 0, start, end).unwrap();

            assert_eq!(&pmin_c.samples_s8()[..3], &pmin_v.samples_s8()[..3]);
            assert_eq!(&pmax_c.samples_s8()[..3], &pmax_v.samples_s8()[..3]);
        }
    }

    #[test]
    fn verify_single_channel_vector_aggregation_matches_scalar() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut mono = ValueBuffer::new();
        mono.alloc(1013, 1, 8, 1, ValueFormat::AnalogS8);
        for s in mono.samples_s8_mut() {
            *s = rng.random_range(i8::MIN..=i8::MAX);
        }

        let mut min_c = ValueBuffer::new();
        let mut max_c = ValueBuffer::new();
        let mut min_v = ValueBuffer::new();
        let mut max_v = ValueBuffer::new();
        crate::dsp::aggregate::prepare(&mono, &mut min_c, &mut max_c, 1).unwrap();
        crate::dsp::aggregate::prepare(&mono, &mut min_v, &mut max_v, 1).unwrap();

        // An odd-sized range exercises both the eight-wide path and its scalar tail.
        ScalarBackend.aggregate_minmax_s8(&mono, &mut min_c, &mut max_c, 0, 3, 1010).unwrap();
        SimdBackend.aggregate_minmax_s8(&mono, &mut min_v, &mut max_v, 0, 3, 1010).unwrap();

        assert_eq!(min_c.samples_s8()[0], min_v.samples_s8()[0]);
        assert_eq!(max_c.samples_s8()[0], max_v.samples_s8()[0]);
    }
}
