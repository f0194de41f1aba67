// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `buffer` module defines the central value buffer data model: an aligned, interleaved
//! sample region plus the time metadata describing it.

use log::error;

use crate::errors::{out_of_range_error, unsupported_error, Result};

/// The minimum alignment of every backing store. The wide SIMD layout requires 16 bytes; smaller
/// requests are satisfied for free.
const STORE_ALIGN: usize = 16;

/// An enumeration of the value formats a [`ValueBuffer`] may carry.
///
/// The compute kernels implement only [`ValueFormat::AnalogS8`] and [`ValueFormat::SimdS16x8`].
/// The remaining variants are accepted by the data model and the formatting utilities, but cause
/// compute operations to report an unsupported-format error.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ValueFormat {
    /// No format assigned yet.
    #[default]
    Undefined,
    /// Single-bit digital samples.
    Digital1,
    /// 4-bit digital samples.
    Digital4,
    /// 8-bit digital samples.
    Digital8,
    /// Signed 8-bit analog samples, one byte per channel.
    AnalogS8,
    /// 32-bit floating point analog samples.
    AnalogF32,
    /// 64-bit floating point analog samples.
    AnalogF64,
    /// Eight interleaved signed 16-bit channels per time step, 16-byte aligned.
    SimdS16x8,
    /// Eight interleaved signed 24-bit channels per time step.
    SimdS24x8,
}

/// Companion record of a buffer prepared as a resampling destination.
#[derive(Copy, Clone, Debug)]
pub struct SampleRateInfo {
    /// The ratio of the new sample rate over the old sample rate.
    pub rate_ratio: f64,
}

/// One prepared interpolation record per output sample of a wide-layout resampling destination.
///
/// `frac` is a Q0.16 fixed-point fraction between the two source indicies, and `inv_frac` is its
/// one's complement.
#[derive(Copy, Clone, Debug)]
pub struct SampleInterp {
    pub idx0: u32,
    pub idx1: u32,
    pub frac: u16,
    pub inv_frac: u16,
}

/// A `ValueBuffer` owns an aligned byte region holding interleaved multi-channel samples, plus
/// the metadata describing their layout and time grid.
///
/// Channel data is interleaved: samples are stored in a linear sequence, and one time step may
/// contain multiple channel values. The per-sample time interval is
/// `time_step × 10^time_exponent` seconds.
///
/// A buffer begins life zeroed with no backing storage, acquires storage through [`alloc`]
/// (fixing the sample count, channel count, bit width, alignment, and value format), and releases
/// everything through [`release`]. The buffer exclusively owns its byte region and any auxiliary
/// resampling state; there is no sharing.
///
/// [`alloc`]: ValueBuffer::alloc
/// [`release`]: ValueBuffer::release
#[derive(Default)]
pub struct ValueBuffer {
    pub(crate) value_type: ValueFormat,
    pub(crate) num_samples: u32,
    pub(crate) num_channels: u8,
    pub(crate) bitwidth: u8,
    pub(crate) bytes_per_sample: u8,
    pub(crate) buffer_size: u32,
    pub(crate) time_step: u32,
    pub(crate) time_exponent: i8,
    pub(crate) total_time_sec: f64,
    raw: Vec<u8>,
    start: usize,
    pub(crate) rate_info: Option<SampleRateInfo>,
    pub(crate) interp: Option<Box<[SampleInterp]>>,
}

fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

/// The effective store alignment for a caller-requested alignment: the least value that is a
/// multiple of both the request and [`STORE_ALIGN`].
fn effective_align(alignment: u8) -> usize {
    let a = usize::from(alignment).max(1);
    (a / gcd(a, STORE_ALIGN)) * STORE_ALIGN
}

impl ValueBuffer {
    /// Instantiate a new, zeroed `ValueBuffer` with no backing storage.
    pub fn new() -> Self {
        Default::default()
    }

    /// Allocate the backing storage for the given geometry.
    ///
    /// Computes `bytes_per_sample = ceil(num_channels × bitwidth / 8)` and allocates
    /// `num_samples × num_channels × bytes_per_sample` bytes, rounded up to a multiple of
    /// `alignment` when `alignment > 1`. The backing store address is a multiple of the
    /// requested alignment (and of 16). Exhaustion of the global allocator aborts the process;
    /// the data model treats sample memory as a strict requirement.
    ///
    /// Any previously held storage is replaced. Time metadata and auxiliary resampling state are
    /// left untouched.
    pub fn alloc(
        &mut self,
        num_samples: u32,
        num_channels: u8,
        bitwidth: u8,
        alignment: u8,
        value_type: ValueFormat,
    ) {
        self.num_samples = num_samples;
        self.num_channels = num_channels;
        self.bitwidth = bitwidth;
        self.bytes_per_sample = ((u32::from(num_channels) * u32::from(bitwidth) + 7) / 8) as u8;
        self.value_type = value_type;
        self.buffer_size =
            num_samples * u32::from(num_channels) * u32::from(self.bytes_per_sample);

        let mut size = self.buffer_size as usize;
        if alignment > 1 {
            let a = usize::from(alignment);
            size = (size + a - 1) / a * a;
        }

        let align = effective_align(alignment);
        self.raw = vec![0; size + align];
        let addr = self.raw.as_ptr() as usize;
        self.start = (align - addr % align) % align;
    }

    /// Release the backing storage and all auxiliary resampling state, and reset the sample
    /// count to zero. Releasing an unallocated buffer is a no-op.
    pub fn release(&mut self) {
        self.raw = Vec::new();
        self.start = 0;
        self.rate_info = None;
        self.interp = None;
        self.num_samples = 0;
        self.buffer_size = 0;
    }

    /// Returns `true` if the buffer currently owns a backing store.
    pub fn is_allocated(&self) -> bool {
        !self.raw.is_empty()
    }

    /// The value format of the samples.
    pub fn value_type(&self) -> ValueFormat {
        self.value_type
    }

    /// The number of time steps contained.
    pub fn num_samples(&self) -> u32 {
        self.num_samples
    }

    /// The number of channels interleaved within one time step.
    pub fn num_channels(&self) -> u8 {
        self.num_channels
    }

    /// Bits per single channel value.
    pub fn bitwidth(&self) -> u8 {
        self.bitwidth
    }

    /// Bytes occupied by one full time step across all channels, for addressing purposes.
    pub fn bytes_per_sample(&self) -> u8 {
        self.bytes_per_sample
    }

    /// The allocated byte length of the value region.
    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    /// The per-sample time interval mantissa. The interval is
    /// `time_step × 10^time_exponent` seconds.
    pub fn time_step(&self) -> u32 {
        self.time_step
    }

    /// The signed decimal exponent of the per-sample time interval, typically a multiple of 3.
    pub fn time_exponent(&self) -> i8 {
        self.time_exponent
    }

    /// Set the per-sample time interval to `time_step × 10^time_exponent` seconds.
    pub fn set_time_base(&mut self, time_step: u32, time_exponent: i8) {
        self.time_step = time_step;
        self.time_exponent = time_exponent;
    }

    /// Total duration covered by the samples. Informational metadata set by producers that know
    /// it; never consumed by the compute kernels.
    pub fn total_time_sec(&self) -> f64 {
        self.total_time_sec
    }

    /// Set the informational total duration.
    pub fn set_total_time_sec(&mut self, total_time_sec: f64) {
        self.total_time_sec = total_time_sec;
    }

    /// The rate-ratio record attached when this buffer was prepared as a resampling destination.
    pub fn rate_info(&self) -> Option<&SampleRateInfo> {
        self.rate_info.as_ref()
    }

    /// The per-output-sample interpolation table attached when this buffer was prepared as a
    /// wide-layout resampling destination.
    pub fn interp(&self) -> Option<&[SampleInterp]> {
        self.interp.as_deref()
    }

    /// The raw value region.
    pub fn bytes(&self) -> &[u8] {
        if self.raw.is_empty() {
            return &[];
        }
        &self.raw[self.start..self.start + self.buffer_size as usize]
    }

    /// The raw value region, mutably.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        if self.raw.is_empty() {
            return &mut [];
        }
        &mut self.raw[self.start..self.start + self.buffer_size as usize]
    }

    /// View the value region as signed 8-bit samples.
    pub fn samples_s8(&self) -> &[i8] {
        bytemuck::cast_slice(self.bytes())
    }

    /// View the value region as signed 8-bit samples, mutably.
    pub fn samples_s8_mut(&mut self) -> &mut [i8] {
        bytemuck::cast_slice_mut(self.bytes_mut())
    }

    /// View the value region as signed 16-bit samples.
    ///
    /// # Panics
    ///
    /// Panics if the region length is not a multiple of two. Every 16-bit geometry allocated
    /// through [`alloc`](ValueBuffer::alloc) satisfies this.
    pub fn samples_s16(&self) -> &[i16] {
        bytemuck::cast_slice(self.bytes())
    }

    /// View the value region as signed 16-bit samples, mutably.
    pub fn samples_s16_mut(&mut self) -> &mut [i16] {
        bytemuck::cast_slice_mut(self.bytes_mut())
    }

    /// The byte offset of the given sample and channel within the value region.
    ///
    /// The offset is strictly increasing in the sample index for a fixed channel.
    pub fn sample_byte_offset(&self, sample: u32, channel: u8) -> Result<u32> {
        if sample >= self.num_samples || channel >= self.num_channels {
            return out_of_range_error("buffer: sample or channel index beyond buffer extents");
        }
        Ok(sample * u32::from(self.bytes_per_sample)
            + u32::from(channel) * u32::from(self.bitwidth) / 8)
    }

    /// Read one signed 8-bit channel value. The buffer bit width must be 8.
    pub fn sample_s8(&self, sample: u32, channel: u8) -> Result<i8> {
        if self.bitwidth != 8 {
            return unsupported_error("buffer: bit width is not 8");
        }
        let offset = self.sample_byte_offset(sample, channel)? as usize;
        Ok(self.bytes()[offset] as i8)
    }

    /// Read one 32-bit floating point channel value. The buffer bit width must be 32.
    pub fn sample_f32(&self, sample: u32, channel: u8) -> Result<f32> {
        if self.bitwidth != 32 {
            return unsupported_error("buffer: bit width is not 32");
        }
        let offset = self.sample_byte_offset(sample, channel)? as usize;
        Ok(bytemuck::pod_read_unaligned(&self.bytes()[offset..offset + 4]))
    }

    /// Read one signed 16-bit channel value of the wide SIMD layout. The buffer bit width must
    /// be 16.
    pub fn sample_s16x8(&self, sample: u32, channel: u8) -> Result<i16> {
        if self.bitwidth != 16 {
            return unsupported_error("buffer: bit width is not 16");
        }
        let offset = self.sample_byte_offset(sample, channel)? as usize;
        Ok(bytemuck::pod_read_unaligned(&self.bytes()[offset..offset + 2]))
    }

    /// Split view for the resampling kernels: the prepared interpolation table together with the
    /// mutable 16-bit sample region. The table lives on the destination buffer, so a plain method
    /// pair would alias; borrowing the disjoint fields here keeps both sides available at once.
    pub(crate) fn interp_split_mut(&mut self) -> (Option<&[SampleInterp]>, &mut [i16]) {
        let bytes = if self.raw.is_empty() {
            &mut []
        } else {
            &mut self.raw[self.start..self.start + self.buffer_size as usize]
        };
        (self.interp.as_deref(), bytemuck::cast_slice_mut(bytes))
    }

    /// Attach auxiliary resampling state, replacing whatever was attached before. The state is
    /// released together with the buffer.
    pub(crate) fn set_resample_state(
        &mut self,
        rate_info: SampleRateInfo,
        interp: Option<Box<[SampleInterp]>>,
    ) {
        self.rate_info = Some(rate_info);
        self.interp = interp;
    }

    pub(crate) fn log_unsupported(&self, operation: &'static str) {
        error!("{}: unsupported value format {:?}", operation, self.value_type);
    }
}
