// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The `util` module provides the ground-truth generators and the buffer dump used by the
//! property tests and the developer demo.

use std::f32::consts::PI;
use std::fmt::Write;

use crate::buffer::{ValueBuffer, ValueFormat};
use crate::errors::{unsupported_error, Result};
use crate::units;

/// Generate a sine wave buffer of the given format.
///
/// `period` is the wave period in samples and `amplitude` the peak value before clamping to the
/// sample range. Channels are phase-shifted by one `1/num_channels` fraction of a sample each.
/// The time base is fitted from `sample_rate_hz` onto the engineering grid. The wide layout
/// always carries eight channels, regardless of `num_channels`.
pub fn sine_wave(
    format: ValueFormat,
    num_samples: u32,
    num_channels: u8,
    period: f32,
    amplitude: f32,
    sample_rate_hz: u32,
) -> Result<ValueBuffer> {
    let mut buf = ValueBuffer::new();

    match format {
        ValueFormat::SimdS16x8 => {
            buf.alloc(num_samples, 8, 16, 16, ValueFormat::SimdS16x8);
            let data = buf.samples_s16_mut();
            for i in 0..num_samples as usize {
                for ch in 0..8usize {
                    let t = (i as f32 + ch as f32 / 8.0) / period;
                    let value = amplitude * (2.0 * PI * t).sin();
                    data[i * 8 + ch] = value as i16;
                }
            }
        }
        ValueFormat::AnalogS8 => {
            buf.alloc(num_samples, num_channels, 8, 1, ValueFormat::AnalogS8);
            let channels = usize::from(num_channels);
            let data = buf.samples_s8_mut();
            for i in 0..num_samples as usize {
                for ch in 0..channels {
                    let t = (i as f32 + ch as f32 / channels as f32) / period;
                    let value = amplitude * (2.0 * PI * t).sin();
                    data[i * channels + ch] = value as i8;
                }
            }
        }
        _ => return unsupported_error("util: value format has no sine generator"),
    }

    let (time_step, time_exponent) = units::fit_time_base(1.0 / f64::from(sample_rate_hz));
    buf.set_time_base(time_step, time_exponent);
    buf.set_total_time_sec(f64::from(num_samples) / f64::from(sample_rate_hz));

    Ok(buf)
}

/// Render the buffer header and every channel's samples as text.
pub fn dump(buf: &ValueBuffer) -> String {
    let (freq_val, freq_unit) = units::sample_rate(buf);
    let (time_val, time_unit) = units::time_interval(buf);

    let mut out = String::new();
    let _ = writeln!(
        out,
        "Dumping timeline buffer: {} samples, buf_size={}, bitwidth={}, stride={}, \
         timestep={} * 10^{} (~{:.0} {}), sample rate: ~{:.3} {}:",
        buf.num_samples(),
        buf.buffer_size(),
        buf.bitwidth(),
        buf.bytes_per_sample(),
        buf.time_step(),
        buf.time_exponent(),
        time_val,
        time_unit,
        freq_val,
        freq_unit,
    );

    for ch in 0..buf.num_channels() {
        let _ = write!(out, "Ch[{}]: ", ch);
        match buf.value_type() {
            ValueFormat::AnalogS8 => {
                for i in 0..buf.num_samples() {
                    match buf.sample_s8(i, ch) {
                        Ok(value) => {
                            let _ = write!(out, "{:4} ", value);
                        }
                        Err(_) => {
                            let _ = write!(out, "?? ");
                        }
                    }
                }
            }
            ValueFormat::Digital8 => {
                for i in 0..buf.num_samples() {
                    match buf.sample_s8(i, ch) {
                        Ok(value) => {
                            let _ = write!(out, "0x{:02X} ", value as u8);
                        }
                        Err(_) => {
                            let _ = write!(out, "?? ");
                        }
                    }
                }
            }
            ValueFormat::SimdS16x8 => {
                for i in 0..buf.num_samples() {
                    match buf.sample_s16x8(i, ch) {
                        Ok(value) => {
                            let _ = write!(out, "{:4} ", value);
                        }
                        Err(_) => {
                            let _ = write!(out, "?? ");
                        }
                    }
                }
            }
            _ => {
                let _ = write!(out, "Unknown type");
            }
        }
        let _ = writeln!(out);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::{dump, sine_wave};
    use crate::buffer::{ValueBuffer, ValueFormat};
    use crate::errors::Error;

    #[test]
    fn verify_sine_wave_s8() {
        let buf = sine_wave(ValueFormat::AnalogS8, 25, 1, 25.0, 100.0, 1_000_000).unwrap();

        assert_eq!(buf.num_samples(), 25);
        assert_eq!(buf.time_step(), 1);
        assert_eq!(buf.time_exponent(), -6);

        // One full period: starts at zero, peaks near the amplitude in both directions.
        assert_eq!(buf.sample_s8(0, 0).unwrap(), 0);
        let mut peak = 0i32;
        let mut trough = 0i32;
        for i in 0..25 {
            let v = i32::from(buf.sample_s8(i, 0).unwrap());
            peak = peak.max(v);
            trough = trough.min(v);
        }
        assert!(peak >= 95 && peak <= 100, "peak {}", peak);
        assert!(trough <= -95 && trough >= -100, "trough {}", trough);
    }

    #[test]
    fn verify_sine_wave_wide_phase_shift() {
        let buf = sine_wave(ValueFormat::SimdS16x8, 100, 8, 25.0, 10_000.0, 1_500_000).unwrap();
        assert_eq!(buf.num_channels(), 8);

        // Adjacent channels lead by an eighth of a sample; on the rising edge that means a
        // strictly larger value.
        let a = buf.sample_s16x8(0, 0).unwrap();
        let b = buf.sample_s16x8(0, 4).unwrap();
        assert!(b > a);
    }

    #[test]
    fn verify_sine_wave_rejects_other_formats() {
        assert!(matches!(
            sine_wave(ValueFormat::Digital4, 10, 1, 5.0, 1.0, 1000),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn verify_dump_format() {
        let buf = sine_wave(ValueFormat::AnalogS8, 25, 2, 25.0, 100.0, 1_000_000).unwrap();
        let text = dump(&buf);

        assert!(text.contains("25 samples"));
        assert!(text.contains("sample rate: ~1.000 MHz"));
        assert!(text.contains("Ch[0]: "));
        assert!(text.contains("Ch[1]: "));

        let mut digital = ValueBuffer::new();
        digital.alloc(2, 1, 8, 1, ValueFormat::Digital8);
        digital.set_time_base(1, -3);
        digital.bytes_mut().copy_from_slice(&[0xAB, 0x01]);
        let text = dump(&digital);
        assert!(text.contains("0xAB 0x01"));
    }
}
