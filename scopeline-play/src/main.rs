// Scopeline
// Copyright (c) 2025 The Project Scopeline Developers.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Developer demo: drives the core end-to-end and times the two backends against each other.

use std::process;
use std::time::Instant;

use clap::{Arg, Command};
use log::{error, info};

use scopeline_core::backend;
use scopeline_core::buffer::{ValueBuffer, ValueFormat};
use scopeline_core::dsp::{aggregate, resample};
use scopeline_core::errors::Result;
use scopeline_core::layout;
use scopeline_core::util;

fn main() {
    pretty_env_logger::init();

    let matches = Command::new("Scopeline Play")
        .version("0.1.0")
        .about("Exercise the Scopeline core: generate, resample, widen, aggregate, and time the backends")
        .arg(
            Arg::new("samples")
                .long("samples")
                .short('n')
                .value_name("COUNT")
                .takes_value(true)
                .default_value("1000000")
                .help("Number of wide-layout samples used by the backend timing comparison"),
        )
        .get_matches();

    let samples = match matches.value_of("samples").unwrap_or("1000000").parse::<u32>() {
        Ok(n) if n > 1 => n,
        _ => {
            error!("--samples must be an integer greater than 1");
            process::exit(1);
        }
    };

    if let Err(err) = run(samples) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(samples: u32) -> Result<()> {
    let sine = util::sine_wave(ValueFormat::AnalogS8, 100, 1, 25.0, 100.0, 1_000_000)?;
    println!("Generated sine wave:");
    print!("{}", util::dump(&sine));

    // Downsample and upsample the packed buffer through the scalar reference kernel.
    for new_rate in [100_000u32, 3_000_000] {
        let mut converted = ValueBuffer::new();
        resample::prepare(&sine, new_rate, &mut converted)?;
        resample::convert(&sine, &mut converted)?;
        println!("Converted to {} Hz sample rate:", new_rate);
        print!("{}", util::dump(&converted));
    }

    // Widen one logical channel into the SIMD layout and resample it there.
    let mut wide = ValueBuffer::new();
    layout::prepare_wide(&sine, &mut wide)?;
    layout::convert_to_wide(&sine, &mut wide, 0, 0)?;
    println!("Wide-layout copy of channel 0:");
    print!("{}", util::dump(&wide));

    let mut wide_converted = ValueBuffer::new();
    resample::prepare(&wide, 300_000, &mut wide_converted)?;
    resample::convert(&wide, &mut wide_converted)?;
    println!("Wide-layout buffer converted to 300 kHz:");
    print!("{}", util::dump(&wide_converted));

    time_backends(samples)?;
    Ok(())
}

/// Resample a large wide-layout sine under both backends, report wall-clock times, verify the
/// outputs agree, and finish with an envelope aggregation.
fn time_backends(samples: u32) -> Result<()> {
    info!("generating {} wide-layout samples for the timing comparison", samples);
    let input = util::sine_wave(ValueFormat::SimdS16x8, samples, 8, 25.0, 100.0, 1_500_000)?;

    let mut outputs: Vec<ValueBuffer> = Vec::new();

    for index in 0..backend::count() {
        backend::select(index)?;
        let mut output = ValueBuffer::new();
        resample::prepare(&input, 1_200_000, &mut output)?;

        let t0 = Instant::now();
        resample::convert(&input, &mut output)?;
        let elapsed = t0.elapsed();

        println!(
            "{} sample rate conversion took {} microseconds",
            backend::active().name(),
            elapsed.as_micros()
        );
        outputs.push(output);
    }

    let (first, second) = (&outputs[0], &outputs[1]);
    let lanes = first.num_samples() as usize * 8;
    let mut worst = 0i32;
    for (a, b) in first.samples_s16()[..lanes].iter().zip(&second.samples_s16()[..lanes]) {
        worst = worst.max((i32::from(*a) - i32::from(*b)).abs());
    }
    if worst > 1 {
        error!("backend outputs diverge by {} LSB", worst);
        process::exit(1);
    }
    println!("Backend outputs agree within {} LSB", worst);

    let mut env_min = ValueBuffer::new();
    let mut env_max = ValueBuffer::new();
    aggregate::prepare(&input, &mut env_min, &mut env_max, 20)?;
    aggregate::aggregate(&input, &mut env_min, &mut env_max, input.num_samples(), 0)?;
    println!("Envelope minimums:");
    print!("{}", util::dump(&env_min));
    println!("Envelope maximums:");
    print!("{}", util::dump(&env_max));

    Ok(())
}
