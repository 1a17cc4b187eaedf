//! A slow pH probe watching a solution whose true pH is dosed up by one unit and back down.
//! Prints `time,real,reading` as CSV on stdout.
// Copyright © 2025 Hs293Go
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the "Software"),
// to deal in the Software without restriction, including without limitation
// the rights to use, copy, modify, merge, publish, distribute, sublicense,
// and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included
// in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES
// OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT.
// IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT,
// TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE
// OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use discrete_control::sensor::SensorBuilder;

const SAMPLE_PERIOD_S: f64 = 0.5;
const PULSE_START_S: f64 = 50.0;
const PULSE_END_S: f64 = 100.0;

fn true_ph(time: f64) -> f64 {
    if (PULSE_START_S..PULSE_END_S).contains(&time) {
        8.0
    } else {
        7.0
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(std::io::stderr)
        .init();

    let mut probe = SensorBuilder::new(7.0).lag_constant(0.03).build()?;

    println!("time,real,reading");
    for i in 1..=400 {
        let time = i as f64 * SAMPLE_PERIOD_S;
        let real = true_ph(time);
        let reading = probe.observe(real, time)?;
        println!("{time:.1},{real:.3},{reading:.4}");
    }

    tracing::info!(
        samples = probe.history().len(),
        final_reading = probe.reading(),
        "probe run finished"
    );
    Ok(())
}
