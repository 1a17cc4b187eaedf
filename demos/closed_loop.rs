//! Holds the pH of a tank with a constant acid inflow at 8 by dosing a base, once under PID and
//! once under on/off control, each read through its own slow pH probe.
//! Prints `time,set_point,pid_ph,on_off_ph` as CSV on stdout.
//! This example requires the `--features simulation` flag to be enabled.
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

#[cfg(feature = "simulation")]
pub fn main() -> Result<(), Box<dyn std::error::Error>> {
    use discrete_control::controller::Controller;
    use discrete_control::on_off::{OnOffConfigBuilder, OnOffController};
    use discrete_control::pid::{PidConfigBuilder, PidController};
    use discrete_control::polarity::Polarity;
    use discrete_control::sensor::{Sensor, SensorBuilder};
    use discrete_control::sim;

    use nalgebra as na;

    const SAMPLING_INTERVAL_S: f64 = 0.1;
    const SET_POINT: f64 = 8.0;

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .init();

    struct Loop {
        name: &'static str,
        controller: Box<dyn Controller<f64>>,
        sensor: Sensor<f64>,
        state: na::Vector2<f64>,
    }

    let pid = PidController::new(
        PidConfigBuilder::default()
            .set_point(SET_POINT)
            .gains(0.001, 0.00002, 0.005)
            .response_limits(Some(0.0), None)
            .derivative_window(5)
            .build()?,
    );
    let on_off = OnOffController::new(
        OnOffConfigBuilder::default()
            .set_point(SET_POINT)
            .polarity(Polarity::LowerLimit)
            .amplitude(0.002)
            .build()?,
    );

    fn pid_loop(pid: PidController<f64>) -> Result<Loop, Box<dyn std::error::Error>> {
        Ok(Loop {
            name: "pid",
            controller: Box::new(pid),
            sensor: SensorBuilder::new(7.0).lag_constant(0.05).build()?,
            state: na::Vector2::zeros(),
        })
    }

    fn on_off_loop(on_off: OnOffController<f64>) -> Result<Loop, Box<dyn std::error::Error>> {
        Ok(Loop {
            name: "on_off",
            controller: Box::new(on_off),
            sensor: SensorBuilder::new(7.0).lag_constant(0.05).build()?,
            state: na::Vector2::zeros(),
        })
    }

    let mut loops = [pid_loop(pid)?, on_off_loop(on_off)?];

    let tank = sim::TitrationTank {
        acid_concentration: 0.01,
        base_concentration: 0.01,
        initial_volume: 0.2,
        acid_flow_rate: 0.001,
    };

    println!("time,set_point,pid_ph,on_off_ph");
    for i in 1..=20_000usize {
        let time = i as f64 * SAMPLING_INTERVAL_S;
        let mut ph = [0.0; 2];
        for (lp, true_ph) in loops.iter_mut().zip(ph.iter_mut()) {
            let base_flow = lp.controller.calc_response(lp.sensor.reading(), time)?;
            lp.state = tank.step(lp.state, base_flow, time, SAMPLING_INTERVAL_S);
            *true_ph = tank.ph(lp.state);
            lp.sensor.observe(*true_ph, time)?;
        }
        println!("{time:.1},{SET_POINT},{:.4},{:.4}", ph[0], ph[1]);
    }

    for lp in &loops {
        tracing::info!(
            controller = lp.name,
            reading = lp.sensor.reading(),
            last_response = ?lp.controller.last_response(),
            "closed loop run finished"
        );
    }
    Ok(())
}

#[cfg(not(feature = "simulation"))]
fn main() {
    eprintln!("This example requires `--features simulation` to run.");
}
