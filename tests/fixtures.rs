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

#![allow(dead_code)]

#[cfg(test)]
pub mod test_pid {

    use discrete_control::pid::*;

    pub const SET_POINT: f64 = 8.0;
    pub const GAINS: (f64, f64, f64) = (0.001, 0.00002, 0.005);

    /// The pH-dosing controller: base is pumped in while the pH is below 8, and a pump cannot
    /// remove what it added, hence the lower response limit of 0
    pub fn make_dosing_config() -> PidConfig<f64> {
        PidConfigBuilder::default()
            .set_point(SET_POINT)
            .gains(GAINS.0, GAINS.1, GAINS.2)
            .response_limits(Some(0.0), None)
            .build()
            .unwrap()
    }

    pub fn make_controller() -> (FuncPidController<f64>, PidContext<f64>) {
        let controller = FuncPidController::new(make_dosing_config());
        let ctx = PidContext::new_uninit();
        (controller, ctx)
    }

    pub fn make_stateful_controller() -> PidController<f64> {
        PidController::new(make_dosing_config())
    }

    pub fn make_unclamped_controller(kp: f64, ki: f64, kd: f64) -> PidController<f64> {
        let config = PidConfigBuilder::default()
            .set_point(SET_POINT)
            .gains(kp, ki, kd)
            .build()
            .unwrap();
        PidController::new(config)
    }
}

#[cfg(test)]
pub mod test_on_off {

    use discrete_control::on_off::*;
    use discrete_control::polarity::Polarity;

    pub const AMPLITUDE: f64 = 0.002;

    pub fn make_controller(polarity: Polarity) -> OnOffController<f64> {
        let config = OnOffConfigBuilder::default()
            .set_point(8.0)
            .polarity(polarity)
            .amplitude(AMPLITUDE)
            .build()
            .unwrap();
        OnOffController::new(config)
    }
}

#[cfg(test)]
pub mod test_sensor {

    use discrete_control::sensor::*;

    /// A relatively slow pH probe
    pub const LAG: f64 = 0.05;

    pub fn make_sensor() -> Sensor<f64> {
        SensorBuilder::new(7.0)
            .start_real(7.0)
            .lag_constant(LAG)
            .build()
            .unwrap()
    }

    /// Reading after `dt` for a true value moving linearly from `r0` to `r1`, starting at `y0`
    pub fn closed_form_reading(k: f64, y0: f64, r0: f64, r1: f64, dt: f64) -> f64 {
        let slope = (r1 - r0) / dt;
        r1 - slope / k + (y0 - r0 + slope / k) * (-k * dt).exp()
    }
}
