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
mod test_closed_loop_simulation {

    use discrete_control::controller::Controller;
    use discrete_control::on_off::{OnOffConfigBuilder, OnOffController};
    use discrete_control::pid::{PidConfigBuilder, PidController};
    use discrete_control::polarity::Polarity;
    use discrete_control::sensor::{Sensor, SensorBuilder};
    use discrete_control::sim;

    use approx::assert_relative_eq;
    use nalgebra as na;

    const SAMPLING_INTERVAL_S: f64 = 0.1;
    const N_STEPS: usize = 20_000;
    const SET_POINT: f64 = 8.0;

    fn make_tank() -> sim::TitrationTank {
        sim::TitrationTank {
            acid_concentration: 0.01,
            base_concentration: 0.01,
            initial_volume: 0.2,
            acid_flow_rate: 0.001,
        }
    }

    fn make_ph_probe() -> Sensor<f64> {
        SensorBuilder::new(7.0)
            .start_real(7.0)
            .lag_constant(0.05)
            .build()
            .unwrap()
    }

    /// Runs the loop probe -> controller -> tank and returns the final tank state
    fn run_titration<C: Controller<f64>>(
        controller: &mut C,
        probe: &mut Sensor<f64>,
    ) -> na::Vector2<f64> {
        let tank = make_tank();
        let mut state = na::Vector2::<f64>::zeros();

        for i in 1..=N_STEPS {
            let time = i as f64 * SAMPLING_INTERVAL_S;
            let base_flow = controller.calc_response(probe.reading(), time).unwrap();
            state = tank.step(state, base_flow, time, SAMPLING_INTERVAL_S);
            probe.observe(tank.ph(state), time).unwrap();
        }
        state
    }

    #[test]
    fn test_tank_starts_neutral_and_acidifies_without_dosing() {
        let tank = make_tank();
        let mut state = na::Vector2::<f64>::zeros();
        assert_relative_eq!(tank.ph(state), 7.0, max_relative = 1e-12);

        for i in 0..1000 {
            state = tank.step(state, 0.0, i as f64 * SAMPLING_INTERVAL_S, SAMPLING_INTERVAL_S);
        }
        assert_relative_eq!(state[0], 0.1, max_relative = 1e-9);
        assert_eq!(state[1], 0.0);

        let acid = 0.1 * 0.01 + 1e-7 * 0.3;
        assert_relative_eq!(tank.ph(state), -(acid / 0.3f64).log10(), max_relative = 1e-9);
    }

    #[test]
    fn test_excess_base_makes_tank_alkaline() {
        let tank = make_tank();
        let mut state = na::Vector2::<f64>::zeros();
        for i in 0..1000 {
            state = tank.step(state, 0.002, i as f64 * SAMPLING_INTERVAL_S, SAMPLING_INTERVAL_S);
        }
        assert!(tank.acid_balance(state) < 0.0);
        assert!(tank.ph(state) > 11.0);
    }

    #[test]
    fn test_pid_dosing_neutralizes_acid_inflow() {
        let config = PidConfigBuilder::default()
            .set_point(SET_POINT)
            .gains(0.001, 0.00002, 0.005)
            .response_limits(Some(0.0), None)
            .derivative_window(5)
            .build()
            .unwrap();
        let mut pid = PidController::new(config);
        let mut probe = make_ph_probe();

        let state = run_titration(&mut pid, &mut probe);

        let responses: Vec<f64> = pid.history().column(|r| r.response).collect();
        assert!(responses.iter().all(|u| *u >= 0.0));
        assert!(responses.iter().any(|u| *u > 0.0));
        assert!(state[1] > 0.0);
        assert!(probe.history().iter().all(|r| r.reading.is_finite()));
        assert_eq!(pid.history().len(), N_STEPS);
        assert_eq!(probe.history().len(), N_STEPS + 1);

        // Any dosed base leaves the tank less acidic than the undosed tank
        let tank = make_tank();
        let undosed = na::Vector2::new(state[0], 0.0);
        assert!(tank.ph(state) > tank.ph(undosed));
    }

    #[test]
    fn test_on_off_dosing_switches_repeatedly() {
        const AMPLITUDE: f64 = 0.002;
        let config = OnOffConfigBuilder::default()
            .set_point(SET_POINT)
            .polarity(Polarity::LowerLimit)
            .amplitude(AMPLITUDE)
            .build()
            .unwrap();
        let mut on_off = OnOffController::new(config);
        let mut probe = make_ph_probe();

        run_titration(&mut on_off, &mut probe);

        let responses: Vec<f64> = on_off.history().column(|r| r.response).collect();
        assert!(responses.iter().all(|u| *u == 0.0 || *u == AMPLITUDE));
        assert_eq!(responses[0], AMPLITUDE);

        let switch_offs = responses
            .windows(2)
            .filter(|w| w[0] == AMPLITUDE && w[1] == 0.0)
            .count();
        assert!(switch_offs >= 2, "switched off only {switch_offs} times");
    }

    /// A slow probe watching a true value that jumps up by one and back down again
    #[test]
    fn test_sensor_tracks_pulse_with_lag() {
        let pulse = sim::SignalGenerator::new(
            sim::WaveForm::Pulse {
                start: 50.0,
                end: 100.0,
            },
            0.0,
            1.0,
            7.0,
        );
        let mut sensor = SensorBuilder::new(7.0)
            .start_real(7.0)
            .lag_constant(0.03)
            .build()
            .unwrap();

        let mut peak: f64 = 7.0;
        for i in 1..=2000 {
            let time = 0.1 * i as f64;
            let reading = sensor.observe(pulse.generate(time), time).unwrap();
            assert!((7.0..=8.0).contains(&reading));
            peak = peak.max(reading);
        }

        // The probe never catches up with the 50 s pulse and is still decaying 100 s later
        assert!(peak > 7.5 && peak < 8.0, "peak reading {peak}");
        assert!(sensor.reading() > 7.0 && sensor.reading() < 7.1);
    }

    #[test]
    fn test_signal_generator_waveforms() {
        let sine = sim::SignalGenerator::new(sim::WaveForm::Sine, 1.0, 2.0, 0.5);
        assert_eq!(sine.generate(1.0), 0.5);

        let square = sim::SignalGenerator::new(sim::WaveForm::Square, 0.0, 1.0, 0.0);
        assert_eq!(square.generate(1.0), 1.0);
        assert_eq!(square.generate(4.0), -1.0);

        let pulse = sim::SignalGenerator::new(
            sim::WaveForm::Pulse {
                start: 1.0,
                end: 2.0,
            },
            0.0,
            3.0,
            1.0,
        );
        assert_eq!(pulse.generate(0.5), 1.0);
        assert_eq!(pulse.generate(1.0), 4.0);
        assert_eq!(pulse.generate(2.0), 1.0);
    }
}
