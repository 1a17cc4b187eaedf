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

mod fixtures;
use fixtures::test_on_off::{make_controller, AMPLITUDE};

use discrete_control::controller::Controller;
use discrete_control::error::{ConfigError, InputError};
use discrete_control::on_off::{OnOffConfig, OnOffConfigBuilder, OnOffController};
use discrete_control::polarity::Polarity;

mod test_on_off_config {

    use super::*;

    #[test]
    fn test_default_config() {
        let config = OnOffConfig::<f64>::default();
        assert_eq!(config.set_point(), 0.0);
        assert_eq!(config.polarity(), Polarity::UpperLimit);
        assert_eq!(config.amplitude(), 1.0);
        assert_eq!(OnOffConfigBuilder::<f64>::default().build(), Ok(config));
    }

    #[test]
    fn test_build_rejects_non_finite_values() {
        assert_eq!(
            OnOffConfigBuilder::default().set_point(f64::NAN).build(),
            Err(ConfigError::InvalidSetPoint)
        );
        assert_eq!(
            OnOffConfigBuilder::default().amplitude(f64::INFINITY).build(),
            Err(ConfigError::InvalidAmplitude)
        );
    }

    #[test]
    fn test_polarity_from_config_name() {
        let polarity: Polarity = "lower_limit".parse().unwrap();
        let config = OnOffConfigBuilder::<f64>::default()
            .polarity(polarity)
            .build()
            .unwrap();
        assert_eq!(config.polarity(), Polarity::LowerLimit);
        assert_eq!(
            "sideways".parse::<Polarity>(),
            Err(ConfigError::UnknownPolarity)
        );
    }
}

mod test_on_off_switching {

    use super::*;

    #[test]
    fn test_lower_limit_switches_on_below_set_point() {
        let mut on_off = make_controller(Polarity::LowerLimit);

        assert_eq!(on_off.step(7.0, None), Ok(AMPLITUDE));
        assert_eq!(on_off.history().last().unwrap().error, 1.0);

        assert_eq!(on_off.step(9.0, None), Ok(0.0));
        assert_eq!(on_off.history().last().unwrap().error, -1.0);
    }

    #[test]
    fn test_upper_limit_switches_on_above_set_point() {
        let mut on_off = make_controller(Polarity::UpperLimit);
        assert_eq!(on_off.step(9.0, None), Ok(AMPLITUDE));
        assert_eq!(on_off.step(7.0, None), Ok(0.0));
    }

    #[test]
    fn test_output_is_off_exactly_at_set_point() {
        for polarity in [Polarity::LowerLimit, Polarity::UpperLimit] {
            let mut on_off = make_controller(polarity);
            assert_eq!(on_off.step(8.0, None), Ok(0.0));
        }
    }

    #[test]
    fn test_output_is_always_zero_or_amplitude() {
        for polarity in [Polarity::LowerLimit, Polarity::UpperLimit] {
            let mut on_off = make_controller(polarity);
            for i in 0..200 {
                let signal = 8.0 + 3.0 * (0.1 * i as f64).sin();
                let response = on_off.step(signal, Some(i as f64)).unwrap();
                assert!(response == 0.0 || response == AMPLITUDE);
            }
        }
    }

    #[test]
    fn test_chatters_around_set_point() {
        // No hysteresis: every crossing toggles the output
        let mut on_off = make_controller(Polarity::LowerLimit);
        let responses: Vec<f64> = [7.99, 8.01, 7.99, 8.01]
            .into_iter()
            .map(|signal| on_off.step(signal, None).unwrap())
            .collect();
        assert_eq!(responses, [AMPLITUDE, 0.0, AMPLITUDE, 0.0]);
    }

    #[test]
    fn test_time_is_bookkeeping_only() {
        let mut timed = make_controller(Polarity::LowerLimit);
        let mut untimed = make_controller(Polarity::LowerLimit);

        // Out-of-order and repeated times are accepted and do not affect the response
        for (signal, time) in [(7.0, 5.0), (9.0, 1.0), (7.5, 1.0)] {
            assert_eq!(timed.step(signal, Some(time)), untimed.step(signal, None));
        }
        let times: Vec<Option<f64>> = timed.history().column(|r| r.time).collect();
        assert_eq!(times, [Some(5.0), Some(1.0), Some(1.0)]);
        assert!(untimed.history().iter().all(|r| r.time.is_none()));
    }
}

mod test_on_off_lifecycle {

    use super::*;

    #[test]
    fn test_history_grows_by_one_per_step() {
        let mut on_off = make_controller(Polarity::LowerLimit);
        for i in 1..=10 {
            on_off.step(7.0 + 0.2 * i as f64, Some(i as f64)).unwrap();
            assert_eq!(on_off.history().len(), i);
        }
    }

    #[test]
    fn test_non_finite_signal_is_rejected() {
        let mut on_off = make_controller(Polarity::LowerLimit);
        assert_eq!(on_off.step(f64::NAN, None), Err(InputError::NonFiniteInput));
        assert!(on_off.history().is_empty());
        assert_eq!(on_off.last_response(), None);
    }

    #[test]
    fn test_controller_trait_records_time() {
        let mut on_off: OnOffController<f64> = make_controller(Polarity::LowerLimit);
        assert_eq!(on_off.calc_response(7.0, 0.1), Ok(AMPLITUDE));
        assert_eq!(on_off.history().last().unwrap().time, Some(0.1));
        assert_eq!(Controller::set_point(&on_off), 8.0);
        assert_eq!(on_off.last_response(), Some(AMPLITUDE));
    }
}
