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

use tracing::{debug, trace, warn};

use crate::controller::Controller;
use crate::error::{ConfigError, InputError};
use crate::history::History;
use crate::polarity::Polarity;
use crate::Real;

/// Validated, immutable configuration of an on/off controller.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OnOffConfig<F> {
    /// Switching threshold.
    /// Defaults to 0.0.
    set_point: F,

    /// Which side of the set point switches the output on.
    /// Defaults to `UpperLimit`.
    polarity: Polarity,

    /// Output while switched on.
    /// Defaults to 1.0.
    amplitude: F,
}

impl<F: Real> Default for OnOffConfig<F> {
    fn default() -> Self {
        OnOffConfig {
            set_point: F::zero(),
            polarity: Polarity::UpperLimit,
            amplitude: F::one(),
        }
    }
}

impl<F: Real> OnOffConfig<F> {
    /// Returns the set point.
    pub fn set_point(&self) -> F {
        self.set_point
    }

    /// Returns the polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Returns the amplitude.
    pub fn amplitude(&self) -> F {
        self.amplitude
    }
}

/// Builder for [`OnOffConfig`].
#[derive(Copy, Clone, Debug)]
pub struct OnOffConfigBuilder<F> {
    config: OnOffConfig<F>,
}

impl<F: Real> Default for OnOffConfigBuilder<F> {
    fn default() -> Self {
        Self {
            config: OnOffConfig::default(),
        }
    }
}

impl<F: Real> OnOffConfigBuilder<F> {
    /// Sets the set point.
    pub fn set_point(mut self, set_point: F) -> Self {
        self.config.set_point = set_point;
        self
    }

    /// Sets the polarity.
    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.config.polarity = polarity;
        self
    }

    /// Sets the amplitude.
    pub fn amplitude(mut self, amplitude: F) -> Self {
        self.config.amplitude = amplitude;
        self
    }

    /// Validates the configuration.
    ///
    /// # Returns
    /// - `Err(ConfigError::InvalidSetPoint)` if the set point is not finite.
    /// - `Err(ConfigError::InvalidAmplitude)` if the amplitude is not finite.
    pub fn build(self) -> Result<OnOffConfig<F>, ConfigError> {
        if !self.config.set_point.is_finite() {
            return Err(ConfigError::InvalidSetPoint);
        }
        if !self.config.amplitude.is_finite() {
            return Err(ConfigError::InvalidAmplitude);
        }
        Ok(self.config)
    }
}

/// Everything an on/off controller computed in one step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OnOffRecord<F> {
    /// The measured signal.
    pub signal: F,
    /// The time of the measurement, if the caller supplied one.
    pub time: Option<F>,
    /// `set_point - signal`, regardless of polarity.
    pub error: F,
    /// Either zero or the amplitude.
    pub response: F,
}

/// A threshold controller: full amplitude on one side of the set point, zero on the other.
///
/// There is no hysteresis band and no minimum dwell time, so a signal hovering at the set point
/// makes the output switch on every step. Time is recorded for bookkeeping only.
#[derive(Clone, Debug)]
pub struct OnOffController<F> {
    config: OnOffConfig<F>,
    last_response: Option<F>,
    history: History<OnOffRecord<F>>,
}

impl<F: Real> OnOffController<F> {
    /// Creates a controller with an unbounded history.
    pub fn new(config: OnOffConfig<F>) -> Self {
        Self::with_history(config, History::unbounded())
    }

    /// Creates a controller that records its steps into `history`.
    pub fn with_history(config: OnOffConfig<F>, history: History<OnOffRecord<F>>) -> Self {
        debug!(
            set_point = ?config.set_point,
            polarity = config.polarity.as_str(),
            amplitude = ?config.amplitude,
            "On/off controller configured"
        );
        Self {
            config,
            last_response: None,
            history,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &OnOffConfig<F> {
        &self.config
    }

    /// Returns the step history.
    pub fn history(&self) -> &History<OnOffRecord<F>> {
        &self.history
    }

    /// Computes, records and returns the response to `signal`.
    ///
    /// With an `UpperLimit` polarity the output is on while the signal is above the set point;
    /// with `LowerLimit` while it is below. On the set point the output is off either way.
    ///
    /// # Errors
    /// - [`InputError::NonFiniteInput`] if `signal` is NaN or infinite. Nothing is recorded.
    pub fn step(&mut self, signal: F, time: Option<F>) -> Result<F, InputError> {
        if !signal.is_finite() {
            warn!(?signal, "On/off step rejected");
            return Err(InputError::NonFiniteInput);
        }

        let error = self.config.set_point - signal;
        let on = match self.config.polarity {
            Polarity::UpperLimit => error < F::zero(),
            Polarity::LowerLimit => error > F::zero(),
        };
        let response = if on { self.config.amplitude } else { F::zero() };

        trace!(?signal, ?time, on, "On/off step");
        self.history.push(OnOffRecord {
            signal,
            time,
            error,
            response,
        });
        self.last_response = Some(response);
        Ok(response)
    }
}

impl<F: Real> Controller<F> for OnOffController<F> {
    fn calc_response(&mut self, signal: F, time: F) -> Result<F, InputError> {
        self.step(signal, Some(time))
    }

    fn set_point(&self) -> F {
        self.config.set_point
    }

    fn last_response(&self) -> Option<F> {
        self.last_response
    }
}
