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

use alloc::collections::VecDeque;

use num_traits::NumCast;
use tracing::{debug, trace, warn};

use crate::controller::Controller;
use crate::error::{ConfigError, InputError};
use crate::history::History;
use crate::polarity::Polarity;
use crate::Real;

/// Optional lower and upper bounds applied to the computed response.
///
/// An absent bound leaves that side unconstrained.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ResponseLimits<F> {
    lower: Option<F>,
    upper: Option<F>,
}

impl<F: Real> Default for ResponseLimits<F> {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl<F: Real> ResponseLimits<F> {
    /// Limits that leave the response untouched.
    pub fn unbounded() -> Self {
        Self {
            lower: None,
            upper: None,
        }
    }

    /// Creates limits from an optional lower and an optional upper bound.
    ///
    /// # Returns
    /// - `Err(ConfigError::InvalidResponseLimits)` if a present bound is not finite, or the lower
    ///   bound is greater than the upper bound.
    pub fn new(lower: Option<F>, upper: Option<F>) -> Result<Self, ConfigError> {
        let finite = |bound: Option<F>| bound.map_or(true, |b| b.is_finite());
        if !finite(lower) || !finite(upper) {
            return Err(ConfigError::InvalidResponseLimits);
        }
        if let (Some(lo), Some(hi)) = (lower, upper) {
            if lo > hi {
                return Err(ConfigError::InvalidResponseLimits);
            }
        }
        Ok(Self { lower, upper })
    }

    /// The lower bound, if any.
    pub fn lower(&self) -> Option<F> {
        self.lower
    }

    /// The upper bound, if any.
    pub fn upper(&self) -> Option<F> {
        self.upper
    }

    /// Returns `true` if neither bound is present.
    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Clamps `response` into the limits.
    pub fn clamp(&self, response: F) -> F {
        match (self.lower, self.upper) {
            (Some(lo), _) if response < lo => lo,
            (_, Some(hi)) if response > hi => hi,
            _ => response,
        }
    }

    /// Returns `true` if `response` lies within the limits.
    pub fn contains(&self, response: F) -> bool {
        self.lower.map_or(true, |lo| response >= lo) && self.upper.map_or(true, |hi| response <= hi)
    }
}

/// Validated, immutable configuration of a PID controller.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidConfig<F> {
    /// Target value of the controlled signal.
    /// Defaults to 0.0.
    set_point: F,

    /// Proportional gain coefficient.
    /// Defaults to 1.0.
    kp: F,

    /// Integral gain coefficient, applied to the error integrated over time.
    /// Defaults to 0.0.
    ki: F,

    /// Derivative gain coefficient, applied to the smoothed error rate.
    /// Defaults to 0.0.
    kd: F,

    /// Which side of the set point produces a positive response.
    /// Defaults to `LowerLimit`.
    polarity: Polarity,

    /// Bounds on the returned response.
    /// Defaults to no bounds.
    response_limits: ResponseLimits<F>,

    /// Number of raw derivatives averaged when the controller is driven through the
    /// [`Controller`] trait.
    /// Defaults to 1, i.e. no smoothing.
    derivative_window: usize,

    /// Number of trailing raw derivatives retained for smoothing, or `None` to retain all of
    /// them. A window longer than what is retained averages everything retained.
    /// Defaults to `None`.
    max_derivative_window: Option<usize>,
}

impl<F: Real> Default for PidConfig<F> {
    fn default() -> Self {
        PidConfig {
            set_point: F::zero(),
            kp: F::one(),
            ki: F::zero(),
            kd: F::zero(),
            polarity: Polarity::LowerLimit,
            response_limits: ResponseLimits::unbounded(),
            derivative_window: 1,
            max_derivative_window: None,
        }
    }
}

impl<F: Real> PidConfig<F> {
    /// Returns the set point.
    pub fn set_point(&self) -> F {
        self.set_point
    }

    /// Returns the proportional gain.
    pub fn kp(&self) -> F {
        self.kp
    }

    /// Returns the integral gain.
    pub fn ki(&self) -> F {
        self.ki
    }

    /// Returns the derivative gain.
    pub fn kd(&self) -> F {
        self.kd
    }

    /// Convenience method that returns the proportional, integral, and derivative gains together as a tuple.
    pub fn gains(&self) -> (F, F, F) {
        (self.kp, self.ki, self.kd)
    }

    /// Returns the set-point polarity.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Returns the response limits.
    pub fn response_limits(&self) -> ResponseLimits<F> {
        self.response_limits
    }

    /// Returns the derivative window used by [`Controller::calc_response`].
    pub fn derivative_window(&self) -> usize {
        self.derivative_window
    }

    /// Returns how many raw derivatives are retained, or `None` if all are.
    pub fn max_derivative_window(&self) -> Option<usize> {
        self.max_derivative_window
    }
}

/// Builder for [`PidConfig`]. Every value is checked once, in [`PidConfigBuilder::build`].
#[derive(Copy, Clone, Debug)]
pub struct PidConfigBuilder<F> {
    set_point: F,
    kp: F,
    ki: F,
    kd: F,
    polarity: Polarity,
    lower_limit: Option<F>,
    upper_limit: Option<F>,
    derivative_window: usize,
    max_derivative_window: Option<usize>,
}

impl<F: Real> Default for PidConfigBuilder<F> {
    fn default() -> Self {
        let config = PidConfig::default();
        Self {
            set_point: config.set_point,
            kp: config.kp,
            ki: config.ki,
            kd: config.kd,
            polarity: config.polarity,
            lower_limit: None,
            upper_limit: None,
            derivative_window: config.derivative_window,
            max_derivative_window: config.max_derivative_window,
        }
    }
}

impl<F: Real> PidConfigBuilder<F> {
    /// Sets the set point.
    pub fn set_point(mut self, set_point: F) -> Self {
        self.set_point = set_point;
        self
    }

    /// Sets the proportional gain.
    pub fn kp(mut self, kp: F) -> Self {
        self.kp = kp;
        self
    }

    /// Sets the integral gain.
    pub fn ki(mut self, ki: F) -> Self {
        self.ki = ki;
        self
    }

    /// Sets the derivative gain.
    pub fn kd(mut self, kd: F) -> Self {
        self.kd = kd;
        self
    }

    /// Convenience method to set the proportional, integral, and derivative gains together
    pub fn gains(self, kp: F, ki: F, kd: F) -> Self {
        self.kp(kp).ki(ki).kd(kd)
    }

    /// Sets the set-point polarity.
    pub fn polarity(mut self, polarity: Polarity) -> Self {
        self.polarity = polarity;
        self
    }

    /// Sets the response limits; pass `None` to leave a side unbounded.
    pub fn response_limits(mut self, lower: Option<F>, upper: Option<F>) -> Self {
        self.lower_limit = lower;
        self.upper_limit = upper;
        self
    }

    /// Sets the derivative window used when the controller is driven through [`Controller`].
    pub fn derivative_window(mut self, window: usize) -> Self {
        self.derivative_window = window;
        self
    }

    /// Retains only the last `max_window` raw derivatives, keeping memory bounded in long runs.
    pub fn max_derivative_window(mut self, max_window: usize) -> Self {
        self.max_derivative_window = Some(max_window);
        self
    }

    /// Validates the configuration.
    ///
    /// # Returns
    /// - `Err(ConfigError::InvalidSetPoint)` if the set point is not finite.
    /// - `Err(ConfigError::Invalid*Gain)` if a gain is not finite. Negative gains are accepted
    ///   and invert that term's action.
    /// - `Err(ConfigError::InvalidResponseLimits)` if the limits are not finite or out of order.
    /// - `Err(ConfigError::InvalidDerivativeWindow)` if the default window or the retained
    ///   derivative count is zero.
    pub fn build(self) -> Result<PidConfig<F>, ConfigError> {
        let valid_gain = |gain: F| gain.is_finite();

        if !self.set_point.is_finite() {
            return Err(ConfigError::InvalidSetPoint);
        }
        if !valid_gain(self.kp) {
            return Err(ConfigError::InvalidProportionalGain);
        }
        if !valid_gain(self.ki) {
            return Err(ConfigError::InvalidIntegralGain);
        }
        if !valid_gain(self.kd) {
            return Err(ConfigError::InvalidDerivativeGain);
        }
        let response_limits = ResponseLimits::new(self.lower_limit, self.upper_limit)?;
        if self.derivative_window == 0 || self.max_derivative_window == Some(0) {
            return Err(ConfigError::InvalidDerivativeWindow);
        }

        Ok(PidConfig {
            set_point: self.set_point,
            kp: self.kp,
            ki: self.ki,
            kd: self.kd,
            polarity: self.polarity,
            response_limits,
            derivative_window: self.derivative_window,
            max_derivative_window: self.max_derivative_window,
        })
    }
}

/// Everything a PID controller computed in one step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PidRecord<F> {
    /// The measured signal.
    pub signal: F,
    /// The time at which the signal was measured.
    pub time: F,
    /// The polarity-adjusted error; also the proportional term.
    pub error: F,
    /// The proportional term.
    pub p_term: F,
    /// The cumulative integral of the error.
    pub i_term: F,
    /// The raw error rate over the last interval.
    pub d_term: F,
    /// The mean of the trailing raw error rates.
    pub d_smoothed: F,
    /// The response after clamping.
    pub response: F,
}

/// The state a PID controller carries from one step to the next.
#[derive(Clone, Debug)]
pub struct PidContext<F> {
    last_time: Option<F>,
    last_error: F,
    last_output: Option<F>,
    i_term: F,
    derivatives: VecDeque<F>,
}

impl<F: Real> Default for PidContext<F> {
    fn default() -> Self {
        Self::new_uninit()
    }
}

impl<F: Real> PidContext<F> {
    /// Creates a context for a controller that has not been stepped yet. The first step will
    /// report zero integral and derivative terms.
    pub fn new_uninit() -> Self {
        Self {
            last_time: None,
            last_error: F::zero(),
            last_output: None,
            i_term: F::zero(),
            derivatives: VecDeque::new(),
        }
    }

    /// Returns the time of the last accepted step, if any.
    pub fn last_time(&self) -> Option<F> {
        self.last_time
    }

    /// Returns the error of the last accepted step.
    pub fn error(&self) -> F {
        self.last_error
    }

    /// Returns the last response, if any.
    pub fn output(&self) -> Option<F> {
        self.last_output
    }

    /// Returns the accumulated integral of the error.
    pub fn i_term(&self) -> F {
        self.i_term
    }

    /// Returns `true` until the first step is accepted.
    pub fn is_uninit(&self) -> bool {
        self.last_time.is_none()
    }

    fn push_derivative(&mut self, derivative: F, max_window: Option<usize>) {
        if max_window.map_or(false, |max| self.derivatives.len() >= max) {
            self.derivatives.pop_front();
        }
        self.derivatives.push_back(derivative);
    }

    fn smoothed_derivative(&self, window: usize) -> F {
        let window = window.min(self.derivatives.len());
        if window == 0 {
            return F::zero();
        }
        let sum = self
            .derivatives
            .iter()
            .rev()
            .take(window)
            .fold(F::zero(), |acc, &d| acc + d);
        // Window sizes are far below where the usize -> float cast could fail
        sum / <F as NumCast>::from(window).unwrap_or_else(F::one)
    }
}

/// A functional implementation of the PID control law.
///
/// The controller only holds its configuration; the evolving state lives in a [`PidContext`]
/// passed to [`FuncPidController::compute`]. Each call either advances the context by exactly one
/// step or, on error, leaves it untouched.
#[derive(Copy, Clone, Debug)]
pub struct FuncPidController<F> {
    config: PidConfig<F>,
}

impl<F: Real> FuncPidController<F> {
    /// Creates a controller from a validated configuration.
    pub fn new(config: PidConfig<F>) -> Self {
        FuncPidController { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PidConfig<F> {
        &self.config
    }

    /// Computes the response to `signal` measured at `time`.
    ///
    /// On the first call, the integral, raw derivative and smoothed derivative terms are zero.
    /// Afterwards the integral accumulates `error·Δt`, the raw derivative is `Δerror/Δt`, and the
    /// smoothed derivative is the mean of the last `derivative_window` raw derivatives (fewer if
    /// fewer exist), including the current one.
    ///
    /// # Arguments
    /// - `ctx`: The controller state, advanced in place on success.
    /// - `signal`: The measured process value.
    /// - `time`: The time of the measurement; must be later than the previous step's.
    /// - `derivative_window`: How many raw derivatives to average. 1 disables smoothing.
    ///
    /// # Returns
    /// The step record, whose `response` field is the clamped controller output.
    ///
    /// # Errors
    /// - [`InputError::InvalidDerivativeWindow`] if the window is zero.
    /// - [`InputError::NonFiniteInput`] if `signal` or `time` is NaN or infinite.
    /// - [`InputError::NonIncreasingTime`] if `time` does not come after the previous step.
    pub fn compute(
        &self,
        ctx: &mut PidContext<F>,
        signal: F,
        time: F,
        derivative_window: usize,
    ) -> Result<PidRecord<F>, InputError> {
        if derivative_window == 0 {
            return Err(InputError::InvalidDerivativeWindow);
        }
        if !signal.is_finite() || !time.is_finite() {
            return Err(InputError::NonFiniteInput);
        }

        let error = self
            .config
            .polarity
            .signed_error(self.config.set_point, signal);

        let (i_term, d_term) = match ctx.last_time {
            None => (F::zero(), F::zero()),
            Some(last_time) => {
                if time <= last_time {
                    return Err(InputError::NonIncreasingTime {
                        previous: last_time.to_f64().unwrap_or(f64::NAN),
                        current: time.to_f64().unwrap_or(f64::NAN),
                    });
                }
                let time_delta = time - last_time;
                (
                    ctx.i_term + error * time_delta,
                    (error - ctx.last_error) / time_delta,
                )
            }
        };

        // All checks passed; from here on the context is committed
        let first_step = ctx.is_uninit();
        ctx.push_derivative(d_term, self.config.max_derivative_window);
        let d_smoothed = if first_step {
            F::zero()
        } else {
            ctx.smoothed_derivative(derivative_window)
        };

        let output =
            self.config.kp * error + self.config.ki * i_term + self.config.kd * d_smoothed;
        let response = self.config.response_limits.clamp(output);

        ctx.last_time = Some(time);
        ctx.last_error = error;
        ctx.i_term = i_term;
        ctx.last_output = Some(response);

        Ok(PidRecord {
            signal,
            time,
            error,
            p_term: error,
            i_term,
            d_term,
            d_smoothed,
            response,
        })
    }
}

/// A stateful implementation of the PID control law.
///
/// This controller owns its [`PidContext`] and records every step in a [`History`], making it the
/// direct building block of a simulation loop. The configuration is fixed at construction.
#[derive(Clone, Debug)]
pub struct PidController<F> {
    ctx: PidContext<F>,
    controller: FuncPidController<F>,
    history: History<PidRecord<F>>,
}

impl<F: Real> PidController<F> {
    /// Creates a controller with an unbounded history.
    pub fn new(config: PidConfig<F>) -> Self {
        Self::with_history(config, History::unbounded())
    }

    /// Creates a controller that records its steps into `history`, e.g. a bounded ring buffer.
    pub fn with_history(config: PidConfig<F>, history: History<PidRecord<F>>) -> Self {
        debug!(
            set_point = ?config.set_point,
            kp = ?config.kp,
            ki = ?config.ki,
            kd = ?config.kd,
            polarity = config.polarity.as_str(),
            lower_limit = ?config.response_limits.lower,
            upper_limit = ?config.response_limits.upper,
            "PID controller configured"
        );
        Self {
            ctx: PidContext::new_uninit(),
            controller: FuncPidController::new(config),
            history,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &PidConfig<F> {
        self.controller.config()
    }

    /// Returns the current controller state.
    pub fn context(&self) -> &PidContext<F> {
        &self.ctx
    }

    /// Returns the step history.
    pub fn history(&self) -> &History<PidRecord<F>> {
        &self.history
    }

    /// Computes, records and returns the response to `signal` measured at `time`.
    ///
    /// See [`FuncPidController::compute`] for the control law and the errors. A failed step
    /// records nothing.
    pub fn step(&mut self, signal: F, time: F, derivative_window: usize) -> Result<F, InputError> {
        match self
            .controller
            .compute(&mut self.ctx, signal, time, derivative_window)
        {
            Ok(record) => {
                trace!(
                    time = ?record.time,
                    signal = ?record.signal,
                    error = ?record.error,
                    i_term = ?record.i_term,
                    d_smoothed = ?record.d_smoothed,
                    response = ?record.response,
                    "PID step"
                );
                self.history.push(record);
                Ok(record.response)
            }
            Err(err) => {
                warn!(?err, "PID step rejected");
                Err(err)
            }
        }
    }
}

impl<F: Real> Controller<F> for PidController<F> {
    fn calc_response(&mut self, signal: F, time: F) -> Result<F, InputError> {
        let window = self.config().derivative_window;
        self.step(signal, time, window)
    }

    fn set_point(&self) -> F {
        self.config().set_point
    }

    fn last_response(&self) -> Option<F> {
        self.ctx.output()
    }
}
