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

//! Error types.
//!
//! Configuration errors are raised by builders and parsers only, so an invalid component can
//! never be constructed. Input and integration errors are raised by step calls and leave the
//! component exactly as it was before the failing call.

/// Errors raised while configuring a component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ConfigError {
    /// The polarity name is neither `lower_limit` nor `upper_limit`.
    #[cfg_attr(
        feature = "std",
        error("Unknown polarity; expected `lower_limit` or `upper_limit`")
    )]
    UnknownPolarity,

    /// The sensor response model kind is not supported.
    #[cfg_attr(
        feature = "std",
        error("Unsupported sensor response model; only proportional lag (`prop`) is available")
    )]
    UnsupportedResponseModel,

    /// The set point is not finite.
    #[cfg_attr(feature = "std", error("Set point must be finite"))]
    InvalidSetPoint,

    /// The proportional gain is not finite.
    #[cfg_attr(feature = "std", error("Proportional gain must be finite"))]
    InvalidProportionalGain,

    /// The integral gain is not finite.
    #[cfg_attr(feature = "std", error("Integral gain must be finite"))]
    InvalidIntegralGain,

    /// The derivative gain is not finite.
    #[cfg_attr(feature = "std", error("Derivative gain must be finite"))]
    InvalidDerivativeGain,

    /// A response bound is not finite, or the lower bound exceeds the upper bound.
    #[cfg_attr(
        feature = "std",
        error("Response limits must be finite with lower <= upper")
    )]
    InvalidResponseLimits,

    /// The default derivative window or the number of retained derivatives is zero.
    #[cfg_attr(
        feature = "std",
        error("Derivative window and derivative retention must be at least 1")
    )]
    InvalidDerivativeWindow,

    /// The on/off amplitude is not finite.
    #[cfg_attr(feature = "std", error("Amplitude must be finite"))]
    InvalidAmplitude,

    /// The sensor start value, start time or start real value is not finite.
    #[cfg_attr(feature = "std", error("Sensor initial values must be finite"))]
    InvalidInitialValue,

    /// The sensor lag constant is negative or not finite.
    #[cfg_attr(
        feature = "std",
        error("Lag constant must be non-negative and finite")
    )]
    InvalidLagConstant,

    /// The solver tolerances are not positive and finite, or the step budget is zero.
    #[cfg_attr(
        feature = "std",
        error("Solver tolerances must be positive and finite with a non-zero step budget")
    )]
    InvalidTolerances,
}

/// Errors raised by a step call whose arguments cannot be processed.
///
/// These are recoverable: the caller may drop the offending sample and keep stepping.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum InputError {
    /// The new timestamp does not come strictly after the previous one.
    #[cfg_attr(
        feature = "std",
        error("Time must increase between steps, got {current} after {previous}")
    )]
    NonIncreasingTime {
        /// Timestamp of the last accepted step.
        previous: f64,
        /// Rejected timestamp.
        current: f64,
    },

    /// The signal or the timestamp is NaN or infinite.
    #[cfg_attr(feature = "std", error("Signal and time must be finite"))]
    NonFiniteInput,

    /// The per-call derivative window is zero.
    #[cfg_attr(feature = "std", error("Derivative window must be at least 1"))]
    InvalidDerivativeWindow,
}

/// Errors raised when the sensor's ODE solver cannot produce a reading.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum IntegrationError {
    /// The solver used up its step budget before reaching the end of the interval.
    #[cfg_attr(
        feature = "std",
        error("Integration did not reach the end of the interval within {max_steps} steps")
    )]
    MaxStepsExceeded {
        /// Step budget that was exhausted.
        max_steps: usize,
    },

    /// The adaptive step size shrank below what the time resolution can represent.
    #[cfg_attr(feature = "std", error("Integration step size underflow at t = {time}"))]
    StepSizeUnderflow {
        /// Time at which the solver stalled.
        time: f64,
    },

    /// The state became NaN or infinite.
    #[cfg_attr(feature = "std", error("Integration produced a non-finite state at t = {time}"))]
    NonFiniteState {
        /// Time at which the state diverged.
        time: f64,
    },
}

/// Errors raised by [`Sensor::observe`](crate::sensor::Sensor::observe).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "std", derive(thiserror::Error))]
pub enum ObserveError {
    /// The sample was rejected before integration.
    #[cfg_attr(feature = "std", error(transparent))]
    Input(InputError),

    /// The integration over the sample interval failed.
    #[cfg_attr(feature = "std", error(transparent))]
    Integration(IntegrationError),
}

impl From<InputError> for ObserveError {
    fn from(err: InputError) -> Self {
        ObserveError::Input(err)
    }
}

impl From<IntegrationError> for ObserveError {
    fn from(err: IntegrationError) -> Self {
        ObserveError::Integration(err)
    }
}
