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

//! Explicit Runge-Kutta integrators.
//!
//! [`dormand_prince`] integrates a scalar ODE over an interval with an adaptive Dormand-Prince
//! 5(4) pair and error-controlled step sizes. It sub-steps automatically, so stiff-looking
//! intervals (large rate constant times a long interval) cost more steps rather than going
//! unstable.
//!
//! [`rk4_step`] is the classic fixed-step fourth-order method over any state type that supports
//! addition and scaling, e.g. `nalgebra` vectors.

use core::ops::{Add, Mul};

use crate::error::{ConfigError, IntegrationError};
use crate::{lit, Real};

/// Error tolerances and step budget of the adaptive integrator.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerances<F> {
    /// Relative tolerance on the local error.
    /// Defaults to 1e-6.
    rtol: F,

    /// Absolute tolerance on the local error.
    /// Defaults to 1e-9.
    atol: F,

    /// Maximum number of attempted steps per integration, accepted or rejected.
    /// Defaults to 50000.
    max_steps: usize,
}

impl<F: Real> Default for Tolerances<F> {
    fn default() -> Self {
        Tolerances {
            rtol: lit(1e-6),
            atol: lit(1e-9),
            max_steps: 50_000,
        }
    }
}

impl<F: Real> Tolerances<F> {
    /// Creates a validated set of tolerances.
    ///
    /// # Returns
    /// - `Err(ConfigError::InvalidTolerances)` if either tolerance is not positive and finite,
    ///   or `max_steps` is zero.
    pub fn new(rtol: F, atol: F, max_steps: usize) -> Result<Self, ConfigError> {
        let valid = |tol: F| tol > F::zero() && tol.is_finite();
        if !valid(rtol) || !valid(atol) || max_steps == 0 {
            return Err(ConfigError::InvalidTolerances);
        }
        Ok(Self {
            rtol,
            atol,
            max_steps,
        })
    }

    /// Returns the relative tolerance.
    pub fn rtol(&self) -> F {
        self.rtol
    }

    /// Returns the absolute tolerance.
    pub fn atol(&self) -> F {
        self.atol
    }

    /// Returns the step budget.
    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    fn scale(&self, y: F, y_new: F) -> F {
        self.atol + self.rtol * y.abs().max(y_new.abs())
    }
}

/// Result of an adaptive integration.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Solution<F> {
    /// The state at the end of the interval.
    pub value: F,
    /// Number of accepted steps.
    pub steps: usize,
    /// Number of rejected step attempts.
    pub rejected: usize,
}

// Dormand-Prince 5(4) tableau. The 5th order weights double as the last row of `A` (FSAL).
const C: [f64; 6] = [1.0 / 5.0, 3.0 / 10.0, 4.0 / 5.0, 8.0 / 9.0, 1.0, 1.0];
const A2: [f64; 1] = [1.0 / 5.0];
const A3: [f64; 2] = [3.0 / 40.0, 9.0 / 40.0];
const A4: [f64; 3] = [44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0];
const A5: [f64; 4] = [
    19372.0 / 6561.0,
    -25360.0 / 2187.0,
    64448.0 / 6561.0,
    -212.0 / 729.0,
];
const A6: [f64; 5] = [
    9017.0 / 3168.0,
    -355.0 / 33.0,
    46732.0 / 5247.0,
    49.0 / 176.0,
    -5103.0 / 18656.0,
];
const B: [f64; 6] = [
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
];
// Difference between the 5th and the embedded 4th order weights
const E: [f64; 7] = [
    71.0 / 57600.0,
    0.0,
    -71.0 / 16695.0,
    71.0 / 1920.0,
    -17253.0 / 339200.0,
    22.0 / 525.0,
    -1.0 / 40.0,
];

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 10.0;
const ERROR_EXPONENT: f64 = -1.0 / 5.0;

/// Integrates `dy/dt = f(t, y)` from `(t0, y0)` to `t1` and returns `y(t1)`.
///
/// # Arguments
/// - `f`: The right hand side of the ODE.
/// - `t0`, `t1`: The interval; `t1` must be greater than `t0`, otherwise `y0` is returned as is.
/// - `y0`: The initial condition.
/// - `tol`: Error tolerances and step budget.
///
/// # Errors
/// - [`IntegrationError::NonFiniteState`] if the derivative at an accepted state is NaN or
///   infinite.
/// - [`IntegrationError::StepSizeUnderflow`] if rejected steps shrink the step size below the
///   resolution of the time axis. An interval shorter than that resolution is still integrated,
///   in a single step.
/// - [`IntegrationError::MaxStepsExceeded`] if the step budget runs out.
pub fn dormand_prince<F, D>(
    mut f: D,
    t0: F,
    t1: F,
    y0: F,
    tol: &Tolerances<F>,
) -> Result<Solution<F>, IntegrationError>
where
    F: Real,
    D: FnMut(F, F) -> F,
{
    let mut solution = Solution {
        value: y0,
        steps: 0,
        rejected: 0,
    };
    if !(t1 > t0) {
        return Ok(solution);
    }

    let non_finite = |t: F| IntegrationError::NonFiniteState {
        time: t.to_f64().unwrap_or(f64::NAN),
    };

    let mut t = t0;
    let mut y = y0;
    let mut k1 = f(t, y);
    if !y.is_finite() || !k1.is_finite() {
        return Err(non_finite(t));
    }

    let mut h = initial_step(&mut f, t0, t1, y0, k1, tol);
    let min_step_scale = lit::<F>(10.0) * F::epsilon();

    while t < t1 {
        // Steps shorter than a few ulps of `t` cannot advance it, so start at least that long.
        // The last step may still be shorter, as it is cut to land exactly on `t1`.
        let min_step = min_step_scale * t.abs().max(t1.abs());
        h = h.max(min_step);
        let mut step_rejected = false;

        // Retry the step from (t, y) until the error estimate is acceptable
        let (t_new, y_new, k7, err_norm) = loop {
            if solution.steps + solution.rejected >= tol.max_steps {
                return Err(IntegrationError::MaxStepsExceeded {
                    max_steps: tol.max_steps,
                });
            }
            let last_step = t + h >= t1;
            if last_step {
                h = t1 - t;
            }

            let k2 = f(t + lit::<F>(C[0]) * h, y + h * lit::<F>(A2[0]) * k1);
            let k3 = f(
                t + lit::<F>(C[1]) * h,
                y + h * (lit::<F>(A3[0]) * k1 + lit::<F>(A3[1]) * k2),
            );
            let k4 = f(
                t + lit::<F>(C[2]) * h,
                y + h * (lit::<F>(A4[0]) * k1 + lit::<F>(A4[1]) * k2 + lit::<F>(A4[2]) * k3),
            );
            let k5 = f(
                t + lit::<F>(C[3]) * h,
                y + h
                    * (lit::<F>(A5[0]) * k1
                        + lit::<F>(A5[1]) * k2
                        + lit::<F>(A5[2]) * k3
                        + lit::<F>(A5[3]) * k4),
            );
            let k6 = f(
                t + lit::<F>(C[4]) * h,
                y + h
                    * (lit::<F>(A6[0]) * k1
                        + lit::<F>(A6[1]) * k2
                        + lit::<F>(A6[2]) * k3
                        + lit::<F>(A6[3]) * k4
                        + lit::<F>(A6[4]) * k5),
            );
            let y5 = y + h
                * (lit::<F>(B[0]) * k1
                    + lit::<F>(B[2]) * k3
                    + lit::<F>(B[3]) * k4
                    + lit::<F>(B[4]) * k5
                    + lit::<F>(B[5]) * k6);
            let t_next = if last_step { t1 } else { t + lit::<F>(C[5]) * h };
            let k7 = f(t_next, y5);

            let err = h
                * (lit::<F>(E[0]) * k1
                    + lit::<F>(E[2]) * k3
                    + lit::<F>(E[3]) * k4
                    + lit::<F>(E[4]) * k5
                    + lit::<F>(E[5]) * k6
                    + lit::<F>(E[6]) * k7);
            let err_norm = err.abs() / tol.scale(y, y5);

            if y5.is_finite() && err_norm <= F::one() {
                break (t_next, y5, k7, err_norm);
            }

            // A non-finite trial state is treated like a failed error test
            solution.rejected += 1;
            step_rejected = true;
            let factor = if err_norm.is_finite() {
                (lit::<F>(SAFETY) * err_norm.powf(lit(ERROR_EXPONENT))).max(lit(MIN_FACTOR))
            } else {
                lit(MIN_FACTOR)
            };
            h = h * factor;
            if h < min_step {
                return Err(IntegrationError::StepSizeUnderflow {
                    time: t.to_f64().unwrap_or(f64::NAN),
                });
            }
        };

        t = t_new;
        y = y_new;
        k1 = k7;
        solution.steps += 1;
        if !k1.is_finite() {
            return Err(non_finite(t));
        }

        let mut factor = if err_norm == F::zero() {
            lit(MAX_FACTOR)
        } else {
            (lit::<F>(SAFETY) * err_norm.powf(lit(ERROR_EXPONENT))).min(lit(MAX_FACTOR))
        };
        if step_rejected {
            factor = factor.min(F::one());
        }
        h = h * factor.max(lit(MIN_FACTOR));
    }

    solution.value = y;
    Ok(solution)
}

/// Picks a first step size from the local behaviour of the ODE.
fn initial_step<F, D>(f: &mut D, t0: F, t1: F, y0: F, f0: F, tol: &Tolerances<F>) -> F
where
    F: Real,
    D: FnMut(F, F) -> F,
{
    let span = t1 - t0;
    let scale = tol.scale(y0, y0);
    let d0 = y0.abs() / scale;
    let d1 = f0.abs() / scale;
    let tiny = lit::<F>(1e-5);

    let h0 = if d0 < tiny || d1 < tiny {
        lit(1e-6)
    } else {
        lit::<F>(0.01) * d0 / d1
    }
    .min(span);

    let f1 = f(t0 + h0, y0 + h0 * f0);
    let d2 = (f1 - f0).abs() / scale / h0;

    let h1 = if d1.max(d2) <= lit(1e-15) {
        lit::<F>(1e-6).max(h0 * lit(1e-3))
    } else {
        (lit::<F>(0.01) / d1.max(d2)).powf(lit(1.0 / 5.0))
    };

    let h = (lit::<F>(100.0) * h0).min(h1).min(span);
    if h.is_finite() && h > F::zero() {
        h
    } else {
        span
    }
}

/// Advances `y` by one classic fourth-order Runge-Kutta step of size `h`.
pub fn rk4_step<F, S, D>(mut f: D, t: F, y: S, h: F) -> S
where
    F: Real,
    S: Copy + Add<Output = S> + Mul<F, Output = S>,
    D: FnMut(F, S) -> S,
{
    let two = lit::<F>(2.0);
    let half_h = h / two;

    let k1 = f(t, y);
    let k2 = f(t + half_h, y + k1 * half_h);
    let k3 = f(t + half_h, y + k2 * half_h);
    let k4 = f(t + h, y + k3 * h);

    y + (k1 + k2 * two + k3 * two + k4) * (h / lit(6.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exponential_decay_matches_closed_form() {
        let tol = Tolerances::default();
        let solution = dormand_prince(|_, y| -y, 0.0, 1.0, 1.0, &tol).unwrap();
        assert_relative_eq!(solution.value, (-1.0f64).exp(), max_relative = 1e-6);
        assert!(solution.steps > 0);
    }

    #[test]
    fn test_time_dependent_rhs() {
        let tol = Tolerances::default();
        let solution = dormand_prince(|t: f64, _| t.cos(), 0.0, 2.0, 0.0, &tol).unwrap();
        assert_relative_eq!(solution.value, 2.0f64.sin(), max_relative = 1e-6);
    }

    #[test]
    fn test_large_rate_times_interval_stays_stable() {
        // k·Δt = 5000: an explicit method taking one step would blow up
        let tol = Tolerances::default();
        let k = 50.0;
        let solution = dormand_prince(|_, y| -k * y + k * 3.0, 0.0, 100.0, 1.0, &tol).unwrap();
        assert_relative_eq!(solution.value, 3.0, epsilon = 1e-4);
        assert!(solution.steps > 1);
    }

    #[test]
    fn test_empty_interval_returns_initial_value() {
        let tol = Tolerances::default();
        let solution = dormand_prince(|_, y| -y, 1.0, 1.0, 4.0, &tol).unwrap();
        assert_eq!(solution.value, 4.0);
        assert_eq!(solution.steps, 0);
    }

    #[test]
    fn test_interval_below_time_resolution_at_large_times() {
        let tol = Tolerances::default();
        let t0: f64 = 1e9;
        let t1 = t0 + 1e-6;
        let solution = dormand_prince(|_, y| 2.0 - y, t0, t1, 1.0, &tol).unwrap();
        assert_eq!(solution.steps, 1);
        assert_relative_eq!(solution.value, 2.0 - (-(t1 - t0)).exp(), epsilon = 1e-12);

        // f32 resolution near 1e5 s is coarser than a 0.1 s sample
        let tol = Tolerances::<f32>::default();
        let solution = dormand_prince(|_, y| 1.0 - y, 1e5f32, 1e5f32 + 0.1, 0.0, &tol).unwrap();
        assert!(solution.value > 0.09 && solution.value < 0.11);
    }

    #[test]
    fn test_step_budget_is_enforced() {
        let tol = Tolerances::new(1e-6, 1e-9, 3).unwrap();
        let result = dormand_prince(|_, y| -1000.0 * y, 0.0, 100.0, 1.0, &tol);
        assert_eq!(
            result,
            Err(IntegrationError::MaxStepsExceeded { max_steps: 3 })
        );
    }

    #[test]
    fn test_non_finite_derivative_is_reported() {
        let tol = Tolerances::default();
        let result = dormand_prince(|_, _| f64::INFINITY, 0.0, 1.0, 1.0, &tol);
        assert_eq!(result, Err(IntegrationError::NonFiniteState { time: 0.0 }));
    }

    #[test]
    fn test_invalid_tolerances_are_rejected() {
        assert_eq!(
            Tolerances::new(0.0, 1e-9, 10),
            Err(ConfigError::InvalidTolerances)
        );
        assert_eq!(
            Tolerances::new(1e-6, f64::NAN, 10),
            Err(ConfigError::InvalidTolerances)
        );
        assert_eq!(
            Tolerances::new(1e-6, 1e-9, 0),
            Err(ConfigError::InvalidTolerances)
        );
    }

    #[test]
    fn test_rk4_step_on_exponential() {
        let mut y = 1.0;
        let h = 0.01;
        for i in 0..100 {
            y = rk4_step(|_, y: f64| -y, i as f64 * h, y, h);
        }
        assert_relative_eq!(y, (-1.0f64).exp(), max_relative = 1e-9);
    }
}
