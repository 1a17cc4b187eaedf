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

#![warn(missing_docs)]

//! # Discrete Feedback Control Library
//!
//! This library provides the building blocks of a discrete-time feedback loop in which a
//! controller reacts to a *lagged* measurement of a physical process.
//!
//! It includes three components, each advanced one sample at a time by a driver loop that you
//! own:
//!
//! - A PID controller with integral accumulation over irregular time steps, moving-average
//!   smoothing of the derivative term and optional one- or two-sided response clamping.
//! - An on/off (threshold) controller that emits either zero or a fixed amplitude.
//! - A sensor model with a first-order lag, whose reading follows the true process value by
//!   integrating `dy/dt = -k·y + k·r(t)` between samples with an adaptive Runge-Kutta solver.
//!
//! Every component keeps a [`history::History`] of its steps for diagnostics. The history is
//! unbounded by default and may be turned into a fixed-capacity ring buffer for long-running
//! loops without affecting the computed responses.
//!
//! ## Usage
//!
//! ### Closing the loop
//!
//! The components never call each other. At each sampling step the driver feeds the true
//! process value to the sensor, the reading to the controller, and the response back into its
//! process model.
//!
//! ```rust
//! use discrete_control::pid::{PidConfigBuilder, PidController};
//! use discrete_control::sensor::SensorBuilder;
//!
//! let config = PidConfigBuilder::default()
//!     .set_point(8.0)
//!     .gains(0.001, 0.00002, 0.005)
//!     .response_limits(Some(0.0), None)
//!     .build()
//!     .expect("Invalid PID config");
//! let mut pid = PidController::new(config);
//!
//! let mut sensor = SensorBuilder::new(7.0)
//!     .lag_constant(0.05)
//!     .build()
//!     .expect("Invalid sensor config");
//!
//! let mut process_value = 7.0;
//! for i in 1..=100 {
//!     let time = i as f64 * 0.1;
//!     let response = pid.step(sensor.reading(), time, 5).unwrap();
//!     process_value += 10.0 * response; // Stand-in for the real process model
//!     sensor.observe(process_value, time).unwrap();
//! }
//!
//! assert_eq!(pid.history().len(), 100);
//! assert_eq!(sensor.history().len(), 101); // Includes the initialization record
//! ```
//!
//! ### On/off control
//!
//! ```rust
//! use discrete_control::on_off::{OnOffConfigBuilder, OnOffController};
//! use discrete_control::polarity::Polarity;
//!
//! let config = OnOffConfigBuilder::default()
//!     .set_point(8.0)
//!     .polarity(Polarity::LowerLimit)
//!     .amplitude(0.002)
//!     .build()
//!     .expect("Invalid on/off config");
//! let mut on_off = OnOffController::new(config);
//!
//! assert_eq!(on_off.step(7.0, None).unwrap(), 0.002);
//! assert_eq!(on_off.step(9.0, None).unwrap(), 0.0);
//! ```
//!
//! ### Driving different controllers uniformly
//!
//! Both controllers implement [`controller::Controller`], so one driver can run either.
//!
//! ```rust
//! use discrete_control::controller::Controller;
//! use discrete_control::on_off::{OnOffConfigBuilder, OnOffController};
//! use discrete_control::pid::{PidConfigBuilder, PidController};
//!
//! let mut loops: Vec<Box<dyn Controller<f64>>> = vec![
//!     Box::new(PidController::new(PidConfigBuilder::default().set_point(1.0).build().unwrap())),
//!     Box::new(OnOffController::new(OnOffConfigBuilder::default().set_point(1.0).build().unwrap())),
//! ];
//!
//! for controller in loops.iter_mut() {
//!     let response = controller.calc_response(0.5, 0.1).unwrap();
//!     assert!(response.is_finite());
//! }
//! ```
//!
//! ## License
//!
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

use core::fmt::Debug;

use num_traits::{Float, NumCast};

/// Errors raised by configuration, step calls and the sensor's integrator.
pub mod error;

/// Set-point polarity shared by both controller kinds.
pub mod polarity;

/// Step records and the bounded or unbounded log that stores them.
pub mod history;

/// The uniform controller interface used by driver loops.
pub mod controller;

/// The PID controller.
pub mod pid;

/// The on/off controller.
pub mod on_off;

/// The first-order-lag sensor model.
pub mod sensor;

/// Runge-Kutta integrators backing the sensor model and the simulation helpers.
pub mod ode;

#[doc(hidden)]
#[cfg(feature = "simulation")]
pub mod sim;

#[doc = include_str!("../README.md")]
#[cfg(doctest)]
pub struct ReadmeDoctests;

/// Scalar types the components compute with, i.e. `f32` and `f64`.
pub trait Real: Float + Debug {}

impl<T: Float + Debug> Real for T {}

/// Converts an `f64` literal into the working scalar type.
///
/// The conversion cannot fail for the floating-point types implementing [`Real`]; a failed
/// conversion turns into NaN, which every caller treats as a non-finite result.
#[inline]
pub(crate) fn lit<F: Real>(value: f64) -> F {
    <F as NumCast>::from(value).unwrap_or_else(F::nan)
}
