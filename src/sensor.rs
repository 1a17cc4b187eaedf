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

//! A sensor whose reading lags the true process value.
//!
//! The proportional-lag model is the first-order transfer function
//!
//! ```text
//! dy/dt = -k·y + k·r(t)
//! ```
//!
//! where `y` is the reading and `r` the true value. Between two samples, `r` is taken to vary
//! linearly, and the reading at the new sample time is obtained by integrating the ODE over the
//! sample interval, starting from the previous reading.

use tracing::{debug, trace, warn};

use crate::error::{ConfigError, InputError, ObserveError};
use crate::history::History;
use crate::ode::{dormand_prince, Tolerances};
use crate::Real;

/// How the sensor reading responds to the true value.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ResponseModel<F> {
    /// The reading moves towards the true value at a rate proportional to the current
    /// measurement error, with lag constant `k`. Larger `k` means a faster sensor.
    ProportionalLag {
        /// Lag constant, in inverse time units.
        k: F,
    },
}

impl<F: Real> Default for ResponseModel<F> {
    fn default() -> Self {
        ResponseModel::ProportionalLag { k: F::one() }
    }
}

impl<F: Real> ResponseModel<F> {
    /// A proportional-lag response with lag constant `k`.
    pub fn proportional_lag(k: F) -> Self {
        ResponseModel::ProportionalLag { k }
    }

    /// Resolves a response model from its configuration name.
    ///
    /// `"prop"` and `"proportional_lag"` name the proportional-lag model; any other name yields
    /// `Err(ConfigError::UnsupportedResponseModel)`.
    pub fn from_kind(kind: &str, k: F) -> Result<Self, ConfigError> {
        match kind {
            "prop" | "proportional_lag" => Ok(Self::proportional_lag(k)),
            _ => Err(ConfigError::UnsupportedResponseModel),
        }
    }

    /// Configuration name of the model.
    pub fn kind(&self) -> &'static str {
        match self {
            ResponseModel::ProportionalLag { .. } => "prop",
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            ResponseModel::ProportionalLag { k } if k >= F::zero() && k.is_finite() => Ok(()),
            ResponseModel::ProportionalLag { .. } => Err(ConfigError::InvalidLagConstant),
        }
    }
}

/// One sample of the sensor: the true value, its time, and what the sensor read.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SensorRecord<F> {
    /// The true process value.
    pub real: F,
    /// The sample time.
    pub time: F,
    /// The lagged sensor reading.
    pub reading: F,
}

/// Builder for [`Sensor`].
///
/// Only the start reading is required. The start time defaults to 0, the true value at the start
/// defaults to the start reading, and the response model defaults to a proportional lag with
/// `k = 1`.
#[derive(Copy, Clone, Debug)]
pub struct SensorBuilder<F> {
    start_value: F,
    start_time: F,
    start_real: Option<F>,
    model: ResponseModel<F>,
    tolerances: Tolerances<F>,
    history_capacity: Option<usize>,
}

impl<F: Real> SensorBuilder<F> {
    /// Starts a sensor whose first reading is `start_value`.
    pub fn new(start_value: F) -> Self {
        Self {
            start_value,
            start_time: F::zero(),
            start_real: None,
            model: ResponseModel::default(),
            tolerances: Tolerances::default(),
            history_capacity: None,
        }
    }

    /// Sets the time of the first reading.
    pub fn start_time(mut self, start_time: F) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets the true value at the start time. A value that differs from the start reading makes
    /// the sensor start with a measurement offset.
    pub fn start_real(mut self, start_real: F) -> Self {
        self.start_real = Some(start_real);
        self
    }

    /// Sets the response model.
    pub fn response_model(mut self, model: ResponseModel<F>) -> Self {
        self.model = model;
        self
    }

    /// Shorthand for a proportional-lag response with lag constant `k`.
    pub fn lag_constant(self, k: F) -> Self {
        self.response_model(ResponseModel::proportional_lag(k))
    }

    /// Sets the tolerances of the integrator.
    pub fn tolerances(mut self, tolerances: Tolerances<F>) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Keeps only the last `capacity` records in the sensor's history.
    pub fn history_capacity(mut self, capacity: usize) -> Self {
        self.history_capacity = Some(capacity);
        self
    }

    /// Validates the configuration and records the initialization sample.
    ///
    /// # Returns
    /// - `Err(ConfigError::InvalidInitialValue)` if a start value or the start time is not
    ///   finite.
    /// - `Err(ConfigError::InvalidLagConstant)` if the lag constant is negative or not finite.
    pub fn build(self) -> Result<Sensor<F>, ConfigError> {
        let start_real = self.start_real.unwrap_or(self.start_value);
        if !self.start_value.is_finite() || !self.start_time.is_finite() || !start_real.is_finite()
        {
            return Err(ConfigError::InvalidInitialValue);
        }
        self.model.validate()?;

        let last = SensorRecord {
            real: start_real,
            time: self.start_time,
            reading: self.start_value,
        };
        let mut history = match self.history_capacity {
            Some(capacity) => History::bounded(capacity),
            None => History::unbounded(),
        };
        history.push(last);

        debug!(
            model = self.model.kind(),
            start_value = ?self.start_value,
            start_real = ?start_real,
            start_time = ?self.start_time,
            "Sensor initialized"
        );

        Ok(Sensor {
            model: self.model,
            tolerances: self.tolerances,
            last,
            history,
        })
    }
}

/// A sensor with a first-order lag.
#[derive(Clone, Debug)]
pub struct Sensor<F> {
    model: ResponseModel<F>,
    tolerances: Tolerances<F>,
    last: SensorRecord<F>,
    history: History<SensorRecord<F>>,
}

impl<F: Real> Sensor<F> {
    /// Returns the response model.
    pub fn response_model(&self) -> ResponseModel<F> {
        self.model
    }

    /// Returns the lag constant.
    pub fn lag_constant(&self) -> F {
        match self.model {
            ResponseModel::ProportionalLag { k } => k,
        }
    }

    /// Returns the integrator tolerances.
    pub fn tolerances(&self) -> &Tolerances<F> {
        &self.tolerances
    }

    /// Returns the current reading.
    pub fn reading(&self) -> F {
        self.last.reading
    }

    /// Returns the time of the last sample.
    pub fn last_time(&self) -> F {
        self.last.time
    }

    /// Returns the most recent sample.
    pub fn last_record(&self) -> &SensorRecord<F> {
        &self.last
    }

    /// Returns the sample history, starting with the initialization record.
    pub fn history(&self) -> &History<SensorRecord<F>> {
        &self.history
    }

    /// Records the true value `real` at `time` and returns the sensor reading at that time.
    ///
    /// The true value is interpolated linearly from the previous sample to this one, and the
    /// sensor ODE is integrated over the interval starting from the previous reading.
    ///
    /// # Errors
    /// - [`InputError::NonFiniteInput`] if `real` or `time` is NaN or infinite.
    /// - [`InputError::NonIncreasingTime`] if `time` does not come after the previous sample.
    /// - [`IntegrationError`](crate::error::IntegrationError) if the integrator fails.
    ///
    /// On error, nothing is recorded and the reading is unchanged.
    pub fn observe(&mut self, real: F, time: F) -> Result<F, ObserveError> {
        match self.integrate(real, time) {
            Ok(reading) => {
                self.last = SensorRecord {
                    real,
                    time,
                    reading,
                };
                self.history.push(self.last);
                Ok(reading)
            }
            Err(err) => {
                warn!(?err, ?time, "Sensor sample rejected");
                Err(err)
            }
        }
    }

    fn integrate(&self, real: F, time: F) -> Result<F, ObserveError> {
        if !real.is_finite() || !time.is_finite() {
            return Err(InputError::NonFiniteInput.into());
        }
        let SensorRecord {
            real: last_real,
            time: last_time,
            reading: last_reading,
        } = self.last;
        if time <= last_time {
            return Err(InputError::NonIncreasingTime {
                previous: last_time.to_f64().unwrap_or(f64::NAN),
                current: time.to_f64().unwrap_or(f64::NAN),
            }
            .into());
        }

        // Integrate over the time elapsed since the last sample, which keeps the full resolution
        // of `F` however large the timestamps grow
        let span = time - last_time;
        let slope = (real - last_real) / span;
        let solution = match self.model {
            ResponseModel::ProportionalLag { k } => {
                let transfer = |elapsed: F, y: F| {
                    let interpolated = last_real + slope * elapsed;
                    k * (interpolated - y)
                };
                dormand_prince(transfer, F::zero(), span, last_reading, &self.tolerances)?
            }
        };

        trace!(
            ?time,
            ?real,
            reading = ?solution.value,
            steps = solution.steps,
            rejected = solution.rejected,
            "Sensor integrated"
        );
        Ok(solution.value)
    }
}
