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

use crate::ode::rk4_step;
use nalgebra as na;

pub enum WaveForm {
    Sine,
    Square,
    /// High between `start` (inclusive) and `end` (exclusive), low elsewhere
    Pulse { start: f64, end: f64 },
}

/// Generates `offset + amplitude * waveform(t - initial_time)`.
pub struct SignalGenerator {
    waveform: WaveForm,
    initial_time: f64,
    amplitude: f64,
    offset: f64,
}

impl SignalGenerator {
    pub fn new(waveform: WaveForm, initial_time: f64, amplitude: f64, offset: f64) -> Self {
        Self {
            waveform,
            initial_time,
            amplitude,
            offset,
        }
    }

    pub fn generate(&self, time: f64) -> f64 {
        let elapsed = time - self.initial_time;
        let shape = match self.waveform {
            WaveForm::Sine => elapsed.sin(),
            WaveForm::Square => elapsed.sin().signum(),
            WaveForm::Pulse { start, end } => {
                if (start..end).contains(&elapsed) {
                    1.0
                } else {
                    0.0
                }
            }
        };
        self.amplitude * shape + self.offset
    }
}

/// Hydronium concentration of neutral water, in mol/L.
const NEUTRAL_HYDRONIUM: f64 = 1e-7;

/// A stirred tank of water into which a strong acid flows at a constant rate, while a
/// controller doses a strong base to hold the pH.
///
/// The chemistry is strongly simplified: the pH follows from the net moles of acid over the
/// total volume, with no buffering and no water autoionization beyond the initial neutral
/// charge.
pub struct TitrationTank {
    /// Acid concentration of the inflow, in mol/L.
    pub acid_concentration: f64,
    /// Base concentration of the dosing stream, in mol/L.
    pub base_concentration: f64,
    /// Water in the tank at the start, in L.
    pub initial_volume: f64,
    /// Acid inflow, in L/s.
    pub acid_flow_rate: f64,
}

impl TitrationTank {
    /// Rate of change of the state `x = [Vₐ, V_b]`, the volumes of acid and base added so far,
    /// under a base dosing rate `u` in L/s: `x' = [qₐ, u]`.
    pub fn f(&self, _x: na::Vector2<f64>, base_flow: f64) -> na::Vector2<f64> {
        na::Vector2::new(self.acid_flow_rate, base_flow)
    }

    /// Net moles of acid in the tank; negative when the base is in excess.
    pub fn acid_balance(&self, x: na::Vector2<f64>) -> f64 {
        let acid = x[0] * self.acid_concentration
            + NEUTRAL_HYDRONIUM * (self.initial_volume + x[0]);
        acid - x[1] * self.base_concentration
    }

    /// Total liquid volume, in L.
    pub fn volume(&self, x: na::Vector2<f64>) -> f64 {
        self.initial_volume + x[0] + x[1]
    }

    /// The true pH of the tank.
    pub fn ph(&self, x: na::Vector2<f64>) -> f64 {
        let concentration = self.acid_balance(x) / self.volume(x);
        if concentration > 0.0 {
            -concentration.log10()
        } else if concentration < 0.0 {
            14.0 + (-concentration).log10()
        } else {
            7.0
        }
    }

    /// Advances the state by `dt` with the base dosing rate held constant
    pub fn step(&self, x: na::Vector2<f64>, base_flow: f64, time: f64, dt: f64) -> na::Vector2<f64> {
        rk4_step(|_, x| self.f(x, base_flow), time, x, dt)
    }
}
