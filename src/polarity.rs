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

use core::fmt;
use core::str::FromStr;

use crate::error::ConfigError;
use crate::Real;

/// Decides on which side of the set point a positive response is produced.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// The set point is a lower limit: a signal below the set point triggers a positive
    /// response, e.g. a heater or a pump dosing base into an acidifying solution.
    LowerLimit,

    /// The set point is an upper limit: a signal above the set point triggers a positive
    /// response, e.g. a cooler.
    UpperLimit,
}

impl Polarity {
    /// The error seen by a PID controller: positive whenever the response should increase.
    pub fn signed_error<F: Real>(self, set_point: F, signal: F) -> F {
        match self {
            Polarity::LowerLimit => set_point - signal,
            Polarity::UpperLimit => signal - set_point,
        }
    }

    /// Name used in configuration files and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Polarity::LowerLimit => "lower_limit",
            Polarity::UpperLimit => "upper_limit",
        }
    }
}

impl FromStr for Polarity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lower_limit" => Ok(Polarity::LowerLimit),
            "upper_limit" => Ok(Polarity::UpperLimit),
            _ => Err(ConfigError::UnknownPolarity),
        }
    }
}

impl fmt::Display for Polarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
