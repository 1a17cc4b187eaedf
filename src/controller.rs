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

use crate::error::InputError;
use crate::Real;

/// A feedback controller that turns one time-stamped measurement into one response.
///
/// This lets a driver loop treat PID and on/off controllers alike. Controller-specific knobs,
/// such as a per-call derivative window, are reachable through the concrete types.
pub trait Controller<F: Real> {
    /// Computes and records the response to `signal` measured at `time`.
    ///
    /// # Errors
    /// Returns an [`InputError`] if the sample is rejected, in which case nothing is recorded.
    fn calc_response(&mut self, signal: F, time: F) -> Result<F, InputError>;

    /// The value the controller drives the signal towards.
    fn set_point(&self) -> F;

    /// The most recent response, or `None` before the first step.
    fn last_response(&self) -> Option<F>;
}
