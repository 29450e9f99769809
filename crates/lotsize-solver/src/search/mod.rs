// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Search strategies over the residual cycle space.
//!
//! [`ExhaustiveSearch`] enumerates every residual cycle of the incumbent and
//! can prove local optimality; [`LocalSearch`] restricts enumeration to small
//! random neighborhoods of demands and scales to instances where full
//! enumeration is hopeless.

pub mod config;
pub mod exhaustive;
pub mod local;

pub use config::{Acceptance, RebuildPolicy, SearchConfig};
pub use exhaustive::ExhaustiveSearch;
pub use local::LocalSearch;

use crate::schedule::Schedule;
use std::time::Duration;

/// A schedule improvement strategy running under a wall-clock budget.
pub trait Solver {
    /// Improves `initial` until no move is left or the budget runs out,
    /// returning the best schedule seen. Never returns a schedule worse
    /// than `initial`.
    fn search(&mut self, initial: Schedule, time_limit: Duration) -> Schedule;
}
