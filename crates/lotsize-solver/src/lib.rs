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

//! Cycle-canceling optimization engine for single-machine lot sizing.
//!
//! The problem is encoded as a four-layer unit-capacity flow network
//! ([`graph::ProblemGraph`]). A feasible production plan corresponds to a flow
//! of value equal to the total demand and is represented by an immutable
//! [`schedule::Schedule`]. Improving moves are simple cycles in the residual
//! graph of the current schedule; they are enumerated with a Johnson-style
//! algorithm ([`cycles::CycleFinder`]) on top of a threshold-parameterized
//! Tarjan SCC engine ([`scc::SccEngine`]) and applied through
//! [`schedule::Schedule::apply`]. The [`search`] module drives these
//! primitives under a wall-clock budget.

pub mod cancel;
pub mod cycle;
pub mod cycles;
pub mod err;
pub mod graph;
pub mod scc;
pub mod schedule;
pub mod search;

pub mod prelude {
    pub use crate::cancel::CancelToken;
    pub use crate::cycle::Cycle;
    pub use crate::cycles::CycleFinder;
    pub use crate::err::InfeasibleInstanceError;
    pub use crate::graph::{ProblemGraph, ResidualGraph, Vertex, VertexId};
    pub use crate::scc::SccEngine;
    pub use crate::schedule::Schedule;
    pub use crate::search::{
        Acceptance, ExhaustiveSearch, LocalSearch, RebuildPolicy, SearchConfig, Solver,
    };
}
