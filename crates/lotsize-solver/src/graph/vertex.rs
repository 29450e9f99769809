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

/// Dense vertex identifier, assigned in construction order and stable for the
/// life of a [`ProblemGraph`](crate::graph::ProblemGraph).
///
/// Id order is the key the SCC engine and the cycle enumerator advance their
/// thresholds on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VertexId(u32);

impl VertexId {
    #[inline]
    pub fn new(raw: usize) -> Self {
        Self(raw as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for VertexId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A vertex of the four-layer problem graph.
///
/// `Demand` stands for one unit of type `item` due no later than slot
/// `deadline`; `Decision` for the binary choice to produce `item` in `slot`;
/// `TimeSlot` for machine capacity of one slot; `Sink` collects all flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Vertex {
    Demand {
        id: VertexId,
        item: usize,
        deadline: usize,
    },
    Decision {
        id: VertexId,
        item: usize,
        slot: usize,
    },
    TimeSlot {
        id: VertexId,
        slot: usize,
    },
    Sink {
        id: VertexId,
    },
}

impl Vertex {
    #[inline]
    pub fn id(&self) -> VertexId {
        match *self {
            Vertex::Demand { id, .. } => id,
            Vertex::Decision { id, .. } => id,
            Vertex::TimeSlot { id, .. } => id,
            Vertex::Sink { id } => id,
        }
    }
}

/// Hands out dense ids during graph construction.
///
/// Deliberately a value owned by one build, never shared between graphs.
#[derive(Debug, Default)]
pub(crate) struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    #[inline]
    pub(crate) fn next_id(&mut self) -> VertexId {
        let id = VertexId(self.next);
        self.next += 1;
        id
    }
}
