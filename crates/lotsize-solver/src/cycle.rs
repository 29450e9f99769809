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

use crate::graph::vertex::{Vertex, VertexId};

/// A simple cycle of the residual graph, split into the schedule patch it
/// encodes.
///
/// Residual arcs that run in the layer order demand → decision → time slot →
/// sink are forward edges of the problem graph and become commits; every
/// other arc traverses a used edge backwards and becomes a decommit, stored
/// in the original (forward) orientation. The demand/decision endpoints of
/// those arcs form the activation and deactivation lists the schedule patch
/// works from.
///
/// Since a cycle enters a layer as often as it leaves it, activations and
/// deactivations always pair up; the balance is checked in debug builds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cycle {
    edges: Vec<(VertexId, VertexId)>,
    commit_edges: Vec<(VertexId, VertexId)>,
    decommit_edges: Vec<(VertexId, VertexId)>,
    activated: Vec<(VertexId, VertexId)>,
    deactivated: Vec<(VertexId, VertexId)>,
}

impl Cycle {
    /// Classifies the closed path `path[0] → path[1] → … → path[0]`.
    ///
    /// `vertices` is the id-indexed vertex table of the owning problem graph.
    pub fn from_path(path: &[VertexId], vertices: &[Vertex]) -> Self {
        let mut edges = Vec::with_capacity(path.len());
        let mut commit_edges = Vec::new();
        let mut decommit_edges = Vec::new();
        let mut activated = Vec::new();
        let mut deactivated = Vec::new();

        for (i, &u) in path.iter().enumerate() {
            let v = path[(i + 1) % path.len()];
            edges.push((u, v));
            match (vertices[u.index()], vertices[v.index()]) {
                (Vertex::Demand { .. }, Vertex::Decision { .. }) => {
                    commit_edges.push((u, v));
                    activated.push((u, v));
                }
                (Vertex::Decision { .. }, Vertex::TimeSlot { .. })
                | (Vertex::TimeSlot { .. }, Vertex::Sink { .. }) => {
                    commit_edges.push((u, v));
                }
                (Vertex::Decision { .. }, Vertex::Demand { .. }) => {
                    decommit_edges.push((v, u));
                    deactivated.push((v, u));
                }
                _ => {
                    // Reversed decision → slot or slot → sink arc.
                    decommit_edges.push((v, u));
                }
            }
        }

        if activated.len() != deactivated.len() {
            tracing::warn!(
                activated = activated.len(),
                deactivated = deactivated.len(),
                "unbalanced cycle"
            );
            debug_assert_eq!(activated.len(), deactivated.len());
        }

        Self {
            edges,
            commit_edges,
            decommit_edges,
            activated,
            deactivated,
        }
    }

    /// Edgeless sentinel used to signal exhaustion on the streaming channel.
    #[inline]
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            commit_edges: Vec::new(),
            decommit_edges: Vec::new(),
            activated: Vec::new(),
            deactivated: Vec::new(),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    /// Residual arcs in traversal order.
    #[inline]
    pub fn edges(&self) -> &[(VertexId, VertexId)] {
        &self.edges
    }

    /// Problem graph edges gaining flow.
    #[inline]
    pub fn commit_edges(&self) -> &[(VertexId, VertexId)] {
        &self.commit_edges
    }

    /// Problem graph edges losing flow, in forward orientation.
    #[inline]
    pub fn decommit_edges(&self) -> &[(VertexId, VertexId)] {
        &self.decommit_edges
    }

    /// (demand, decision) pairs newly carrying flow.
    #[inline]
    pub fn activated(&self) -> &[(VertexId, VertexId)] {
        &self.activated
    }

    /// (demand, decision) pairs no longer carrying flow.
    #[inline]
    pub fn deactivated(&self) -> &[(VertexId, VertexId)] {
        &self.deactivated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::problem::ProblemGraph;
    use lotsize_model::instance::Instance;

    #[test]
    fn empty_sentinel() {
        let c = Cycle::empty();
        assert!(c.is_empty());
        assert_eq!(c.len(), 0);
        assert!(c.activated().is_empty());
    }

    #[test]
    fn classifies_a_slot_move() {
        // One unit of one type due by slot 1.
        let instance = Instance::new(2, 1, 1, vec![vec![0, 1]], vec![vec![0]]).unwrap();
        let graph = ProblemGraph::build(&instance);
        let d = graph.demand_vertices()[0];
        let dec0 = graph.decision_vertex(0, 0);
        let dec1 = graph.decision_vertex(0, 1);
        let ts0 = graph.time_slot_vertex(0);
        let ts1 = graph.time_slot_vertex(1);
        let sink = graph.sink();

        // Schedule produces in slot 0; the residual cycle moves it to slot 1.
        let path = [d, dec1, ts1, sink, ts0, dec0];
        let cycle = Cycle::from_path(&path, graph.vertices());

        assert_eq!(cycle.len(), 6);
        assert_eq!(cycle.commit_edges(), &[(d, dec1), (dec1, ts1), (ts1, sink)]);
        assert_eq!(
            cycle.decommit_edges(),
            &[(ts0, sink), (dec0, ts0), (d, dec0)]
        );
        assert_eq!(cycle.activated(), &[(d, dec1)]);
        assert_eq!(cycle.deactivated(), &[(d, dec0)]);
    }

    #[test]
    fn activation_balance_holds_for_multi_demand_cycles() {
        // Two units of one type, swap-style cycle touching both demands.
        let instance = Instance::new(3, 1, 1, vec![vec![0, 1, 1]], vec![vec![0]]).unwrap();
        let graph = ProblemGraph::build(&instance);
        let d0 = graph.demand_vertices()[0];
        let d1 = graph.demand_vertices()[1];
        let dec0 = graph.decision_vertex(0, 0);
        let dec1 = graph.decision_vertex(0, 1);

        // d0 takes slot 0 from d1, d1 takes slot 1 from d0.
        let path = [d0, dec0, d1, dec1];
        let cycle = Cycle::from_path(&path, graph.vertices());
        assert_eq!(cycle.activated().len(), 2);
        assert_eq!(cycle.deactivated().len(), 2);
        assert_eq!(cycle.activated(), &[(d0, dec0), (d1, dec1)]);
        assert_eq!(cycle.deactivated(), &[(d1, dec0), (d0, dec1)]);
    }
}
