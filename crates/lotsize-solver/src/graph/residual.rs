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

use crate::{
    graph::problem::ProblemGraph,
    graph::vertex::{Vertex, VertexId},
    schedule::Schedule,
};
use fixedbitset::FixedBitSet;

/// Residual graph of a schedule: same vertex set as the problem graph, with
/// every used edge reversed and every unused edge kept in its original
/// orientation. Rebuilt from scratch whenever the schedule changes.
#[derive(Debug, Clone)]
pub struct ResidualGraph {
    out: Vec<Vec<VertexId>>,
    edge_count: usize,
}

impl ResidualGraph {
    pub fn new(graph: &ProblemGraph, schedule: &Schedule) -> Self {
        let mut out = vec![Vec::new(); graph.vertex_count()];
        let mut edge_count = 0usize;
        for u in 0..graph.vertex_count() {
            let uid = VertexId::new(u);
            for &v in graph.out_neighbors(uid) {
                if schedule.uses_edge(uid, v) {
                    out[v.index()].push(uid);
                } else {
                    out[u].push(v);
                }
                edge_count += 1;
            }
        }
        Self { out, edge_count }
    }

    /// Builds a residual graph directly from raw arcs. Useful for driving the
    /// SCC engine and the cycle enumerator on plain digraphs.
    pub fn from_arcs(vertex_count: usize, arcs: &[(usize, usize)]) -> Self {
        let mut out = vec![Vec::new(); vertex_count];
        for &(u, v) in arcs {
            out[u].push(VertexId::new(v));
        }
        Self {
            out,
            edge_count: arcs.len(),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.out.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn out_neighbors(&self, id: VertexId) -> &[VertexId] {
        &self.out[id.index()]
    }

    /// Restriction used by the bounded-neighborhood search: drops every
    /// demand ↔ decision arc whose demand endpoint is outside `demands`,
    /// leaving all other arcs in place. The vertex set is unchanged.
    pub fn restrict_demand_edges(&self, graph: &ProblemGraph, demands: &FixedBitSet) -> Self {
        let mut out = self.out.clone();
        let mut edge_count = 0usize;
        for (u, neighbors) in out.iter_mut().enumerate() {
            let uid = VertexId::new(u);
            neighbors.retain(|&v| {
                let keep = match (graph.vertex(uid), graph.vertex(v)) {
                    (Vertex::Demand { .. }, Vertex::Decision { .. }) => demands.contains(u),
                    (Vertex::Decision { .. }, Vertex::Demand { .. }) => demands.contains(v.index()),
                    _ => true,
                };
                keep
            });
            edge_count += neighbors.len();
        }
        Self { out, edge_count }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxhash::FxHashSet;
    use lotsize_model::instance::Instance;

    fn two_slot_instance() -> Instance {
        // One unit of a single type, due by slot 1.
        Instance::new(2, 1, 1, vec![vec![0, 1]], vec![vec![0]]).unwrap()
    }

    #[test]
    fn used_edges_are_reversed() {
        let instance = two_slot_instance();
        let graph = ProblemGraph::build(&instance);
        let d = graph.demand_vertices()[0];
        let dec1 = graph.decision_vertex(0, 1);
        let ts1 = graph.time_slot_vertex(1);
        let sink = graph.sink();
        let used: FxHashSet<_> = [(d, dec1), (dec1, ts1), (ts1, sink)].into_iter().collect();
        let schedule = Schedule::new(&graph, used);

        let residual = ResidualGraph::new(&graph, &schedule);
        assert_eq!(residual.edge_count(), graph.edge_count());
        // Used path is reversed.
        assert!(residual.out_neighbors(dec1).contains(&d));
        assert!(residual.out_neighbors(ts1).contains(&dec1));
        assert!(residual.out_neighbors(sink).contains(&ts1));
        // The unused alternative keeps its forward orientation.
        let dec0 = graph.decision_vertex(0, 0);
        assert!(residual.out_neighbors(d).contains(&dec0));
        assert!(residual.out_neighbors(dec0).contains(&graph.time_slot_vertex(0)));
    }

    #[test]
    fn restriction_drops_foreign_demand_arcs() {
        // Two units of one type due by slot 1 and slot 2.
        let instance = Instance::new(3, 1, 1, vec![vec![0, 1, 1]], vec![vec![0]]).unwrap();
        let graph = ProblemGraph::build(&instance);
        let schedule = graph.min_inventory_schedule().unwrap();
        let residual = ResidualGraph::new(&graph, &schedule);

        let d0 = graph.demand_vertices()[0];
        let d1 = graph.demand_vertices()[1];
        let mut allowed = FixedBitSet::with_capacity(graph.vertex_count());
        allowed.insert(d0.index());
        let restricted = residual.restrict_demand_edges(&graph, &allowed);

        assert!(restricted.edge_count() < residual.edge_count());
        for u in 0..restricted.vertex_count() {
            let uid = VertexId::new(u);
            for &v in restricted.out_neighbors(uid) {
                let touches_d1 = uid == d1 || v == d1;
                if touches_d1 {
                    // Only non-decision arcs may still touch the excluded demand.
                    let decision_arc = matches!(
                        (graph.vertex(uid), graph.vertex(v)),
                        (Vertex::Demand { .. }, Vertex::Decision { .. })
                            | (Vertex::Decision { .. }, Vertex::Demand { .. })
                    );
                    assert!(!decision_arc);
                }
            }
        }
    }
}
