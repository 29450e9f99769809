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

use crate::graph::{residual::ResidualGraph, vertex::VertexId};
use fixedbitset::FixedBitSet;

/// Tarjan's strongly connected components over a residual graph, restricted
/// to the subgraph induced by vertices with id at least a threshold.
///
/// The threshold is how the cycle enumerator peels the graph: raising it past
/// the least vertex of the previous round removes that vertex and every
/// cycle through it. The engine is iterative (explicit frame stack) because
/// residual graphs of large instances produce recursion depths in the tens
/// of thousands.
///
/// Scratch buffers live on the engine and are reset per [`compute`] call, so
/// one engine can serve many thresholds without reallocating.
///
/// [`compute`]: SccEngine::compute
#[derive(Debug)]
pub struct SccEngine<'g> {
    graph: &'g ResidualGraph,
    index: Vec<i64>,
    lowlink: Vec<i64>,
    on_stack: FixedBitSet,
    stack: Vec<usize>,
    next_index: i64,
}

impl<'g> SccEngine<'g> {
    pub fn new(graph: &'g ResidualGraph) -> Self {
        let n = graph.vertex_count();
        Self {
            graph,
            index: vec![-1; n],
            lowlink: vec![0; n],
            on_stack: FixedBitSet::with_capacity(n),
            stack: Vec::new(),
            next_index: 0,
        }
    }

    /// All strongly connected components of the subgraph induced by vertices
    /// with `id >= threshold`. Arcs touching a vertex below the threshold are
    /// ignored. Roots are tried in ascending id order, which makes the
    /// output deterministic.
    pub fn compute(&mut self, threshold: usize) -> Vec<Vec<VertexId>> {
        self.index.fill(-1);
        self.lowlink.fill(0);
        self.on_stack.clear();
        self.stack.clear();
        self.next_index = 0;

        let mut components = Vec::new();
        for root in threshold..self.graph.vertex_count() {
            if self.index[root] < 0 {
                self.strong_connect(root, threshold, &mut components);
            }
        }
        components
    }

    fn strong_connect(
        &mut self,
        root: usize,
        threshold: usize,
        components: &mut Vec<Vec<VertexId>>,
    ) {
        let mut frames: Vec<(usize, usize)> = Vec::new();
        self.visit(root);
        frames.push((root, 0));

        'outer: while let Some(&(v, resume_at)) = frames.last() {
            let neighbors = self.graph.out_neighbors(VertexId::new(v));
            let mut i = resume_at;
            while i < neighbors.len() {
                let w = neighbors[i].index();
                i += 1;
                if w < threshold {
                    continue;
                }
                if self.index[w] < 0 {
                    frames.last_mut().unwrap().1 = i;
                    self.visit(w);
                    frames.push((w, 0));
                    continue 'outer;
                }
                if self.on_stack.contains(w) && self.index[w] < self.lowlink[v] {
                    self.lowlink[v] = self.index[w];
                }
            }

            if self.lowlink[v] == self.index[v] {
                let mut component = Vec::new();
                loop {
                    let w = self.stack.pop().unwrap();
                    self.on_stack.set(w, false);
                    component.push(VertexId::new(w));
                    if w == v {
                        break;
                    }
                }
                components.push(component);
            }

            frames.pop();
            if let Some(&(parent, _)) = frames.last() {
                if self.lowlink[v] < self.lowlink[parent] {
                    self.lowlink[parent] = self.lowlink[v];
                }
            }
        }
    }

    #[inline]
    fn visit(&mut self, v: usize) {
        self.index[v] = self.next_index;
        self.lowlink[v] = self.next_index;
        self.next_index += 1;
        self.stack.push(v);
        self.on_stack.insert(v);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(components: Vec<Vec<VertexId>>) -> Vec<Vec<usize>> {
        let mut out: Vec<Vec<usize>> = components
            .iter()
            .map(|c| {
                let mut c: Vec<usize> = c.iter().map(|v| v.index()).collect();
                c.sort_unstable();
                c
            })
            .collect();
        out.sort();
        out
    }

    #[test]
    fn empty_graph_has_no_components() {
        let graph = ResidualGraph::from_arcs(0, &[]);
        let mut engine = SccEngine::new(&graph);
        assert!(engine.compute(0).is_empty());
    }

    #[test]
    fn finds_two_cycles_and_a_bridge() {
        // 0 ↔ 1, 2 ↔ 3, bridge 1 → 2.
        let graph =
            ResidualGraph::from_arcs(4, &[(0, 1), (1, 0), (2, 3), (3, 2), (1, 2)]);
        let mut engine = SccEngine::new(&graph);
        assert_eq!(sorted(engine.compute(0)), vec![vec![0, 1], vec![2, 3]]);
    }

    #[test]
    fn threshold_removes_low_vertices() {
        // Single 4-cycle; cutting vertex 0 out leaves only singletons.
        let graph = ResidualGraph::from_arcs(4, &[(0, 1), (1, 2), (2, 3), (3, 0)]);
        let mut engine = SccEngine::new(&graph);
        assert_eq!(sorted(engine.compute(0)), vec![vec![0, 1, 2, 3]]);
        assert_eq!(sorted(engine.compute(1)), vec![vec![1], vec![2], vec![3]]);
    }

    #[test]
    fn state_is_reset_between_calls() {
        let graph = ResidualGraph::from_arcs(3, &[(0, 1), (1, 2), (2, 0)]);
        let mut engine = SccEngine::new(&graph);
        let first = sorted(engine.compute(0));
        let second = sorted(engine.compute(0));
        assert_eq!(first, second);
        assert_eq!(first, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn deep_path_does_not_overflow() {
        // A long chain closed into one big cycle forces maximal DFS depth.
        let n = 50_000;
        let mut arcs: Vec<(usize, usize)> = (0..n - 1).map(|i| (i, i + 1)).collect();
        arcs.push((n - 1, 0));
        let graph = ResidualGraph::from_arcs(n, &arcs);
        let mut engine = SccEngine::new(&graph);
        let components = engine.compute(0);
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), n);
    }
}
