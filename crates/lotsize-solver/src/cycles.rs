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
    cancel::CancelToken,
    cycle::Cycle,
    err::EnumerationAbort,
    graph::{
        residual::ResidualGraph,
        vertex::{Vertex, VertexId},
    },
    scc::SccEngine,
};
use crossbeam_channel::{SendTimeoutError, Sender};
use fixedbitset::FixedBitSet;
use std::time::Duration;

/// Polling interval of a blocked channel send; bounds cancellation latency.
const SEND_RETRY: Duration = Duration::from_millis(10);

/// Where enumerated cycles go. One DFS core serves both the batch and the
/// streaming mode through this seam.
pub trait CycleSink {
    /// Takes ownership of a finished cycle. May block (streaming mode).
    fn emit(&mut self, cycle: Cycle) -> Result<(), EnumerationAbort>;

    /// Cheap abort probe, called once per DFS step.
    #[inline]
    fn check(&mut self) -> Result<(), EnumerationAbort> {
        Ok(())
    }
}

/// Batch mode: collect everything.
impl CycleSink for Vec<Cycle> {
    #[inline]
    fn emit(&mut self, cycle: Cycle) -> Result<(), EnumerationAbort> {
        self.push(cycle);
        Ok(())
    }
}

/// Streaming mode: a bounded crossbeam channel with cooperative
/// cancellation. A full channel blocks the producer (backpressure) in short
/// timed sends so cancellation is noticed within [`SEND_RETRY`].
struct ChannelSink<'a> {
    sender: Sender<Cycle>,
    cancel: &'a CancelToken,
}

impl CycleSink for ChannelSink<'_> {
    fn emit(&mut self, cycle: Cycle) -> Result<(), EnumerationAbort> {
        let mut pending = cycle;
        loop {
            if self.cancel.is_cancelled() {
                return Err(EnumerationAbort::Cancelled);
            }
            match self.sender.send_timeout(pending, SEND_RETRY) {
                Ok(()) => return Ok(()),
                Err(SendTimeoutError::Timeout(cycle)) => pending = cycle,
                Err(SendTimeoutError::Disconnected(_)) => {
                    return Err(EnumerationAbort::ChannelClosed)
                }
            }
        }
    }

    #[inline]
    fn check(&mut self) -> Result<(), EnumerationAbort> {
        if self.cancel.is_cancelled() {
            return Err(EnumerationAbort::Cancelled);
        }
        Ok(())
    }
}

/// Enumerates every simple cycle of a residual graph, Johnson style.
///
/// The graph is peeled by repeated SCC computation: each round roots a
/// blocked-set DFS at the least vertex of the least nontrivial component,
/// then raises the id threshold past that vertex and recomputes. Blocked
/// state persists across rounds of one [`enumerate`](Self::enumerate) call;
/// the root's in-component successors are explicitly unblocked before each
/// DFS.
#[derive(Debug)]
pub struct CycleFinder<'g> {
    graph: &'g ResidualGraph,
    vertices: &'g [Vertex],
    blocked: FixedBitSet,
    blocked_map: Vec<Vec<usize>>,
    in_scc: FixedBitSet,
    path: Vec<VertexId>,
}

impl<'g> CycleFinder<'g> {
    /// `vertices` is the id-indexed vertex table the graph was built over.
    pub fn new(graph: &'g ResidualGraph, vertices: &'g [Vertex]) -> Self {
        let n = graph.vertex_count();
        debug_assert_eq!(n, vertices.len());
        Self {
            graph,
            vertices,
            blocked: FixedBitSet::with_capacity(n),
            blocked_map: vec![Vec::new(); n],
            in_scc: FixedBitSet::with_capacity(n),
            path: Vec::new(),
        }
    }

    /// Collects all simple cycles into a vector. Intended for the
    /// best-improvement passes, which need the whole set anyway.
    pub fn compute_cycles(&mut self) -> Vec<Cycle> {
        let mut cycles = Vec::new();
        // A Vec sink never aborts.
        let _ = self.enumerate(&mut cycles);
        cycles
    }

    /// Streams cycles into a bounded channel as they are found, finishing
    /// with an empty sentinel cycle once the search space is exhausted.
    ///
    /// Returns early with the abort reason when the consumer cancels or
    /// drops its receiver; the sentinel is only sent on true exhaustion.
    pub fn stream_cycles(
        &mut self,
        sender: Sender<Cycle>,
        cancel: &CancelToken,
    ) -> Result<(), EnumerationAbort> {
        let mut sink = ChannelSink { sender, cancel };
        self.enumerate(&mut sink)?;
        sink.emit(Cycle::empty())
    }

    /// Runs the full enumeration against an arbitrary sink.
    pub fn enumerate<S: CycleSink>(&mut self, sink: &mut S) -> Result<(), EnumerationAbort> {
        self.blocked.clear();
        for list in &mut self.blocked_map {
            list.clear();
        }
        self.path.clear();

        let graph = self.graph;
        let mut engine = SccEngine::new(graph);
        let mut threshold = 0;
        while threshold < graph.vertex_count() {
            let components = engine.compute(threshold);
            let Some(start) = components
                .iter()
                .filter(|c| c.len() > 1)
                .filter_map(|c| c.iter().copied().min())
                .min()
            else {
                break;
            };
            let component = components
                .iter()
                .find(|c| c.contains(&start))
                .unwrap_or_else(|| unreachable!());

            self.in_scc.clear();
            for &v in component {
                self.in_scc.insert(v.index());
            }

            // The root's successors may still be blocked from the previous
            // round; release them so the DFS can enter the component.
            for &w in graph.out_neighbors(start) {
                if self.in_scc.contains(w.index()) {
                    self.blocked.set(w.index(), false);
                    self.blocked_map[w.index()].clear();
                }
            }

            self.find_cycles(start, start, sink)?;
            threshold = start.index() + 1;
        }
        Ok(())
    }

    fn find_cycles<S: CycleSink>(
        &mut self,
        v: VertexId,
        start: VertexId,
        sink: &mut S,
    ) -> Result<bool, EnumerationAbort> {
        sink.check()?;

        let mut found = false;
        self.path.push(v);
        self.blocked.insert(v.index());

        let graph = self.graph;
        for &w in graph.out_neighbors(v) {
            if !self.in_scc.contains(w.index()) {
                continue;
            }
            if w == start {
                sink.emit(Cycle::from_path(&self.path, self.vertices))?;
                found = true;
            } else if !self.blocked.contains(w.index()) && self.find_cycles(w, start, sink)? {
                found = true;
            }
        }

        if found {
            self.unblock(v);
        } else {
            for &w in graph.out_neighbors(v) {
                if self.in_scc.contains(w.index()) {
                    self.blocked_map[w.index()].push(v.index());
                }
            }
        }

        self.path.pop();
        Ok(found)
    }

    fn unblock(&mut self, v: VertexId) {
        let mut pending = vec![v.index()];
        while let Some(u) = pending.pop() {
            self.blocked.set(u, false);
            for w in std::mem::take(&mut self.blocked_map[u]) {
                if self.blocked.contains(w) {
                    pending.push(w);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::bounded;
    use std::collections::BTreeMap;

    // The classifier only needs vertex kinds; a slot-only table keeps every
    // arc in the "reverse" bucket, which is irrelevant here.
    fn slot_vertices(n: usize) -> Vec<Vertex> {
        (0..n)
            .map(|i| Vertex::TimeSlot {
                id: VertexId::new(i),
                slot: i,
            })
            .collect()
    }

    fn complete_digraph(n: usize) -> ResidualGraph {
        let mut arcs = Vec::new();
        for u in 0..n {
            for v in 0..n {
                if u != v {
                    arcs.push((u, v));
                }
            }
        }
        ResidualGraph::from_arcs(n, &arcs)
    }

    // Rotation-normalized vertex sequence, usable as a multiset key.
    fn normalize(cycle: &Cycle) -> Vec<usize> {
        let seq: Vec<usize> = cycle.edges().iter().map(|&(u, _)| u.index()).collect();
        let min_pos = seq
            .iter()
            .enumerate()
            .min_by_key(|&(_, v)| v)
            .map(|(i, _)| i)
            .unwrap();
        let mut rotated = seq[min_pos..].to_vec();
        rotated.extend_from_slice(&seq[..min_pos]);
        rotated
    }

    fn multiset(cycles: &[Cycle]) -> BTreeMap<Vec<usize>, usize> {
        let mut out = BTreeMap::new();
        for c in cycles {
            *out.entry(normalize(c)).or_insert(0) += 1;
        }
        out
    }

    #[test]
    fn finds_all_cycles_of_a_small_digraph() {
        // Cycles: (0 1), (0 1 2), (0 2), (0 2 1), (1 2).
        let graph = complete_digraph(3);
        let vertices = slot_vertices(3);
        let mut finder = CycleFinder::new(&graph, &vertices);
        let cycles = finder.compute_cycles();
        let keys: Vec<Vec<usize>> = multiset(&cycles).into_keys().collect();
        assert_eq!(cycles.len(), 5);
        assert_eq!(
            keys,
            vec![
                vec![0, 1],
                vec![0, 1, 2],
                vec![0, 2],
                vec![0, 2, 1],
                vec![1, 2]
            ]
        );
    }

    #[test]
    fn complete_digraph_cycle_count() {
        // K4 has C(4,2)·1! + C(4,3)·2! + C(4,4)·3! = 6 + 8 + 6 = 20 cycles.
        let graph = complete_digraph(4);
        let vertices = slot_vertices(4);
        let mut finder = CycleFinder::new(&graph, &vertices);
        let cycles = finder.compute_cycles();
        assert_eq!(cycles.len(), 20);
        // All distinct.
        assert_eq!(multiset(&cycles).len(), 20);
    }

    #[test]
    fn acyclic_graph_yields_nothing() {
        let graph = ResidualGraph::from_arcs(4, &[(0, 1), (1, 2), (2, 3), (0, 3)]);
        let vertices = slot_vertices(4);
        let mut finder = CycleFinder::new(&graph, &vertices);
        assert!(finder.compute_cycles().is_empty());
    }

    #[test]
    fn streaming_matches_batch_and_ends_with_sentinel() {
        let graph = complete_digraph(4);
        let vertices = slot_vertices(4);

        let batch = CycleFinder::new(&graph, &vertices).compute_cycles();

        // A tiny channel forces the producer through the backpressure path.
        let (tx, rx) = bounded(2);
        let cancel = CancelToken::new();
        let mut streamed = Vec::new();
        std::thread::scope(|scope| {
            let producer = scope.spawn(|| {
                let mut finder = CycleFinder::new(&graph, &vertices);
                finder.stream_cycles(tx, &cancel)
            });
            for cycle in rx {
                if cycle.is_empty() {
                    break;
                }
                streamed.push(cycle);
            }
            assert!(producer.join().unwrap().is_ok());
        });

        assert_eq!(multiset(&streamed), multiset(&batch));
    }

    #[test]
    fn cancellation_stops_the_producer() {
        let graph = complete_digraph(6);
        let vertices = slot_vertices(6);
        let (tx, rx) = bounded(1);
        let cancel = CancelToken::new();

        std::thread::scope(|scope| {
            let producer = scope.spawn(|| {
                let mut finder = CycleFinder::new(&graph, &vertices);
                finder.stream_cycles(tx, &cancel)
            });
            // Take one cycle, then stop consuming.
            let first = rx.recv().unwrap();
            assert!(!first.is_empty());
            cancel.cancel();
            assert_eq!(producer.join().unwrap(), Err(EnumerationAbort::Cancelled));
        });
    }

    #[test]
    fn dropped_receiver_aborts_the_producer() {
        let graph = complete_digraph(5);
        let vertices = slot_vertices(5);
        let (tx, rx) = bounded(1);
        let cancel = CancelToken::new();
        drop(rx);

        let mut finder = CycleFinder::new(&graph, &vertices);
        assert_eq!(
            finder.stream_cycles(tx, &cancel),
            Err(EnumerationAbort::ChannelClosed)
        );
    }
}
