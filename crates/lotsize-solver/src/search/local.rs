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
    cycles::CycleFinder,
    graph::{problem::ProblemGraph, residual::ResidualGraph, vertex::VertexId},
    schedule::Schedule,
    search::{Acceptance, RebuildPolicy, SearchConfig, Solver},
};
use crossbeam_channel::unbounded;
use fixedbitset::FixedBitSet;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::{Duration, Instant};

/// Bounded-neighborhood search for instances too large to enumerate fully.
///
/// Each iteration partitions the demand vertices into chunks of
/// `neighborhood_size`. Per chunk, the incumbent's residual graph is
/// restricted to the arcs touching only that chunk's demands, the (now
/// small) cycle space is enumerated and the best improving move of the
/// chunk reported. Chunks are evaluated in parallel by a worker pool.
/// When no chunk improves, the demand order is reshuffled so the next
/// partition cuts different neighborhoods. Runs until the wall clock
/// expires; unlike the exhaustive search it never proves optimality.
#[derive(Debug)]
pub struct LocalSearch<'p> {
    graph: &'p ProblemGraph,
    neighborhood_size: usize,
    config: SearchConfig,
}

impl<'p> LocalSearch<'p> {
    pub fn new(graph: &'p ProblemGraph, neighborhood_size: usize, config: SearchConfig) -> Self {
        Self {
            graph,
            neighborhood_size: neighborhood_size.max(1),
            config,
        }
    }

    /// Best improving schedule reachable through cycles confined to the
    /// chunk's demands, if any.
    fn evaluate_chunk(
        &self,
        residual: &ResidualGraph,
        incumbent: &Schedule,
        chunk: &[VertexId],
    ) -> Option<Schedule> {
        let mut allowed = FixedBitSet::with_capacity(self.graph.vertex_count());
        for &d in chunk {
            allowed.insert(d.index());
        }
        let restricted = residual.restrict_demand_edges(self.graph, &allowed);
        let mut finder = CycleFinder::new(&restricted, self.graph.vertices());

        let mut best: Option<Schedule> = None;
        for cycle in &finder.compute_cycles() {
            let candidate = incumbent.apply(cycle, self.graph);
            if candidate.cost() < incumbent.cost()
                && best.as_ref().map_or(true, |b| candidate.cost() < b.cost())
            {
                best = Some(candidate);
            }
        }
        best
    }

    /// Evaluates all chunks on the worker pool; results are indexed by chunk.
    ///
    /// With `stop_on_first`, the pool is cancelled as soon as one improving
    /// chunk arrives and the remaining chunks report no candidate.
    fn evaluate(
        &self,
        residual: &ResidualGraph,
        incumbent: &Schedule,
        chunks: &[&[VertexId]],
        stop_on_first: bool,
    ) -> Vec<Option<Schedule>> {
        let workers = self.config.num_workers.clamp(1, chunks.len().max(1));
        if workers == 1 {
            let mut results = Vec::with_capacity(chunks.len());
            for chunk in chunks {
                let candidate = self.evaluate_chunk(residual, incumbent, chunk);
                let improved = candidate.is_some();
                results.push(candidate);
                if improved && stop_on_first {
                    results.resize(chunks.len(), None);
                    break;
                }
            }
            results.resize(chunks.len(), None);
            return results;
        }

        let (task_tx, task_rx) = unbounded::<(usize, &[VertexId])>();
        let (result_tx, result_rx) = unbounded::<(usize, Option<Schedule>)>();
        for (i, &chunk) in chunks.iter().enumerate() {
            // Receivers outlive this loop; send cannot fail.
            let _ = task_tx.send((i, chunk));
        }
        drop(task_tx);

        let cancel = CancelToken::new();
        let mut results: Vec<Option<Schedule>> = vec![None; chunks.len()];
        std::thread::scope(|scope| {
            for _ in 0..workers {
                let task_rx = task_rx.clone();
                let result_tx = result_tx.clone();
                let cancel = cancel.clone();
                scope.spawn(move || {
                    for (i, chunk) in task_rx.iter() {
                        let candidate = if cancel.is_cancelled() {
                            None
                        } else {
                            self.evaluate_chunk(residual, incumbent, chunk)
                        };
                        let _ = result_tx.send((i, candidate));
                    }
                });
            }
            drop(result_tx);
            for (i, candidate) in result_rx.iter() {
                if candidate.is_some() && stop_on_first {
                    cancel.cancel();
                }
                results[i] = candidate;
            }
        });
        results
    }
}

impl Solver for LocalSearch<'_> {
    fn search(&mut self, initial: Schedule, time_limit: Duration) -> Schedule {
        let deadline = Instant::now() + time_limit;
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        let mut demands: Vec<VertexId> = self.graph.demand_vertices().to_vec();
        if demands.is_empty() {
            return initial;
        }

        let mut incumbent = initial;
        let mut residual = ResidualGraph::new(self.graph, &incumbent);
        let mut iterations = 0u64;

        while Instant::now() < deadline {
            iterations += 1;
            if self.config.rebuild == RebuildPolicy::EveryIteration {
                residual = ResidualGraph::new(self.graph, &incumbent);
            }

            let chunks: Vec<&[VertexId]> = demands.chunks(self.neighborhood_size).collect();
            let stop_on_first = self.config.acceptance == Acceptance::FirstImprovement;
            let candidates = self.evaluate(&residual, &incumbent, &chunks, stop_on_first);

            let accepted = match self.config.acceptance {
                Acceptance::FirstImprovement => candidates.into_iter().flatten().next(),
                Acceptance::BestImprovement => {
                    candidates.into_iter().flatten().min_by_key(|s| s.cost())
                }
            };

            match accepted {
                Some(schedule) => {
                    tracing::debug!(iteration = iterations, cost = schedule.cost(), "improved");
                    incumbent = schedule;
                    if self.config.rebuild == RebuildPolicy::OnAcceptance {
                        residual = ResidualGraph::new(self.graph, &incumbent);
                    }
                }
                None => {
                    // Stuck on this partition; cut new neighborhoods.
                    demands.shuffle(&mut rng);
                }
            }
        }
        tracing::info!(iterations, cost = incumbent.cost(), "local search finished");
        incumbent
    }
}
