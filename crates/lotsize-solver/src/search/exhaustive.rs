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
    graph::{problem::ProblemGraph, residual::ResidualGraph},
    schedule::Schedule,
    search::{Acceptance, SearchConfig, Solver},
};
use crossbeam_channel::{bounded, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Polling interval while waiting on the cycle channel.
const RECV_RETRY: Duration = Duration::from_millis(10);

/// Outcome of one improvement pass over the incumbent's residual graph.
enum PassOutcome {
    /// A strictly cheaper schedule was found and adopted.
    Improved(Schedule),
    /// Every residual cycle was seen and none improved: the incumbent is a
    /// global optimum of the cycle-canceling move space.
    Exhausted,
    /// The wall clock ran out mid-pass.
    TimedOut,
}

/// Full-enumeration search: every pass rebuilds the residual graph around
/// the current incumbent and enumerates all of its simple cycles.
///
/// With [`Acceptance::FirstImprovement`] cycles are consumed from a bounded
/// channel while a producer thread enumerates; the pass is cancelled as soon
/// as one improving cycle arrives. With [`Acceptance::BestImprovement`] the
/// whole cycle set is collected first and the cheapest improvement adopted.
///
/// If a pass drains the sentinel without finding an improvement, no cycle of
/// the incumbent's residual graph has negative cost and the incumbent is
/// optimal; [`search_space_exhausted`](Self::search_space_exhausted) then
/// reports `true`.
#[derive(Debug)]
pub struct ExhaustiveSearch<'p> {
    graph: &'p ProblemGraph,
    config: SearchConfig,
    search_space_exhausted: bool,
}

impl<'p> ExhaustiveSearch<'p> {
    pub fn new(graph: &'p ProblemGraph, config: SearchConfig) -> Self {
        Self {
            graph,
            config,
            search_space_exhausted: false,
        }
    }

    /// True once a full pass found no improving cycle, i.e. the returned
    /// schedule is proven optimal.
    #[inline]
    pub fn search_space_exhausted(&self) -> bool {
        self.search_space_exhausted
    }

    fn streaming_pass(
        &self,
        residual: &ResidualGraph,
        incumbent: &Schedule,
        deadline: Instant,
    ) -> PassOutcome {
        let (tx, rx) = bounded(self.config.queue_capacity);
        let cancel = CancelToken::new();

        std::thread::scope(|scope| {
            let producer_cancel = cancel.clone();
            scope.spawn(move || {
                let mut finder = CycleFinder::new(residual, self.graph.vertices());
                if let Err(reason) = finder.stream_cycles(tx, &producer_cancel) {
                    tracing::trace!(%reason, "cycle producer stopped");
                }
            });

            let outcome = loop {
                if Instant::now() >= deadline {
                    break PassOutcome::TimedOut;
                }
                match rx.recv_timeout(RECV_RETRY) {
                    Ok(cycle) if cycle.is_empty() => break PassOutcome::Exhausted,
                    Ok(cycle) => {
                        let candidate = incumbent.apply(&cycle, self.graph);
                        if candidate.cost() < incumbent.cost() {
                            break PassOutcome::Improved(candidate);
                        }
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    // Producer gone without the sentinel; don't claim
                    // exhaustion.
                    Err(RecvTimeoutError::Disconnected) => break PassOutcome::TimedOut,
                }
            };

            // Unblock a producer stuck on a full channel.
            cancel.cancel();
            drop(rx);
            outcome
        })
    }

    fn batch_pass(
        &self,
        residual: &ResidualGraph,
        incumbent: &Schedule,
        deadline: Instant,
    ) -> PassOutcome {
        let mut finder = CycleFinder::new(residual, self.graph.vertices());
        let cycles = finder.compute_cycles();

        let mut best: Option<Schedule> = None;
        for cycle in &cycles {
            if Instant::now() >= deadline {
                return match best {
                    Some(schedule) => PassOutcome::Improved(schedule),
                    None => PassOutcome::TimedOut,
                };
            }
            let candidate = incumbent.apply(cycle, self.graph);
            if candidate.cost() < incumbent.cost()
                && best.as_ref().map_or(true, |b| candidate.cost() < b.cost())
            {
                best = Some(candidate);
            }
        }
        match best {
            Some(schedule) => PassOutcome::Improved(schedule),
            None => PassOutcome::Exhausted,
        }
    }
}

impl Solver for ExhaustiveSearch<'_> {
    fn search(&mut self, initial: Schedule, time_limit: Duration) -> Schedule {
        let deadline = Instant::now() + time_limit;
        self.search_space_exhausted = false;
        let mut incumbent = initial;
        let mut passes = 0u64;

        loop {
            if Instant::now() >= deadline {
                break;
            }
            let residual = ResidualGraph::new(self.graph, &incumbent);
            let outcome = match self.config.acceptance {
                Acceptance::FirstImprovement => {
                    self.streaming_pass(&residual, &incumbent, deadline)
                }
                Acceptance::BestImprovement => self.batch_pass(&residual, &incumbent, deadline),
            };
            passes += 1;
            match outcome {
                PassOutcome::Improved(schedule) => {
                    tracing::debug!(pass = passes, cost = schedule.cost(), "improved");
                    incumbent = schedule;
                }
                PassOutcome::Exhausted => {
                    tracing::info!(pass = passes, cost = incumbent.cost(), "optimum proven");
                    self.search_space_exhausted = true;
                    break;
                }
                PassOutcome::TimedOut => {
                    tracing::info!(pass = passes, cost = incumbent.cost(), "time limit reached");
                    break;
                }
            }
        }
        incumbent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::vertex::Vertex;
    use fxhash::FxHashSet;
    use lotsize_model::instance::Instance;

    // Unit inventory cost, strongly asymmetric changeovers. The optimum is
    // [-1, 1, 0] with cost 1; any plan producing in slot 0 pays inventory.
    fn improvable_instance() -> Instance {
        Instance::new(
            3,
            2,
            1,
            vec![vec![0, 0, 1], vec![0, 1, 0]],
            vec![vec![0, 10], vec![1, 0]],
        )
        .unwrap()
    }

    fn schedule_from_slots(graph: &ProblemGraph, slots: &[(usize, usize)]) -> Schedule {
        let mut used = FxHashSet::default();
        for &(slot, demand_idx) in slots {
            let d = graph.demand_vertices()[demand_idx];
            let Vertex::Demand { item, .. } = graph.vertex(d) else {
                unreachable!()
            };
            let decision = graph.decision_vertex(item, slot);
            used.insert((d, decision));
            used.insert((decision, graph.time_slot_vertex(slot)));
            used.insert((graph.time_slot_vertex(slot), graph.sink()));
        }
        Schedule::new(graph, used)
    }

    fn poor_initial(graph: &ProblemGraph) -> Schedule {
        // [1, 0, -1]: both units one slot early, cost 2 + 1 = 3.
        let initial = schedule_from_slots(graph, &[(0, 1), (1, 0)]);
        assert_eq!(initial.to_string(), "[1, 0, -1]");
        assert_eq!(initial.cost(), 3);
        initial
    }

    #[test]
    fn first_improvement_reaches_the_optimum() {
        let instance = improvable_instance();
        let graph = ProblemGraph::build(&instance);
        let mut solver = ExhaustiveSearch::new(&graph, SearchConfig::default());
        let best = solver.search(poor_initial(&graph), Duration::from_secs(30));
        assert_eq!(best.to_string(), "[-1, 1, 0]");
        assert_eq!(best.cost(), 1);
        assert!(solver.search_space_exhausted());
    }

    #[test]
    fn best_improvement_reaches_the_optimum() {
        let instance = improvable_instance();
        let graph = ProblemGraph::build(&instance);
        let config = SearchConfig {
            acceptance: Acceptance::BestImprovement,
            ..SearchConfig::default()
        };
        let mut solver = ExhaustiveSearch::new(&graph, config);
        let best = solver.search(poor_initial(&graph), Duration::from_secs(30));
        assert_eq!(best.cost(), 1);
        assert!(solver.search_space_exhausted());
    }

    #[test]
    fn optimal_input_is_returned_unchanged_and_proven() {
        let instance = improvable_instance();
        let graph = ProblemGraph::build(&instance);
        let optimal = schedule_from_slots(&graph, &[(1, 1), (2, 0)]);
        assert_eq!(optimal.cost(), 1);
        let mut solver = ExhaustiveSearch::new(&graph, SearchConfig::default());
        let best = solver.search(optimal.clone(), Duration::from_secs(30));
        assert_eq!(best, optimal);
        assert!(solver.search_space_exhausted());
    }

    #[test]
    fn zero_budget_returns_the_initial_schedule() {
        let instance = improvable_instance();
        let graph = ProblemGraph::build(&instance);
        let initial = poor_initial(&graph);
        let mut solver = ExhaustiveSearch::new(&graph, SearchConfig::default());
        let best = solver.search(initial.clone(), Duration::ZERO);
        assert_eq!(best, initial);
        assert!(!solver.search_space_exhausted());
    }
}
