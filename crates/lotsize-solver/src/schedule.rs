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
    cycle::Cycle,
    graph::problem::ProblemGraph,
    graph::vertex::{Vertex, VertexId},
};
use fxhash::FxHashSet;
use lotsize_model::instance::Instance;
use std::collections::BTreeMap;

/// One feasible assignment of item types to time slots.
///
/// Derived from the set of problem graph edges carrying flow; immutable.
/// Applying a residual cycle produces a new value, never mutates this one.
#[derive(Debug, Clone)]
pub struct Schedule {
    used: FxHashSet<(VertexId, VertexId)>,
    /// Slot → occupying demand vertex; absent slots are idle.
    production: BTreeMap<usize, Vertex>,
    num_time_slots: usize,
    changeover_cost: i64,
    inventory_cost: i64,
}

impl Schedule {
    pub fn new(graph: &ProblemGraph, used: FxHashSet<(VertexId, VertexId)>) -> Self {
        let mut production = BTreeMap::new();
        for &(u, v) in &used {
            if let (demand @ Vertex::Demand { .. }, Vertex::Decision { slot, .. }) =
                (graph.vertex(u), graph.vertex(v))
            {
                production.insert(slot, demand);
            }
        }
        let instance = graph.instance();
        let (changeover_cost, inventory_cost) = compute_cost(&production, instance);
        Self {
            used,
            production,
            num_time_slots: instance.num_time_slots(),
            changeover_cost,
            inventory_cost,
        }
    }

    #[inline]
    pub fn changeover_cost(&self) -> i64 {
        self.changeover_cost
    }

    #[inline]
    pub fn inventory_cost(&self) -> i64 {
        self.inventory_cost
    }

    #[inline]
    pub fn cost(&self) -> i64 {
        self.changeover_cost + self.inventory_cost
    }

    #[inline]
    pub fn uses_edge(&self, from: VertexId, to: VertexId) -> bool {
        self.used.contains(&(from, to))
    }

    #[inline]
    pub fn used_edge_count(&self) -> usize {
        self.used.len()
    }

    /// Slot → demand vertex map of the non-idle slots, in slot order.
    #[inline]
    pub fn production(&self) -> &BTreeMap<usize, Vertex> {
        &self.production
    }

    /// Applies a residual cycle: decommitted edges leave the used set,
    /// committed edges enter it, and the per-slot assignment is patched from
    /// the cycle's activation and deactivation lists. Flow value is
    /// preserved, so the used edge count never changes.
    pub fn apply(&self, cycle: &Cycle, graph: &ProblemGraph) -> Schedule {
        let mut used = self.used.clone();
        for &(u, v) in cycle.decommit_edges() {
            let removed = used.remove(&(u, v));
            debug_assert!(removed, "decommitted edge was not in use");
        }
        for &(u, v) in cycle.commit_edges() {
            used.insert((u, v));
        }
        debug_assert_eq!(used.len(), self.used.len());

        let mut production = self.production.clone();
        for &(_, decision) in cycle.deactivated() {
            let Vertex::Decision { slot, .. } = graph.vertex(decision) else {
                unreachable!()
            };
            production.remove(&slot);
        }
        for &(demand, decision) in cycle.activated() {
            let Vertex::Decision { slot, .. } = graph.vertex(decision) else {
                unreachable!()
            };
            production.insert(slot, graph.vertex(demand));
        }
        let (changeover_cost, inventory_cost) = compute_cost(&production, graph.instance());
        Schedule {
            used,
            production,
            num_time_slots: self.num_time_slots,
            changeover_cost,
            inventory_cost,
        }
    }
}

fn compute_cost(production: &BTreeMap<usize, Vertex>, instance: &Instance) -> (i64, i64) {
    let mut changeover = 0i64;
    let mut inventory = 0i64;
    let mut prev_item: Option<usize> = None;
    for (&slot, vertex) in production {
        let Vertex::Demand { item, deadline, .. } = *vertex else {
            unreachable!()
        };
        debug_assert!(slot <= deadline);
        inventory += (deadline - slot) as i64 * instance.inventory_cost();
        if let Some(prev) = prev_item {
            changeover += instance.changeover_cost(prev, item);
        }
        prev_item = Some(item);
    }
    (changeover, inventory)
}

impl PartialEq for Schedule {
    fn eq(&self, other: &Self) -> bool {
        self.num_time_slots == other.num_time_slots && self.production == other.production
    }
}
impl Eq for Schedule {}

impl std::fmt::Display for Schedule {
    /// Renders the per-slot item types, `-1` for idle slots, e.g. `[1, 0, 2]`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut slots = vec![-1i64; self.num_time_slots];
        for (&slot, vertex) in &self.production {
            let Vertex::Demand { item, .. } = *vertex else {
                unreachable!()
            };
            slots[slot] = item as i64;
        }
        write!(f, "{:?}", slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 3 slots, 3 types, one unit each; unique feasible assignment [1, 0, 2].
    fn unique_solution_instance() -> Instance {
        Instance::new(
            3,
            3,
            2,
            vec![vec![0, 1, 0], vec![1, 0, 0], vec![0, 0, 1]],
            vec![vec![0, 6, 2], vec![3, 0, 6], vec![6, 6, 0]],
        )
        .unwrap()
    }

    // 4 slots, 2 types, zero inventory cost; two feasible assignments.
    fn two_solution_instance() -> Instance {
        Instance::new(
            4,
            2,
            0,
            vec![vec![0, 1, 0, 0], vec![1, 0, 0, 1]],
            vec![vec![0, 4], vec![3, 0]],
        )
        .unwrap()
    }

    fn schedule_from_slots(graph: &ProblemGraph, slots: &[(usize, usize)]) -> Schedule {
        // slots: (slot, demand vertex index)
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

    #[test]
    fn cost_breakdown_of_unique_schedule() {
        let instance = unique_solution_instance();
        let graph = ProblemGraph::build(&instance);
        // demand vertices: 0 = type 0 due slot 1, 1 = type 1 due slot 0,
        // 2 = type 2 due slot 2
        let schedule = schedule_from_slots(&graph, &[(0, 1), (1, 0), (2, 2)]);
        assert_eq!(schedule.to_string(), "[1, 0, 2]");
        assert_eq!(schedule.inventory_cost(), 0);
        assert_eq!(schedule.changeover_cost(), 3 + 2);
        assert_eq!(schedule.cost(), 5);
        assert_eq!(schedule.used_edge_count(), 9);
    }

    #[test]
    fn inventory_cost_counts_early_production() {
        let instance = unique_solution_instance();
        let graph = ProblemGraph::build(&instance);
        // Produce type 2 (due slot 2) in slot 2 but type 0 (due slot 1) in
        // slot 0, leaving slot 1 idle: one slot of inventory at unit cost 2.
        let schedule = schedule_from_slots(&graph, &[(0, 0), (2, 2)]);
        assert_eq!(schedule.to_string(), "[0, -1, 2]");
        assert_eq!(schedule.inventory_cost(), 2);
        assert_eq!(schedule.changeover_cost(), 2);
    }

    #[test]
    fn applying_a_cycle_preserves_edge_count_and_patches_slots() {
        let instance = two_solution_instance();
        let graph = ProblemGraph::build(&instance);
        // demand vertices: 0 = type 0 due slot 1, 1 = type 1 due slot 0,
        // 2 = type 1 due slot 3
        let initial = schedule_from_slots(&graph, &[(0, 1), (1, 0), (2, 2)]);
        assert_eq!(initial.to_string(), "[1, 0, 1, -1]");
        assert_eq!(initial.inventory_cost(), 0);
        assert_eq!(initial.changeover_cost(), 4 + 3);

        // Move the second type-1 unit from slot 2 to slot 3.
        let d = graph.demand_vertices()[2];
        let dec2 = graph.decision_vertex(1, 2);
        let dec3 = graph.decision_vertex(1, 3);
        let ts2 = graph.time_slot_vertex(2);
        let ts3 = graph.time_slot_vertex(3);
        let path = [d, dec3, ts3, graph.sink(), ts2, dec2];
        let cycle = Cycle::from_path(&path, graph.vertices());

        let next = initial.apply(&cycle, &graph);
        assert_eq!(next.to_string(), "[1, 0, -1, 1]");
        assert_eq!(next.inventory_cost(), 0);
        assert_eq!(next.changeover_cost(), 4 + 3);
        assert_eq!(next.used_edge_count(), initial.used_edge_count());
        // The move is cost neutral, which is exactly why the search only
        // accepts strictly negative deltas.
        assert_eq!(next.cost(), initial.cost());
        // The receiver is untouched.
        assert_eq!(initial.to_string(), "[1, 0, 1, -1]");
    }

    #[test]
    fn equality_ignores_edge_representation() {
        let instance = unique_solution_instance();
        let graph = ProblemGraph::build(&instance);
        let a = schedule_from_slots(&graph, &[(0, 1), (1, 0), (2, 2)]);
        let b = schedule_from_slots(&graph, &[(0, 1), (1, 0), (2, 2)]);
        assert_eq!(a, b);
        let c = schedule_from_slots(&graph, &[(0, 0), (2, 2)]);
        assert_ne!(a, c);
    }
}
