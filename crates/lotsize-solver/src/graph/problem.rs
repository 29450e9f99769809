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
    err::InfeasibleInstanceError,
    graph::vertex::{IdAllocator, Vertex, VertexId},
    schedule::Schedule,
};
use fxhash::FxHashSet;
use lotsize_model::instance::Instance;
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::VecDeque;

/// The static four-layer flow network encoding of an [`Instance`].
///
/// Layers in id order: demand vertices (one per unit of demand, in
/// `(type, slot)` order), decision vertices (one per `(type, slot)` pair),
/// time slot vertices, and the sink. Edges run demand → decision (for every
/// slot up to the deadline), decision → time slot, and time slot → sink,
/// where the latter two are only present when the source vertex has positive
/// in-degree. Built once, immutable afterwards.
#[derive(Debug, Clone)]
pub struct ProblemGraph {
    instance: Instance,
    vertices: Vec<Vertex>,
    out: Vec<Vec<VertexId>>,
    demand: Vec<VertexId>,
    decision: Vec<VertexId>,
    time_slots: Vec<VertexId>,
    sink: VertexId,
    edge_count: usize,
}

impl ProblemGraph {
    pub fn build(instance: &Instance) -> Self {
        let num_slots = instance.num_time_slots();
        let num_types = instance.num_types();
        let mut alloc = IdAllocator::default();
        let mut vertices = Vec::new();

        let mut demand = Vec::with_capacity(instance.num_produced_items());
        for item in 0..num_types {
            for (slot, &due) in instance.demand(item).iter().enumerate() {
                if due == 1 {
                    let id = alloc.next_id();
                    vertices.push(Vertex::Demand {
                        id,
                        item,
                        deadline: slot,
                    });
                    demand.push(id);
                }
            }
        }
        tracing::debug!("Number of added demand vertices: {}", demand.len());

        let mut decision = Vec::with_capacity(num_types * num_slots);
        for item in 0..num_types {
            for slot in 0..num_slots {
                let id = alloc.next_id();
                vertices.push(Vertex::Decision { id, item, slot });
                decision.push(id);
            }
        }
        tracing::debug!("Number of added decision vertices: {}", decision.len());

        let mut time_slots = Vec::with_capacity(num_slots);
        for slot in 0..num_slots {
            let id = alloc.next_id();
            vertices.push(Vertex::TimeSlot { id, slot });
            time_slots.push(id);
        }
        tracing::debug!("Number of added time slot vertices: {}", time_slots.len());

        let sink = alloc.next_id();
        vertices.push(Vertex::Sink { id: sink });

        fn add_edge(
            out: &mut [Vec<VertexId>],
            in_deg: &mut [usize],
            edge_count: &mut usize,
            from: VertexId,
            to: VertexId,
        ) {
            out[from.index()].push(to);
            in_deg[to.index()] += 1;
            *edge_count += 1;
        }

        let mut out = vec![Vec::new(); vertices.len()];
        let mut in_deg = vec![0usize; vertices.len()];
        let mut edge_count = 0usize;

        // Order matters: decision → time slot edges exist only for decision
        // vertices that already received a demand edge, and likewise for
        // time slot → sink edges.
        for &d in &demand {
            let Vertex::Demand { item, deadline, .. } = vertices[d.index()] else {
                unreachable!()
            };
            for slot in 0..=deadline {
                add_edge(
                    &mut out,
                    &mut in_deg,
                    &mut edge_count,
                    d,
                    decision[item * num_slots + slot],
                );
            }
        }
        for &v in &decision {
            if in_deg[v.index()] > 0 {
                let Vertex::Decision { slot, .. } = vertices[v.index()] else {
                    unreachable!()
                };
                add_edge(&mut out, &mut in_deg, &mut edge_count, v, time_slots[slot]);
            }
        }
        for &v in &time_slots {
            if in_deg[v.index()] > 0 {
                add_edge(&mut out, &mut in_deg, &mut edge_count, v, sink);
            }
        }
        tracing::debug!("Number of edges: {}", edge_count);

        Self {
            instance: instance.clone(),
            vertices,
            out,
            demand,
            decision,
            time_slots,
            sink,
            edge_count,
        }
    }

    #[inline]
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    #[inline]
    pub fn vertex(&self, id: VertexId) -> Vertex {
        self.vertices[id.index()]
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn out_neighbors(&self, id: VertexId) -> &[VertexId] {
        &self.out[id.index()]
    }

    /// Demand vertex ids in ascending id order.
    #[inline]
    pub fn demand_vertices(&self) -> &[VertexId] {
        &self.demand
    }

    #[inline]
    pub fn decision_vertex(&self, item: usize, slot: usize) -> VertexId {
        self.decision[item * self.instance.num_time_slots() + slot]
    }

    #[inline]
    pub fn time_slot_vertex(&self, slot: usize) -> VertexId {
        self.time_slots[slot]
    }

    #[inline]
    pub fn sink(&self) -> VertexId {
        self.sink
    }

    /// Inventory cost of committing a demand unit to an earlier slot; zero for
    /// all other layers.
    fn arc_cost(&self, from: VertexId, to: VertexId) -> i64 {
        match (self.vertices[from.index()], self.vertices[to.index()]) {
            (Vertex::Demand { deadline, .. }, Vertex::Decision { slot, .. }) => {
                self.instance.inventory_cost() * (deadline - slot) as i64
            }
            _ => 0,
        }
    }

    /// Computes a schedule with minimal inventory cost via successive shortest
    /// augmenting paths on the unit-capacity network.
    pub fn min_inventory_schedule(&self) -> Result<Schedule, InfeasibleInstanceError> {
        let n = self.vertices.len();
        let total = self.demand.len();
        let mut used: FxHashSet<(VertexId, VertexId)> = FxHashSet::default();
        let mut satisfied = vec![false; total];

        for round in 0..total {
            // Residual adjacency under the current flow; reverse arcs carry
            // negated cost, so shortest paths need SPFA rather than Dijkstra.
            let mut adj: Vec<Vec<(usize, i64)>> = vec![Vec::new(); n];
            for u in 0..n {
                let uid = VertexId::new(u);
                for &v in &self.out[u] {
                    let cost = self.arc_cost(uid, v);
                    if used.contains(&(uid, v)) {
                        adj[v.index()].push((u, -cost));
                    } else {
                        adj[u].push((v.index(), cost));
                    }
                }
            }

            let mut dist = vec![i64::MAX; n];
            let mut pred: Vec<Option<usize>> = vec![None; n];
            let mut in_queue = vec![false; n];
            let mut queue = VecDeque::new();
            for (i, &d) in self.demand.iter().enumerate() {
                if !satisfied[i] {
                    dist[d.index()] = 0;
                    in_queue[d.index()] = true;
                    queue.push_back(d.index());
                }
            }
            while let Some(u) = queue.pop_front() {
                in_queue[u] = false;
                let du = dist[u];
                for &(v, cost) in &adj[u] {
                    if du + cost < dist[v] {
                        dist[v] = du + cost;
                        pred[v] = Some(u);
                        if !in_queue[v] {
                            in_queue[v] = true;
                            queue.push_back(v);
                        }
                    }
                }
            }

            if dist[self.sink.index()] == i64::MAX {
                return Err(InfeasibleInstanceError::new(round, total));
            }

            // Recover the augmenting path and flip its arcs.
            let mut path = Vec::new();
            let mut v = self.sink.index();
            while let Some(u) = pred[v] {
                path.push((u, v));
                v = u;
            }
            for &(u, w) in &path {
                let (uid, wid) = (VertexId::new(u), VertexId::new(w));
                if used.contains(&(wid, uid)) {
                    used.remove(&(wid, uid));
                } else {
                    used.insert((uid, wid));
                }
            }
            // The path root is the demand vertex this round committed; demand
            // vertices occupy the lowest ids, so the raw index doubles as the
            // demand index.
            debug_assert!(v < total);
            satisfied[v] = true;
        }

        debug_assert_eq!(used.len(), 3 * total);
        Ok(Schedule::new(self, used))
    }

    /// Computes a random feasible schedule via augmenting paths over a
    /// shuffled demand order.
    pub fn random_schedule<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<Schedule, InfeasibleInstanceError> {
        let total = self.demand.len();
        let num_slots = self.instance.num_time_slots();
        let mut slot_match: Vec<Option<usize>> = vec![None; num_slots];

        let mut order: Vec<usize> = (0..total).collect();
        order.shuffle(rng);
        let mut matched = 0usize;
        for demand_idx in order {
            let mut visited = vec![false; num_slots];
            if self.try_assign(demand_idx, &mut slot_match, &mut visited, rng) {
                matched += 1;
            }
        }
        if matched != total {
            return Err(InfeasibleInstanceError::new(matched, total));
        }

        let mut used: FxHashSet<(VertexId, VertexId)> = FxHashSet::default();
        for (slot, assigned) in slot_match.iter().enumerate() {
            if let Some(demand_idx) = assigned {
                let d = self.demand[*demand_idx];
                let Vertex::Demand { item, .. } = self.vertices[d.index()] else {
                    unreachable!()
                };
                let decision = self.decision_vertex(item, slot);
                used.insert((d, decision));
                used.insert((decision, self.time_slots[slot]));
                used.insert((self.time_slots[slot], self.sink));
            }
        }
        debug_assert_eq!(used.len(), 3 * total);
        Ok(Schedule::new(self, used))
    }

    fn try_assign<R: Rng>(
        &self,
        demand_idx: usize,
        slot_match: &mut Vec<Option<usize>>,
        visited: &mut Vec<bool>,
        rng: &mut R,
    ) -> bool {
        let d = self.demand[demand_idx];
        let Vertex::Demand { deadline, .. } = self.vertices[d.index()] else {
            unreachable!()
        };
        let mut slots: Vec<usize> = (0..=deadline).collect();
        slots.shuffle(rng);
        for slot in slots {
            if visited[slot] {
                continue;
            }
            visited[slot] = true;
            let occupant = slot_match[slot];
            let free = match occupant {
                None => true,
                Some(other) => self.try_assign(other, slot_match, visited, rng),
            };
            if free {
                slot_match[slot] = Some(demand_idx);
                return true;
            }
        }
        false
    }
}
