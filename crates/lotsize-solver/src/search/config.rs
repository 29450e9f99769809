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

/// How an improving move is picked from the candidates of one iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Acceptance {
    /// Adopt the first strictly improving move and restart the iteration.
    /// Cheap per step; pairs with the streaming cycle producer.
    #[default]
    FirstImprovement,
    /// Evaluate every candidate of the iteration and adopt the cheapest.
    BestImprovement,
}

/// When the residual graph is rebuilt during a local search run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RebuildPolicy {
    /// Rebuild at the start of every iteration, whether or not the previous
    /// one improved. Simple and always consistent with the incumbent.
    #[default]
    EveryIteration,
    /// Rebuild only after an accepted move. Skips redundant rebuilds on
    /// reshuffle-only iterations, where the incumbent is unchanged.
    OnAcceptance,
}

/// Shared tuning knobs of the search strategies.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub acceptance: Acceptance,
    pub rebuild: RebuildPolicy,
    /// Worker threads for parallel neighborhood evaluation.
    pub num_workers: usize,
    /// Capacity of the streaming cycle channel.
    pub queue_capacity: usize,
    /// Seed of the neighborhood shuffle; fixed so runs are reproducible.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            acceptance: Acceptance::default(),
            rebuild: RebuildPolicy::default(),
            num_workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            queue_capacity: 10,
            seed: 1,
        }
    }
}
