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

use crate::err::InstanceError;

/// A single-machine lot sizing instance.
///
/// For `num_types` item types and `num_time_slots` time slots, `demand[i][j] == 1`
/// means that one unit of type `i` has to be produced no later than slot `j`.
/// Holding a produced unit in stock for one slot costs `inventory_cost`; switching
/// production from type `i` to type `j` between two consecutive non-idle slots
/// costs `changeover_cost[i][j]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instance {
    num_time_slots: usize,
    num_types: usize,
    inventory_cost: i64,
    demand: Vec<Vec<u8>>,
    changeover_cost: Vec<Vec<i64>>,
    demand_per_type: Vec<usize>,
}

impl Instance {
    pub fn new(
        num_time_slots: usize,
        num_types: usize,
        inventory_cost: i64,
        demand: Vec<Vec<u8>>,
        changeover_cost: Vec<Vec<i64>>,
    ) -> Result<Self, InstanceError> {
        if num_time_slots == 0 || num_types == 0 {
            return Err(InstanceError::NonPositiveCounts);
        }
        if demand.len() != num_types {
            return Err(InstanceError::DemandRowCount {
                expected: num_types,
                got: demand.len(),
            });
        }
        for (item, row) in demand.iter().enumerate() {
            if row.len() != num_time_slots {
                return Err(InstanceError::DemandRowLength {
                    item,
                    expected: num_time_slots,
                    got: row.len(),
                });
            }
            for (slot, &value) in row.iter().enumerate() {
                if value > 1 {
                    return Err(InstanceError::NonBinaryDemand { item, slot, value });
                }
            }
        }
        if changeover_cost.len() != num_types {
            return Err(InstanceError::ChangeoverRowCount {
                expected: num_types,
                got: changeover_cost.len(),
            });
        }
        for (item, row) in changeover_cost.iter().enumerate() {
            if row.len() != num_types {
                return Err(InstanceError::ChangeoverRowLength {
                    item,
                    expected: num_types,
                    got: row.len(),
                });
            }
        }
        let demand_per_type = demand
            .iter()
            .map(|row| row.iter().filter(|&&d| d == 1).count())
            .collect();
        Ok(Self {
            num_time_slots,
            num_types,
            inventory_cost,
            demand,
            changeover_cost,
            demand_per_type,
        })
    }

    #[inline]
    pub fn num_time_slots(&self) -> usize {
        self.num_time_slots
    }

    #[inline]
    pub fn num_types(&self) -> usize {
        self.num_types
    }

    /// Cost of keeping one produced unit in stock for one time slot.
    #[inline]
    pub fn inventory_cost(&self) -> i64 {
        self.inventory_cost
    }

    /// Binary demand row of the given type, one entry per time slot.
    #[inline]
    pub fn demand(&self, item: usize) -> &[u8] {
        &self.demand[item]
    }

    #[inline]
    pub fn changeover_cost(&self, pred: usize, succ: usize) -> i64 {
        self.changeover_cost[pred][succ]
    }

    #[inline]
    pub fn demand_per_type(&self, item: usize) -> usize {
        self.demand_per_type[item]
    }

    /// Total number of units that have to be produced.
    #[inline]
    pub fn num_produced_items(&self) -> usize {
        self.demand_per_type.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demand_counts() {
        let instance = Instance::new(
            5,
            2,
            2,
            vec![vec![0, 1, 0, 0, 1], vec![1, 0, 0, 0, 1]],
            vec![vec![0, 5], vec![3, 0]],
        )
        .unwrap();
        assert_eq!(instance.num_time_slots(), 5);
        assert_eq!(instance.num_types(), 2);
        assert_eq!(instance.demand_per_type(0), 2);
        assert_eq!(instance.demand_per_type(1), 2);
        assert_eq!(instance.num_produced_items(), 4);
        assert_eq!(instance.changeover_cost(0, 1), 5);
        assert_eq!(instance.changeover_cost(1, 0), 3);
    }

    #[test]
    fn rejects_malformed_shapes() {
        assert_eq!(
            Instance::new(0, 2, 1, vec![], vec![]),
            Err(InstanceError::NonPositiveCounts)
        );
        assert_eq!(
            Instance::new(2, 2, 1, vec![vec![0, 1]], vec![vec![0, 1], vec![1, 0]]),
            Err(InstanceError::DemandRowCount { expected: 2, got: 1 })
        );
        assert_eq!(
            Instance::new(
                2,
                2,
                1,
                vec![vec![0, 1], vec![1]],
                vec![vec![0, 1], vec![1, 0]]
            ),
            Err(InstanceError::DemandRowLength {
                item: 1,
                expected: 2,
                got: 1
            })
        );
        assert_eq!(
            Instance::new(
                2,
                2,
                1,
                vec![vec![0, 2], vec![1, 0]],
                vec![vec![0, 1], vec![1, 0]]
            ),
            Err(InstanceError::NonBinaryDemand {
                item: 0,
                slot: 1,
                value: 2
            })
        );
        assert_eq!(
            Instance::new(2, 2, 1, vec![vec![0, 1], vec![1, 0]], vec![vec![0, 1]]),
            Err(InstanceError::ChangeoverRowCount { expected: 2, got: 1 })
        );
    }
}
