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
    err::InstanceLoaderError,
    instance::Instance,
};
use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Reads an [`Instance`] from its plain text representation.
///
/// An example input looks like:
///
/// ```text
/// 5          number of time slots
/// 2          number of machine types
/// 0 1 0 0 1  demand of first type
/// 1 0 0 0 1  demand of second type
/// 2          inventory cost
/// 0 5        changeover cost from first type to second type
/// 3 0        changeover cost from second type to first type
/// ```
///
/// Blank lines are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InstanceLoader;

struct LineScanner<R> {
    reader: R,
    line: usize,
    buf: String,
}

impl<R: BufRead> LineScanner<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: String::new(),
        }
    }

    /// Next non-blank line, split into integer tokens.
    fn next_values(&mut self) -> Result<Vec<i64>, InstanceLoaderError> {
        loop {
            self.buf.clear();
            self.line += 1;
            if self.reader.read_line(&mut self.buf)? == 0 {
                return Err(InstanceLoaderError::UnexpectedEndOfInput);
            }
            if self.buf.trim().is_empty() {
                continue;
            }
            return self
                .buf
                .split_whitespace()
                .map(|token| {
                    token.parse::<i64>().map_err(|source| {
                        InstanceLoaderError::Parse {
                            line: self.line,
                            source,
                        }
                    })
                })
                .collect();
        }
    }

    fn next_single_value(&mut self) -> Result<i64, InstanceLoaderError> {
        let values = self.next_values()?;
        match values.as_slice() {
            [value] => Ok(*value),
            _ => Err(InstanceLoaderError::UnexpectedTokenCount {
                line: self.line,
                got: values.len(),
            }),
        }
    }

    /// Next single value as a count; negative inputs are malformed, not
    /// wrap-around huge.
    fn next_count(&mut self) -> Result<usize, InstanceLoaderError> {
        let value = self.next_single_value()?;
        usize::try_from(value).map_err(|_| InstanceLoaderError::ValueOutOfRange {
            line: self.line,
            value,
        })
    }
}

impl InstanceLoader {
    #[inline]
    pub fn new() -> Self {
        Self
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<Instance, InstanceLoaderError> {
        let file = File::open(path)?;
        self.from_bufread(BufReader::new(file))
    }

    pub fn from_bufread<R: BufRead>(&self, reader: R) -> Result<Instance, InstanceLoaderError> {
        let mut sc = LineScanner::new(reader);
        let num_time_slots = sc.next_count()?;
        tracing::info!("Number of time slots: {}", num_time_slots);
        let num_types = sc.next_count()?;
        tracing::info!("Number of types: {}", num_types);
        let mut demand = Vec::with_capacity(num_types);
        for _ in 0..num_types {
            let row = sc.next_values()?;
            let row = row
                .into_iter()
                .map(|v| {
                    u8::try_from(v).map_err(|_| InstanceLoaderError::ValueOutOfRange {
                        line: sc.line,
                        value: v,
                    })
                })
                .collect::<Result<Vec<u8>, _>>()?;
            demand.push(row);
        }
        let inventory_cost = sc.next_single_value()?;
        tracing::info!("Inventory cost: {}", inventory_cost);
        let mut changeover_cost = Vec::with_capacity(num_types);
        for _ in 0..num_types {
            changeover_cost.push(sc.next_values()?);
        }
        let instance = Instance::new(
            num_time_slots,
            num_types,
            inventory_cost,
            demand,
            changeover_cost,
        )?;
        tracing::info!("Overall demand: {}", instance.num_produced_items());
        Ok(instance)
    }
}
