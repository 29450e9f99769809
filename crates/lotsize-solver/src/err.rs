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

/// The instance admits no flow covering its total demand, e.g. because more
/// units are due within a deadline window than there are time slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfeasibleInstanceError {
    flow_value: usize,
    expected: usize,
}

impl InfeasibleInstanceError {
    #[inline]
    pub fn new(flow_value: usize, expected: usize) -> Self {
        Self {
            flow_value,
            expected,
        }
    }

    #[inline]
    pub fn flow_value(&self) -> usize {
        self.flow_value
    }

    #[inline]
    pub fn expected(&self) -> usize {
        self.expected
    }
}

impl std::fmt::Display for InfeasibleInstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Computed flow value: {}; expected: {}",
            self.flow_value, self.expected
        )
    }
}

impl std::error::Error for InfeasibleInstanceError {}

/// Reason an in-flight cycle enumeration stopped early.
///
/// Recovered locally by the search loops; never surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnumerationAbort {
    /// The consumer requested cooperative cancellation.
    Cancelled,
    /// The consuming side of the cycle channel went away.
    ChannelClosed,
}

impl std::fmt::Display for EnumerationAbort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EnumerationAbort::Cancelled => write!(f, "Cycle enumeration cancelled"),
            EnumerationAbort::ChannelClosed => write!(f, "Cycle channel closed"),
        }
    }
}

impl std::error::Error for EnumerationAbort {}
