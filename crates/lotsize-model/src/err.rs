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

use std::num::ParseIntError;

/// Validation failures when assembling an [`Instance`](crate::instance::Instance).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstanceError {
    NonPositiveCounts,
    DemandRowCount { expected: usize, got: usize },
    DemandRowLength { item: usize, expected: usize, got: usize },
    NonBinaryDemand { item: usize, slot: usize, value: u8 },
    ChangeoverRowCount { expected: usize, got: usize },
    ChangeoverRowLength { item: usize, expected: usize, got: usize },
}

impl std::fmt::Display for InstanceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceError::NonPositiveCounts => {
                write!(f, "Number of time slots and number of types must be positive")
            }
            InstanceError::DemandRowCount { expected, got } => {
                write!(f, "Expected {} demand rows, got {}", expected, got)
            }
            InstanceError::DemandRowLength { item, expected, got } => write!(
                f,
                "Demand row of type {} has length {}, expected {}",
                item, got, expected
            ),
            InstanceError::NonBinaryDemand { item, slot, value } => write!(
                f,
                "Demand of type {} in slot {} is {}, expected 0 or 1",
                item, slot, value
            ),
            InstanceError::ChangeoverRowCount { expected, got } => {
                write!(f, "Expected {} changeover cost rows, got {}", expected, got)
            }
            InstanceError::ChangeoverRowLength { item, expected, got } => write!(
                f,
                "Changeover cost row of type {} has length {}, expected {}",
                item, got, expected
            ),
        }
    }
}

impl std::error::Error for InstanceError {}

/// Failures while reading an instance from its text representation.
#[derive(Debug)]
pub enum InstanceLoaderError {
    Io(std::io::Error),
    Parse { line: usize, source: ParseIntError },
    ValueOutOfRange { line: usize, value: i64 },
    UnexpectedTokenCount { line: usize, got: usize },
    UnexpectedEndOfInput,
    Instance(InstanceError),
}

impl std::fmt::Display for InstanceLoaderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InstanceLoaderError::Io(err) => write!(f, "IO error: {}", err),
            InstanceLoaderError::Parse { line, source } => {
                write!(f, "Parse error in line {}: {}", line, source)
            }
            InstanceLoaderError::ValueOutOfRange { line, value } => {
                write!(f, "Value {} in line {} is out of range", value, line)
            }
            InstanceLoaderError::UnexpectedTokenCount { line, got } => {
                write!(f, "Expected a single value in line {}, got {} tokens", line, got)
            }
            InstanceLoaderError::UnexpectedEndOfInput => {
                write!(f, "Unexpected end of input")
            }
            InstanceLoaderError::Instance(err) => write!(f, "Invalid instance: {}", err),
        }
    }
}

impl std::error::Error for InstanceLoaderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            InstanceLoaderError::Io(err) => Some(err),
            InstanceLoaderError::Parse { source, .. } => Some(source),
            InstanceLoaderError::ValueOutOfRange { .. } => None,
            InstanceLoaderError::UnexpectedTokenCount { .. } => None,
            InstanceLoaderError::UnexpectedEndOfInput => None,
            InstanceLoaderError::Instance(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for InstanceLoaderError {
    #[inline]
    fn from(err: std::io::Error) -> Self {
        InstanceLoaderError::Io(err)
    }
}

impl From<InstanceError> for InstanceLoaderError {
    #[inline]
    fn from(err: InstanceError) -> Self {
        InstanceLoaderError::Instance(err)
    }
}
