// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::alloc::{handle_alloc_error, Layout};
use std::error::Error;
use std::fmt;

use crate::OFLOW;

/// Failure to obtain memory for a construction or growth request.
///
/// Returned only by the `try_*` operations. When this is returned the string
/// the operation was called on is left exactly as it was.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    /// The requested size does not fit in the address space.
    CapacityOverflow,
    /// The allocator could not satisfy a request of this layout.
    AllocFailed { layout: Layout },
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            AllocError::CapacityOverflow => f.write_str(OFLOW),
            AllocError::AllocFailed { layout } => {
                write!(f, "dynstring: memory allocation of {} bytes failed", layout.size())
            }
        }
    }
}

impl Error for AllocError {}

/// Unwrap the result of an allocating operation, or stop.
///
/// Capacity overflow panics like `Vec` does; an allocator failure goes
/// through the global allocation error handler, which aborts by default.
pub(crate) fn fatal<T>(result: Result<T, AllocError>) -> T {
    match result {
        Ok(value) => value,
        Err(AllocError::CapacityOverflow) => panic!("{}", OFLOW),
        Err(AllocError::AllocFailed { layout }) => handle_alloc_error(layout),
    }
}
