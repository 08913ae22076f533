// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The capacity policy applied whenever a string has to grow.

use crate::error::AllocError;

/// Content size below which growth doubles, and above which it is linear.
pub const PREALLOC_THRESHOLD: usize = 1024 * 1024;

/// Content capacity to allocate when `needed` bytes must fit.
///
/// Doubling keeps the total copying work of repeated appends linear;
/// past the threshold a fixed `PREALLOC_THRESHOLD` of slack is added instead.
pub fn grown_capacity(needed: usize) -> Result<usize, AllocError> {
    if needed < PREALLOC_THRESHOLD {
        Ok(needed * 2)
    } else {
        debug!("dynstring: linear growth for {} bytes", needed);
        needed.checked_add(PREALLOC_THRESHOLD).ok_or(AllocError::CapacityOverflow)
    }
}
