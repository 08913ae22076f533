// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`DynString`](struct.DynString.html) is a binary-safe, growable byte string.
//!
//! * **O(1) length**: the length and the free space are stored in a header
//!   placed immediately before the content, in the same heap allocation.
//! * **Always terminated**: the byte after the content is always zero,
//!   so `as_ptr()` can be passed to code expecting a C string
//!   (content may still contain zeros of its own).
//! * **Amortized growth**: when a string has to grow, its capacity becomes
//!   twice the needed size, or the needed size plus
//!   [`PREALLOC_THRESHOLD`](constant.PREALLOC_THRESHOLD.html) for large strings.
//!
//! Operations that may reallocate take `&mut self`,
//! so no slice of the old storage can outlive a reallocation.
//! Raw pointers from `as_ptr()` are not tracked and must be re-fetched.

#[macro_use] extern crate log;
#[cfg(test)] #[macro_use] extern crate mac;

pub use crate::dynstring::DynString;
pub use crate::error::AllocError;
pub use crate::growth::PREALLOC_THRESHOLD;
pub use crate::heap_data::HEADER_SIZE;

#[macro_use]
mod macros;

mod dynstring;
mod error;
mod growth;
mod heap_data;

pub mod util;

static OFLOW: &'static str = "dynstring: overflow in buffer arithmetic";
