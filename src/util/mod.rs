// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Conveniences built only on the public `DynString` operations.

pub use self::smallcharset::ByteSet;
pub use self::split::{split_args, split_len, SplitError};
pub use self::str::join;

mod fmt;
mod smallcharset;
mod split;
mod str;
