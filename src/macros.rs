// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// Check a caller-side precondition of an `unsafe` operation.
///
/// Debug builds always check; release builds only with the `hardened` feature.
macro_rules! precondition ( ($cond:expr, $($arg:tt)+) => (
    if cfg!(feature = "hardened") {
        assert!($cond, $($arg)+)
    } else {
        debug_assert!($cond, $($arg)+)
    }
));

/// Like `format!`, but builds a `DynString`.
///
/// ```
/// # #[macro_use] extern crate dynstring;
/// # fn main() {
/// let s = dynformat!("{}-{}", 12, "ab");
/// assert_eq!(s, "12-ab");
/// # }
/// ```
#[macro_export]
macro_rules! dynformat ( ($($arg:tt)*) => ({
    let mut s = $crate::DynString::new();
    match s.push_fmt(format_args!($($arg)*)) {
        Ok(()) => s,
        Err(_) => panic!("a formatting trait implementation returned an error"),
    }
}));
