// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::DynString;

impl DynString {
    /// Map ASCII uppercase to lowercase in place; other bytes are preserved.
    pub fn to_lower(&mut self) {
        self.make_ascii_lowercase()
    }

    /// Map ASCII lowercase to uppercase in place; other bytes are preserved.
    pub fn to_upper(&mut self) {
        self.make_ascii_uppercase()
    }

    /// Replace every occurrence of `from[i]` with `to[i]`.
    ///
    /// Each byte is translated at most once, using the first matching entry.
    pub fn map_chars(&mut self, from: &[u8], to: &[u8]) {
        assert_eq!(from.len(), to.len(), "map_chars: {} sources for {} replacements",
                   from.len(), to.len());
        for byte in self.iter_mut() {
            if let Some(i) = from.iter().position(|&f| f == *byte) {
                *byte = to[i];
            }
        }
    }
}

/// Concatenate `parts`, with `sep` between consecutive parts.
pub fn join<I>(parts: I, sep: &[u8]) -> DynString
    where I: IntoIterator, I::Item: AsRef<[u8]>
{
    let mut joined = DynString::new();
    for (i, part) in parts.into_iter().enumerate() {
        if i > 0 {
            joined.push_bytes(sep);
        }
        joined.push_bytes(part.as_ref());
    }
    joined
}
