// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

/// A set of byte values, one bit per value.
#[derive(Copy, Clone, Default, PartialEq, Eq, Debug)]
pub struct ByteSet {
    bits: [u64; 4],
}

impl ByteSet {
    pub fn from_bytes(bytes: &[u8]) -> ByteSet {
        let mut set = ByteSet::default();
        for &b in bytes {
            set.bits[(b >> 6) as usize] |= 1 << (b & 63);
        }
        set
    }

    #[inline]
    pub fn contains(&self, b: u8) -> bool {
        0 != (self.bits[(b >> 6) as usize] & (1 << (b & 63)))
    }
}
