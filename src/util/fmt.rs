// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Formatted and escaped appends.

use std::fmt::{self, Write};

use crate::DynString;

static HEX_DIGITS: &'static [u8; 16] = b"0123456789abcdef";

impl DynString {
    /// Append formatted text, as `write!` would. See also `dynformat!`.
    pub fn push_fmt(&mut self, args: fmt::Arguments) -> fmt::Result {
        self.write_fmt(args)
    }

    /// Decimal representation of `value`.
    pub fn from_i64(value: i64) -> DynString {
        // Sign and 19 digits at most.
        let mut buf = [0u8; 20];
        let mut i = buf.len();
        let mut n = value.unsigned_abs();
        loop {
            i -= 1;
            buf[i] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        if value < 0 {
            i -= 1;
            buf[i] = b'-';
        }
        DynString::from_bytes(&buf[i..])
    }

    /// Append `bytes` as a double-quoted literal, escaping quotes, backslashes
    /// and non-printable bytes, so the result is printable and unambiguous.
    pub fn push_repr(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len() + 2);
        self.push_bytes(b"\"");
        for &b in bytes {
            match b {
                b'\\' | b'"' => self.push_bytes(&[b'\\', b]),
                b'\n' => self.push_bytes(b"\\n"),
                b'\r' => self.push_bytes(b"\\r"),
                b'\t' => self.push_bytes(b"\\t"),
                0x07 => self.push_bytes(b"\\a"),
                0x08 => self.push_bytes(b"\\b"),
                0x20..=0x7e => self.push_bytes(&[b]),
                _ => self.push_bytes(&[b'\\', b'x', HEX_DIGITS[(b >> 4) as usize],
                                       HEX_DIGITS[(b & 0xf) as usize]]),
            }
        }
        self.push_bytes(b"\"")
    }
}
