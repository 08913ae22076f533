// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tokenizing into owned strings.

use std::error::Error;
use std::fmt;

use crate::DynString;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SplitError {
    /// `split_len` was given an empty separator.
    EmptySeparator,
    /// A quoted argument was not closed before the end of the line.
    UnbalancedQuotes,
    /// A closing quote was followed by something other than whitespace.
    NoSpaceAfterQuote,
}

impl fmt::Display for SplitError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match *self {
            SplitError::EmptySeparator => "empty separator",
            SplitError::UnbalancedQuotes => "unbalanced quotes",
            SplitError::NoSpaceAfterQuote => "closing quote must be followed by a space",
        })
    }
}

impl Error for SplitError {}

/// Split `bytes` on every occurrence of `sep`, which may be several bytes long.
///
/// Adjacent separators produce empty tokens. An empty input gives no tokens.
pub fn split_len(bytes: &[u8], sep: &[u8]) -> Result<Vec<DynString>, SplitError> {
    if sep.is_empty() {
        return Err(SplitError::EmptySeparator);
    }
    let mut tokens = Vec::new();
    if bytes.is_empty() {
        return Ok(tokens);
    }

    let mut start = 0;
    let mut i = 0;
    while i + sep.len() <= bytes.len() {
        if &bytes[i..i + sep.len()] == sep {
            tokens.push(DynString::from_bytes(&bytes[start..i]));
            i += sep.len();
            start = i;
        } else {
            i += 1;
        }
    }
    tokens.push(DynString::from_bytes(&bytes[start..]));
    Ok(tokens)
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Quote {
    Unquoted,
    Double,
    Single,
}

fn is_space(b: u8) -> bool {
    match b {
        b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c => true,
        _ => false,
    }
}

fn hex_digit(b: u8) -> Option<u8> {
    (b as char).to_digit(16).map(|d| d as u8)
}

/// Split a command line into arguments, the way a shell or REPL would.
///
/// Arguments are separated by whitespace. Double-quoted arguments understand
/// `\n \r \t \b \a`, `\xHH` and backslash-escaped characters; single-quoted
/// ones only `\'`. A closing quote must be followed by whitespace or the end
/// of the line. Parsing stops at the end of `line` or at its first zero byte.
pub fn split_args(line: &[u8]) -> Result<Vec<DynString>, SplitError> {
    // Past the end reads as a terminator.
    let at = |i: usize| line.get(i).cloned().unwrap_or(0);
    let mut args = Vec::new();
    let mut p = 0;

    loop {
        while at(p) != 0 && is_space(at(p)) {
            p += 1;
        }
        if at(p) == 0 {
            return Ok(args);
        }

        let mut current = DynString::new();
        let mut quote = Quote::Unquoted;
        let mut done = false;
        while !done {
            let c = at(p);
            match quote {
                Quote::Double => {
                    let hex = if c == b'\\' && at(p + 1) == b'x' {
                        hex_digit(at(p + 2)).and_then(|hi| hex_digit(at(p + 3)).map(|lo| hi * 16 + lo))
                    } else {
                        None
                    };
                    if let Some(byte) = hex {
                        current.push_bytes(&[byte]);
                        p += 3;
                    } else if c == b'\\' && at(p + 1) != 0 {
                        p += 1;
                        let escaped = match at(p) {
                            b'n' => b'\n',
                            b'r' => b'\r',
                            b't' => b'\t',
                            b'b' => 0x08,
                            b'a' => 0x07,
                            other => other,
                        };
                        current.push_bytes(&[escaped]);
                    } else if c == b'"' {
                        if at(p + 1) != 0 && !is_space(at(p + 1)) {
                            return Err(SplitError::NoSpaceAfterQuote);
                        }
                        done = true;
                    } else if c == 0 {
                        return Err(SplitError::UnbalancedQuotes);
                    } else {
                        current.push_bytes(&[c]);
                    }
                }
                Quote::Single => {
                    if c == b'\\' && at(p + 1) == b'\'' {
                        p += 1;
                        current.push_bytes(b"'");
                    } else if c == b'\'' {
                        if at(p + 1) != 0 && !is_space(at(p + 1)) {
                            return Err(SplitError::NoSpaceAfterQuote);
                        }
                        done = true;
                    } else if c == 0 {
                        return Err(SplitError::UnbalancedQuotes);
                    } else {
                        current.push_bytes(&[c]);
                    }
                }
                Quote::Unquoted => match c {
                    b' ' | b'\n' | b'\r' | b'\t' | 0 => done = true,
                    b'"' => quote = Quote::Double,
                    b'\'' => quote = Quote::Single,
                    _ => current.push_bytes(&[c]),
                },
            }
            if at(p) != 0 {
                p += 1;
            }
        }
        args.push(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(bytes: &str, sep: &str) -> Vec<DynString> {
        split_len(bytes.as_bytes(), sep.as_bytes()).unwrap()
    }

    fn args(line: &str) -> Vec<DynString> {
        split_args(line.as_bytes()).unwrap()
    }

    test_eq!(split_simple, split("a,b,c", ","), ["a", "b", "c"]);
    test_eq!(split_multibyte, split("foo_-_bar", "_-_"), ["foo", "bar"]);
    test_eq!(split_adjacent, split(",a,,", ","), ["", "a", "", ""]);
    test_eq!(split_no_match, split("abc", "--"), ["abc"]);
    test_eq!(split_sep_longer_than_input, split("a", "abc"), ["a"]);
    test_eq!(split_empty_input, split("", ",").len(), 0);
    test_eq!(split_empty_sep, split_len(b"abc", b""), Err(SplitError::EmptySeparator));

    test_eq!(args_empty, args("").len(), 0);
    test_eq!(args_blank, args(" \t\n ").len(), 0);
    test_eq!(args_plain, args("set key  value\n"), ["set", "key", "value"]);
    test_eq!(args_double, args(r#"a "b c" d"#), ["a", "b c", "d"]);
    test_eq!(args_escapes, args(r#""\n\t\\\"\x41\x4g""#), ["\n\t\\\"Ax4g"]);
    test_eq!(args_single, args(r"'it\'s \n' x"), ["it's \\n", "x"]);
    test_eq!(args_empty_quoted, args(r#""" ''"#), ["", ""]);
    test_eq!(args_quote_mid_word, args(r#"ab"c d""#), ["abc d"]);
    test_eq!(args_unbalanced_double, split_args(br#""abc"#), Err(SplitError::UnbalancedQuotes));
    test_eq!(args_unbalanced_single, split_args(b"'abc"), Err(SplitError::UnbalancedQuotes));
    test_eq!(args_no_space_after_quote, split_args(br#""a"b"#), Err(SplitError::NoSpaceAfterQuote));
    test_eq!(args_stops_at_nul, args("a b\0c"), ["a", "b"]);
}
