// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ffi::{CStr, FromBytesWithNulError};
use std::fmt;
use std::hash;
use std::io;
use std::mem::MaybeUninit;
use std::ops::{Deref, DerefMut};
use std::os::raw::c_char;
use std::ptr::{self, NonNull};
use std::slice;

use crate::error::{fatal, AllocError};
use crate::growth::grown_capacity;
use crate::heap_data::{HeapData, HEADER_SIZE};
use crate::util::ByteSet;

/// A binary-safe, growable byte string.
///
/// The length and free space live in a header placed immediately before
/// the content, in the same allocation, and the content is always followed
/// by a zero byte. `as_ptr()` can therefore be handed to anything expecting
/// a NUL-terminated string, as long as it does not mind embedded zeros.
pub struct DynString {
    ptr: NonNull<HeapData>,
}

// Exclusively owned heap data, like `Vec<u8>`.
unsafe impl Send for DynString {}
unsafe impl Sync for DynString {}

impl DynString {
    /// An empty string with no free space.
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// An empty string with room for `capacity` bytes before it has to grow.
    pub fn with_capacity(capacity: usize) -> Self {
        fatal(Self::try_with_capacity(capacity))
    }

    pub fn try_with_capacity(capacity: usize) -> Result<Self, AllocError> {
        Ok(DynString { ptr: HeapData::allocate(capacity)? })
    }

    /// A copy of `bytes`, which may contain zeros. The result has no free space.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        fatal(Self::try_from_bytes(bytes))
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, AllocError> {
        let mut s = Self::try_with_capacity(bytes.len())?;
        unsafe { s.append_unchecked(bytes) }
        Ok(s)
    }

    /// A copy of the bytes of `c_str` before its terminator.
    pub fn from_c_str(c_str: &CStr) -> Self {
        Self::from_bytes(c_str.to_bytes())
    }

    fn heap_data(&self) -> &HeapData {
        unsafe { self.ptr.as_ref() }
    }

    // Header writes go through the raw pointer, never a `&mut HeapData`.
    fn set_len(&mut self, new_len: usize) {
        unsafe { HeapData::set_len(self.ptr, new_len) }
    }

    /// Number of content bytes. O(1).
    pub fn len(&self) -> usize {
        self.heap_data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes that can be appended without reallocating. O(1).
    pub fn avail(&self) -> usize {
        self.heap_data().free()
    }

    /// `len() + avail()`: content capacity, not counting the terminator.
    pub fn capacity(&self) -> usize {
        self.heap_data().data_capacity()
    }

    /// Total size of the allocation: header, content, free space and terminator.
    pub fn alloc_size(&self) -> usize {
        HEADER_SIZE + self.capacity() + 1
    }

    /// Address of the first content byte. The byte at `len()` is always zero.
    ///
    /// Any operation that can grow the string may invalidate this pointer.
    pub fn as_ptr(&self) -> *const u8 {
        unsafe { HeapData::data_ptr(self.ptr) }
    }

    pub fn as_mut_ptr(&mut self) -> *mut u8 {
        unsafe { HeapData::data_ptr(self.ptr) }
    }

    pub fn as_c_ptr(&self) -> *const c_char {
        self.as_ptr() as *const c_char
    }

    pub fn as_bytes(&self) -> &[u8] {
        self
    }

    /// The content followed by its terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len() + 1) }
    }

    /// View as a C string. Fails if the content contains a zero byte.
    pub fn to_c_str(&self) -> Result<&CStr, FromBytesWithNulError> {
        CStr::from_bytes_with_nul(self.as_bytes_with_nul())
    }

    /// Make sure at least `additional` bytes can be appended without reallocating.
    ///
    /// Does nothing if there is already enough free space. Otherwise the
    /// capacity becomes twice the needed size, or the needed size plus
    /// `PREALLOC_THRESHOLD` for strings past that threshold.
    pub fn reserve(&mut self, additional: usize) {
        fatal(self.try_reserve(additional))
    }

    /// Like `reserve`, but reports allocation failure instead of stopping.
    /// On error the string is unchanged.
    pub fn try_reserve(&mut self, additional: usize) -> Result<(), AllocError> {
        if self.avail() >= additional {
            return Ok(());
        }
        let needed = self.len().checked_add(additional).ok_or(AllocError::CapacityOverflow)?;
        let new_capacity = grown_capacity(needed)?;
        self.reallocate(new_capacity)
    }

    fn reallocate(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        let old_capacity = self.capacity();
        self.ptr = unsafe { HeapData::reallocate(self.ptr, new_capacity)? };
        trace!("dynstring: reallocated from {} to {} bytes", old_capacity, new_capacity);
        Ok(())
    }

    /// Release all free space. Content is unchanged.
    pub fn shrink_to_fit(&mut self) {
        let free = self.avail();
        if free > 0 {
            let len = self.len();
            fatal(self.reallocate(len));
            debug!("dynstring: released {} free bytes", free);
        }
    }

    /// Unsafe: `bytes.len() <= self.avail()` must hold.
    unsafe fn append_unchecked(&mut self, bytes: &[u8]) {
        debug_assert!(bytes.len() <= self.avail());
        let len = self.len();
        ptr::copy_nonoverlapping(bytes.as_ptr(), self.as_mut_ptr().add(len), bytes.len());
        self.set_len(len + bytes.len())
    }

    /// Append `bytes`, which may contain zeros.
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        unsafe { self.append_unchecked(bytes) }
    }

    /// Append another string. To append a string to itself, use `push_self`.
    pub fn push_dyn(&mut self, other: &DynString) {
        self.push_bytes(other)
    }

    /// Append a copy of the current content, doubling it.
    pub fn push_self(&mut self) {
        let len = self.len();
        self.reserve(len);
        unsafe {
            let data = self.as_mut_ptr();
            ptr::copy_nonoverlapping(data, data.add(len), len);
        }
        self.set_len(2 * len)
    }

    pub fn push_c_str(&mut self, c_str: &CStr) {
        self.push_bytes(c_str.to_bytes())
    }

    pub fn push_str(&mut self, s: &str) {
        self.push_bytes(s.as_bytes())
    }

    /// Replace the whole content with `bytes`.
    ///
    /// Only reallocates if `bytes` does not fit in the current capacity;
    /// capacity left over past the new content becomes free space.
    pub fn copy_from(&mut self, bytes: &[u8]) {
        if bytes.len() > self.capacity() {
            let additional = bytes.len() - self.len();
            self.reserve(additional);
        }
        unsafe {
            ptr::copy_nonoverlapping(bytes.as_ptr(), self.as_mut_ptr(), bytes.len());
        }
        self.set_len(bytes.len())
    }

    /// Extend the string with zero bytes up to `new_len`.
    /// Does nothing if the string is already at least that long.
    pub fn grow_zeroed(&mut self, new_len: usize) {
        let len = self.len();
        if new_len <= len {
            return;
        }
        self.reserve(new_len - len);
        unsafe {
            ptr::write_bytes(self.as_mut_ptr().add(len), 0, new_len - len);
        }
        self.set_len(new_len)
    }

    /// Keep only the bytes from `start` to `end`, both inclusive.
    ///
    /// Negative indices count from the end: `-1` is the last byte.
    /// Out-of-range indices are clamped, and an empty range leaves an empty
    /// string. The kept bytes move to the front; nothing is reallocated.
    pub fn range(&mut self, start: isize, end: isize) {
        let len = self.len();
        if len == 0 {
            return;
        }
        let start = from_end(start, len);
        let end = from_end(end, len).min(len - 1);
        let new_len = if start >= len || start > end { 0 } else { end - start + 1 };
        if new_len > 0 && start > 0 {
            self.copy_within(start..start + new_len, 0);
        }
        self.set_len(new_len)
    }

    /// Remove leading and trailing bytes that appear in `charset`.
    /// The remaining bytes move to the front; nothing is reallocated.
    pub fn trim(&mut self, charset: &[u8]) {
        let set = ByteSet::from_bytes(charset);
        let (start, end) = {
            let bytes = self.as_bytes();
            let start = bytes.iter().position(|&b| !set.contains(b)).unwrap_or(bytes.len());
            let end = bytes.iter().rposition(|&b| !set.contains(b)).map_or(start, |i| i + 1);
            (start, end)
        };
        if start > 0 {
            self.copy_within(start..end, 0);
        }
        self.set_len(end - start)
    }

    /// Make the string empty, keeping all of its capacity as free space.
    pub fn clear(&mut self) {
        self.set_len(0)
    }

    /// Shorten the string to `new_len` bytes. Does nothing if it is not longer.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len < self.len() {
            self.set_len(new_len)
        }
    }

    /// Adjust the length after writing directly past the end of the content,
    /// or shrink it with a negative `delta`. Free space changes by the opposite
    /// amount and the terminator is rewritten.
    ///
    /// Unsafe: for a positive `delta`, at least `delta` bytes must have been
    /// free and initialized by the caller (through `as_mut_ptr` or
    /// `spare_capacity_mut`). For a negative `delta`, `-delta <= len()`.
    pub unsafe fn incr_len(&mut self, delta: isize) {
        let len = self.len();
        let new_len = if delta >= 0 {
            precondition!((delta as usize) <= self.avail(),
                          "incr_len by {} with only {} bytes free", delta, self.avail());
            len + delta as usize
        } else {
            precondition!(delta.unsigned_abs() <= len,
                          "incr_len by {} on a string of {} bytes", delta, len);
            len - delta.unsigned_abs()
        };
        self.set_len(new_len)
    }

    /// The free space after the content, for writing in place before `commit`.
    ///
    /// The slot holding the terminator is not part of this slice.
    pub fn spare_capacity_mut(&mut self) -> &mut [MaybeUninit<u8>] {
        let len = self.len();
        let free = self.avail();
        unsafe {
            let start = self.as_mut_ptr().add(len) as *mut MaybeUninit<u8>;
            slice::from_raw_parts_mut(start, free)
        }
    }

    /// Add `written` bytes from the front of `spare_capacity_mut()` to the content.
    ///
    /// Unsafe: those bytes must have been initialized, and `written <= avail()`.
    pub unsafe fn commit(&mut self, written: usize) {
        precondition!(written <= self.avail(),
                      "commit of {} bytes with only {} bytes free", written, self.avail());
        let len = self.len();
        self.set_len(len + written)
    }

    /// Let `f` write into the free space, zeroed beforehand, then append the
    /// number of bytes it returns. Reserve first to control how much room `f` gets.
    ///
    /// Panics if `f` claims to have written more than it was given.
    pub fn write_to_spare<F>(&mut self, f: F) -> usize where F: FnOnce(&mut [u8]) -> usize {
        let written;
        {
            let spare = self.spare_capacity_mut();
            let spare = unsafe {
                ptr::write_bytes(spare.as_mut_ptr(), 0, spare.len());
                slice::from_raw_parts_mut(spare.as_mut_ptr() as *mut u8, spare.len())
            };
            written = f(spare);
            assert!(written <= spare.len(),
                    "wrote {} bytes into {} bytes of free space", written, spare.len());
        }
        unsafe { self.commit(written) }
        written
    }

    /// Set the length to the position of the first zero byte, for content
    /// that was rewritten in place as a C string.
    pub fn update_len(&mut self) {
        let new_len = self.as_bytes().iter().position(|&b| b == 0).unwrap_or(self.len());
        self.set_len(new_len)
    }

    /// Byte-wise comparison; a proper prefix sorts first.
    pub fn compare(&self, other: &DynString) -> Ordering {
        <[u8]>::cmp(self, other)
    }
}

/// Resolve a possibly negative index against `len`, clamping below at zero.
fn from_end(index: isize, len: usize) -> usize {
    if index < 0 {
        len.saturating_sub(index.unsigned_abs())
    } else {
        index as usize
    }
}

impl Drop for DynString {
    fn drop(&mut self) {
        unsafe { HeapData::deallocate(self.ptr) }
    }
}

impl Deref for DynString {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.as_ptr(), self.len()) }
    }
}

impl DerefMut for DynString {
    fn deref_mut(&mut self) -> &mut [u8] {
        let len = self.len();
        unsafe { slice::from_raw_parts_mut(self.as_mut_ptr(), len) }
    }
}

impl AsRef<[u8]> for DynString {
    fn as_ref(&self) -> &[u8] {
        self
    }
}

impl AsMut<[u8]> for DynString {
    fn as_mut(&mut self) -> &mut [u8] {
        self
    }
}

impl Borrow<[u8]> for DynString {
    fn borrow(&self) -> &[u8] {
        self
    }
}

/// An independent copy with no free space.
impl Clone for DynString {
    fn clone(&self) -> Self {
        Self::from_bytes(self)
    }
}

impl<'a> From<&'a [u8]> for DynString {
    fn from(bytes: &'a [u8]) -> Self {
        Self::from_bytes(bytes)
    }
}

impl<'a> From<&'a str> for DynString {
    fn from(s: &'a str) -> Self {
        Self::from_bytes(s.as_bytes())
    }
}

impl<'a> From<&'a CStr> for DynString {
    fn from(c_str: &'a CStr) -> Self {
        Self::from_c_str(c_str)
    }
}

impl<'a> Extend<&'a u8> for DynString {
    fn extend<I: IntoIterator<Item = &'a u8>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for &byte in iter {
            self.push_bytes(&[byte])
        }
    }
}

impl fmt::Write for DynString {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_str(s);
        Ok(())
    }
}

impl io::Write for DynString {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.try_reserve(buf.len()).map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        self.push_bytes(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Shows the content as a quoted byte string with non-printable bytes escaped.
impl fmt::Debug for DynString {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("\"")?;
        for &byte in self.as_bytes() {
            for c in std::ascii::escape_default(byte) {
                fmt::Write::write_char(formatter, c as char)?;
            }
        }
        formatter.write_str("\"")
    }
}

impl hash::Hash for DynString {
    fn hash<H>(&self, hasher: &mut H) where H: hash::Hasher {
        <[u8]>::hash(self, hasher)
    }
}

impl Default for DynString {
    fn default() -> Self {
        Self::new()
    }
}

impl Eq for DynString {}

impl<T: AsRef<[u8]>> PartialEq<T> for DynString {
    fn eq(&self, other: &T) -> bool {
        <[u8]>::eq(self, other.as_ref())
    }
}

impl Ord for DynString {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl<T: AsRef<[u8]>> PartialOrd<T> for DynString {
    fn partial_cmp(&self, other: &T) -> Option<Ordering> {
        <[u8]>::partial_cmp(self, other.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Check the layout invariants through the raw pointer.
    fn assert_consistent(s: &DynString) {
        assert_eq!(s.len() + s.avail(), s.capacity());
        assert_eq!(s.alloc_size(), HEADER_SIZE + s.len() + s.avail() + 1);
        unsafe {
            assert_eq!(*s.as_ptr().add(s.len()), 0);
            let header = s.as_ptr().sub(HEADER_SIZE) as *const usize;
            assert_eq!(*header, s.len());
            assert_eq!(*header.add(1), s.avail());
        }
    }

    #[test]
    fn header_precedes_content() {
        let mut s = DynString::from("abc");
        assert_consistent(&s);
        s.reserve(40);
        assert_consistent(&s);
        s.range(1, 1);
        assert_consistent(&s);
    }

    #[test]
    fn from_bytes_has_no_free_space() {
        let s = DynString::from_bytes(b"a\0b");
        assert_eq!(s.len(), 3);
        assert_eq!(s.avail(), 0);
        assert_eq!(s.as_bytes_with_nul(), b"a\0b\0");
    }

    #[test]
    fn reserve_policy() {
        let mut s = DynString::from("Hello");
        s.reserve(6);
        assert_eq!(s.capacity(), 22);
        assert_eq!(s.avail(), 17);

        // Enough room already: no change.
        let ptr = s.as_ptr();
        s.reserve(17);
        assert_eq!(s.as_ptr(), ptr);
        assert_eq!(s.capacity(), 22);
    }

    #[test]
    fn copy_from_keeps_capacity() {
        let mut s = DynString::with_capacity(32);
        s.push_bytes(b"0123456789");
        s.copy_from(b"xy");
        assert_eq!(s, "xy");
        assert_eq!(s.capacity(), 32);
        assert_eq!(s.avail(), 30);
        assert_consistent(&s);
    }

    #[test]
    fn incr_len_negative() {
        let mut s = DynString::from("abcdef");
        unsafe { s.incr_len(-2) }
        assert_eq!(s, "abcd");
        assert_eq!(s.avail(), 2);
        assert_consistent(&s);
    }

    #[test]
    fn push_self_doubles() {
        let mut s = DynString::from("ab\0");
        s.push_self();
        assert_eq!(s, b"ab\0ab\0");
        assert_consistent(&s);

        let mut empty = DynString::new();
        empty.push_self();
        assert_eq!(empty, "");
        assert_consistent(&empty);
    }

    #[test]
    fn debug_escapes() {
        let s = DynString::from_bytes(b"a\"\n\x01");
        assert_eq!(format!("{:?}", s), r#""a\"\n\x01""#);
    }

    #[test]
    fn to_c_str() {
        assert_eq!(DynString::from("ok").to_c_str().unwrap().to_bytes(), b"ok");
        assert!(DynString::from_bytes(b"o\0k").to_c_str().is_err());
    }
}
