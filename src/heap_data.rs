// Copyright 2024 The dynstring Project Developers. See the
// COPYRIGHT file at the top-level directory of this distribution.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Heap-allocated data: a header followed by bytes and a NUL terminator.

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::{self, NonNull};

use crate::error::AllocError;

/// Size in bytes of the header that precedes the content.
pub const HEADER_SIZE: usize = mem::size_of::<HeapData>();

/// Header of the allocation. The `len + free + 1` content bytes follow it
/// directly, at offset `HEADER_SIZE`.
#[repr(C)]  // Preserve field order: len, then free
pub struct HeapData {
    len: usize,
    free: usize,
}

/// Layout of an allocation holding one header and `data_capacity` content bytes,
/// plus one byte for the terminator.
fn layout_for(data_capacity: usize) -> Result<Layout, AllocError> {
    let bytes = HEADER_SIZE
        .checked_add(data_capacity)
        .and_then(|n| n.checked_add(1))
        .ok_or(AllocError::CapacityOverflow)?;
    Layout::from_size_align(bytes, mem::align_of::<HeapData>())
        .map_err(|_| AllocError::CapacityOverflow)
}

impl HeapData {
    /// Allocate an empty buffer with room for `data_capacity` content bytes.
    ///
    /// The header is initialized to `len == 0, free == data_capacity`
    /// and the terminator is written at offset zero.
    pub fn allocate(data_capacity: usize) -> Result<NonNull<Self>, AllocError> {
        let layout = layout_for(data_capacity)?;
        unsafe {
            // Never zero-sized: the header alone is non-empty.
            let raw = alloc::alloc(layout) as *mut HeapData;
            let ptr = NonNull::new(raw).ok_or(AllocError::AllocFailed { layout })?;
            ptr::write(raw, HeapData {
                len: 0,
                free: data_capacity,
            });
            Self::write_terminator(ptr);
            Ok(ptr)
        }
    }

    /// Move the allocation to one holding `new_data_capacity` content bytes,
    /// preserving the first `len` bytes.
    ///
    /// On error the original allocation is untouched and still owned by the caller.
    ///
    /// Unsafe: `ptr` must be valid, and not used afterwards if this returns `Ok`.
    /// `new_data_capacity` must be at least the current length.
    pub unsafe fn reallocate(ptr: NonNull<Self>, new_data_capacity: usize)
                             -> Result<NonNull<Self>, AllocError> {
        let len = ptr.as_ref().len;
        debug_assert!(new_data_capacity >= len);
        let old_layout = layout_for(ptr.as_ref().data_capacity())?;
        let new_layout = layout_for(new_data_capacity)?;

        let raw = alloc::realloc(ptr.as_ptr() as *mut u8, old_layout, new_layout.size());
        let new_ptr = NonNull::new(raw as *mut HeapData)
            .ok_or(AllocError::AllocFailed { layout: new_layout })?;

        (*new_ptr.as_ptr()).free = new_data_capacity - len;
        Self::write_terminator(new_ptr);
        Ok(new_ptr)
    }

    /// Unsafe: `ptr` must be valid, and not used afterwards
    pub unsafe fn deallocate(ptr: NonNull<Self>) {
        // `len + free` is the capacity the block was last (re)allocated with,
        // and that layout was validated at the time.
        let bytes = HEADER_SIZE + ptr.as_ref().data_capacity() + 1;
        let layout = Layout::from_size_align_unchecked(bytes, mem::align_of::<HeapData>());
        alloc::dealloc(ptr.as_ptr() as *mut u8, layout)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn free(&self) -> usize {
        self.free
    }

    /// Content capacity, excluding the terminator byte.
    pub fn data_capacity(&self) -> usize {
        self.len + self.free
    }

    /// Move the boundary between content and free space, then re-terminate.
    ///
    /// Capacity is unchanged: bytes leaving the content are folded into `free`.
    ///
    /// Unsafe: `ptr` must be valid.
    pub unsafe fn set_len(ptr: NonNull<Self>, new_len: usize) {
        let raw = ptr.as_ptr();
        let capacity = (*raw).len + (*raw).free;
        debug_assert!(new_len <= capacity, "length {} past capacity {}", new_len, capacity);
        (*raw).len = new_len;
        (*raw).free = capacity - new_len;
        Self::write_terminator(ptr)
    }

    unsafe fn write_terminator(ptr: NonNull<Self>) {
        let len = (*ptr.as_ptr()).len;
        *Self::data_ptr(ptr).add(len) = 0;
    }

    /// First content byte, offset from the start of the allocation.
    ///
    /// Unsafe: `ptr` must be valid.
    pub unsafe fn data_ptr(ptr: NonNull<Self>) -> *mut u8 {
        (ptr.as_ptr() as *mut u8).add(HEADER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_two_words() {
        assert_eq!(HEADER_SIZE, 2 * mem::size_of::<usize>());
    }

    #[test]
    fn allocate_is_empty_and_terminated() {
        unsafe {
            let ptr = HeapData::allocate(10).unwrap();
            let header = ptr.as_ref();
            assert_eq!(header.len(), 0);
            assert_eq!(header.free(), 10);
            assert_eq!(*HeapData::data_ptr(ptr), 0);
            HeapData::deallocate(ptr);
        }
    }

    #[test]
    fn data_follows_header() {
        unsafe {
            let ptr = HeapData::allocate(0).unwrap();
            let header_addr = ptr.as_ptr() as usize;
            assert_eq!(HeapData::data_ptr(ptr) as usize - header_addr, HEADER_SIZE);
            HeapData::deallocate(ptr);
        }
    }

    #[test]
    fn reallocate_preserves_content() {
        unsafe {
            let ptr = HeapData::allocate(3).unwrap();
            ptr::copy_nonoverlapping(b"abc".as_ptr(), HeapData::data_ptr(ptr), 3);
            HeapData::set_len(ptr, 3);
            assert_eq!(ptr.as_ref().free(), 0);

            let ptr = HeapData::reallocate(ptr, 100).unwrap();
            assert_eq!(ptr.as_ref().len(), 3);
            assert_eq!(ptr.as_ref().free(), 97);
            let data = std::slice::from_raw_parts(HeapData::data_ptr(ptr), 4);
            assert_eq!(data, b"abc\0");
            HeapData::deallocate(ptr);
        }
    }

    #[test]
    fn set_len_moves_terminator() {
        unsafe {
            let ptr = HeapData::allocate(8).unwrap();
            ptr::write_bytes(HeapData::data_ptr(ptr), b'x', 8);
            HeapData::set_len(ptr, 5);
            HeapData::set_len(ptr, 2);
            assert_eq!(ptr.as_ref().len(), 2);
            assert_eq!(ptr.as_ref().free(), 6);
            let data = std::slice::from_raw_parts(HeapData::data_ptr(ptr), 3);
            assert_eq!(data, b"xx\0");
            HeapData::deallocate(ptr);
        }
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn failed_reallocate_keeps_old_block() {
        unsafe {
            let ptr = HeapData::allocate(3).unwrap();
            ptr::copy_nonoverlapping(b"abc".as_ptr(), HeapData::data_ptr(ptr), 3);
            HeapData::set_len(ptr, 3);
            match HeapData::reallocate(ptr, isize::MAX as usize / 2) {
                Err(AllocError::AllocFailed { .. }) => {}
                Err(e) => panic!("unexpected error {}", e),
                Ok(_) => panic!("allocated half the address space"),
            }
            assert_eq!(ptr.as_ref().len(), 3);
            assert_eq!(ptr.as_ref().free(), 0);
            let data = std::slice::from_raw_parts(HeapData::data_ptr(ptr), 4);
            assert_eq!(data, b"abc\0");
            HeapData::deallocate(ptr);
        }
    }

    #[test]
    fn capacity_overflow() {
        match HeapData::allocate(usize::MAX) {
            Err(AllocError::CapacityOverflow) => {}
            Err(e) => panic!("unexpected error {}", e),
            Ok(ptr) => unsafe {
                HeapData::deallocate(ptr);
                panic!("allocated usize::MAX bytes");
            },
        }
    }
}
