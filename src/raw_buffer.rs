//! Explicit-lifetime storage block.
//!
//! A `RawBuffer<T>` is a fixed-capacity block of uninitialized slots. It
//! never knows which slots are live: the owner tracks that and is the only
//! party allowed to call the slot operations. Dropping the buffer frees
//! the block without touching any slot, so the owner must drop or move out
//! every live value first.
//!
//! Zero-sized types never allocate; the block pointer stays dangling and
//! every slot operation is still well defined.

use core::marker::PhantomData;
use core::mem;
use core::ptr::{self, NonNull};
use std::alloc::{self, Layout};

pub(crate) struct RawBuffer<T> {
    ptr: NonNull<T>,
    cap: usize,
    _owns: PhantomData<T>,
}

impl<T> RawBuffer<T> {
    /// A buffer with no slots. Does not allocate.
    pub(crate) const fn empty() -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            _owns: PhantomData,
        }
    }

    /// Allocate a block of `cap` uninitialized slots.
    pub(crate) fn allocate(cap: usize) -> Self {
        let layout = Self::layout_for(cap);
        if layout.size() == 0 {
            return Self {
                ptr: NonNull::dangling(),
                cap,
                _owns: PhantomData,
            };
        }
        // SAFETY: layout has a nonzero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = match NonNull::new(raw.cast::<T>()) {
            Some(p) => p,
            None => alloc::handle_alloc_error(layout),
        };
        Self {
            ptr,
            cap,
            _owns: PhantomData,
        }
    }

    fn layout_for(cap: usize) -> Layout {
        match Layout::array::<T>(cap) {
            Ok(layout) => layout,
            Err(_) => panic!("capacity overflow"),
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Construct a value in slot `index`.
    ///
    /// # Safety
    /// `index < capacity` and the slot is uninitialized.
    #[inline]
    pub(crate) unsafe fn write(&mut self, index: usize, value: T) {
        debug_assert!(index < self.cap);
        ptr::write(self.ptr.as_ptr().add(index), value);
    }

    /// Move the value out of slot `index`, leaving the slot uninitialized.
    ///
    /// # Safety
    /// `index < capacity` and the slot is live.
    #[inline]
    pub(crate) unsafe fn read(&mut self, index: usize) -> T {
        debug_assert!(index < self.cap);
        ptr::read(self.ptr.as_ptr().add(index))
    }

    /// Destroy the live values in `start..end`, leaving those slots
    /// uninitialized.
    ///
    /// # Safety
    /// `start <= end <= capacity` and every slot in the range is live.
    #[inline]
    pub(crate) unsafe fn drop_range(&mut self, start: usize, end: usize) {
        debug_assert!(start <= end && end <= self.cap);
        let slice = ptr::slice_from_raw_parts_mut(self.ptr.as_ptr().add(start), end - start);
        ptr::drop_in_place(slice);
    }

    /// Relocate `count` values starting at `src` to start at `dst` within
    /// this block. Ranges may overlap. Source slots not covered by the
    /// destination become uninitialized.
    ///
    /// # Safety
    /// Both ranges lie within capacity, the source slots are live and the
    /// destination slots outside the source range are uninitialized.
    #[inline]
    pub(crate) unsafe fn relocate(&mut self, src: usize, dst: usize, count: usize) {
        debug_assert!(src + count <= self.cap && dst + count <= self.cap);
        let base = self.ptr.as_ptr();
        ptr::copy(base.add(src), base.add(dst), count);
    }

    /// Relocate `count` values from `src` in this block to `dst` in
    /// `other`. The source slots become uninitialized.
    ///
    /// # Safety
    /// Source slots are live, destination slots are uninitialized, both
    /// ranges lie within their buffer's capacity.
    #[inline]
    pub(crate) unsafe fn relocate_into(
        &mut self,
        src: usize,
        other: &mut RawBuffer<T>,
        dst: usize,
        count: usize,
    ) {
        debug_assert!(src + count <= self.cap && dst + count <= other.cap);
        ptr::copy_nonoverlapping(self.ptr.as_ptr().add(src), other.ptr.as_ptr().add(dst), count);
    }

    /// Swap the blocks of two buffers.
    #[inline]
    pub(crate) fn swap(&mut self, other: &mut RawBuffer<T>) {
        mem::swap(self, other);
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        let layout = Self::layout_for(self.cap);
        if layout.size() != 0 {
            // SAFETY: the block was allocated in `allocate` with this layout.
            unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RawBuffer;
    use std::rc::Rc;

    /// Values written, relocated and read back keep their identity; the
    /// buffer itself never drops slot contents.
    #[test]
    fn write_relocate_read() {
        let mut buf: RawBuffer<String> = RawBuffer::allocate(4);
        assert_eq!(buf.capacity(), 4);
        unsafe {
            buf.write(0, "a".to_string());
            buf.write(1, "b".to_string());
            buf.relocate(0, 1, 2);
            buf.write(0, "z".to_string());
            assert_eq!(buf.read(0), "z");
            assert_eq!(buf.read(1), "a");
            assert_eq!(buf.read(2), "b");
        }
    }

    /// `drop_range` runs destructors exactly once per live slot.
    #[test]
    fn drop_range_runs_destructors() {
        let tracker = Rc::new(());
        let mut buf: RawBuffer<Rc<()>> = RawBuffer::allocate(3);
        unsafe {
            for i in 0..3 {
                buf.write(i, tracker.clone());
            }
            assert_eq!(Rc::strong_count(&tracker), 4);
            buf.drop_range(0, 3);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    /// Moving values into another block transfers ownership without
    /// running destructors.
    #[test]
    fn relocate_into_other_block() {
        let tracker = Rc::new(());
        let mut a: RawBuffer<Rc<()>> = RawBuffer::allocate(2);
        let mut b: RawBuffer<Rc<()>> = RawBuffer::allocate(8);
        unsafe {
            a.write(0, tracker.clone());
            a.write(1, tracker.clone());
            a.relocate_into(0, &mut b, 5, 2);
            assert_eq!(Rc::strong_count(&tracker), 3);
            b.drop_range(5, 7);
        }
        assert_eq!(Rc::strong_count(&tracker), 1);
    }

    #[test]
    fn zero_sized_values_need_no_block() {
        let mut buf: RawBuffer<()> = RawBuffer::allocate(16);
        assert_eq!(buf.capacity(), 16);
        unsafe {
            buf.write(15, ());
            buf.read(15);
        }
        let empty: RawBuffer<u64> = RawBuffer::empty();
        assert_eq!(empty.capacity(), 0);
    }
}
