//! Raw storage blocks and the lease handed out by the pool

use std::{
    alloc::{self, Layout},
    fmt,
    ptr::NonNull,
    slice,
    sync::Arc,
};

/// Fixed-capacity heap allocation backing one pool entry.
///
/// Zero-filled on creation so a view is always readable; the pool's contract
/// still makes no promise about a fresh lease's contents beyond what the
/// holder wrote. The registry and any outstanding lease share the block
/// through an `Arc`, so eviction can never free memory out from under a
/// holder.
pub(crate) struct Block {
    ptr: NonNull<u8>,
    capacity: usize,
}

impl Block {
    pub(crate) fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        let layout =
            Layout::from_size_align(capacity, 1).expect("buffer capacity exceeds isize::MAX");
        let ptr = unsafe { alloc::alloc_zeroed(layout) };
        let ptr = NonNull::new(ptr).unwrap_or_else(|| alloc::handle_alloc_error(layout));
        Self { ptr, capacity }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    pub(crate) fn as_ptr(&self) -> *mut u8 {
        self.ptr.as_ptr()
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        // Layout was validated at construction
        let layout = unsafe { Layout::from_size_align_unchecked(self.capacity, 1) };
        unsafe { alloc::dealloc(self.ptr.as_ptr(), layout) };
    }
}

impl fmt::Debug for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Block")
            .field("capacity", &self.capacity)
            .finish()
    }
}

unsafe impl Send for Block {}
unsafe impl Sync for Block {}

/// Exclusive view over a pooled buffer, truncated to the requested length
///
/// The view is bounded to exactly the length passed to
/// [`acquire`](super::BufferPool::acquire); excess capacity in the underlying
/// entry stays hidden. While the entry is marked in-use the pool never touches
/// the block contents, so the lease holder has the only live view.
///
/// The pool does not police a lease outliving its release: a caller that
/// releases the identifier, keeps the lease, and lets someone else acquire the
/// same entry gets the aliasing it asked for.
pub struct BufferLease {
    id: u64,
    len: usize,
    reused: bool,
    block: Arc<Block>,
}

impl BufferLease {
    pub(crate) fn new(id: u64, block: Arc<Block>, len: usize, reused: bool) -> Self {
        debug_assert!(len <= block.capacity());
        Self {
            id,
            len,
            reused,
            block,
        }
    }

    /// Identifier of the pool entry backing this lease
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Length of the view in bytes (exactly the requested size)
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the view is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether this lease reused an existing entry (cache hit)
    pub fn reused(&self) -> bool {
        self.reused
    }

    /// Get the view as a byte slice
    pub fn as_slice(&self) -> &[u8] {
        unsafe { slice::from_raw_parts(self.block.as_ptr(), self.len) }
    }

    /// Get the view as a mutable byte slice
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        unsafe { slice::from_raw_parts_mut(self.block.as_ptr(), self.len) }
    }

    /// Copy `src` into the start of the view
    ///
    /// Panics if `src` is longer than the view.
    pub fn copy_from_slice(&mut self, src: &[u8]) {
        assert!(src.len() <= self.len, "source exceeds lease length");
        self.as_mut_slice()[..src.len()].copy_from_slice(src);
    }
}

impl fmt::Debug for BufferLease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferLease")
            .field("id", &self.id)
            .field("len", &self.len)
            .field("reused", &self.reused)
            .finish()
    }
}

impl AsRef<[u8]> for BufferLease {
    fn as_ref(&self) -> &[u8] {
        self.as_slice()
    }
}

impl AsMut<[u8]> for BufferLease {
    fn as_mut(&mut self) -> &mut [u8] {
        self.as_mut_slice()
    }
}

unsafe impl Send for BufferLease {}
