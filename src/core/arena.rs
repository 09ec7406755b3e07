//! Growable slot arena with stable 32-bit indices.
//!
//! Both the hash table's entry pool and the queue's node storage need the
//! same allocation shape: a pre-sized block of slots handed out through a
//! monotonic high-water index, growing by fresh heap segments when the
//! pre-allocation runs out, with every slot addressable by a compact
//! `u32` index for the lifetime of the structure.
//!
//! The arena satisfies three contracts the concurrent structures rely on:
//!
//! 1. **Index stability**: once `alloc` returns an index, `get` on that
//!    index is valid until the arena is dropped. Segments are never moved
//!    or freed while the arena lives, so links packed into atomic words
//!    stay dereferenceable even after the logical node was recycled.
//! 2. **Lock-free fast path**: allocation inside already-installed
//!    capacity is a single `fetch_add`. Only installing a new segment
//!    takes the grow mutex, mirroring the "fresh heap allocation under
//!    the pool mutex" fallback.
//! 3. **No deallocation before teardown**: recycling is the caller's
//!    concern (free list or free stack); the arena itself only grows.
//!
//! Segment 0 is the pre-allocation and has caller-chosen size; segment
//! `k >= 1` holds `chunk << (k - 1)` slots, so capacity doubles per grow
//! and the segment table stays small.
//!
//! Allocation failure is fatal by design: the global allocator aborts on
//! out-of-memory, and exhausting the 32-bit index space panics.

use std::sync::atomic::{AtomicPtr, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Null slot index. No allocation ever returns this value.
pub(crate) const NIL: u32 = u32::MAX;

/// Segment-table size: segment 0 plus 32 doubling segments, enough to
/// cover the whole `u32` index space for any chunk size.
const MAX_SEGMENTS: usize = 33;

/// Pre-sized, growable slot storage addressed by `u32` index.
///
/// `T` must be `Default` so freshly installed segments start in a known
/// state; callers overwrite slot contents when they take ownership of an
/// index.
pub(crate) struct SlotArena<T> {
    /// Segment pointer table. Entry `k` is null until segment `k` is
    /// installed; installed entries are immutable afterwards.
    segments: Box<[AtomicPtr<T>]>,
    /// Number of slots in segment 0 (the pre-allocation).
    base: usize,
    /// Number of slots in segment 1; segment `k` holds `chunk << (k-1)`.
    chunk: usize,
    /// Total slots across installed segments.
    installed: AtomicUsize,
    /// Monotonic high-water allocation index.
    next: AtomicUsize,
    /// Serializes segment installation.
    grow: Mutex<()>,
}

// Safety: the arena hands out `&T` only; all slot storage is owned by the
// arena and freed only in `Drop`, which takes `&mut self`. Sharing the
// arena across threads is therefore exactly as safe as sharing `&T`.
unsafe impl<T: Send> Send for SlotArena<T> {}
unsafe impl<T: Sync> Sync for SlotArena<T> {}

impl<T: Default> SlotArena<T> {
    /// Create an arena with `base` pre-allocated slots, growing in
    /// doubling segments starting at `chunk` slots.
    ///
    /// # Panics
    ///
    /// Panics if `base` or `chunk` is 0.
    pub(crate) fn new(base: usize, chunk: usize) -> Self {
        assert!(base > 0, "arena base size must be > 0");
        assert!(chunk > 0, "arena chunk size must be > 0");

        let segments = (0..MAX_SEGMENTS)
            .map(|_| AtomicPtr::new(std::ptr::null_mut()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        let arena = Self {
            segments,
            base,
            chunk,
            installed: AtomicUsize::new(0),
            next: AtomicUsize::new(0),
            grow: Mutex::new(()),
        };

        // Install the pre-allocation eagerly so the fast path never sees
        // an empty arena.
        arena.install_next_segment();
        arena
    }

    /// Reserve a fresh slot and return its index.
    ///
    /// The returned slot still holds its previous (default or stale)
    /// contents; the caller initializes it before publishing the index.
    ///
    /// # Panics
    ///
    /// Panics if the 32-bit index space is exhausted.
    pub(crate) fn alloc(&self) -> u32 {
        let idx = self.next.fetch_add(1, Ordering::Relaxed);
        assert!(idx < NIL as usize, "slot arena index space exhausted");

        if idx >= self.installed.load(Ordering::Acquire) {
            self.grow_to(idx);
        }

        idx as u32
    }

    /// Get a reference to the slot at `idx`.
    ///
    /// # Panics
    ///
    /// Panics (in debug builds) if `idx` was never returned by `alloc`.
    #[inline]
    pub(crate) fn get(&self, idx: u32) -> &T {
        let (seg, off) = self.locate(idx as usize);
        let ptr = self.segments[seg].load(Ordering::Acquire);
        debug_assert!(!ptr.is_null(), "slot index {} not installed", idx);

        // Safety: `alloc` installs the covering segment before returning
        // an index, and any thread that learned the index did so through
        // an operation that synchronizes with that installation (mutex
        // release or CAS with Release ordering). Segments are never freed
        // or moved while the arena lives.
        unsafe { &*ptr.add(off) }
    }

    /// High-water mark: number of slots ever reserved.
    ///
    /// Best-effort under concurrent allocation.
    pub(crate) fn allocated(&self) -> usize {
        self.next.load(Ordering::Relaxed)
    }

    /// Number of slots in the pre-allocated segment.
    pub(crate) fn preallocated(&self) -> usize {
        self.base
    }

    /// Install segments until `idx` is covered.
    fn grow_to(&self, idx: usize) {
        let _guard = self.grow.lock().expect("arena grow lock poisoned");
        while idx >= self.installed.load(Ordering::Acquire) {
            self.install_next_segment();
        }
    }

    /// Allocate and publish the next uninstalled segment.
    ///
    /// Must only be called from the constructor or under the grow mutex.
    fn install_next_segment(&self) {
        let seg = self
            .segments
            .iter()
            .position(|p| p.load(Ordering::Relaxed).is_null())
            .expect("slot arena segment table exhausted");
        let len = self.segment_len(seg);

        let slots: Box<[T]> = (0..len).map(|_| T::default()).collect();
        let ptr = Box::into_raw(slots) as *mut T;

        self.segments[seg].store(ptr, Ordering::Release);
        self.installed.fetch_add(len, Ordering::Release);
    }
}

impl<T> SlotArena<T> {
    /// Map a slot index to (segment, offset).
    #[inline]
    fn locate(&self, idx: usize) -> (usize, usize) {
        if idx < self.base {
            return (0, idx);
        }
        // Segment k (k >= 1) covers chunk * (2^(k-1) - 1) .. chunk * (2^k - 1)
        // past the base.
        let rel = idx - self.base;
        let q = rel / self.chunk;
        let seg = (q + 1).ilog2() as usize + 1;
        let off = rel - self.chunk * ((1usize << (seg - 1)) - 1);
        (seg, off)
    }

    /// Capacity of segment `seg`.
    fn segment_len(&self, seg: usize) -> usize {
        if seg == 0 {
            self.base
        } else {
            self.chunk << (seg - 1)
        }
    }
}

impl<T> Drop for SlotArena<T> {
    fn drop(&mut self) {
        for seg in 0..self.segments.len() {
            let ptr = *self.segments[seg].get_mut();
            if ptr.is_null() {
                continue;
            }
            let len = self.segment_len(seg);
            // Safety: `ptr` came from `Box::into_raw` on a boxed slice of
            // exactly `len` elements, and `&mut self` guarantees no other
            // reference into the segment exists.
            unsafe {
                drop(Box::from_raw(std::slice::from_raw_parts_mut(ptr, len)));
            }
        }
    }
}

#[cfg(test)]
impl<T> SlotArena<T> {
    /// Total installed slot capacity, for growth assertions.
    fn installed_capacity(&self) -> usize {
        self.installed.load(Ordering::Acquire)
    }
}
