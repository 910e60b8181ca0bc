//! # Frame Arena
//!
//! Recycled buffers for allocations that live exactly one frame.
//!
//! A frame acquires its buffers through [`Arena::acquire`]. The returned
//! [`ArenaVec`] guard derefs to a `Vec<T>`; when it drops (normal frame end,
//! early `?` return, or unwinding) the buffer is cleared and handed back to the
//! arena with its capacity intact. After the first few frames no per-frame
//! heap allocation happens at all.

use std::cell::{Cell, RefCell};
use std::ops::{Deref, DerefMut};

/// Usage statistics of an [`Arena`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Buffers currently handed out.
    pub in_use: usize,
    /// Buffers parked in the free list.
    pub pooled: usize,
    /// Largest element count any buffer reached.
    pub high_water: usize,
    /// Number of buffers created because the free list was empty.
    pub allocations: usize,
}

/// A pool of reusable `Vec<T>` buffers.
///
/// # Thread Safety
///
/// This arena is NOT thread-safe. Use one arena per thread.
///
/// # Example
///
/// ```rust
/// use glint_core::Arena;
///
/// let arena: Arena<u32> = Arena::new(1024);
/// {
///     let mut scratch = arena.acquire();
///     scratch.extend([1, 2, 3]);
///     assert_eq!(scratch.len(), 3);
/// } // released here
///
/// assert!(arena.acquire().is_empty());
/// ```
pub struct Arena<T> {
    /// Parked buffers, all empty.
    free: RefCell<Vec<Vec<T>>>,
    /// Initial capacity for freshly created buffers.
    capacity: usize,
    /// Buffers handed out.
    in_use: Cell<usize>,
    /// Largest length observed at release.
    high_water: Cell<usize>,
    /// Fresh buffer creations.
    allocations: Cell<usize>,
}

impl<T> Arena<T> {
    /// Creates an arena whose buffers start with room for `capacity` elements.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            free: RefCell::new(Vec::new()),
            capacity,
            in_use: Cell::new(0),
            high_water: Cell::new(0),
            allocations: Cell::new(0),
        }
    }

    /// Returns the initial capacity of fresh buffers.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Acquires an empty buffer for the duration of the guard.
    pub fn acquire(&self) -> ArenaVec<'_, T> {
        let buffer = self.free.borrow_mut().pop().unwrap_or_else(|| {
            self.allocations.set(self.allocations.get() + 1);
            Vec::with_capacity(self.capacity)
        });
        self.in_use.set(self.in_use.get() + 1);
        ArenaVec {
            arena: self,
            buffer,
        }
    }

    /// Returns current usage statistics.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            in_use: self.in_use.get(),
            pooled: self.free.borrow().len(),
            high_water: self.high_water.get(),
            allocations: self.allocations.get(),
        }
    }

    /// Drops every parked buffer and returns their memory to the allocator.
    pub fn trim(&self) {
        self.free.borrow_mut().clear();
    }

    fn release(&self, mut buffer: Vec<T>) {
        self.high_water.set(self.high_water.get().max(buffer.len()));
        self.in_use.set(self.in_use.get().saturating_sub(1));
        buffer.clear();
        self.free.borrow_mut().push(buffer);
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new(256)
    }
}

/// A buffer borrowed from an [`Arena`], returned on drop.
pub struct ArenaVec<'a, T> {
    arena: &'a Arena<T>,
    buffer: Vec<T>,
}

impl<T> Deref for ArenaVec<'_, T> {
    type Target = Vec<T>;

    fn deref(&self) -> &Vec<T> {
        &self.buffer
    }
}

impl<T> DerefMut for ArenaVec<'_, T> {
    fn deref_mut(&mut self) -> &mut Vec<T> {
        &mut self.buffer
    }
}

impl<T> Drop for ArenaVec<'_, T> {
    fn drop(&mut self) {
        self.arena.release(std::mem::take(&mut self.buffer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_reuses_buffers() {
        let arena: Arena<u64> = Arena::new(16);

        {
            let mut buffer = arena.acquire();
            buffer.extend(0..100);
        }
        {
            let buffer = arena.acquire();
            assert!(buffer.is_empty());
            assert!(buffer.capacity() >= 100);
        }

        let stats = arena.stats();
        assert_eq!(stats.allocations, 1);
        assert_eq!(stats.high_water, 100);
        assert_eq!(stats.in_use, 0);
        assert_eq!(stats.pooled, 1);
    }

    #[test]
    fn test_release_on_early_return() {
        fn fails(arena: &Arena<u32>) -> Result<(), ()> {
            let mut buffer = arena.acquire();
            buffer.push(7);
            Err(())
        }

        let arena = Arena::new(4);
        assert!(fails(&arena).is_err());
        assert_eq!(arena.stats().in_use, 0);
        assert_eq!(arena.stats().pooled, 1);
    }

    #[test]
    fn test_nested_acquire() {
        let arena: Arena<u8> = Arena::new(4);
        let a = arena.acquire();
        let b = arena.acquire();
        assert_eq!(arena.stats().in_use, 2);
        drop(a);
        drop(b);
        assert_eq!(arena.stats().pooled, 2);
    }
}
