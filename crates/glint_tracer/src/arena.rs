//! Linear scratch arena for per-thread intersection lists.
//!
//! An [`Arena`] has a hard maximum size fixed at construction and a committed
//! region that grows by doubling as elements are appended. Appends, pops and
//! clears are O(1) amortized; clearing keeps the committed storage so a worker
//! can reuse it for every pixel without touching the allocator again.
//!
//! Elements are only ever appended at the end; nothing already written is
//! reordered except through [`Arena::as_mut_slice`].

use std::mem;

use thiserror::Error;

/// Errors raised when building or filling an arena.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArenaError {
    #[error("Arena element type is zero-sized")]
    ZeroSizedType,

    #[error("Arena capacity of {bytes} bytes cannot hold a single element")]
    ZeroCapacity { bytes: usize },

    #[error("Initial length {initial} exceeds arena capacity of {max} elements")]
    InitialExceedsCapacity { initial: usize, max: usize },

    #[error("Arena is full ({max} elements)")]
    Full { max: usize },
}

/// Bump allocator with a fixed ceiling and doubling commitment.
#[derive(Debug)]
pub struct Arena<T> {
    items: Vec<T>,
    committed: usize,
    initial_len: usize,
    max_len: usize,
    overflowed: usize,
}

impl<T: Copy> Arena<T> {
    /// Create an arena that may grow to `max_capacity_bytes`, with room for
    /// `initial_len` elements committed up front.
    pub fn new(max_capacity_bytes: usize, initial_len: usize) -> Result<Self, ArenaError> {
        let size = mem::size_of::<T>();
        if size == 0 {
            return Err(ArenaError::ZeroSizedType);
        }

        let max_len = max_capacity_bytes / size;
        if max_len == 0 {
            return Err(ArenaError::ZeroCapacity {
                bytes: max_capacity_bytes,
            });
        }
        if initial_len > max_len {
            return Err(ArenaError::InitialExceedsCapacity {
                initial: initial_len,
                max: max_len,
            });
        }

        let initial_len = initial_len.max(1);
        Ok(Self {
            items: Vec::with_capacity(initial_len),
            committed: initial_len,
            initial_len,
            max_len,
            overflowed: 0,
        })
    }

    /// A new empty arena with the same limits as this one.
    pub fn fresh(&self) -> Self {
        Self {
            items: Vec::with_capacity(self.initial_len),
            committed: self.initial_len,
            initial_len: self.initial_len,
            max_len: self.max_len,
            overflowed: 0,
        }
    }

    /// Append an element.
    ///
    /// Once the arena sits at its maximum the element is dropped and the
    /// overflow counter is bumped; see [`Arena::take_overflowed`].
    #[inline]
    pub fn push(&mut self, item: T) {
        if self.try_push(item).is_err() {
            self.overflowed += 1;
        }
    }

    /// Append an element, reporting a full arena instead of dropping.
    pub fn try_push(&mut self, item: T) -> Result<(), ArenaError> {
        if self.items.len() == self.committed && !self.grow() {
            return Err(ArenaError::Full { max: self.max_len });
        }
        self.items.push(item);
        Ok(())
    }

    /// Double the committed region, clamped to the maximum.
    fn grow(&mut self) -> bool {
        let target = self.committed.saturating_mul(2).min(self.max_len);
        if target <= self.committed {
            return false;
        }
        self.items.reserve_exact(target - self.items.len());
        self.committed = target;
        true
    }

    /// Remove and return the last element.
    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    /// Shorten the logical length to `len`, keeping committed storage.
    pub fn truncate(&mut self, len: usize) {
        self.items.truncate(len);
    }

    /// Reset the logical length to zero. Committed storage is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Reset and hand committed storage beyond the initial commitment back to
    /// the allocator.
    pub fn release(&mut self) {
        self.items.clear();
        self.items.shrink_to(self.initial_len);
        self.committed = self.initial_len;
    }

    /// Element at `index`, bounds-checked against the logical length.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of elements the committed region can hold.
    pub fn committed_len(&self) -> usize {
        self.committed
    }

    /// Hard element ceiling.
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn used_bytes(&self) -> usize {
        self.items.len() * mem::size_of::<T>()
    }

    pub fn committed_bytes(&self) -> usize {
        self.committed * mem::size_of::<T>()
    }

    pub fn capacity_bytes(&self) -> usize {
        self.max_len * mem::size_of::<T>()
    }

    /// Number of elements dropped by [`Arena::push`] since the last call to
    /// [`Arena::take_overflowed`].
    pub fn overflowed(&self) -> usize {
        self.overflowed
    }

    /// Return and reset the dropped-element counter.
    pub fn take_overflowed(&mut self) -> usize {
        mem::take(&mut self.overflowed)
    }
}

impl<T: Copy> std::ops::Index<usize> for Arena<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        &self.items[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_rejects_bad_layouts() {
        assert_eq!(
            Arena::<()>::new(1024, 4).unwrap_err(),
            ArenaError::ZeroSizedType
        );
        assert_eq!(
            Arena::<u64>::new(4, 0).unwrap_err(),
            ArenaError::ZeroCapacity { bytes: 4 }
        );
        assert_eq!(
            Arena::<u64>::new(64, 9).unwrap_err(),
            ArenaError::InitialExceedsCapacity { initial: 9, max: 8 }
        );
    }

    #[test]
    fn test_arena_append_and_read_back() {
        let mut arena = Arena::<u32>::new(4096, 4).unwrap();
        for i in 0..100 {
            arena.push(i * 3);
        }

        assert_eq!(arena.len(), 100);
        for i in 0..100 {
            assert_eq!(arena[i], i as u32 * 3);
        }
        assert_eq!(arena.get(100), None);
        assert_eq!(arena.overflowed(), 0);
    }

    #[test]
    fn test_arena_commit_doubles() {
        let mut arena = Arena::<u64>::new(8 * 64, 4).unwrap();
        assert_eq!(arena.committed_len(), 4);

        for i in 0..5 {
            arena.push(i);
        }
        assert_eq!(arena.committed_len(), 8);

        for i in 5..17 {
            arena.push(i);
        }
        assert_eq!(arena.committed_len(), 32);
        assert_eq!(arena.used_bytes(), 17 * 8);
        assert_eq!(arena.committed_bytes(), 32 * 8);
        assert_eq!(arena.capacity_bytes(), 64 * 8);
    }

    #[test]
    fn test_arena_overflow_drops_items() {
        let mut arena = Arena::<u64>::new(8 * 6, 2).unwrap();
        for i in 0..10 {
            arena.push(i);
        }

        assert_eq!(arena.len(), 6);
        assert_eq!(arena.as_slice(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(arena.take_overflowed(), 4);
        assert_eq!(arena.overflowed(), 0);
        assert_eq!(arena.try_push(99), Err(ArenaError::Full { max: 6 }));
    }

    #[test]
    fn test_arena_clear_reuses_storage() {
        let mut arena = Arena::<u32>::new(1 << 20, 16).unwrap();
        for i in 0..1000 {
            arena.push(i);
        }
        let committed = arena.committed_len();
        let base = arena.as_slice().as_ptr();

        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.get(0), None);
        assert_eq!(arena.committed_len(), committed);

        for i in 0..1000 {
            arena.push(i + 1);
        }
        assert_eq!(arena.as_slice().as_ptr(), base);
        assert_eq!(arena[999], 1000);
    }

    #[test]
    fn test_arena_pop_and_truncate() {
        let mut arena = Arena::<i32>::new(1024, 4).unwrap();
        for i in 0..6 {
            arena.push(i);
        }

        assert_eq!(arena.pop(), Some(5));
        arena.truncate(2);
        assert_eq!(arena.as_slice(), &[0, 1]);
        arena.truncate(10);
        assert_eq!(arena.len(), 2);
    }

    #[test]
    fn test_arena_release_returns_to_initial_commitment() {
        let mut arena = Arena::<u64>::new(1 << 16, 8).unwrap();
        for i in 0..500 {
            arena.push(i);
        }
        assert!(arena.committed_len() >= 500);

        arena.release();
        assert!(arena.is_empty());
        assert_eq!(arena.committed_len(), 8);
    }

    #[test]
    fn test_arena_fresh_keeps_limits() {
        let mut arena = Arena::<u16>::new(100, 3).unwrap();
        arena.push(7);
        let other = arena.fresh();

        assert!(other.is_empty());
        assert_eq!(other.max_len(), arena.max_len());
        assert_eq!(other.committed_len(), 3);
    }
}
