//! # Sprite Allocator
//!
//! Fixed-capacity pool of sprite records with O(1) allocate and release.
//!
//! ## Architecture
//!
//! Every slot sits on exactly one of two intrusive doubly-linked lists:
//! the active list or the free list. Allocation pops the free-list head and
//! pushes it onto the active list; release unlinks the slot from wherever
//! it sits in the active list (head, middle, tail or sole element) and
//! pushes it back onto the free list. No slot storage moves after
//! construction.
//!
//! Handles carry a generation counter that is bumped on release, so a
//! handle kept past its release is rejected rather than aliasing whatever
//! reuses the slot.

use thiserror::Error;

use crate::render::primitives::Sprite;

/// Result type for allocator operations
pub type AllocatorResult<T> = Result<T, AllocatorError>;

/// Allocator errors
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorError {
    /// Every slot is active
    #[error("Sprite pool exhausted: all {capacity} slots are active")]
    Exhausted {
        /// Pool capacity
        capacity: usize,
    },

    /// Handle refers to a released or never-allocated slot
    #[error("Stale sprite handle (index {index}, generation {generation})")]
    StaleHandle {
        /// Slot index
        index: u32,
        /// Generation carried by the handle
        generation: u32,
    },
}

/// Handle to an allocated sprite slot with generation counter for safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle {
    /// Index in the slot array
    pub index: u32,
    /// Generation at allocation time
    pub generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum List {
    Active,
    Free,
}

#[derive(Debug)]
struct Slot<T> {
    value: Option<T>,
    prev: Option<u32>,
    next: Option<u32>,
    generation: u32,
    active: bool,
}

/// Fixed-capacity sprite pool
#[derive(Debug)]
pub struct SpriteAllocator<T = Sprite> {
    slots: Vec<Slot<T>>,
    active_head: Option<u32>,
    free_head: Option<u32>,
    active_count: usize,
}

impl<T> SpriteAllocator<T> {
    /// Create a pool with `capacity` slots, all free
    ///
    /// # Panics
    ///
    /// Panics if `capacity` does not fit in a `u32` slot index.
    pub fn new(capacity: usize) -> Self {
        assert!(u32::try_from(capacity).is_ok(), "sprite pool capacity {} too large", capacity);

        let last = capacity.saturating_sub(1) as u32;
        let slots = (0..capacity as u32)
            .map(|i| Slot {
                value: None,
                prev: i.checked_sub(1),
                next: (i < last).then_some(i + 1),
                generation: 0,
                active: false,
            })
            .collect();

        Self {
            slots,
            active_head: None,
            free_head: (capacity > 0).then_some(0),
            active_count: 0,
        }
    }

    /// Move a free slot onto the active list and store `value` in it
    pub fn allocate(&mut self, value: T) -> AllocatorResult<SpriteHandle> {
        let index = self.free_head.ok_or(AllocatorError::Exhausted {
            capacity: self.capacity(),
        })?;

        self.unlink(List::Free, index);
        self.push_front(List::Active, index);

        let slot = &mut self.slots[index as usize];
        slot.value = Some(value);
        slot.active = true;
        self.active_count += 1;

        Ok(SpriteHandle {
            index,
            generation: slot.generation,
        })
    }

    /// Return a slot to the free list, handing back its value
    pub fn release(&mut self, handle: SpriteHandle) -> AllocatorResult<T> {
        if !self.is_valid(handle) {
            return Err(AllocatorError::StaleHandle {
                index: handle.index,
                generation: handle.generation,
            });
        }

        self.unlink(List::Active, handle.index);
        self.push_front(List::Free, handle.index);
        self.active_count -= 1;

        let slot = &mut self.slots[handle.index as usize];
        slot.active = false;
        slot.generation = slot.generation.wrapping_add(1);
        slot.value.take().ok_or(AllocatorError::StaleHandle {
            index: handle.index,
            generation: handle.generation,
        })
    }

    /// Release every active slot
    pub fn clear(&mut self) {
        let mut cursor = self.active_head;
        while let Some(index) = cursor {
            let slot = &mut self.slots[index as usize];
            cursor = slot.next;
            slot.value = None;
            slot.active = false;
            slot.generation = slot.generation.wrapping_add(1);
            self.push_front(List::Free, index);
        }
        self.active_head = None;
        self.active_count = 0;
    }

    /// Check if a handle refers to a live slot
    pub fn is_valid(&self, handle: SpriteHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|slot| slot.active && slot.generation == handle.generation)
    }

    /// Validate handle and get the value
    pub fn get(&self, handle: SpriteHandle) -> Option<&T> {
        if self.is_valid(handle) {
            self.slots[handle.index as usize].value.as_ref()
        } else {
            None
        }
    }

    /// Validate handle and get the value mutably
    pub fn get_mut(&mut self, handle: SpriteHandle) -> Option<&mut T> {
        if self.is_valid(handle) {
            self.slots[handle.index as usize].value.as_mut()
        } else {
            None
        }
    }

    /// Iterate active slots, most recently allocated first
    pub fn iter_active(&self) -> ActiveIter<'_, T> {
        ActiveIter {
            slots: &self.slots,
            cursor: self.active_head,
        }
    }

    /// Visit every active value mutably
    pub fn for_each_active_mut(&mut self, mut f: impl FnMut(SpriteHandle, &mut T)) {
        let mut cursor = self.active_head;
        while let Some(index) = cursor {
            let slot = &mut self.slots[index as usize];
            cursor = slot.next;
            let handle = SpriteHandle {
                index,
                generation: slot.generation,
            };
            if let Some(value) = slot.value.as_mut() {
                f(handle, value);
            }
        }
    }

    /// Number of active slots
    pub fn active_count(&self) -> usize {
        self.active_count
    }

    /// Number of free slots
    pub fn free_count(&self) -> usize {
        self.capacity() - self.active_count
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Whether no slot is active
    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }

    fn head_mut(&mut self, list: List) -> &mut Option<u32> {
        match list {
            List::Active => &mut self.active_head,
            List::Free => &mut self.free_head,
        }
    }

    fn unlink(&mut self, list: List, index: u32) {
        let (prev, next) = {
            let slot = &self.slots[index as usize];
            (slot.prev, slot.next)
        };

        match prev {
            Some(p) => self.slots[p as usize].next = next,
            None => *self.head_mut(list) = next,
        }
        if let Some(n) = next {
            self.slots[n as usize].prev = prev;
        }

        let slot = &mut self.slots[index as usize];
        slot.prev = None;
        slot.next = None;
    }

    fn push_front(&mut self, list: List, index: u32) {
        let head = *self.head_mut(list);
        if let Some(h) = head {
            self.slots[h as usize].prev = Some(index);
        }

        let slot = &mut self.slots[index as usize];
        slot.prev = None;
        slot.next = head;
        *self.head_mut(list) = Some(index);
    }
}

/// Iterator over active slots
pub struct ActiveIter<'a, T> {
    slots: &'a [Slot<T>],
    cursor: Option<u32>,
}

impl<'a, T> Iterator for ActiveIter<'a, T> {
    type Item = (SpriteHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let index = self.cursor?;
            let slot = &self.slots[index as usize];
            self.cursor = slot.next;
            if let Some(value) = slot.value.as_ref() {
                let handle = SpriteHandle {
                    index,
                    generation: slot.generation,
                };
                return Some((handle, value));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    impl<T> SpriteAllocator<T> {
        /// Walk a list forwards, checking back links, and return its indices
        fn walk(&self, list: List) -> Vec<u32> {
            let mut out = Vec::new();
            let mut prev = None;
            let mut cursor = match list {
                List::Active => self.active_head,
                List::Free => self.free_head,
            };
            while let Some(index) = cursor {
                let slot = &self.slots[index as usize];
                assert_eq!(slot.prev, prev, "broken back link at {}", index);
                assert_eq!(slot.active, list == List::Active);
                out.push(index);
                prev = Some(index);
                cursor = slot.next;
                assert!(out.len() <= self.slots.len(), "cycle in list");
            }
            out
        }

        fn assert_partitioned(&self) {
            let active = self.walk(List::Active);
            let free = self.walk(List::Free);
            assert_eq!(active.len(), self.active_count);
            assert_eq!(active.len() + free.len(), self.capacity());

            let all: HashSet<u32> = active.iter().chain(free.iter()).copied().collect();
            assert_eq!(all.len(), self.capacity(), "a slot is on both lists");
        }
    }

    #[test]
    fn test_fresh_pool_is_all_free() {
        let pool: SpriteAllocator<u32> = SpriteAllocator::new(8);
        assert_eq!(pool.free_count(), 8);
        assert_eq!(pool.active_count(), 0);
        pool.assert_partitioned();
    }

    #[test]
    fn test_capacity_two_allocate_release_cycle() {
        let mut pool = SpriteAllocator::new(2);
        let a = pool.allocate(1).expect("first");
        let b = pool.allocate(2).expect("second");
        assert!(matches!(pool.allocate(3), Err(AllocatorError::Exhausted { capacity: 2 })));

        assert_eq!(pool.release(a), Ok(1));
        assert_eq!(pool.free_count(), 1);
        pool.assert_partitioned();

        let c = pool.allocate(3).expect("reuse");
        assert_eq!(c.index, a.index);
        assert_ne!(c.generation, a.generation);
        assert_eq!(pool.get(b), Some(&2));
        pool.assert_partitioned();
    }

    #[test]
    fn test_release_head_middle_tail_and_sole() {
        let mut pool = SpriteAllocator::new(4);
        let handles: Vec<_> = (0..4).map(|i| pool.allocate(i).expect("alloc")).collect();
        // Active list order is [3, 2, 1, 0]; release middle, head, tail, then the last one
        for index in [1usize, 3, 0, 2] {
            pool.release(handles[index]).expect("release");
            pool.assert_partitioned();
        }
        assert!(pool.is_empty());
        assert_eq!(pool.free_count(), 4);
    }

    #[test]
    fn test_stale_handle_rejected() {
        let mut pool = SpriteAllocator::new(2);
        let a = pool.allocate("a").expect("alloc");
        pool.release(a).expect("release");

        assert!(matches!(pool.release(a), Err(AllocatorError::StaleHandle { .. })));
        assert!(pool.get(a).is_none());

        // The reused slot is not reachable through the old handle
        let b = pool.allocate("b").expect("alloc");
        assert_eq!(b.index, a.index);
        assert!(pool.get_mut(a).is_none());
        assert_eq!(pool.get(b), Some(&"b"));
    }

    #[test]
    fn test_out_of_range_handle_rejected() {
        let mut pool: SpriteAllocator<u8> = SpriteAllocator::new(1);
        let bogus = SpriteHandle { index: 9, generation: 0 };
        assert!(pool.release(bogus).is_err());
    }

    #[test]
    fn test_clear_frees_everything() {
        let mut pool = SpriteAllocator::new(5);
        let handles: Vec<_> = (0..3).map(|i| pool.allocate(i).expect("alloc")).collect();
        pool.clear();

        assert!(pool.is_empty());
        assert_eq!(pool.free_count(), 5);
        pool.assert_partitioned();
        assert!(handles.iter().all(|h| !pool.is_valid(*h)));

        for i in 0..5 {
            pool.allocate(i).expect("capacity restored");
        }
        pool.assert_partitioned();
    }

    #[test]
    fn test_iter_active_visits_live_values() {
        let mut pool = SpriteAllocator::new(4);
        let a = pool.allocate(10).expect("alloc");
        pool.allocate(20).expect("alloc");
        pool.allocate(30).expect("alloc");
        pool.release(a).expect("release");

        let mut values: Vec<i32> = pool.iter_active().map(|(_, v)| *v).collect();
        values.sort_unstable();
        assert_eq!(values, vec![20, 30]);

        pool.for_each_active_mut(|_, v| *v += 1);
        let total: i32 = pool.iter_active().map(|(_, v)| *v).sum();
        assert_eq!(total, 52);
    }

    #[test]
    fn test_zero_capacity_is_always_exhausted() {
        let mut pool = SpriteAllocator::new(0);
        assert!(matches!(pool.allocate(()), Err(AllocatorError::Exhausted { capacity: 0 })));
        pool.assert_partitioned();
    }

    #[test]
    fn test_random_churn_keeps_lists_consistent() {
        let mut pool = SpriteAllocator::new(16);
        let mut live = Vec::new();
        let mut seed = 0x2545_f491_u32;
        for step in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            if seed % 3 != 0 && pool.free_count() > 0 {
                live.push(pool.allocate(step).expect("free slot"));
            } else if !live.is_empty() {
                let victim = live.swap_remove(seed as usize % live.len());
                pool.release(victim).expect("live handle");
            }
            assert_eq!(pool.active_count(), live.len());
        }
        pool.assert_partitioned();
    }
}
