//! # Recycling Pool
//!
//! Fixed-capacity slot pool for short-lived objects such as particles.
//! When the pool is full, inserting recycles the slot of the oldest live
//! object instead of failing.

/// A fixed-capacity pool that evicts its oldest entry when full.
///
/// All slots are pre-allocated. Insert, remove and lookup never touch the
/// heap; eviction scans the slots once to find the oldest entry.
///
/// # Example
///
/// ```rust,ignore
/// struct Particle { x: f32, y: f32, life: f32 }
///
/// let mut pool: RecyclingPool<Particle> = RecyclingPool::new(256);
/// let (handle, evicted) = pool.insert(Particle { x: 0.0, y: 0.0, life: 1.0 });
/// assert!(evicted.is_none());
///
/// pool.retain(|p| p.life > 0.0);
/// ```
pub struct RecyclingPool<T> {
    slots: Box<[Slot<T>]>,
    /// Indices of empty slots.
    free_list: Vec<usize>,
    live: usize,
    /// Monotonic insertion counter, used to find the oldest entry.
    next_stamp: u64,
}

struct Slot<T> {
    value: Option<T>,
    stamp: u64,
}

/// Handle to an object in a pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoolHandle {
    index: usize,
    stamp: u64,
}

impl PoolHandle {
    /// Slot index inside the pool.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.index
    }
}

impl<T> RecyclingPool<T> {
    /// Creates a pool with `capacity` slots.
    ///
    /// # Panics
    ///
    /// Panics if capacity is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "Capacity must be greater than zero");

        let slots = (0..capacity)
            .map(|_| Slot {
                value: None,
                stamp: 0,
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            slots,
            free_list: (0..capacity).rev().collect(),
            live: 0,
            next_stamp: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of live objects.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if the pool holds nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Stores `value`, evicting the oldest object if the pool is full.
    ///
    /// Returns the new handle and the evicted value, if any.
    pub fn insert(&mut self, value: T) -> (PoolHandle, Option<T>) {
        let stamp = self.next_stamp;
        self.next_stamp += 1;

        let (index, evicted) = match self.free_list.pop() {
            Some(index) => {
                self.live += 1;
                (index, None)
            }
            None => {
                let index = self.oldest_index();
                (index, self.slots[index].value.take())
            }
        };

        let slot = &mut self.slots[index];
        slot.value = Some(value);
        slot.stamp = stamp;

        (PoolHandle { index, stamp }, evicted)
    }

    /// Index of the live slot with the smallest stamp.
    ///
    /// Only called when the pool is full, so every slot is live.
    fn oldest_index(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .min_by_key(|(_, slot)| slot.stamp)
            .map_or(0, |(index, _)| index)
    }

    /// Removes an object.
    ///
    /// Returns `None` if the handle is stale (its slot was recycled).
    pub fn remove(&mut self, handle: PoolHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.stamp != handle.stamp {
            return None;
        }

        let value = slot.value.take()?;
        self.free_list.push(handle.index);
        self.live -= 1;
        Some(value)
    }

    /// Gets an object by handle.
    #[inline]
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index)?;
        if slot.stamp != handle.stamp {
            return None;
        }
        slot.value.as_ref()
    }

    /// Gets an object by handle, mutably.
    #[inline]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index)?;
        if slot.stamp != handle.stamp {
            return None;
        }
        slot.value.as_mut()
    }

    /// Keeps only the objects for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut T) -> bool) {
        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(value) = slot.value.as_mut() else {
                continue;
            };
            if !keep(value) {
                slot.value = None;
                self.free_list.push(index);
                self.live -= 1;
            }
        }
    }

    /// Empties the pool without releasing memory.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.value = None;
        }
        self.free_list.clear();
        self.free_list.extend((0..self.slots.len()).rev());
        self.live = 0;
    }

    /// Iterates over live objects in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.slots.iter().filter_map(|slot| slot.value.as_ref())
    }

    /// Iterates mutably over live objects in slot order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.slots.iter_mut().filter_map(|slot| slot.value.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut pool: RecyclingPool<u32> = RecyclingPool::new(4);

        let (h, evicted) = pool.insert(42);
        assert!(evicted.is_none());
        assert_eq!(pool.get(h), Some(&42));
        assert_eq!(pool.len(), 1);

        assert_eq!(pool.remove(h), Some(42));
        assert!(pool.is_empty());
        assert_eq!(pool.remove(h), None);
    }

    #[test]
    fn test_full_pool_evicts_oldest() {
        let mut pool: RecyclingPool<u32> = RecyclingPool::new(3);
        let (first, _) = pool.insert(1);
        pool.insert(2);
        pool.insert(3);

        let (h, evicted) = pool.insert(4);
        assert_eq!(evicted, Some(1));
        assert_eq!(pool.len(), 3);
        assert_eq!(h.index(), first.index());
        assert!(pool.get(first).is_none(), "stale handle must not alias");

        let (_, evicted) = pool.insert(5);
        assert_eq!(evicted, Some(2));
    }

    #[test]
    fn test_retain_frees_slots() {
        let mut pool: RecyclingPool<u32> = RecyclingPool::new(4);
        for v in 0..4 {
            pool.insert(v);
        }
        pool.retain(|v| *v % 2 == 0);
        assert_eq!(pool.len(), 2);

        let (_, evicted) = pool.insert(9);
        assert!(evicted.is_none());
        assert_eq!(pool.iter().copied().collect::<Vec<_>>().len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut pool: RecyclingPool<u8> = RecyclingPool::new(2);
        pool.insert(1);
        pool.insert(2);
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.iter().count(), 0);
    }

    #[test]
    fn test_len_never_exceeds_capacity() {
        let mut pool: RecyclingPool<usize> = RecyclingPool::new(8);
        for v in 0..100 {
            pool.insert(v);
            assert!(pool.len() <= pool.capacity());
        }
        assert_eq!(pool.len(), 8);
    }
}
