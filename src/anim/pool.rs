//! Fixed-capacity object pool
//!
//! All instances are created once by `build`; afterwards instances only move
//! between the idle and active partitions. The pool never grows, so callers
//! must treat `acquire() == None` as "skip this spawn".

/// Index of an instance inside its pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle(usize);

impl PoolHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Pre-allocated instances partitioned into idle and active
#[derive(Debug, Clone)]
pub struct ObjectPool<T> {
    items: Vec<T>,
    idle: Vec<usize>,
    active: Vec<usize>,
    /// Membership flags, indexed like `items`
    is_active: Vec<bool>,
}

impl<T> ObjectPool<T> {
    /// Create `capacity` instances up front, all idle
    pub fn build(capacity: usize, mut factory: impl FnMut(usize) -> T) -> Self {
        let items: Vec<T> = (0..capacity).map(&mut factory).collect();
        // Reverse so the first acquire hands out index 0
        let idle: Vec<usize> = (0..capacity).rev().collect();
        log::info!("Built object pool with {} instances", capacity);
        Self {
            items,
            idle,
            active: Vec::with_capacity(capacity),
            is_active: vec![false; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.items.len()
    }

    pub fn idle_count(&self) -> usize {
        self.idle.len()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Move one idle instance to active. `None` when the pool is exhausted.
    pub fn acquire(&mut self) -> Option<PoolHandle> {
        let index = self.idle.pop()?;
        self.is_active[index] = true;
        self.active.push(index);
        Some(PoolHandle(index))
    }

    /// Move an active instance back to idle.
    ///
    /// Releasing a handle that is not active is a logic error: it panics in
    /// debug builds and is ignored (returning false) in release builds.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        debug_assert!(
            self.is_active(handle),
            "released pool handle {:?} that is not active",
            handle
        );
        if !self.is_active(handle) {
            log::warn!("Ignoring release of inactive pool handle {:?}", handle);
            return false;
        }

        if let Some(pos) = self.active.iter().position(|&i| i == handle.0) {
            self.active.swap_remove(pos);
        }
        self.is_active[handle.0] = false;
        self.idle.push(handle.0);
        true
    }

    /// Release every active instance
    pub fn release_all(&mut self) {
        for index in self.active.drain(..) {
            self.is_active[index] = false;
            self.idle.push(index);
        }
    }

    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.is_active.get(handle.0).copied().unwrap_or(false)
    }

    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        self.items.get(handle.0)
    }

    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        self.items.get_mut(handle.0)
    }

    /// Every instance, idle ones included (render layers draw all and let
    /// inactive instances suppress themselves)
    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &T> {
        self.active.iter().map(|&i| &self.items[i])
    }

    pub fn active_handles(&self) -> impl Iterator<Item = PoolHandle> + '_ {
        self.active.iter().map(|&i| PoolHandle(i))
    }

    /// Visit every active instance; those for which `keep` returns false are
    /// released back to idle. Returns how many were released.
    pub fn retain_active(&mut self, mut keep: impl FnMut(&mut T) -> bool) -> usize {
        let mut released = 0;
        // Walk backwards so swap_remove never skips an element
        let mut i = self.active.len();
        while i > 0 {
            i -= 1;
            let index = self.active[i];
            if !keep(&mut self.items[index]) {
                self.active.swap_remove(i);
                self.is_active[index] = false;
                self.idle.push(index);
                released += 1;
            }
        }
        released
    }

    /// Visit every active instance mutably
    pub fn for_each_active_mut(&mut self, mut f: impl FnMut(&mut T)) {
        for &index in &self.active {
            f(&mut self.items[index]);
        }
    }
}
