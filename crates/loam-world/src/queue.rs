use std::hash::Hash;

use hashbrown::HashSet;

use super::coord::ChunkCoord;

/// Integer triple usable as a queue key.
pub trait Location: Copy + Eq + Hash {
    fn xyz(self) -> [i32; 3];
}

impl Location for ChunkCoord {
    #[inline]
    fn xyz(self) -> [i32; 3] {
        [self.cx, self.cy, self.cz]
    }
}

impl Location for [i32; 3] {
    #[inline]
    fn xyz(self) -> [i32; 3] {
        self
    }
}

/// Ordered set of locations: a `Vec` for order plus a hash set for O(1)
/// membership. `pop` takes from the back, so after [`sort_by_distance`]
/// it yields the closest location first.
///
/// [`sort_by_distance`]: LocationQueue::sort_by_distance
#[derive(Clone, Debug)]
pub struct LocationQueue<L: Location = ChunkCoord> {
    items: Vec<L>,
    set: HashSet<L>,
}

impl<L: Location> Default for LocationQueue<L> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Location> LocationQueue<L> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            set: HashSet::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[inline]
    pub fn contains(&self, loc: L) -> bool {
        self.set.contains(&loc)
    }

    /// Appends `loc` unless already present. Returns whether it was added.
    pub fn add(&mut self, loc: L) -> bool {
        if !self.set.insert(loc) {
            return false;
        }
        self.items.push(loc);
        true
    }

    /// Inserts at the front (popped last) unless already present.
    pub fn add_to_front(&mut self, loc: L) -> bool {
        if !self.set.insert(loc) {
            return false;
        }
        self.items.insert(0, loc);
        true
    }

    pub fn remove(&mut self, loc: L) -> bool {
        if !self.set.remove(&loc) {
            return false;
        }
        if let Some(idx) = self.items.iter().rposition(|l| *l == loc) {
            self.items.remove(idx);
        }
        true
    }

    pub fn pop(&mut self) -> Option<L> {
        let loc = self.items.pop()?;
        self.set.remove(&loc);
        Some(loc)
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<L> {
        self.items.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = L> + '_ {
        self.items.iter().copied()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.set.clear();
    }

    pub fn copy_from(&mut self, other: &LocationQueue<L>) {
        self.items.clone_from(&other.items);
        self.set.clone_from(&other.set);
    }

    /// Sorts so the largest `dist(dx, dy, dz)` relative to `origin` comes
    /// first and `pop` returns the smallest. `reverse` flips the order.
    pub fn sort_by_distance<F>(&mut self, origin: [i32; 3], dist: F, reverse: bool)
    where
        F: Fn(i32, i32, i32) -> i64,
    {
        let key = |l: &L| {
            let p = l.xyz();
            dist(p[0] - origin[0], p[1] - origin[1], p[2] - origin[2])
        };
        if reverse {
            self.items.sort_by_cached_key(key);
        } else {
            self.items.sort_by_cached_key(|l| std::cmp::Reverse(key(l)));
        }
    }
}
