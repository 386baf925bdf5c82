use hashbrown::HashMap;

use super::coord::ChunkCoord;

/// Hashed map from chunk coordinate to a chunk handle.
#[derive(Clone, Debug)]
pub struct ChunkStorage<T> {
    map: HashMap<ChunkCoord, T>,
}

impl<T> Default for ChunkStorage<T> {
    fn default() -> Self {
        Self {
            map: HashMap::new(),
        }
    }
}

impl<T> ChunkStorage<T> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, c: ChunkCoord) -> Option<&T> {
        self.map.get(&c)
    }

    #[inline]
    pub fn get_mut(&mut self, c: ChunkCoord) -> Option<&mut T> {
        self.map.get_mut(&c)
    }

    #[inline]
    pub fn contains(&self, c: ChunkCoord) -> bool {
        self.map.contains_key(&c)
    }

    pub fn insert(&mut self, c: ChunkCoord, value: T) -> Option<T> {
        self.map.insert(c, value)
    }

    pub fn remove(&mut self, c: ChunkCoord) -> Option<T> {
        self.map.remove(&c)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChunkCoord, &T)> + '_ {
        self.map.iter().map(|(c, v)| (*c, v))
    }

    pub fn drain(&mut self) -> impl Iterator<Item = (ChunkCoord, T)> + '_ {
        self.map.drain()
    }
}
