use std::collections::HashMap;

use ahash::RandomState as AHasher;

use crate::engine::Board;

/// Whose turn a search node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ply {
    Player,
    Chance,
}

/// Cache key: the board plus how much search remains below it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub board: Board,
    pub depth: u32,
    pub ply: Ply,
}

/// Bounded memo of evaluated subtrees.
///
/// When an insert would push the size past `capacity` the whole table is
/// dropped; entries otherwise survive across searches.
pub struct SearchCache {
    map: HashMap<CacheKey, f64, AHasher>,
    capacity: usize,
    hits: u64,
    misses: u64,
}

impl SearchCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self { map: HashMap::with_hasher(AHasher::new()), capacity, hits: 0, misses: 0 }
    }

    /// Look up `key`, counting the hit or miss.
    #[inline]
    pub fn get(&mut self, key: &CacheKey) -> Option<f64> {
        match self.map.get(key) {
            Some(&score) => {
                self.hits += 1;
                Some(score)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn insert(&mut self, key: CacheKey, score: f64) {
        if self.map.len() >= self.capacity && !self.map.contains_key(&key) {
            log::debug!("search cache reached {} entries, clearing", self.map.len());
            self.map.clear();
        }
        self.map.insert(key, score);
    }

    pub fn clear(&mut self) { self.map.clear(); }

    #[inline]
    pub fn len(&self) -> usize { self.map.len() }

    #[inline]
    pub fn is_empty(&self) -> bool { self.map.is_empty() }

    #[inline]
    pub fn hits(&self) -> u64 { self.hits }

    #[inline]
    pub fn misses(&self) -> u64 { self.misses }
}
