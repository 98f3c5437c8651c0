//! Bulk storage for clause records.
//!
//! Clauses are copied here wholesale when the store is compacted. A clause
//! living in the arena is never freed on its own: deleting it only adds its
//! words to `wasted`, and the memory comes back when the next compaction
//! replaces the whole arena.

pub struct ClauseArena {
    data: Vec<u32>,
    wasted: usize,
}

impl ClauseArena {
    pub fn new() -> Self {
        ClauseArena {
            data: Vec::new(),
            wasted: 0,
        }
    }

    pub fn with_capacity(words: usize) -> Self {
        ClauseArena {
            data: Vec::with_capacity(words),
            wasted: 0,
        }
    }

    /// Does `addr` point into the arena's words?
    pub fn contains(&self, addr: *const u32) -> bool {
        self.data.as_ptr_range().contains(&addr)
    }

    /// Copy a record into the arena and return its start index.
    ///
    /// Must not grow beyond the reserved capacity: records already handed
    /// out keep pointing into the current buffer.
    pub fn copy(&mut self, words: &[u32]) -> u32 {
        debug_assert!(self.data.len() + words.len() <= self.data.capacity());
        let start = self.data.len() as u32;
        self.data.extend_from_slice(words);
        start
    }

    pub fn release(&mut self, words: usize) {
        self.wasted += words;
    }

    pub fn words(&self, start: u32, len: u32) -> &[u32] {
        &self.data[start as usize..(start + len) as usize]
    }

    pub fn words_mut(&mut self, start: u32, len: u32) -> &mut [u32] {
        &mut self.data[start as usize..(start + len) as usize]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn wasted(&self) -> usize {
        self.wasted
    }
}

impl Default for ClauseArena {
    fn default() -> Self {
        Self::new()
    }
}
