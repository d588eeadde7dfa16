//! Word-addressed backing store shared by both access ports.

/// Power-up fill pattern for freshly constructed arrays.
///
/// Real storage comes up with undefined contents; the model uses a fixed
/// nonzero pattern so the scrub pass is observable rather than vacuous.
pub const POWER_UP_PATTERN: u64 = 0xA5A5_A5A5_A5A5_A5A5;

/// Fixed-capacity word array, one masked word per address.
///
/// Exclusively owned by the controller; both ports mutate it only through
/// the controller's per-tick commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryArray {
    words: Box<[u64]>,
    word_mask: u64,
}

impl MemoryArray {
    /// Creates an array of `depth` words filled with the power-up pattern.
    #[must_use]
    pub fn new(depth: usize, word_mask: u64) -> Self {
        Self {
            words: vec![POWER_UP_PATTERN & word_mask; depth].into_boxed_slice(),
            word_mask,
        }
    }

    /// Rebuilds an array from exported words, re-masking each entry.
    pub(crate) fn from_words(words: &[u64], word_mask: u64) -> Self {
        Self {
            words: words.iter().map(|word| word & word_mask).collect(),
            word_mask,
        }
    }

    /// Reads the word stored at `addr`.
    ///
    /// Latency is not modeled here; it belongs to the port pipeline.
    #[must_use]
    pub fn read(&self, addr: usize) -> u64 {
        self.words[addr]
    }

    /// Stores `word` at `addr`, masked to the configured word width.
    pub fn write(&mut self, addr: usize, word: u64) {
        self.words[addr] = word & self.word_mask;
    }

    /// Number of addressable words.
    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// True when the array holds no words.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Read-only view of the stored words.
    #[must_use]
    pub fn words(&self) -> &[u64] {
        &self.words
    }
}
