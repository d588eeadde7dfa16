//! Device geometry configuration and construction-time validation policy.

use crate::ConfigError;

/// Default word width in bits.
pub const DEFAULT_WORD_WIDTH: u32 = 18;
/// Default number of addressable words.
pub const DEFAULT_DEPTH: usize = 1024;
/// Default number of extra output pipeline stages.
pub const DEFAULT_PIPELINE_DEPTH: usize = 3;
/// Widest supported word, bounded by the 64-bit storage word.
pub const MAX_WORD_WIDTH: u32 = 64;
/// Widest supported address, bounding the backing allocation.
pub const MAX_ADDR_WIDTH: u32 = 24;
/// Deepest supported output pipeline register chain.
pub const MAX_PIPELINE_DEPTH: usize = 15;

/// Geometry of one memory device, fixed for its whole lifetime.
///
/// `depth` must be a power of two so the derived address type covers exactly
/// the addressable range and the scrub counter's all-ones saturation point is
/// the last valid address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct MemConfig {
    /// Bits per stored word (1..=64).
    pub word_width: u32,
    /// Number of addressable words (power of two, >= 2).
    pub depth: usize,
    /// Extra output pipeline stages beyond the base-latency register.
    pub pipeline_depth: usize,
}

impl Default for MemConfig {
    fn default() -> Self {
        Self {
            word_width: DEFAULT_WORD_WIDTH,
            depth: DEFAULT_DEPTH,
            pipeline_depth: DEFAULT_PIPELINE_DEPTH,
        }
    }
}

impl MemConfig {
    /// Address width in bits; meaningful once [`Self::validate`] has passed.
    #[must_use]
    pub const fn addr_width(&self) -> u32 {
        self.depth.trailing_zeros()
    }

    /// Mask selecting the active bits of a stored word.
    #[must_use]
    pub const fn word_mask(&self) -> u64 {
        if self.word_width >= 64 {
            u64::MAX
        } else if self.word_width == 0 {
            0
        } else {
            (1_u64 << self.word_width) - 1
        }
    }

    /// Mask selecting the active bits of an address.
    #[must_use]
    pub const fn addr_mask(&self) -> usize {
        self.depth.wrapping_sub(1)
    }

    /// Highest valid address, the all-ones value of the address type.
    #[must_use]
    pub const fn last_addr(&self) -> usize {
        self.depth.wrapping_sub(1)
    }

    /// Checks the geometry once at construction time.
    ///
    /// # Errors
    ///
    /// Returns the first violated [`ConfigError`] bound. A failed check is
    /// fatal: no device is constructed from an invalid geometry.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.word_width == 0 || self.word_width > MAX_WORD_WIDTH {
            return Err(ConfigError::WordWidthOutOfRange(self.word_width));
        }
        if self.depth < 2 {
            return Err(ConfigError::DepthTooSmall(self.depth));
        }
        if !self.depth.is_power_of_two() {
            return Err(ConfigError::DepthNotPowerOfTwo(self.depth));
        }
        if self.addr_width() > MAX_ADDR_WIDTH {
            return Err(ConfigError::DepthTooLarge(self.depth));
        }
        if self.pipeline_depth > MAX_PIPELINE_DEPTH {
            return Err(ConfigError::PipelineDepthOutOfRange(self.pipeline_depth));
        }
        Ok(())
    }

    /// Checks a caller's declared port shape against this geometry.
    ///
    /// Mirrors the wiring-time assertion an enclosing system performs when a
    /// port record is connected: widths must match exactly on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WordWidthMismatch`] or
    /// [`ConfigError::AddrWidthMismatch`] when the caller's wiring disagrees.
    pub const fn check_port_shape(
        &self,
        caller_word_width: u32,
        caller_addr_width: u32,
    ) -> Result<(), ConfigError> {
        if caller_word_width != self.word_width {
            return Err(ConfigError::WordWidthMismatch {
                device: self.word_width,
                caller: caller_word_width,
            });
        }
        if caller_addr_width != self.addr_width() {
            return Err(ConfigError::AddrWidthMismatch {
                device: self.addr_width(),
                caller: caller_addr_width,
            });
        }
        Ok(())
    }
}
