use thiserror::Error;

/// Fatal configuration and wiring errors detected once at construction time.
///
/// None of these are recoverable at run time: the device refuses to come up
/// rather than silently truncate or pad a mismatched connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum ConfigError {
    /// Word width is zero or wider than the 64-bit storage word.
    #[error("word width {0} is outside the supported 1..=64 bit range")]
    WordWidthOutOfRange(u32),
    /// Depth does not cover the address space of a whole-bit address type.
    #[error("depth {0} is not a power of two")]
    DepthNotPowerOfTwo(usize),
    /// Depth is below the two-word minimum.
    #[error("depth {0} is smaller than the two-word minimum")]
    DepthTooSmall(usize),
    /// Depth needs more address bits than the model supports.
    #[error("depth {0} exceeds the maximum addressable word count")]
    DepthTooLarge(usize),
    /// Output pipeline is deeper than the supported register chain.
    #[error("pipeline depth {0} exceeds the supported maximum")]
    PipelineDepthOutOfRange(usize),
    /// A caller's wiring declares a different word width than the device.
    #[error("caller word width {caller} does not match device word width {device}")]
    WordWidthMismatch {
        /// Word width configured on the device.
        device: u32,
        /// Word width declared by the caller's wiring.
        caller: u32,
    },
    /// A caller's wiring declares a different address width than the device.
    #[error("caller address width {caller} does not match device address width {device}")]
    AddrWidthMismatch {
        /// Address width derived from the device depth.
        device: u32,
        /// Address width declared by the caller's wiring.
        caller: u32,
    },
}

#[cfg(test)]
mod tests {
    use super::ConfigError;

    #[test]
    fn mismatch_errors_render_both_sides() {
        let word = ConfigError::WordWidthMismatch {
            device: 18,
            caller: 16,
        };
        assert_eq!(
            word.to_string(),
            "caller word width 16 does not match device word width 18"
        );

        let addr = ConfigError::AddrWidthMismatch {
            device: 10,
            caller: 12,
        };
        assert_eq!(
            addr.to_string(),
            "caller address width 12 does not match device address width 10"
        );
    }
}
