//! Allocation configuration parameters.

use ferry_core::AllocError;

/// Configuration for opaque block allocation.
///
/// Validated on every allocation; all values are plain data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AllocConfig {
    /// Smallest alignment any block is given, in bytes.
    ///
    /// Requests below this are raised to it. Default: pointer size.
    /// Must be a power of two.
    pub min_alignment: usize,

    /// Zero the block before handing it out.
    ///
    /// Default: `false`. Generated initializers overwrite the whole value,
    /// so zeroing only matters when a block may be read before it is filled.
    pub zero_init: bool,
}

impl AllocConfig {
    /// Default minimum alignment: the size of a pointer.
    pub const DEFAULT_MIN_ALIGNMENT: usize = std::mem::size_of::<*const ()>();

    /// Default zeroing policy.
    pub const DEFAULT_ZERO_INIT: bool = false;

    /// Create a config with default values.
    pub const fn new() -> Self {
        Self {
            min_alignment: Self::DEFAULT_MIN_ALIGNMENT,
            zero_init: Self::DEFAULT_ZERO_INIT,
        }
    }

    /// Check that the configured values are usable.
    pub fn validate(&self) -> Result<(), AllocError> {
        if !self.min_alignment.is_power_of_two() {
            return Err(AllocError::InvalidAlignment {
                align: self.min_alignment,
            });
        }
        Ok(())
    }
}

impl Default for AllocConfig {
    fn default() -> Self {
        Self::new()
    }
}
