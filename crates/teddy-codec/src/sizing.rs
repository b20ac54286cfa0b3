//! Fixed sizes hosts use to allocate buffers.

use crate::constants::*;

/// Constant buffer sizes and the protocol revision.
///
/// The values never change for the lifetime of a codec.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SizingOracle;

impl SizingOracle {
    /// Largest datagram the link carries.
    pub const fn max_datagram_size() -> u32 {
        MAX_DATAGRAM_SIZE_RAW as u32
    }

    /// Largest debug string a DebugInd may carry.
    pub const fn max_debug_string_size() -> u32 {
        MAX_DEBUG_STRING_SIZE as u32
    }

    /// Revision level of the message protocol.
    pub const fn revision_level() -> u32 {
        REVISION_LEVEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sizes() {
        assert_eq!(SizingOracle::max_datagram_size(), 122);
        assert_eq!(SizingOracle::max_debug_string_size(), 31);
        assert_eq!(SizingOracle::revision_level(), 0);
    }

    #[test]
    fn test_largest_messages_fit_a_datagram() {
        let max = SizingOracle::max_datagram_size() as usize;
        assert!(1 + 4 + SizingOracle::max_debug_string_size() as usize <= max);
        for kind in crate::UplinkKind::ALL {
            assert!(kind.min_size() <= max, "{}", kind);
        }
    }
}
