//! Pooling strategy flags

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// How a sub-pool fills and resizes itself
    ///
    /// Serialized as a flag list (`"FILL | GROW"`) in text formats.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct PoolingStrategy: u8 {
        /// Pre-populate the idle queue to full capacity at creation
        const FILL = 1 << 0;

        /// Let capacity expand and contract between the minimum and five
        /// times the minimum
        const GROW = 1 << 1;
    }
}

impl PoolingStrategy {
    /// No pre-fill, fixed capacity
    pub const DEFAULT: Self = Self::empty();

    /// Whether the idle queue is pre-populated
    pub fn fills(self) -> bool {
        self.contains(Self::FILL)
    }

    /// Whether capacity adapts to pressure
    pub fn grows(self) -> bool {
        self.contains(Self::GROW)
    }
}

impl Default for PoolingStrategy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_flags() {
        let strategy = PoolingStrategy::default();
        assert!(!strategy.fills());
        assert!(!strategy.grows());
        assert_eq!(strategy.bits(), 0);
    }

    #[test]
    fn test_combined_flags() {
        let strategy = PoolingStrategy::FILL | PoolingStrategy::GROW;
        assert!(strategy.fills());
        assert!(strategy.grows());
    }

    #[test]
    fn test_ron_round_trip() {
        let strategy = PoolingStrategy::FILL | PoolingStrategy::GROW;
        let text = ron::to_string(&strategy).unwrap();
        let parsed: PoolingStrategy = ron::from_str(&text).unwrap();
        assert_eq!(parsed, strategy);
    }
}
