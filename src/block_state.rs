use serde::{Deserialize, Serialize};
use std::fmt;

/// A legacy block: numeric type id plus its 4-bit-era metadata byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BlockState {
    pub id: u8,
    pub meta: u8,
}

impl BlockState {
    pub const AIR: BlockState = BlockState { id: 0, meta: 0 };

    pub fn new(id: u8) -> Self {
        BlockState { id, meta: 0 }
    }

    pub fn with_meta(mut self, meta: u8) -> Self {
        self.meta = meta;
        self
    }

    pub fn is_air(&self) -> bool {
        self.id == 0
    }
}

impl From<(u8, u8)> for BlockState {
    fn from((id, meta): (u8, u8)) -> Self {
        BlockState { id, meta }
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.meta == 0 {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}:{}", self.id, self.meta)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::BlockState;

    #[test]
    fn test_block_state_creation() {
        let wool = BlockState::new(35).with_meta(14);

        assert_eq!(wool.id, 35);
        assert_eq!(wool.meta, 14);
        assert!(!wool.is_air());
        assert!(BlockState::AIR.is_air());
    }

    #[test]
    fn test_display() {
        assert_eq!(BlockState::new(1).to_string(), "1");
        assert_eq!(BlockState::from((35, 14)).to_string(), "35:14");
    }
}
