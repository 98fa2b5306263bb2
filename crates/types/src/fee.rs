use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::KeeperError;

/// Protocol fee tiers. Each tier fixes the quantization grid for usable ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum FeeTier {
    Low,
    #[default]
    Medium,
    High,
}

impl FeeTier {
    /// Fee in hundredths of a basis point, as encoded on-chain.
    pub fn fee(&self) -> u32 {
        match self {
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10000,
        }
    }

    pub fn tick_spacing(&self) -> i32 {
        match self {
            FeeTier::Low => 10,
            FeeTier::Medium => 60,
            FeeTier::High => 200,
        }
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = KeeperError;

    fn try_from(fee: u32) -> Result<Self, Self::Error> {
        match fee {
            500 => Ok(FeeTier::Low),
            3000 => Ok(FeeTier::Medium),
            10000 => Ok(FeeTier::High),
            _ => Err(KeeperError::InvalidInput(format!("unrecognized fee tier {fee}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_mapping() {
        assert_eq!(FeeTier::Low.fee(), 500);
        assert_eq!(FeeTier::Low.tick_spacing(), 10);
        assert_eq!(FeeTier::Medium.fee(), 3000);
        assert_eq!(FeeTier::Medium.tick_spacing(), 60);
        assert_eq!(FeeTier::High.fee(), 10000);
        assert_eq!(FeeTier::High.tick_spacing(), 200);
    }

    #[test]
    fn tier_from_fee() {
        assert_eq!(FeeTier::try_from(3000).unwrap(), FeeTier::Medium);
        assert!(FeeTier::try_from(123).is_err());
    }
}
