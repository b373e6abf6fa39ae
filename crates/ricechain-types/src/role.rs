//! Organizational roles in the supply chain.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The part an organization plays in the supply chain.
///
/// Which organization holds which role is deployment configuration (see
/// [`ContractConfig::roles`](crate::ContractConfig)), never a constant in
/// the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Role {
    /// Registers and deletes rice batches.
    Farmer,
    /// Places processing orders in the restricted collection.
    Miller,
    /// Takes delivery of batches.
    Retailer,
}

impl Role {
    /// All roles, in supply-chain order.
    pub const ALL: [Self; 3] = [Self::Farmer, Self::Miller, Self::Retailer];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Farmer => write!(f, "FARMER"),
            Self::Miller => write!(f, "MILLER"),
            Self::Retailer => write!(f, "RETAILER"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_display() {
        assert_eq!(format!("{}", Role::Farmer), "FARMER");
        assert_eq!(format!("{}", Role::Retailer), "RETAILER");
    }

    #[test]
    fn role_serde_roundtrip() {
        let json = serde_json::to_string(&Role::Miller).unwrap();
        assert_eq!(json, "\"Miller\"");
        let back: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Role::Miller);
    }
}
