//! Contract configuration.
//!
//! The organization-to-role table, the restricted collection name, and the
//! switches for quantity parsing and batch id reuse.
//! Loaded from JSON by the embedding host; [`ContractConfig::default`]
//! reproduces the three-organization test network.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{OrgId, Result, RiceError, Role, constants};

/// How caller-supplied quantity strings are turned into integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantityPolicy {
    /// Missing or non-integer input is rejected with `InvalidQuantity`.
    #[default]
    Strict,
    /// Leading decimal digits are used (`"500kg"` is 500); anything else,
    /// including a negative number, degrades to 0.
    Lenient,
}

impl QuantityPolicy {
    /// Parse the raw value of `field`.
    ///
    /// # Errors
    /// Under [`QuantityPolicy::Strict`], returns `InvalidQuantity` if `raw`
    /// is absent or not a non-negative integer.
    pub fn parse(self, field: &str, raw: Option<&str>) -> Result<u64> {
        match self {
            Self::Strict => {
                let text = raw.unwrap_or_default();
                text.trim()
                    .parse::<u64>()
                    .map_err(|_| RiceError::InvalidQuantity {
                        field: field.to_string(),
                        raw: text.to_string(),
                    })
            }
            Self::Lenient => Ok(raw.map_or(0, leading_integer)),
        }
    }
}

/// Scan an optionally signed decimal prefix, the way `%d` scanning does.
fn leading_integer(raw: &str) -> u64 {
    let text = raw.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if negative || end == 0 {
        return 0;
    }
    digits[..end].parse().unwrap_or(0)
}

/// Configuration for one deployed instance of the contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractConfig {
    /// Organization id -> role.
    pub roles: BTreeMap<OrgId, Role>,
    /// Name of the restricted collection holding processing orders.
    pub order_collection: String,
    /// Parsing rule for the transient `quantityInKg` field.
    pub quantity_policy: QuantityPolicy,
    /// Whether a deleted batch id may be registered again.
    pub allow_batch_id_reuse: bool,
}

impl Default for ContractConfig {
    fn default() -> Self {
        let mut roles = BTreeMap::new();
        roles.insert(OrgId::from(constants::DEFAULT_FARMER_ORG), Role::Farmer);
        roles.insert(OrgId::from(constants::DEFAULT_MILLER_ORG), Role::Miller);
        roles.insert(OrgId::from(constants::DEFAULT_RETAILER_ORG), Role::Retailer);
        Self {
            roles,
            order_collection: constants::DEFAULT_ORDER_COLLECTION.to_string(),
            quantity_policy: QuantityPolicy::default(),
            allow_batch_id_reuse: true,
        }
    }
}

impl ContractConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| RiceError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every role is held by some organization and the
    /// collection is named.
    pub fn validate(&self) -> Result<()> {
        for role in Role::ALL {
            if !self.roles.values().any(|r| *r == role) {
                return Err(RiceError::Configuration(format!(
                    "no organization holds the {role} role"
                )));
            }
        }
        if self.roles.keys().any(|org| org.as_str().is_empty()) {
            return Err(RiceError::Configuration(
                "organization ids must not be empty".to_string(),
            ));
        }
        if self.order_collection.is_empty() {
            return Err(RiceError::Configuration(
                "order_collection must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// The role held by `org`, if any.
    #[must_use]
    pub fn role_of(&self, org: &OrgId) -> Option<Role> {
        self.roles.get(org).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_maps_three_orgs() {
        let cfg = ContractConfig::default();
        assert_eq!(cfg.role_of(&OrgId::from("Org1MSP")), Some(Role::Farmer));
        assert_eq!(cfg.role_of(&OrgId::from("Org2MSP")), Some(Role::Miller));
        assert_eq!(cfg.role_of(&OrgId::from("Org3MSP")), Some(Role::Retailer));
        assert_eq!(cfg.role_of(&OrgId::from("Org4MSP")), None);
        assert_eq!(cfg.order_collection, "ProcessingOrderCollection");
        assert!(cfg.allow_batch_id_reuse);
        cfg.validate().unwrap();
    }

    #[test]
    fn from_json_fills_defaults() {
        let cfg = ContractConfig::from_json(concat!(
            r#"{"roles":{"FarmCo":"Farmer","MillCo":"Miller","ShopCo":"Retailer"},"#,
            r#""quantity_policy":"lenient"}"#,
        ))
        .unwrap();
        assert_eq!(cfg.role_of(&OrgId::from("MillCo")), Some(Role::Miller));
        assert_eq!(cfg.quantity_policy, QuantityPolicy::Lenient);
        assert_eq!(cfg.order_collection, "ProcessingOrderCollection");
        assert_eq!(cfg.role_of(&OrgId::from("ShopCo")), Some(Role::Retailer));
    }

    #[test]
    fn missing_role_is_rejected() {
        let err = ContractConfig::from_json(r#"{"roles":{"FarmCo":"Farmer","MillCo":"Miller"}}"#)
            .unwrap_err();
        assert!(matches!(err, RiceError::Configuration(ref m) if m.contains("RETAILER")));
    }

    #[test]
    fn malformed_json_is_configuration_error() {
        let err = ContractConfig::from_json("{roles").unwrap_err();
        assert!(matches!(err, RiceError::Configuration(_)));
    }

    #[test]
    fn strict_quantity_parsing() {
        let p = QuantityPolicy::Strict;
        assert_eq!(p.parse("quantityInKg", Some("500")).unwrap(), 500);
        assert_eq!(p.parse("quantityInKg", Some(" 42 ")).unwrap(), 42);
        assert!(matches!(
            p.parse("quantityInKg", Some("500kg")),
            Err(RiceError::InvalidQuantity { .. })
        ));
        assert!(p.parse("quantityInKg", Some("-5")).is_err());
        assert!(p.parse("quantityInKg", None).is_err());
    }

    #[test]
    fn lenient_quantity_parsing() {
        let p = QuantityPolicy::Lenient;
        assert_eq!(p.parse("q", Some("500")).unwrap(), 500);
        assert_eq!(p.parse("q", Some("500kg")).unwrap(), 500);
        assert_eq!(p.parse("q", Some("  +7")).unwrap(), 7);
        assert_eq!(p.parse("q", Some("abc")).unwrap(), 0);
        assert_eq!(p.parse("q", Some("-5")).unwrap(), 0);
        assert_eq!(p.parse("q", Some("")).unwrap(), 0);
        assert_eq!(p.parse("q", None).unwrap(), 0);
    }
}
