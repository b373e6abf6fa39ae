//! Identity guard.
//!
//! Maps the caller's verified organization to a [`Role`] through the
//! configured role table. Every mutating operation authorizes before it
//! touches the ledger.

use ricechain_ledger::ClientIdentity;
use ricechain_types::{ContractConfig, OrgId, Result, RiceError, Role};

/// Role check against an injected role table.
#[derive(Debug, Clone, Copy)]
pub struct IdentityGuard<'a> {
    config: &'a ContractConfig,
}

impl<'a> IdentityGuard<'a> {
    #[must_use]
    pub fn new(config: &'a ContractConfig) -> Self {
        Self { config }
    }

    /// The role held by the caller, or `None` for an unknown organization.
    ///
    /// # Errors
    /// Returns `Unauthorized` if the caller's identity cannot be obtained.
    pub fn role_of(&self, caller: &dyn ClientIdentity) -> Result<Option<Role>> {
        let org = caller.org_id()?;
        Ok(self.config.role_of(&org))
    }

    /// Require the caller to hold `required`. Returns the caller's org id.
    ///
    /// # Errors
    /// Returns `Unauthorized` for an unknown organization, a different
    /// role, or an unavailable identity.
    pub fn authorize(
        &self,
        caller: &dyn ClientIdentity,
        required: Role,
        action: &str,
    ) -> Result<OrgId> {
        let org = caller.org_id()?;
        match self.config.role_of(&org) {
            Some(role) if role == required => Ok(org),
            held => {
                tracing::warn!(
                    org = %org,
                    required = %required,
                    held = ?held,
                    action,
                    "Authorization refused"
                );
                Err(RiceError::Unauthorized {
                    org: org.to_string(),
                    action: action.to_string(),
                })
            }
        }
    }
}
