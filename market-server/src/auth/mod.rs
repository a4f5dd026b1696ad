//! Authentication
//!
//! Bearer-token validation and per-route role checks. Login, sessions and
//! credential storage live in the external auth service; this module only
//! verifies what that service signed.

pub mod extractor;
pub mod jwt;

pub use jwt::{Claims, JwtConfig, JwtError, JwtService};

use crate::utils::AppError;
use shared::UserRole;

/// The authenticated caller, extracted from the bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// `"user:key"` record id string
    pub id: String,
    pub name: String,
    pub role: UserRole,
}

impl From<Claims> for CurrentUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            role: claims.role,
        }
    }
}

impl CurrentUser {
    /// Per-route role gate.
    pub fn require_role(&self, role: UserRole) -> Result<(), AppError> {
        if self.role == role {
            Ok(())
        } else {
            Err(AppError::forbidden(format!("{} role required", role)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: UserRole) -> CurrentUser {
        CurrentUser {
            id: "user:u1".into(),
            name: "Test".into(),
            role,
        }
    }

    #[test]
    fn role_gate_is_exact() {
        assert!(user(UserRole::Buyer).require_role(UserRole::Buyer).is_ok());
        assert!(user(UserRole::Seller).require_role(UserRole::Buyer).is_err());
        assert!(user(UserRole::Admin).require_role(UserRole::Buyer).is_err());
    }
}
