//! User model
//!
//! Only what the marketplace core needs: identity plus role. Credentials
//! and sessions live in the external auth service that signs the JWTs.

use super::serde_helpers;
use serde::{Deserialize, Serialize};
use shared::UserRole;
use surrealdb::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(
        default,
        with = "serde_helpers::option_record_id",
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<RecordId>,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: i64,
}

fn default_true() -> bool {
    true
}

impl User {
    pub fn new(name: String, email: String, role: UserRole) -> Self {
        Self {
            id: None,
            name,
            email,
            role,
            is_active: true,
            created_at: shared::util::now_millis(),
        }
    }
}
