use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered user in the local registry.
///
/// Users are never hard-deleted; the only field that may change after
/// registration is `verified`. The raw password is never stored —
/// `credential_digest` holds an Argon2id PHC string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    /// Stored lowercase; uniqueness is case-insensitive.
    pub email: String,
    pub credential_digest: String,
    pub created_at: DateTime<Utc>,
    pub verified: bool,
}

impl User {
    pub fn new(name: String, email: String, credential_digest: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email: email.to_lowercase(),
            credential_digest,
            created_at: Utc::now(),
            verified: false,
        }
    }
}

/// Who a saved valuation belongs to.
///
/// Valuations created without an authenticated session belong to `Guest`
/// rather than a magic user-id string, so a real user id can never
/// collide with the sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    User(Uuid),
    Guest,
}

impl std::fmt::Display for Owner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Owner::User(id) => write!(f, "user:{id}"),
            Owner::Guest => write!(f, "guest"),
        }
    }
}
