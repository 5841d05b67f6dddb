use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Proof of the current user, stored in one of two slots:
///
/// - **volatile** — cleared on logout, scoped to the running process;
/// - **remembered** — durable across restarts, written only when the
///   user asked to be remembered at login.
///
/// A session whose `user_id` no longer resolves in the user registry is
/// stale and must be discarded, not honored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub login_time: DateTime<Utc>,
    pub remember: bool,
}

impl Session {
    pub fn new(user: &super::user::User, remember: bool) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            login_time: Utc::now(),
            remember,
        }
    }
}
