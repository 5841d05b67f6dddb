use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use std::sync::Arc;

use crate::errors::{CoreError, ValidationIssue};
use crate::models::session::Session;
use crate::models::user::{Owner, User};
use crate::storage::kv::{KeyValueStore, KeyValueStoreExt};

/// Composite value holding the whole user registry.
pub const USERS_KEY: &str = "crypto_portfolio_users";
/// Volatile session slot — cleared on logout, process-scoped.
pub const VOLATILE_SESSION_KEY: &str = "crypto_portfolio_user";
/// Remembered session slot — durable across restarts.
pub const REMEMBERED_SESSION_KEY: &str = "crypto_portfolio_session";

/// Built-in account so the system is usable without registering.
pub const SEED_EMAIL: &str = "demo@example.com";
pub const SEED_PASSWORD: &str = "demo123";
const SEED_NAME: &str = "Demo User";

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 6;

/// Local user registry, login sessions, and the notion of
/// "current user" that scopes portfolio data.
///
/// The registry and the remembered session live in the durable store;
/// the volatile session slot lives in its own store whose lifetime is
/// the running process.
pub struct AuthService {
    persistent: Arc<dyn KeyValueStore>,
    volatile: Arc<dyn KeyValueStore>,
}

impl AuthService {
    /// Build the service and (re)create the seed account if absent.
    pub fn new(
        persistent: Arc<dyn KeyValueStore>,
        volatile: Arc<dyn KeyValueStore>,
    ) -> Result<Self, CoreError> {
        let service = Self {
            persistent,
            volatile,
        };
        service.ensure_seed_account()?;
        Ok(service)
    }

    // ── Registration & login ────────────────────────────────────────

    /// Create a new account and immediately log it in.
    ///
    /// Every validation check runs; all violations are reported
    /// together in `CoreError::Validation`. The new user starts
    /// unverified and the session goes to the volatile slot only.
    pub fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
        agree_to_terms: bool,
    ) -> Result<User, CoreError> {
        let mut issues = Vec::new();
        if name.trim().len() < MIN_NAME_LEN {
            issues.push(ValidationIssue::NameTooShort);
        }
        if !email_is_valid(email.trim()) {
            issues.push(ValidationIssue::InvalidEmail);
        }
        if password.len() < MIN_PASSWORD_LEN {
            issues.push(ValidationIssue::PasswordTooShort);
        }
        if password != confirm_password {
            issues.push(ValidationIssue::PasswordMismatch);
        }
        if !agree_to_terms {
            issues.push(ValidationIssue::TermsNotAccepted);
        }
        if !issues.is_empty() {
            return Err(CoreError::Validation(issues));
        }

        let mut users = self.load_users();
        let email = email.trim().to_lowercase();
        if users.iter().any(|u| u.email == email) {
            return Err(CoreError::DuplicateEmail);
        }

        let digest = Self::hash(password)?;
        let user = User::new(name.trim().to_string(), email, digest);
        users.push(user.clone());
        self.save_users(&users)?;

        // Registration implies login.
        self.establish_session(&user, false)?;
        Ok(user)
    }

    /// Authenticate and establish a session.
    ///
    /// The volatile slot is always written; the remembered slot only
    /// when `remember` is set.
    pub fn login(&self, email: &str, password: &str, remember: bool) -> Result<Session, CoreError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(CoreError::MissingFields);
        }

        let users = self.load_users();
        let email = email.trim().to_lowercase();
        let user = users
            .iter()
            .find(|u| u.email == email)
            .ok_or(CoreError::UserNotFound)?;

        if !Self::verify(password, &user.credential_digest) {
            return Err(CoreError::InvalidCredential);
        }

        self.establish_session(user, remember)
    }

    /// Clear both session slots. Idempotent.
    pub fn logout(&self) {
        self.volatile.delete(VOLATILE_SESSION_KEY);
        self.persistent.delete(REMEMBERED_SESSION_KEY);
    }

    // ── Current user ────────────────────────────────────────────────

    /// The active session, volatile slot first, remembered slot as a
    /// fallback. A session whose user no longer exists in the registry
    /// is discarded from its slot and treated as absent.
    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        let users = self.load_users();

        if let Some(session) = self.volatile.get::<Session>(VOLATILE_SESSION_KEY) {
            if users.iter().any(|u| u.id == session.user_id) {
                return Some(session);
            }
            self.volatile.delete(VOLATILE_SESSION_KEY);
        }

        if let Some(session) = self.persistent.get::<Session>(REMEMBERED_SESSION_KEY) {
            if users.iter().any(|u| u.id == session.user_id) {
                return Some(session);
            }
            self.persistent.delete(REMEMBERED_SESSION_KEY);
        }

        None
    }

    /// Registry record behind the active session.
    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        let session = self.current_session()?;
        self.load_users()
            .into_iter()
            .find(|u| u.id == session.user_id)
    }

    /// Owner identity used to scope portfolio data: the session's user
    /// when logged in, the guest sentinel otherwise.
    #[must_use]
    pub fn current_owner(&self) -> Owner {
        match self.current_session() {
            Some(session) => Owner::User(session.user_id),
            None => Owner::Guest,
        }
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.current_session().is_some()
    }

    // ── Credentials ─────────────────────────────────────────────────

    /// Hash a password into an Argon2id PHC string. The raw password
    /// is never retained.
    pub fn hash(password: &str) -> Result<String, CoreError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|digest| digest.to_string())
            .map_err(|e| CoreError::Hashing(e.to_string()))
    }

    /// Check a password against a stored digest. An undecodable digest
    /// never matches.
    #[must_use]
    pub fn verify(password: &str, digest: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(digest) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn establish_session(&self, user: &User, remember: bool) -> Result<Session, CoreError> {
        let session = Session::new(user, remember);
        self.volatile.set(VOLATILE_SESSION_KEY, &session)?;
        if remember {
            self.persistent.set(REMEMBERED_SESSION_KEY, &session)?;
        }
        Ok(session)
    }

    fn load_users(&self) -> Vec<User> {
        self.persistent.get(USERS_KEY).unwrap_or_default()
    }

    fn save_users(&self, users: &[User]) -> Result<(), CoreError> {
        self.persistent.set(USERS_KEY, &users)
    }

    fn ensure_seed_account(&self) -> Result<(), CoreError> {
        let mut users = self.load_users();
        if users.iter().any(|u| u.email == SEED_EMAIL) {
            return Ok(());
        }

        let digest = Self::hash(SEED_PASSWORD)?;
        let mut seed = User::new(SEED_NAME.to_string(), SEED_EMAIL.to_string(), digest);
        seed.verified = true;
        users.push(seed);
        self.save_users(&users)
    }
}

/// Basic `local@domain.tld` shape check: no whitespace, exactly one
/// `@`, and a dotted domain with non-empty parts.
fn email_is_valid(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}
