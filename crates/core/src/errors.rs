use thiserror::Error;

/// A single field-level registration failure.
///
/// `register` runs every check and reports all violations together,
/// so callers can render the full list instead of fixing one field
/// per attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("Name must be at least 2 characters long")]
    NameTooShort,

    #[error("Please enter a valid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("You must agree to the Terms of Service")]
    TermsNotAccepted,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Unified error type for the entire crypto-portfolio-core library.
/// Every fallible public function returns `Result<T, CoreError>`.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── User input / validation ─────────────────────────────────────
    #[error("Registration validation failed: {}", join_issues(.0))]
    Validation(Vec<ValidationIssue>),

    #[error("Please fill in all fields")]
    MissingFields,

    #[error("User not found — check the email or register first")]
    UserNotFound,

    #[error("Invalid password")]
    InvalidCredential,

    #[error("An account with this email already exists")]
    DuplicateEmail,

    // ── Portfolio ───────────────────────────────────────────────────
    #[error("Amount must be a positive number")]
    InvalidAmount,

    #[error("Portfolio name must not be empty")]
    EmptyName,

    #[error("No calculation to save — calculate a portfolio value first")]
    NoCalculation,

    #[error("Import rejected: {0}")]
    MalformedImport(String),

    // ── Credentials ─────────────────────────────────────────────────
    #[error("Credential hashing failed: {0}")]
    Hashing(String),

    // ── Persistence ─────────────────────────────────────────────────
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("File I/O error: {0}")]
    FileIO(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    // ── API / Network ───────────────────────────────────────────────
    #[error("API error ({provider}): {message}")]
    Api {
        provider: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),
}

impl CoreError {
    /// `true` for failures a caller should render to the user and let
    /// them retry, as opposed to persistence/network faults.
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            CoreError::Validation(_)
                | CoreError::MissingFields
                | CoreError::UserNotFound
                | CoreError::InvalidCredential
                | CoreError::DuplicateEmail
                | CoreError::InvalidAmount
                | CoreError::EmptyName
                | CoreError::NoCalculation
                | CoreError::MalformedImport(_)
        )
    }
}

// ── Conversion helpers (From impls) ─────────────────────────────────

impl From<std::io::Error> for CoreError {
    fn from(e: std::io::Error) -> Self {
        CoreError::FileIO(e.to_string())
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(e: reqwest::Error) -> Self {
        // Sanitize error message: strip query parameters from URLs so
        // upstream keys or identifiers never end up in logs.
        let msg = e.to_string();
        let sanitized = if let Some(idx) = msg.find('?') {
            format!("{}?<query redacted>", &msg[..idx])
        } else {
            msg
        };
        CoreError::Network(sanitized)
    }
}
