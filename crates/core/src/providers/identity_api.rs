use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;

use crate::errors::CoreError;

/// A user record as reported by the identity endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Session status as reported by a GET on the identity endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStatus {
    #[serde(rename = "loggedIn")]
    pub logged_in: bool,
    #[serde(default)]
    pub user: Option<RemoteUser>,
}

#[derive(Deserialize)]
struct ActionResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    user: Option<RemoteUser>,
}

/// Client for the server-assisted identity mode.
///
/// The endpoint accepts POSTs with `action ∈ {register, login, logout}`
/// and answers `{success, ...}`; a GET reports the server-side session.
/// This is an optional collaborator — the local `AuthService` never
/// depends on it.
pub struct IdentityApiClient {
    client: Client,
    base_url: String,
}

impl IdentityApiClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = builder.timeout(Duration::from_secs(10));
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: base_url.into(),
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<RemoteUser, CoreError> {
        let body = json!({
            "action": "register",
            "name": name,
            "email": email,
            "password": password,
        });
        self.post_action(body).await?.ok_or_else(|| CoreError::Api {
            provider: "identity".into(),
            message: "register response carried no user".into(),
        })
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<RemoteUser, CoreError> {
        let body = json!({
            "action": "login",
            "email": email,
            "password": password,
        });
        self.post_action(body).await?.ok_or_else(|| CoreError::Api {
            provider: "identity".into(),
            message: "login response carried no user".into(),
        })
    }

    pub async fn logout(&self) -> Result<(), CoreError> {
        let body = json!({ "action": "logout" });
        self.post_action(body).await?;
        Ok(())
    }

    /// Current server-side session state.
    pub async fn status(&self) -> Result<SessionStatus, CoreError> {
        let status: SessionStatus = self
            .client
            .get(&self.base_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "identity".into(),
                message: format!("failed to parse status response: {e}"),
            })?;
        Ok(status)
    }

    async fn post_action(&self, body: serde_json::Value) -> Result<Option<RemoteUser>, CoreError> {
        let resp: ActionResponse = self
            .client
            .post(&self.base_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .map_err(|e| CoreError::Api {
                provider: "identity".into(),
                message: format!("failed to parse action response: {e}"),
            })?;

        if !resp.success {
            return Err(CoreError::Api {
                provider: "identity".into(),
                message: resp.error.unwrap_or_else(|| "request failed".into()),
            });
        }
        Ok(resp.user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_shapes() {
        let logged_in: SessionStatus = serde_json::from_str(
            r#"{"loggedIn":true,"user":{"id":7,"name":"Demo User","email":"demo@example.com"}}"#,
        )
        .unwrap();
        assert!(logged_in.logged_in);
        assert_eq!(logged_in.user.unwrap().id, 7);

        let logged_out: SessionStatus = serde_json::from_str(r#"{"loggedIn":false}"#).unwrap();
        assert!(!logged_out.logged_in);
        assert!(logged_out.user.is_none());
    }

    #[test]
    fn failed_action_carries_the_server_error() {
        let resp: ActionResponse =
            serde_json::from_str(r#"{"success":false,"error":"Invalid password"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("Invalid password"));
        assert!(resp.user.is_none());
    }
}
