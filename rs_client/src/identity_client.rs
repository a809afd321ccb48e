//! Identity provider client for a Supabase (GoTrue) auth endpoint.
//!
//! The access token returned by a password sign-in is held in memory for
//! the lifetime of the process. A token taken from a password-reset link
//! can be seeded with [`IdentityClient::with_recovery_token`]; the session
//! probe then reports a session this process did not create.

use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use resume_screen::ports::{IdentityProvider, ProviderError, ProviderResult, Session};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::sync::RwLock;

/// Fields GoTrue uses for a human-readable error, in lookup order.
const ERROR_FIELDS: [&str; 4] = ["msg", "error_description", "message", "error"];

pub struct IdentityClient {
    base_url: String,
    anon_key: SecretString,
    client: reqwest::Client,
    access_token: RwLock<Option<SecretString>>,
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RecoverRequest<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct PasswordUpdate<'a> {
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    user: Option<UserResponse>,
}

#[derive(Deserialize)]
struct UserResponse {
    #[serde(default)]
    email: Option<String>,
}

impl IdentityClient {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: SecretString,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key,
            client,
            access_token: RwLock::new(None),
        })
    }

    /// Seed the client with the access token carried by a reset link.
    pub fn with_recovery_token(self, token: SecretString) -> Self {
        Self {
            access_token: RwLock::new(Some(token)),
            ..self
        }
    }

    pub async fn has_session(&self) -> bool {
        self.access_token.read().await.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Attach the project key. Requests on behalf of a user carry their
    /// token as the bearer; everything else uses the anon key.
    fn authorize(&self, request: RequestBuilder, bearer: Option<&SecretString>) -> RequestBuilder {
        let bearer = bearer.unwrap_or(&self.anon_key);
        request
            .header("apikey", self.anon_key.expose_secret())
            .bearer_auth(bearer.expose_secret())
    }

    async fn send(&self, request: RequestBuilder) -> ProviderResult<Response> {
        let response = request.send().await.map_err(|e| {
            tracing::warn!(error = %e, "identity provider request failed");
            ProviderError::new(format!("Unable to reach the identity provider: {e}"))
        })?;

        if response.status().is_success() {
            Ok(response)
        } else {
            Err(error_from(response).await)
        }
    }

    async fn bearer(&self) -> Option<SecretString> {
        self.access_token
            .read()
            .await
            .as_ref()
            .map(|token| SecretString::from(token.expose_secret().to_string()))
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_up(&self, email: &str, password: &str) -> ProviderResult<()> {
        let request = self
            .client
            .post(self.endpoint("signup"))
            .json(&Credentials { email, password });

        self.send(self.authorize(request, None)).await?;
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> ProviderResult<Session> {
        let request = self
            .client
            .post(self.endpoint("token"))
            .query(&[("grant_type", "password")])
            .json(&Credentials { email, password });

        let response = self.send(self.authorize(request, None)).await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::new(format!("Unexpected sign-in response: {e}")))?;

        *self.access_token.write().await = Some(SecretString::from(token.access_token));

        let email = token
            .user
            .and_then(|user| user.email)
            .unwrap_or_else(|| email.to_string());
        Ok(Session::new(email))
    }

    async fn get_session(&self) -> ProviderResult<Option<Session>> {
        let Some(token) = self.bearer().await else {
            return Ok(None);
        };

        let request = self.client.get(self.endpoint("user"));
        let response = self
            .authorize(request, Some(&token))
            .send()
            .await
            .map_err(|e| ProviderError::new(format!("Unable to reach the identity provider: {e}")))?;

        match response.status() {
            status if status.is_success() => {
                let user: UserResponse = response
                    .json()
                    .await
                    .map_err(|e| ProviderError::new(format!("Unexpected user response: {e}")))?;
                Ok(user.email.map(Session::new))
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                tracing::info!("stored access token rejected, discarding it");
                *self.access_token.write().await = None;
                Ok(None)
            }
            _ => Err(error_from(response).await),
        }
    }

    async fn reset_password_for_email(&self, email: &str, redirect_to: &str) -> ProviderResult<()> {
        let request = self
            .client
            .post(self.endpoint("recover"))
            .query(&[("redirect_to", redirect_to)])
            .json(&RecoverRequest { email });

        self.send(self.authorize(request, None)).await?;
        Ok(())
    }

    async fn update_password(&self, password: &str) -> ProviderResult<()> {
        let Some(token) = self.bearer().await else {
            return Err(ProviderError::new("Auth session missing!"));
        };

        let request = self
            .client
            .put(self.endpoint("user"))
            .json(&PasswordUpdate { password });

        self.send(self.authorize(request, Some(&token))).await?;
        Ok(())
    }

    async fn sign_out(&self) -> ProviderResult<()> {
        // Local token goes first; the remote revoke is best effort.
        let Some(token) = self.access_token.write().await.take() else {
            return Ok(());
        };

        let request = self.client.post(self.endpoint("logout"));
        self.send(self.authorize(request, Some(&token))).await?;
        Ok(())
    }
}

/// Build a provider error from a non-success response, preferring the
/// provider's own message so it can be shown verbatim.
async fn error_from(response: Response) -> ProviderError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    ProviderError::new(
        extract_message(&body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Request failed").to_string()),
    )
}

fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ERROR_FIELDS.iter().find_map(|field| {
        value
            .get(*field)
            .and_then(Value::as_str)
            .filter(|message| !message.trim().is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_message_prefers_msg() {
        let body = r#"{"msg": "Invalid login credentials", "error": "invalid_grant"}"#;
        assert_eq!(
            extract_message(body).as_deref(),
            Some("Invalid login credentials")
        );
    }

    #[test]
    fn test_extract_message_falls_through_fields() {
        let body = r#"{"error": "invalid_grant", "error_description": "Email not confirmed"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("Email not confirmed"));

        let body = r#"{"code": 422, "message": "User already registered"}"#;
        assert_eq!(extract_message(body).as_deref(), Some("User already registered"));
    }

    #[test]
    fn test_extract_message_ignores_non_json_and_blank() {
        assert_eq!(extract_message("<html>bad gateway</html>"), None);
        assert_eq!(extract_message(r#"{"msg": "  "}"#), None);
        assert_eq!(extract_message(r#"{"msg": 42}"#), None);
    }

    #[tokio::test]
    async fn test_recovery_token_counts_as_session() {
        let client = IdentityClient::new(
            "http://localhost:54321/",
            SecretString::from("anon".to_string()),
            Duration::from_secs(5),
        )
        .unwrap();
        assert!(!client.has_session().await);
        assert_eq!(client.endpoint("user"), "http://localhost:54321/auth/v1/user");

        let client = client.with_recovery_token(SecretString::from("token".to_string()));
        assert!(client.has_session().await);
    }

    #[tokio::test]
    async fn test_update_password_without_session_fails_locally() {
        let client = IdentityClient::new(
            "http://localhost:19999",
            SecretString::from("anon".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.update_password("fresh").await.unwrap_err();
        assert_eq!(err.to_string(), "Auth session missing!");
    }

    #[tokio::test]
    async fn test_sign_out_without_session_is_noop() {
        let client = IdentityClient::new(
            "http://localhost:19999",
            SecretString::from("anon".to_string()),
            Duration::from_secs(1),
        )
        .unwrap();

        assert!(client.sign_out().await.is_ok());
    }
}
