//! Client configuration management.
//!
//! Consolidates all environment variable reads and provides validated configuration.

use resume_screen::session::{DEFAULT_RESET_COOLDOWN_SECS, DEFAULT_RESET_REDIRECT, SessionSettings};
use secrecy::SecretString;
use std::time::Duration;

/// Scoring service used when nothing else is configured.
pub const DEFAULT_SCORING_URL: &str = "http://127.0.0.1:8000";

/// Complete client configuration
#[derive(Debug)]
pub struct ClientConfig {
    /// Scoring service connection
    pub scoring: ScoringConfig,
    /// Identity provider connection
    pub identity: IdentityConfig,
    /// Session behaviour (reset redirect, cooldown)
    pub session: SessionSettings,
    /// Access token from a password-reset link, seeds a recovery session
    pub recovery_token: Option<SecretString>,
}

/// Scoring service configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Identity provider configuration
#[derive(Debug)]
pub struct IdentityConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public anon key sent as the `apikey` header
    pub anon_key: SecretString,
}

/// Values given on the command line; they win over the environment.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    pub scoring_url: Option<String>,
    pub identity_url: Option<String>,
    pub recovery_token: Option<String>,
}

impl ClientConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns error if required variables are missing or invalid
    pub fn from_env(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::from_lookup(overrides, |key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(overrides: ConfigOverrides, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scoring_url = overrides
            .scoring_url
            .or_else(|| lookup("SCORING_URL"))
            .unwrap_or_else(|| DEFAULT_SCORING_URL.to_string());

        let timeout_secs: u64 = parse_or(&lookup, "HTTP_TIMEOUT_SECS", 30)?;

        let identity_url = overrides
            .identity_url
            .or_else(|| lookup("SUPABASE_URL"))
            .ok_or_else(|| ConfigError::MissingRequired {
                var: "SUPABASE_URL".to_string(),
                hint: "Project URL from the Supabase dashboard, e.g. https://xyz.supabase.co"
                    .to_string(),
            })?;

        let anon_key = lookup("SUPABASE_ANON_KEY").ok_or_else(|| ConfigError::MissingRequired {
            var: "SUPABASE_ANON_KEY".to_string(),
            hint: "Public anon key from the Supabase API settings".to_string(),
        })?;

        let session = SessionSettings {
            reset_redirect: lookup("RESET_REDIRECT_URL")
                .unwrap_or_else(|| DEFAULT_RESET_REDIRECT.to_string()),
            reset_cooldown_secs: parse_or(
                &lookup,
                "RESET_COOLDOWN_SECS",
                DEFAULT_RESET_COOLDOWN_SECS,
            )?,
        };

        let recovery_token = overrides
            .recovery_token
            .or_else(|| lookup("RECOVERY_ACCESS_TOKEN"))
            .filter(|token| !token.trim().is_empty())
            .map(SecretString::from);

        let config = ClientConfig {
            scoring: ScoringConfig {
                base_url: trim_base(scoring_url),
                timeout: Duration::from_secs(timeout_secs),
            },
            identity: IdentityConfig {
                url: trim_base(identity_url),
                anon_key: SecretString::from(anon_key),
            },
            session,
            recovery_token,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (var, url) in [
            ("SCORING_URL", &self.scoring.base_url),
            ("SUPABASE_URL", &self.identity.url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid {
                    var: var.to_string(),
                    reason: format!("'{url}' must start with http:// or https://"),
                });
            }
        }

        if self.scoring.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "HTTP_TIMEOUT_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        if self.session.reset_cooldown_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "RESET_COOLDOWN_SECS".to_string(),
                reason: "Must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {var}\nHint: {hint}")]
    MissingRequired { var: String, hint: String },

    #[error("Invalid configuration for {var}: {reason}")]
    Invalid { var: String, reason: String },
}

/// Parse an optional variable, falling back to `default` when unset.
/// A set but unparseable value is an error rather than silently ignored.
fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid {
            var: key.to_string(),
            reason: format!("'{raw}' is not a valid value"),
        }),
        None => Ok(default),
    }
}

fn trim_base(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
