use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// OAuth 2.0 token set.
///
/// Contains the access token, optional refresh token, and expiration time
/// for an authenticated session.
///
/// # Security
///
/// Tokens must be stored only through the secure store and never logged.
/// The `Debug` implementation redacts both token values.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// The access token used for API requests
    pub access_token: String,
    /// The refresh token, when the provider issued one
    pub refresh_token: Option<String>,
    /// When the access token expires (UTC)
    pub expires_at: DateTime<Utc>,
}

impl OAuthTokens {
    /// Create a new token set from a token endpoint response.
    ///
    /// `expires_in` is the provider-reported lifetime in seconds.
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in),
        }
    }

    /// Reconstruct a token set from persisted parts.
    pub fn from_parts(
        access_token: String,
        refresh_token: Option<String>,
        expires_at_unix: i64,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: Utc
                .timestamp_opt(expires_at_unix, 0)
                .single()
                .unwrap_or_else(Utc::now),
        }
    }

    /// Expiry as Unix epoch seconds, for persistence.
    pub fn expires_at_unix(&self) -> i64 {
        self.expires_at.timestamp()
    }

    /// Check whether the access token expires within the given margin.
    ///
    /// A token inside the margin is treated as expired so callers refresh
    /// before the provider starts rejecting it.
    pub fn is_expired_with_margin(&self, margin_seconds: i64) -> bool {
        Utc::now() >= self.expires_at - chrono::Duration::seconds(margin_seconds)
    }
}

// Custom Debug implementation to avoid logging tokens
impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Profile of the signed-in user, as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider-assigned user identifier
    pub id: String,
    /// Display name, when the user has set one
    #[serde(default)]
    pub display_name: Option<String>,
    /// Email address, when the granted scopes include it
    #[serde(default)]
    pub email: Option<String>,
}

/// Authentication state of the credential manager.
///
/// # State Transitions
///
/// ```text
/// SignedOut -> Authorizing -> SignedIn
///                               ^  |
///                               |  v
///                            Refreshing
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AuthState {
    /// No credentials are held
    #[default]
    SignedOut,
    /// An authorization flow is pending completion
    Authorizing,
    /// Valid credentials are held
    SignedIn,
    /// A token refresh is in progress
    Refreshing,
}

impl AuthState {
    /// Check whether the user holds credentials.
    ///
    /// Returns `true` for `SignedIn` and `Refreshing`.
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::SignedIn | AuthState::Refreshing)
    }

    /// Check whether a flow or refresh is in progress.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, AuthState::Authorizing | AuthState::Refreshing)
    }
}

impl fmt::Display for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthState::SignedOut => write!(f, "Signed Out"),
            AuthState::Authorizing => write!(f, "Authorizing..."),
            AuthState::SignedIn => write!(f, "Signed In"),
            AuthState::Refreshing => write!(f, "Refreshing Token..."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_tokens_fresh_outside_margin() {
        let tokens = OAuthTokens {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!tokens.is_expired_with_margin(5));
    }

    #[test]
    fn test_tokens_expired_inside_margin() {
        let tokens = OAuthTokens {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::seconds(3),
        };
        assert!(tokens.is_expired_with_margin(5));
    }

    #[test]
    fn test_tokens_expired_in_past() {
        let tokens = OAuthTokens {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: Utc::now() - Duration::hours(1),
        };
        assert!(tokens.is_expired_with_margin(0));
    }

    #[test]
    fn test_tokens_round_trip_through_parts() {
        let tokens = OAuthTokens::new("access".to_string(), Some("refresh".to_string()), 3600);
        let restored = OAuthTokens::from_parts(
            tokens.access_token.clone(),
            tokens.refresh_token.clone(),
            tokens.expires_at_unix(),
        );
        assert_eq!(restored.access_token, tokens.access_token);
        assert_eq!(restored.refresh_token, tokens.refresh_token);
        assert_eq!(restored.expires_at_unix(), tokens.expires_at_unix());
    }

    #[test]
    fn test_tokens_debug_redacts() {
        let tokens = OAuthTokens::new(
            "secret_access_token".to_string(),
            Some("secret_refresh_token".to_string()),
            3600,
        );
        let debug_str = format!("{:?}", tokens);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret_access_token"));
        assert!(!debug_str.contains("secret_refresh_token"));
    }

    #[test]
    fn test_profile_deserializes_with_missing_fields() {
        let profile: UserProfile = serde_json::from_str(r#"{"id": "user-1"}"#).unwrap();
        assert_eq!(profile.id, "user-1");
        assert!(profile.display_name.is_none());
        assert!(profile.email.is_none());
    }

    #[test]
    fn test_auth_state_is_authenticated() {
        assert!(!AuthState::SignedOut.is_authenticated());
        assert!(!AuthState::Authorizing.is_authenticated());
        assert!(AuthState::SignedIn.is_authenticated());
        assert!(AuthState::Refreshing.is_authenticated());
    }

    #[test]
    fn test_auth_state_default() {
        assert_eq!(AuthState::default(), AuthState::SignedOut);
    }
}
