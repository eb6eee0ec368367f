use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("An authorization flow is already pending")]
    FlowAlreadyPending,

    #[error("No authorization flow is pending")]
    NoPendingFlow,

    #[error("OAuth state mismatch")]
    StateMismatch,

    #[error("Authorization code exchange failed: {0}")]
    InvalidAuthCode(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Secure storage unavailable: {0}")]
    SecureStorage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
