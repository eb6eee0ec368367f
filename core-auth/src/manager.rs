//! Credential Manager
//!
//! Owns the credential lifecycle: authorization flows, persistence, token
//! refresh, and the cached user profile. The central contract is
//! [`authorization_header`](CredentialManager::authorization_header): it
//! either produces a currently-valid `Bearer` header or `None`, and it never
//! fails loudly, so authorization stays optional for every caller.
//!
//! ## Concurrency
//!
//! Token refreshes are serialized through an internal lock. Callers that
//! queue behind an in-flight refresh re-read the stored record after the
//! lock is granted, so a burst of expiring-token requests produces exactly
//! one refresh.

use crate::error::{AuthError, Result};
use crate::oauth::{OAuthFlowManager, PkceVerifier};
use crate::store::CredentialStore;
use crate::types::{AuthState, OAuthTokens, UserProfile};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use bridge_traits::storage::SecureStore;
use core_runtime::config::AuthApiConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Tokens expiring within this margin are refreshed before use.
const TOKEN_EXPIRY_MARGIN_SECS: i64 = 5;

/// Timeout for profile requests
const PROFILE_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Outcome of a single profile request, before any retry decision.
enum ProfileFetchError {
    Unauthorized,
    Other,
}

/// Manages authorization flows and the persisted credential record.
pub struct CredentialManager {
    flow: OAuthFlowManager,
    store: CredentialStore,
    http_client: Arc<dyn HttpClient>,
    profile_endpoint: String,
    state: RwLock<AuthState>,
    pending: Mutex<Option<PkceVerifier>>,
    refresh_lock: Mutex<()>,
    events: EventBus,
}

impl CredentialManager {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        secure_store: Arc<dyn SecureStore>,
        config: AuthApiConfig,
        events: EventBus,
    ) -> Self {
        let profile_endpoint = config.profile_endpoint.clone();
        Self {
            flow: OAuthFlowManager::new(config, Arc::clone(&http_client)),
            store: CredentialStore::new(secure_store),
            http_client,
            profile_endpoint,
            state: RwLock::new(AuthState::SignedOut),
            pending: Mutex::new(None),
            refresh_lock: Mutex::new(()),
            events,
        }
    }

    /// Current authentication state.
    pub async fn state(&self) -> AuthState {
        *self.state.read().await
    }

    /// Load persisted credentials at startup.
    ///
    /// Returns `true` when a credential record exists and the manager moved
    /// to `SignedIn`. Absence or a corrupt record is first-run, not an error.
    pub async fn restore_session(&self) -> bool {
        match self.store.load_tokens().await {
            Ok(Some(_)) => {
                *self.state.write().await = AuthState::SignedIn;
                info!("Restored persisted session");
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!(error = %e, "Failed to restore session");
                false
            }
        }
    }

    /// Start an authorization flow.
    ///
    /// Generates the PKCE verifier and CSRF state, remembers them as the
    /// pending flow, and returns the authorization URL the host must open.
    ///
    /// # Errors
    ///
    /// [`AuthError::FlowAlreadyPending`] when a flow is awaiting completion;
    /// cancel it first.
    #[instrument(skip(self))]
    pub async fn begin_authorization(&self) -> Result<String> {
        let mut pending = self.pending.lock().await;
        if pending.is_some() {
            return Err(AuthError::FlowAlreadyPending);
        }

        let (url, verifier) = self.flow.build_auth_url()?;
        *pending = Some(verifier);
        *self.state.write().await = AuthState::Authorizing;

        self.events
            .emit(CoreEvent::Auth(AuthEvent::Authorizing))
            .ok();

        info!("Authorization flow started");
        Ok(url)
    }

    /// Complete the pending authorization flow with the callback values.
    ///
    /// Validates the CSRF state, exchanges the code for tokens, persists
    /// them, and best-effort fetches the user profile. On any failure the
    /// manager returns to `SignedOut` and the pending flow is discarded.
    #[instrument(skip_all)]
    pub async fn complete_authorization(&self, code: &str, state: &str) -> Result<()> {
        let verifier = self
            .pending
            .lock()
            .await
            .take()
            .ok_or(AuthError::NoPendingFlow)?;

        let result = self.exchange_and_persist(code, state, &verifier).await;

        match result {
            Ok(tokens) => {
                *self.state.write().await = AuthState::SignedIn;

                // Best-effort profile fetch with the fresh token; failure
                // never blocks sign-in.
                let header = format!("Bearer {}", tokens.access_token);
                let profile_id = match self.request_profile(&header).await {
                    Ok(profile) => {
                        let id = profile.id.clone();
                        self.cache_profile(&profile).await;
                        Some(id)
                    }
                    Err(_) => {
                        debug!("Profile fetch after sign-in failed");
                        None
                    }
                };

                self.events
                    .emit(CoreEvent::Auth(AuthEvent::SignedIn { profile_id }))
                    .ok();

                info!("Authorization flow completed");
                Ok(())
            }
            Err(e) => {
                *self.state.write().await = AuthState::SignedOut;
                self.events
                    .emit(CoreEvent::Auth(AuthEvent::Error {
                        message: e.to_string(),
                        recoverable: true,
                    }))
                    .ok();
                Err(e)
            }
        }
    }

    async fn exchange_and_persist(
        &self,
        code: &str,
        state: &str,
        verifier: &PkceVerifier,
    ) -> Result<OAuthTokens> {
        let tokens = self.flow.exchange_code(code, state, verifier).await?;
        self.store.store_tokens(&tokens).await?;
        Ok(tokens)
    }

    /// Abandon the pending authorization flow, if any.
    ///
    /// Returns `true` when a flow was pending. Persisted credentials are
    /// untouched, so a signed-in user who started a re-authorization stays
    /// signed in.
    pub async fn cancel_authorization(&self) -> bool {
        let had_flow = self.pending.lock().await.take().is_some();
        if had_flow {
            let signed_in = matches!(self.store.load_tokens().await, Ok(Some(_)));
            *self.state.write().await = if signed_in {
                AuthState::SignedIn
            } else {
                AuthState::SignedOut
            };
            debug!("Authorization flow cancelled");
        }
        had_flow
    }

    /// Produce a `Bearer` header for the current access token.
    ///
    /// If the token expires within the 5-second margin, a refresh runs first
    /// (serialized, so concurrent callers share one refresh). Returns `None`
    /// when no credentials exist or the refresh fails; callers proceed
    /// unauthenticated.
    pub async fn authorization_header(&self) -> Option<String> {
        let tokens = match self.store.load_tokens().await {
            Ok(Some(tokens)) => tokens,
            Ok(None) => {
                debug!("No credentials held, proceeding unauthenticated");
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Credential load failed");
                return None;
            }
        };

        if !tokens.is_expired_with_margin(TOKEN_EXPIRY_MARGIN_SECS) {
            return Some(format!("Bearer {}", tokens.access_token));
        }

        // Serialize refreshes. Re-read after acquiring the lock so callers
        // queued behind an in-flight refresh reuse its result.
        let _guard = self.refresh_lock.lock().await;

        if let Ok(Some(tokens)) = self.store.load_tokens().await {
            if !tokens.is_expired_with_margin(TOKEN_EXPIRY_MARGIN_SECS) {
                return Some(format!("Bearer {}", tokens.access_token));
            }

            match self.refresh_inner(tokens).await {
                Ok(refreshed) => return Some(format!("Bearer {}", refreshed.access_token)),
                Err(e) => {
                    warn!(error = %e, "Token refresh failed, proceeding unauthenticated");
                    return None;
                }
            }
        }

        None
    }

    /// Refresh the access token using the stored refresh token.
    ///
    /// Retains the previous refresh token when the provider does not rotate
    /// it, and persists the updated record.
    pub async fn refresh_access_token(&self) -> Result<OAuthTokens> {
        let _guard = self.refresh_lock.lock().await;

        let tokens = self
            .store
            .load_tokens()
            .await?
            .ok_or(AuthError::NotAuthenticated)?;

        self.refresh_inner(tokens).await
    }

    /// Refresh with the refresh lock already held.
    async fn refresh_inner(&self, tokens: OAuthTokens) -> Result<OAuthTokens> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or(AuthError::NotAuthenticated)?;

        *self.state.write().await = AuthState::Refreshing;
        self.events
            .emit(CoreEvent::Auth(AuthEvent::TokenRefreshing))
            .ok();

        match self.flow.refresh_access_token(refresh_token).await {
            Ok(refreshed) => {
                self.store.store_tokens(&refreshed).await?;
                *self.state.write().await = AuthState::SignedIn;
                self.events
                    .emit(CoreEvent::Auth(AuthEvent::TokenRefreshed {
                        expires_at: refreshed.expires_at_unix(),
                    }))
                    .ok();
                Ok(refreshed)
            }
            Err(e) => {
                // The stored record may still hold a usable refresh token;
                // keep the session and let a later attempt retry.
                *self.state.write().await = AuthState::SignedIn;
                self.events
                    .emit(CoreEvent::Auth(AuthEvent::Error {
                        message: e.to_string(),
                        recoverable: true,
                    }))
                    .ok();
                Err(e)
            }
        }
    }

    /// Fetch the signed-in user's profile.
    ///
    /// On a 401 response, refreshes once and retries with the refreshed
    /// token passed explicitly; a second rejection yields `None`. Transport
    /// failures also yield `None`. Successful fetches update the cached
    /// profile.
    pub async fn fetch_profile(&self) -> Option<UserProfile> {
        let header = self.authorization_header().await?;

        match self.request_profile(&header).await {
            Ok(profile) => {
                self.cache_profile(&profile).await;
                Some(profile)
            }
            Err(ProfileFetchError::Unauthorized) => {
                debug!("Profile request unauthorized, refreshing once");

                let refreshed = match self.refresh_access_token().await {
                    Ok(tokens) => tokens,
                    Err(e) => {
                        warn!(error = %e, "Refresh for profile retry failed");
                        return None;
                    }
                };

                let header = format!("Bearer {}", refreshed.access_token);
                match self.request_profile(&header).await {
                    Ok(profile) => {
                        self.cache_profile(&profile).await;
                        Some(profile)
                    }
                    Err(_) => {
                        warn!("Profile request failed after refresh");
                        None
                    }
                }
            }
            Err(ProfileFetchError::Other) => None,
        }
    }

    /// The profile cached from the last successful fetch, if any.
    pub async fn cached_profile(&self) -> Option<UserProfile> {
        self.store.load_profile().await.ok().flatten()
    }

    /// Clear all persisted credentials and in-memory state. Idempotent.
    pub async fn sign_out(&self) {
        if let Err(e) = self.store.clear().await {
            warn!(error = %e, "Failed to clear credential record");
        }
        self.pending.lock().await.take();
        *self.state.write().await = AuthState::SignedOut;

        self.events.emit(CoreEvent::Auth(AuthEvent::SignedOut)).ok();
        info!("Signed out");
    }

    async fn request_profile(
        &self,
        header: &str,
    ) -> std::result::Result<UserProfile, ProfileFetchError> {
        let request = HttpRequest::new(HttpMethod::Get, self.profile_endpoint.clone())
            .header("Authorization", header.to_string())
            .header("Accept", "application/json")
            .timeout(PROFILE_REQUEST_TIMEOUT);

        let response = match self.http_client.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Profile request failed");
                return Err(ProfileFetchError::Other);
            }
        };

        if response.status == 401 {
            return Err(ProfileFetchError::Unauthorized);
        }

        if !response.is_success() {
            warn!(status = response.status, "Profile request rejected");
            return Err(ProfileFetchError::Other);
        }

        response.json::<UserProfile>().map_err(|e| {
            warn!(error = %e, "Failed to parse profile response");
            ProfileFetchError::Other
        })
    }

    async fn cache_profile(&self, profile: &UserProfile) {
        if let Err(e) = self.store.store_profile(profile).await {
            warn!(error = %e, "Failed to cache profile");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::HttpResponse;
    use bytes::Bytes;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex as StdMutex;
    use url::Url;

    #[derive(Clone, Default)]
    struct MockSecureStore {
        storage: Arc<tokio::sync::Mutex<HashMap<String, String>>>,
    }

    #[async_trait::async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.storage
                .lock()
                .await
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.storage.lock().await.get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            self.storage.lock().await.remove(key);
            Ok(())
        }
    }

    struct MockHttpClient {
        responses: StdMutex<VecDeque<BridgeResult<HttpResponse>>>,
        requests: StdMutex<Vec<HttpRequest>>,
    }

    impl MockHttpClient {
        fn new() -> Self {
            Self {
                responses: StdMutex::new(VecDeque::new()),
                requests: StdMutex::new(Vec::new()),
            }
        }

        fn push_json(&self, status: u16, body: &str) {
            self.responses.lock().unwrap().push_back(Ok(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from(body.to_string()),
            }));
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn last_request(&self) -> HttpRequest {
            self.requests.lock().unwrap().last().unwrap().clone()
        }
    }

    #[async_trait::async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.requests.lock().unwrap().push(request);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| {
                    Err(BridgeError::OperationFailed(
                        "No scripted response".to_string(),
                    ))
                })
        }
    }

    const REFRESH_RESPONSE: &str =
        r#"{"access_token": "new-at", "refresh_token": "new-rt", "expires_in": 3600}"#;
    const PROFILE_RESPONSE: &str = r#"{"id": "user-1", "display_name": "Alice"}"#;

    fn manager_with(
        http: Arc<MockHttpClient>,
        secure: Arc<MockSecureStore>,
    ) -> (CredentialManager, EventBus) {
        let bus = EventBus::new(32);
        let config = AuthApiConfig::new("test-client", "myapp://callback")
            .with_authorize_endpoint("https://provider.example/authorize")
            .with_token_endpoint("https://provider.example/token")
            .with_profile_endpoint("https://provider.example/me");
        let manager = CredentialManager::new(http, secure, config, bus.clone());
        (manager, bus)
    }

    async fn seed_tokens(manager: &CredentialManager, expires_in: i64) {
        let tokens = OAuthTokens::new("at-0".to_string(), Some("rt-0".to_string()), expires_in);
        manager.store.store_tokens(&tokens).await.unwrap();
    }

    fn state_param(url: &str) -> String {
        Url::parse(url)
            .unwrap()
            .query_pairs()
            .find(|(k, _)| k == "state")
            .map(|(_, v)| v.into_owned())
            .unwrap()
    }

    #[tokio::test]
    async fn test_authorization_header_none_when_signed_out() {
        let http = Arc::new(MockHttpClient::new());
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));

        assert!(manager.authorization_header().await.is_none());
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_authorization_header_fresh_token_skips_refresh() {
        let http = Arc::new(MockHttpClient::new());
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 3600).await;

        let header = manager.authorization_header().await.unwrap();
        assert_eq!(header, "Bearer at-0");
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_authorization_header_refreshes_expiring_token() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(200, REFRESH_RESPONSE);
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));

        // Inside the 5-second margin
        seed_tokens(&manager, 2).await;

        let header = manager.authorization_header().await.unwrap();
        assert_eq!(header, "Bearer new-at");
        assert_eq!(http.request_count(), 1);

        // The refreshed record is persisted
        let stored = manager.store.load_tokens().await.unwrap().unwrap();
        assert_eq!(stored.access_token, "new-at");
        assert_eq!(stored.refresh_token.as_deref(), Some("new-rt"));
    }

    #[tokio::test]
    async fn test_concurrent_headers_share_one_refresh() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(200, REFRESH_RESPONSE);
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 2).await;

        let manager = Arc::new(manager);
        let m1 = Arc::clone(&manager);
        let m2 = Arc::clone(&manager);
        let (h1, h2) = tokio::join!(
            async move { m1.authorization_header().await },
            async move { m2.authorization_header().await }
        );

        assert_eq!(h1.as_deref(), Some("Bearer new-at"));
        assert_eq!(h2.as_deref(), Some("Bearer new-at"));
        assert_eq!(http.request_count(), 1);
    }

    #[tokio::test]
    async fn test_authorization_header_none_when_refresh_fails() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(400, r#"{"error": "invalid_grant"}"#);
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 2).await;

        assert!(manager.authorization_header().await.is_none());
        assert_eq!(http.request_count(), 1);
    }

    #[tokio::test]
    async fn test_refresh_retains_refresh_token_when_not_rotated() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(200, r#"{"access_token": "new-at", "expires_in": 3600}"#);
        let (manager, _bus) = manager_with(http, Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 2).await;

        let refreshed = manager.refresh_access_token().await.unwrap();
        assert_eq!(refreshed.access_token, "new-at");
        assert_eq!(refreshed.refresh_token.as_deref(), Some("rt-0"));
    }

    #[tokio::test]
    async fn test_begin_authorization_rejects_second_flow() {
        let http = Arc::new(MockHttpClient::new());
        let (manager, _bus) = manager_with(http, Arc::new(MockSecureStore::default()));

        manager.begin_authorization().await.unwrap();
        let err = manager.begin_authorization().await.unwrap_err();
        assert!(matches!(err, AuthError::FlowAlreadyPending));
    }

    #[tokio::test]
    async fn test_cancel_authorization_allows_new_flow() {
        let http = Arc::new(MockHttpClient::new());
        let (manager, _bus) = manager_with(http, Arc::new(MockSecureStore::default()));

        assert!(!manager.cancel_authorization().await);

        manager.begin_authorization().await.unwrap();
        assert_eq!(manager.state().await, AuthState::Authorizing);

        assert!(manager.cancel_authorization().await);
        assert_eq!(manager.state().await, AuthState::SignedOut);

        manager.begin_authorization().await.unwrap();
    }

    #[tokio::test]
    async fn test_complete_authorization_success() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(
            200,
            r#"{"access_token": "at-1", "refresh_token": "rt-1", "expires_in": 3600}"#,
        );
        http.push_json(200, PROFILE_RESPONSE);
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));

        let url = manager.begin_authorization().await.unwrap();
        let state = state_param(&url);

        manager.complete_authorization("auth-code", &state).await.unwrap();
        assert_eq!(manager.state().await, AuthState::SignedIn);

        // Token request plus profile request
        assert_eq!(http.request_count(), 2);

        let header = manager.authorization_header().await.unwrap();
        assert_eq!(header, "Bearer at-1");

        let profile = manager.cached_profile().await.unwrap();
        assert_eq!(profile.id, "user-1");
    }

    #[tokio::test]
    async fn test_complete_authorization_state_mismatch() {
        let http = Arc::new(MockHttpClient::new());
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));

        manager.begin_authorization().await.unwrap();
        let err = manager
            .complete_authorization("auth-code", "forged-state")
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::StateMismatch));
        assert_eq!(manager.state().await, AuthState::SignedOut);
        assert_eq!(http.request_count(), 0);
    }

    #[tokio::test]
    async fn test_complete_authorization_without_pending_flow() {
        let http = Arc::new(MockHttpClient::new());
        let (manager, _bus) = manager_with(http, Arc::new(MockSecureStore::default()));

        let err = manager
            .complete_authorization("code", "state")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::NoPendingFlow));
    }

    #[tokio::test]
    async fn test_fetch_profile_retries_once_on_unauthorized() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(401, "");
        http.push_json(200, REFRESH_RESPONSE);
        http.push_json(200, PROFILE_RESPONSE);
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 3600).await;

        let profile = manager.fetch_profile().await.unwrap();
        assert_eq!(profile.id, "user-1");

        // Profile, refresh, profile retry
        assert_eq!(http.request_count(), 3);

        // The retry carried the refreshed token
        let last = http.last_request();
        assert_eq!(
            last.headers.get("Authorization").map(String::as_str),
            Some("Bearer new-at")
        );
    }

    #[tokio::test]
    async fn test_fetch_profile_gives_up_after_second_unauthorized() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(401, "");
        http.push_json(200, REFRESH_RESPONSE);
        http.push_json(401, "");
        let (manager, _bus) = manager_with(http.clone(), Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 3600).await;

        assert!(manager.fetch_profile().await.is_none());
        assert_eq!(http.request_count(), 3);
    }

    #[tokio::test]
    async fn test_fetch_profile_none_on_transport_failure() {
        let http = Arc::new(MockHttpClient::new());
        // No scripted response: the profile request fails at transport level
        let (manager, _bus) = manager_with(http, Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 3600).await;

        assert!(manager.fetch_profile().await.is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_credentials_and_is_idempotent() {
        let http = Arc::new(MockHttpClient::new());
        let (manager, bus) = manager_with(http, Arc::new(MockSecureStore::default()));
        seed_tokens(&manager, 3600).await;

        let mut events = bus.subscribe();

        manager.sign_out().await;
        assert_eq!(manager.state().await, AuthState::SignedOut);
        assert!(manager.authorization_header().await.is_none());
        assert_eq!(
            events.recv().await.unwrap(),
            CoreEvent::Auth(AuthEvent::SignedOut)
        );

        // Signing out again is a no-op
        manager.sign_out().await;
        assert_eq!(manager.state().await, AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_restore_session() {
        let http = Arc::new(MockHttpClient::new());
        let secure = Arc::new(MockSecureStore::default());
        let (manager, _bus) = manager_with(http.clone(), secure.clone());

        assert!(!manager.restore_session().await);

        seed_tokens(&manager, 3600).await;

        let (restored, _bus) = manager_with(http, secure);
        assert!(restored.restore_session().await);
        assert_eq!(restored.state().await, AuthState::SignedIn);
    }
}
