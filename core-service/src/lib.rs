//! Core façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, secure
//! storage, settings, audio) into the shared core. Desktop hosts typically
//! enable the `desktop-shims` feature, which pulls in `bridge-desktop` for
//! everything except the audio engine; audio decoding stays with the host.

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{
    audio::AudioEngine,
    http::HttpClient,
    storage::{SecureStore, SettingsStore},
};
use core_auth::CredentialManager;
use core_catalog::CatalogClient;
use core_playback::PlayerSession;
use core_runtime::config::CoreConfig;
use core_runtime::events::EventBus;
use tracing::info;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::{JsonFileSettingsStore, KeyringSecureStore, ReqwestHttpClient};

/// Aggregated handle to all bridge dependencies the core requires.
pub struct CoreDependencies {
    pub http_client: Arc<dyn HttpClient>,
    pub secure_store: Arc<dyn SecureStore>,
    pub settings_store: Arc<dyn SettingsStore>,
    pub audio_engine: Arc<dyn AudioEngine>,
}

impl CoreDependencies {
    /// Construct a dependency bundle from explicit bridge handles.
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        secure_store: Arc<dyn SecureStore>,
        settings_store: Arc<dyn SettingsStore>,
        audio_engine: Arc<dyn AudioEngine>,
    ) -> Self {
        Self {
            http_client,
            secure_store,
            settings_store,
            audio_engine,
        }
    }

    /// Desktop bridge set.
    ///
    /// The audio engine is still supplied by the host; no desktop audio
    /// implementation is shipped.
    #[cfg(feature = "desktop-shims")]
    pub fn desktop(
        audio_engine: Arc<dyn AudioEngine>,
        keyring_service: &str,
        settings_path: impl Into<std::path::PathBuf>,
    ) -> Result<Self> {
        let http_client = ReqwestHttpClient::new()
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

        Ok(Self {
            http_client: Arc::new(http_client),
            secure_store: Arc::new(KeyringSecureStore::new(keyring_service)),
            settings_store: Arc::new(JsonFileSettingsStore::new(settings_path)),
            audio_engine,
        })
    }
}

/// Outcome of the startup restore pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreSummary {
    /// A persisted credential record was found and the session is signed in
    pub signed_in: bool,
    /// A persisted queue snapshot was loaded
    pub queue_restored: bool,
}

/// Primary façade exposed to host applications.
///
/// Owns the credential manager, catalog client, and playback session, all
/// wired from one explicit dependency bundle.
#[derive(Clone)]
pub struct AppCore {
    credentials: Arc<CredentialManager>,
    catalog: Arc<CatalogClient>,
    player: PlayerSession,
    events: EventBus,
    config: CoreConfig,
}

impl std::fmt::Debug for AppCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppCore")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppCore {
    /// Wire the core components from explicit dependencies.
    ///
    /// # Errors
    ///
    /// [`CoreError::InitializationFailed`] when the configuration is invalid.
    pub fn new(deps: CoreDependencies, config: CoreConfig, events: EventBus) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?;

        let credentials = Arc::new(CredentialManager::new(
            Arc::clone(&deps.http_client),
            Arc::clone(&deps.secure_store),
            config.auth.clone(),
            events.clone(),
        ));

        let catalog = Arc::new(CatalogClient::new(
            Arc::clone(&deps.http_client),
            config.catalog.clone(),
        ));

        let player = PlayerSession::new(
            Arc::clone(&deps.audio_engine),
            Arc::clone(&catalog),
            Arc::clone(&deps.settings_store),
            events.clone(),
        );

        info!("Core wired");
        Ok(Self {
            credentials,
            catalog,
            player,
            events,
            config,
        })
    }

    /// Run both restore paths: persisted credentials and persisted queue.
    ///
    /// Absence of either is first-run, never an error.
    pub async fn restore(&self) -> RestoreSummary {
        let signed_in = self.credentials.restore_session().await;
        let queue_restored = self.player.restore().await;

        info!(signed_in, queue_restored, "Startup restore completed");
        RestoreSummary {
            signed_in,
            queue_restored,
        }
    }

    /// Credential manager for the host's account surface.
    pub fn credentials(&self) -> Arc<CredentialManager> {
        Arc::clone(&self.credentials)
    }

    /// Catalog search client.
    pub fn catalog(&self) -> Arc<CatalogClient> {
        Arc::clone(&self.catalog)
    }

    /// Playback session and queue.
    pub fn player(&self) -> &PlayerSession {
        &self.player
    }

    /// Event bus the components publish on.
    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// The static configuration the core was wired with.
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::audio::{AudioHandleId, AudioSource, PlaybackStatus};
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{HttpRequest, HttpResponse};
    use bytes::Bytes;
    use core_auth::AuthState;
    use core_runtime::config::{AuthApiConfig, CatalogApiConfig};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::broadcast;

    struct MockHttpClient {
        responses: Mutex<VecDeque<HttpResponse>>,
    }

    impl MockHttpClient {
        fn new() -> Self {
            Self {
                responses: Mutex::new(VecDeque::new()),
            }
        }

        fn push_json(&self, status: u16, body: &str) {
            self.responses.lock().unwrap().push_back(HttpResponse {
                status,
                headers: HashMap::new(),
                body: Bytes::from(body.to_string()),
            });
        }
    }

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            self.responses.lock().unwrap().pop_front().ok_or_else(|| {
                BridgeError::OperationFailed("No scripted response".to_string())
            })
        }
    }

    #[derive(Default)]
    struct MockSecureStore {
        storage: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SecureStore for MockSecureStore {
        async fn set_secret(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.storage
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_secret(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.storage.lock().unwrap().get(key).cloned())
        }

        async fn delete_secret(&self, key: &str) -> BridgeResult<()> {
            self.storage.lock().unwrap().remove(key);
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockSettingsStore {
        storage: Mutex<HashMap<String, String>>,
    }

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(&self, key: &str, value: &str) -> BridgeResult<()> {
            self.storage
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        async fn get_string(&self, key: &str) -> BridgeResult<Option<String>> {
            Ok(self.storage.lock().unwrap().get(key).cloned())
        }

        async fn delete(&self, key: &str) -> BridgeResult<()> {
            self.storage.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct NullAudioEngine;

    #[async_trait]
    impl AudioEngine for NullAudioEngine {
        async fn load(&self, _source: AudioSource, _autoplay: bool) -> BridgeResult<AudioHandleId> {
            Ok(AudioHandleId::new())
        }

        async fn play(&self, _handle: AudioHandleId) -> BridgeResult<()> {
            Ok(())
        }

        async fn pause(&self, _handle: AudioHandleId) -> BridgeResult<()> {
            Ok(())
        }

        async fn stop(&self, _handle: AudioHandleId) -> BridgeResult<()> {
            Ok(())
        }

        async fn seek(&self, _handle: AudioHandleId, _position: Duration) -> BridgeResult<()> {
            Ok(())
        }

        async fn unload(&self, _handle: AudioHandleId) -> BridgeResult<()> {
            Ok(())
        }

        async fn status_stream(
            &self,
            _handle: AudioHandleId,
        ) -> BridgeResult<broadcast::Receiver<PlaybackStatus>> {
            let (sender, receiver) = broadcast::channel(1);
            std::mem::forget(sender);
            Ok(receiver)
        }
    }

    fn test_config() -> CoreConfig {
        CoreConfig::new(
            CatalogApiConfig::default(),
            AuthApiConfig::new("client-123", "myapp://callback"),
        )
    }

    fn deps_with(http: Arc<MockHttpClient>) -> CoreDependencies {
        CoreDependencies::new(
            http,
            Arc::new(MockSecureStore::default()),
            Arc::new(MockSettingsStore::default()),
            Arc::new(NullAudioEngine),
        )
    }

    #[tokio::test]
    async fn test_new_rejects_invalid_config() {
        let config = CoreConfig::new(
            CatalogApiConfig::default().with_country("USA"),
            AuthApiConfig::new("client-123", "myapp://callback"),
        );

        let err = AppCore::new(deps_with(Arc::new(MockHttpClient::new())), config, EventBus::new(16))
            .unwrap_err();
        assert!(matches!(err, CoreError::InitializationFailed(_)));
    }

    #[tokio::test]
    async fn test_restore_on_first_run() {
        let core = AppCore::new(
            deps_with(Arc::new(MockHttpClient::new())),
            test_config(),
            EventBus::new(16),
        )
        .unwrap();

        let summary = core.restore().await;
        assert!(!summary.signed_in);
        assert!(!summary.queue_restored);
        assert_eq!(core.credentials().state().await, AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_session_survives_rewiring() {
        let http = Arc::new(MockHttpClient::new());
        http.push_json(
            200,
            r#"{"access_token": "at-1", "refresh_token": "rt-1", "expires_in": 3600}"#,
        );
        http.push_json(200, r#"{"id": "user-1"}"#);

        let secure = Arc::new(MockSecureStore::default());
        let settings = Arc::new(MockSettingsStore::default());

        let deps = CoreDependencies::new(
            http.clone(),
            secure.clone(),
            settings.clone(),
            Arc::new(NullAudioEngine),
        );
        let core = AppCore::new(deps, test_config(), EventBus::new(16)).unwrap();

        // Complete a full sign-in against the scripted endpoints
        let credentials = core.credentials();
        let url = credentials.begin_authorization().await.unwrap();
        let state = url::Url::parse(&url)
            .ok()
            .and_then(|u| {
                u.query_pairs()
                    .find(|(k, _)| k == "state")
                    .map(|(_, v)| v.into_owned())
            })
            .unwrap();
        credentials
            .complete_authorization("auth-code", &state)
            .await
            .unwrap();

        // A fresh core over the same stores picks the session back up
        let deps = CoreDependencies::new(http, secure, settings, Arc::new(NullAudioEngine));
        let rewired = AppCore::new(deps, test_config(), EventBus::new(16)).unwrap();

        let summary = rewired.restore().await;
        assert!(summary.signed_in);
        assert_eq!(rewired.credentials().state().await, AuthState::SignedIn);
    }
}
