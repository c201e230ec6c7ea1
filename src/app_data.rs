use std::sync::Arc;

use crate::config::{BootstrapSettings, DatabaseConnections, SecretManager};
use crate::errors::InternalError;
use crate::providers::{FileStorage, LocalFileStorage, TokenProvider};
use crate::stores::{ContentStore, CredentialStore, IdentityStore, ProfileStore, ReferenceStore};

/// Centralized application data following the main-owned stores pattern
///
/// All dependencies are created once at startup and shared across coordinators.
///
/// ```text
/// main.rs
///   ↓
/// AppData::init()
///   ↓ creates once
///   ├─ connections (ledger + content)
///   ├─ secret_manager
///   ├─ identity / profile / reference / credential stores (ledger)
///   ├─ content_store (content)
///   ├─ file_storage
///   └─ token_provider
///   ↓ wrapped in Arc<AppData>
///   ├─ AuthCoordinator::new(app_data)
///   └─ AchievementCoordinator::new(app_data)
/// ```
pub struct AppData {
    pub connections: DatabaseConnections,
    pub secret_manager: Arc<SecretManager>,
    pub identity_store: Arc<IdentityStore>,
    pub profile_store: Arc<ProfileStore>,
    pub reference_store: Arc<ReferenceStore>,
    pub credential_store: Arc<CredentialStore>,
    pub content_store: Arc<ContentStore>,
    pub file_storage: Arc<dyn FileStorage>,
    pub token_provider: Arc<TokenProvider>,
}

impl AppData {
    /// Assemble application data from already-created parts
    pub fn new(
        connections: DatabaseConnections,
        secret_manager: Arc<SecretManager>,
        file_storage: Arc<dyn FileStorage>,
    ) -> Self {
        let token_provider = Arc::new(TokenProvider::new(secret_manager.clone()));

        Self {
            connections,
            secret_manager,
            identity_store: Arc::new(IdentityStore::new()),
            profile_store: Arc::new(ProfileStore::new()),
            reference_store: Arc::new(ReferenceStore::new()),
            credential_store: Arc::new(CredentialStore::new()),
            content_store: Arc::new(ContentStore::new()),
            file_storage,
            token_provider,
        }
    }

    /// Initialize all application data
    ///
    /// Database connections should be initialized and migrated before calling this.
    ///
    /// # Errors
    ///
    /// Returns `InternalError` when secret manager initialization fails
    pub async fn init(
        connections: DatabaseConnections,
        bootstrap_settings: &BootstrapSettings,
    ) -> Result<Self, InternalError> {
        tracing::info!("Initializing AppData...");

        let secret_manager = Arc::new(SecretManager::init().map_err(|e| {
            InternalError::parse("secret_manager", format!("Secret manager init failed: {}", e))
        })?);
        tracing::debug!("Secret manager initialized: {}", secret_manager);

        let file_storage: Arc<dyn FileStorage> =
            Arc::new(LocalFileStorage::new(bootstrap_settings.upload_dir()));
        tracing::debug!("Upload directory: {}", bootstrap_settings.upload_dir().display());

        tracing::info!("AppData initialization complete");

        Ok(Self::new(connections, secret_manager, file_storage))
    }
}
