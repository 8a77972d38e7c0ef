use std::sync::Arc;

use portfolio_core::{Certificate, CollectionDetails, ContentRecord};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::{AuthProvider, AuthSessionMirror, RestAuth};
use crate::cache::CacheStore;
use crate::client::BackendClient;
use crate::fallback::FallbackRecords;
use crate::loader::ContentLoader;
use crate::remote::{RemoteStore, RestStore};
use crate::service::{CollectionService, DocumentsService};
use crate::settings::BackendSettings;
use crate::RemoteError;

/// Everything a view needs, created once and passed around by reference.
pub struct AppContext {
    settings: BackendSettings,
    store: Arc<dyn RemoteStore>,
    cache: Arc<dyn CacheStore>,
    auth: AuthSessionMirror,
}

impl AppContext {
    pub fn connect(settings: BackendSettings, cache: Arc<dyn CacheStore>) -> Result<Self, RemoteError> {
        let client = BackendClient::new(settings.clone())?;
        let store: Arc<dyn RemoteStore> = Arc::new(RestStore::new(client.clone()));
        let provider: Arc<dyn AuthProvider> = Arc::new(RestAuth::new(client));
        Ok(Self::from_parts(settings, store, cache, provider))
    }

    pub fn from_parts(
        settings: BackendSettings,
        store: Arc<dyn RemoteStore>,
        cache: Arc<dyn CacheStore>,
        provider: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            settings,
            store,
            cache,
            auth: AuthSessionMirror::new(provider),
        }
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    pub fn auth(&self) -> &AuthSessionMirror {
        &self.auth
    }

    pub fn service<D>(&self) -> CollectionService<D>
    where
        D: CollectionDetails + Serialize + DeserializeOwned,
    {
        CollectionService::new(self.store.clone())
    }

    pub fn documents(&self) -> DocumentsService {
        DocumentsService::new(self.store.clone())
    }

    pub fn loader<D>(&self) -> ContentLoader<ContentRecord<D>>
    where
        D: CollectionDetails + Serialize + DeserializeOwned,
        ContentRecord<D>: FallbackRecords,
    {
        ContentLoader::new(
            Arc::new(self.service::<D>()),
            self.cache.clone(),
            self.settings.load_deadline,
        )
    }

    /// Uploaded certificates, loaded alongside the experience entries.
    pub fn certificates_loader(&self) -> ContentLoader<Certificate> {
        ContentLoader::new(
            Arc::new(self.documents()),
            self.cache.clone(),
            self.settings.load_deadline,
        )
    }

    /// Ends long-lived subscriptions.
    pub fn shutdown(&self) {
        self.auth.teardown();
    }
}

impl Drop for AppContext {
    fn drop(&mut self) {
        self.shutdown();
    }
}
