//! Portfolio engine: backend access, caching and the resilient content loader.
mod auth;
mod cache;
mod client;
mod context;
mod engine;
mod fallback;
mod loader;
mod remote;
mod service;
mod settings;
mod timeout;
mod types;

pub use auth::{
    AuthError, AuthEvent, AuthProvider, AuthSession, AuthSessionMirror, AuthUser, RestAuth,
    SessionHub, SessionSubscription,
};
pub use cache::{
    ensure_cache_dir, snapshot_key, write_atomic, CacheError, CacheStore, FileCache, MemoryCache,
    SnapshotCache,
};
pub use client::BackendClient;
pub use context::AppContext;
pub use engine::EngineHandle;
pub use fallback::{fallback_experience, fallback_projects, FallbackRecords};
pub use loader::{ChannelLoadSink, CollectionSource, ContentLoader, LoadSink};
pub use remote::{FileUpload, ListQuery, RemoteStore, RestStore, UploadedFile};
pub use service::{
    draft_row, storage_path, CollectionService, DocumentsService, DOCUMENTS_BUCKET,
    MAX_DOWNLOAD_BYTES,
};
pub use settings::{
    BackendSettings, Diagnostics, DEFAULT_LOAD_DEADLINE, ENV_BACKEND_ANON_KEY, ENV_BACKEND_URL,
    ENV_LOAD_DEADLINE_MS,
};
pub use timeout::{race, with_timeout, RaceOutcome, TimedOut};
pub use types::{FailureKind, LoadEvent, LoadOutcome, RemoteError};
