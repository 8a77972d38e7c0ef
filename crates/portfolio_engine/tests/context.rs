use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use portfolio_core::{Certificate, DocumentKind, LoadSource, Project, ProjectDetails};
use portfolio_engine::{
    AppContext, AuthError, AuthProvider, AuthUser, BackendSettings, CacheStore, FailureKind,
    FileUpload, ListQuery, LoadEvent, LoadOutcome, LoadSink, MemoryCache, RemoteError,
    RemoteStore, SessionHub, SessionSubscription, UploadedFile,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(portfolio_logging::initialize_for_tests);
}

/// Table store backed by a map of collection name to rows.
#[derive(Default)]
struct InMemoryStore {
    rows: Mutex<Vec<(String, Value)>>,
}

#[async_trait::async_trait]
impl RemoteStore for InMemoryStore {
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Value>, RemoteError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|(name, _)| name == collection)
            .filter(|(_, row)| {
                query
                    .filters
                    .iter()
                    .all(|(field, value)| row[field.as_str()] == value.as_str())
            })
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn insert(&self, collection: &str, mut row: Value) -> Result<Value, RemoteError> {
        let mut rows = self.rows.lock().unwrap();
        row["id"] = json!(format!("row-{}", rows.len() + 1));
        row["created_at"] = json!("2024-06-01T00:00:00Z");
        rows.push((collection.to_string(), row.clone()));
        Ok(row)
    }

    async fn update(&self, _collection: &str, _id: &str, _patch: Value) -> Result<Value, RemoteError> {
        Err(RemoteError {
            kind: FailureKind::NotFound,
            message: "no row".to_string(),
        })
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        self.rows
            .lock()
            .unwrap()
            .retain(|(name, row)| !(name == collection && row["id"] == id));
        Ok(())
    }

    async fn upload_file(&self, _bucket: &str, file: FileUpload) -> Result<UploadedFile, RemoteError> {
        Ok(UploadedFile {
            url: format!("memory://{}", file.path),
            path: file.path,
            size: file.bytes.len() as u64,
            name: file.file_name,
        })
    }

    async fn delete_file(&self, _bucket: &str, _path: &str) -> Result<(), RemoteError> {
        Ok(())
    }

    async fn download(&self, _url: &str, _max_bytes: u64) -> Result<Vec<u8>, RemoteError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
struct SignedOutProvider {
    hub: SessionHub,
}

#[async_trait::async_trait]
impl AuthProvider for SignedOutProvider {
    async fn current_user(&self) -> Result<Option<AuthUser>, AuthError> {
        Ok(None)
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::Rejected {
            status: 400,
            message: "Invalid login credentials".to_string(),
        })
    }

    async fn sign_up(&self, _email: &str, _password: &str) -> Result<AuthUser, AuthError> {
        Err(AuthError::Rejected {
            status: 422,
            message: "Signups not allowed".to_string(),
        })
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        Ok(())
    }

    fn on_session_change(&self) -> SessionSubscription {
        self.hub.subscribe()
    }
}

#[derive(Default)]
struct Collect(Mutex<Vec<LoadEvent<Project>>>);

impl LoadSink<Project> for Collect {
    fn emit(&self, event: LoadEvent<Project>) {
        self.0.lock().unwrap().push(event);
    }
}

#[tokio::test]
async fn created_projects_show_up_in_the_next_live_load() {
    init_logging();
    let provider = Arc::new(SignedOutProvider::default());
    let ctx = AppContext::from_parts(
        BackendSettings::new("https://example.test", "key"),
        Arc::new(InMemoryStore::default()),
        Arc::new(MemoryCache::new()),
        provider.clone(),
    );

    let draft = portfolio_core::Draft {
        title: "Edge router".to_string(),
        description: "BGP lab".to_string(),
        tags: vec!["BGP".to_string()],
        category: "network".to_string(),
        details: ProjectDetails::default(),
    };
    let created = ctx.service::<ProjectDetails>().create(&draft).await.unwrap();
    assert_eq!(created.id, "row-1");

    let loader = ctx.loader::<ProjectDetails>();
    assert_eq!(loader.deadline(), Duration::from_millis(800));
    let sink = Collect::default();
    let outcome = loader.load(1, &sink, &CancellationToken::new()).await;
    assert_eq!(outcome, LoadOutcome::Live { count: 1 });

    let events = sink.0.lock().unwrap().clone();
    assert!(matches!(events[0], LoadEvent::Rendered { source: LoadSource::Fallback, .. }));
    assert_eq!(
        events[1],
        LoadEvent::Rendered {
            generation: 1,
            source: LoadSource::Live,
            records: vec![created],
        }
    );
}

#[derive(Default)]
struct CollectCertificates(Mutex<Vec<LoadEvent<Certificate>>>);

impl LoadSink<Certificate> for CollectCertificates {
    fn emit(&self, event: LoadEvent<Certificate>) {
        self.0.lock().unwrap().push(event);
    }
}

#[tokio::test]
async fn published_certificates_load_next_to_experience() {
    init_logging();
    let cache = MemoryCache::new();
    let ctx = AppContext::from_parts(
        BackendSettings::new("https://example.test", "key"),
        Arc::new(InMemoryStore::default()),
        Arc::new(cache.clone()),
        Arc::new(SignedOutProvider::default()),
    );
    let documents = ctx.documents();
    documents
        .publish(DocumentKind::Cv, "cv.pdf", None, b"%PDF".to_vec())
        .await
        .unwrap();
    let certificate = documents
        .publish(
            DocumentKind::Certificate,
            "ccnp.pdf",
            Some("CCNP".to_string()),
            b"%PDF".to_vec(),
        )
        .await
        .unwrap();

    let loader = ctx.certificates_loader();
    assert_eq!(loader.deadline(), Duration::from_millis(800));
    let sink = CollectCertificates::default();
    let outcome = loader.load(1, &sink, &CancellationToken::new()).await;
    assert_eq!(outcome, LoadOutcome::Live { count: 1 });

    let events = sink.0.lock().unwrap().clone();
    assert_eq!(
        events,
        vec![
            LoadEvent::Rendered {
                generation: 1,
                source: LoadSource::Fallback,
                records: Vec::new(),
            },
            LoadEvent::Rendered {
                generation: 1,
                source: LoadSource::Live,
                records: vec![Certificate::from(certificate)],
            },
        ]
    );
    assert!(cache.get("certificates_cache_v1").is_some());
}

#[tokio::test]
async fn shutdown_ends_the_auth_subscription() {
    init_logging();
    let provider = Arc::new(SignedOutProvider::default());
    let ctx = AppContext::from_parts(
        BackendSettings::default(),
        Arc::new(InMemoryStore::default()),
        Arc::new(MemoryCache::new()),
        provider.clone(),
    );
    assert!(!ctx.settings().is_configured());

    ctx.auth().initialize().await;
    assert_eq!(provider.hub.subscriber_count(), 1);
    assert!(ctx.auth().sign_in("a@example.com", "secret1").await.is_err());

    drop(ctx);
    assert_eq!(provider.hub.subscriber_count(), 0);
}
