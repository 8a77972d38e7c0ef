use std::sync::Arc;

use futures_util::StreamExt;

use reqwest::header::{CACHE_CONTROL, CONTENT_TYPE};
use reqwest::Method;
use serde_json::Value;

use crate::client::{map_reqwest_error, BackendClient};
use crate::{FailureKind, RemoteError};

/// Row selection for `list`: equality filters, newest-first ordering and an optional cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filters: Vec<(String, String)>,
    pub order_by: String,
    pub descending: bool,
    pub limit: Option<usize>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            order_by: "created_at".to_string(),
            descending: true,
            limit: None,
        }
    }
}

impl ListQuery {
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub url: String,
    /// Object path inside the bucket.
    pub path: String,
    pub name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub path: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Table and file operations of the hosted backend, on untyped JSON rows.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Value>, RemoteError>;

    async fn insert(&self, collection: &str, row: Value) -> Result<Value, RemoteError>;

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value, RemoteError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError>;

    async fn upload_file(&self, bucket: &str, file: FileUpload) -> Result<UploadedFile, RemoteError>;

    async fn delete_file(&self, bucket: &str, path: &str) -> Result<(), RemoteError>;

    /// Fetches a stored file by URL, refusing anything over `max_bytes`.
    async fn download(&self, url: &str, max_bytes: u64) -> Result<Vec<u8>, RemoteError>;
}

/// `RemoteStore` over the PostgREST table API and the object storage API.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: Arc<BackendClient>,
}

impl RestStore {
    pub fn new(client: Arc<BackendClient>) -> Self {
        Self { client }
    }

    fn table_url(&self, collection: &str) -> Result<url::Url, RemoteError> {
        if collection.is_empty() || collection.contains(['/', '?', '#']) {
            return Err(RemoteError::new(
                FailureKind::InvalidUrl,
                format!("bad collection name {collection:?}"),
            ));
        }
        self.client.endpoint(&format!("rest/v1/{collection}"))
    }

    fn row_url(&self, collection: &str, id: &str) -> Result<url::Url, RemoteError> {
        let mut url = self.table_url(collection)?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{id}"));
        Ok(url)
    }

    pub fn public_url(&self, bucket: &str, path: &str) -> Result<String, RemoteError> {
        self.client
            .endpoint(&format!("storage/v1/object/public/{bucket}/{path}"))
            .map(|url| url.to_string())
    }
}

fn first_row(rows: Vec<Value>) -> Result<Value, RemoteError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| RemoteError::new(FailureKind::NotFound, "no row returned"))
}

#[async_trait::async_trait]
impl RemoteStore for RestStore {
    async fn list(&self, collection: &str, query: &ListQuery) -> Result<Vec<Value>, RemoteError> {
        let mut url = self.table_url(collection)?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("select", "*");
            for (field, value) in &query.filters {
                pairs.append_pair(field, &format!("eq.{value}"));
            }
            let direction = if query.descending { "desc" } else { "asc" };
            pairs.append_pair("order", &format!("{}.{direction}", query.order_by));
            if let Some(limit) = query.limit {
                pairs.append_pair("limit", &limit.to_string());
            }
        }
        let request = self.client.request(Method::GET, url);
        self.client.send_json(request).await
    }

    async fn insert(&self, collection: &str, row: Value) -> Result<Value, RemoteError> {
        let url = self.table_url(collection)?;
        let request = self
            .client
            .request(Method::POST, url)
            .header("Prefer", "return=representation")
            .json(&Value::Array(vec![row]));
        let rows: Vec<Value> = self.client.send_json(request).await?;
        first_row(rows)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<Value, RemoteError> {
        let url = self.row_url(collection, id)?;
        let request = self
            .client
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(&patch);
        let rows: Vec<Value> = self.client.send_json(request).await?;
        first_row(rows)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), RemoteError> {
        let url = self.row_url(collection, id)?;
        let request = self.client.request(Method::DELETE, url);
        self.client.send(request).await?;
        Ok(())
    }

    async fn upload_file(&self, bucket: &str, file: FileUpload) -> Result<UploadedFile, RemoteError> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{bucket}/{}", file.path))?;
        let size = file.bytes.len() as u64;
        let request = self
            .client
            .request(Method::POST, url)
            .header(CACHE_CONTROL, "max-age=3600")
            .header("x-upsert", "false")
            .header(CONTENT_TYPE, file.content_type.clone())
            .body(file.bytes);
        self.client.send(request).await?;

        Ok(UploadedFile {
            url: self.public_url(bucket, &file.path)?,
            path: file.path,
            name: file.file_name,
            size,
        })
    }

    async fn delete_file(&self, bucket: &str, path: &str) -> Result<(), RemoteError> {
        let url = self
            .client
            .endpoint(&format!("storage/v1/object/{bucket}/{path}"))?;
        self.client.send(self.client.request(Method::DELETE, url)).await?;
        Ok(())
    }

    async fn download(&self, url: &str, max_bytes: u64) -> Result<Vec<u8>, RemoteError> {
        let url = url::Url::parse(url)
            .map_err(|err| RemoteError::new(FailureKind::InvalidUrl, err.to_string()))?;
        let response = self.client.send(self.client.request(Method::GET, url)).await?;
        if let Some(len) = response.content_length() {
            if len > max_bytes {
                return Err(too_large(max_bytes, Some(len)));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> RemoteError {
    RemoteError::new(FailureKind::TooLarge { max_bytes, actual }, "file too large")
}
