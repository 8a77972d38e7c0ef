use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use portfolio_core::{CollectionDetails, ContentRecord, Document, DocumentKind, Draft, NewDocument, DOCUMENTS};
use portfolio_logging::portfolio_warn;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::remote::{FileUpload, ListQuery, RemoteStore, UploadedFile};
use crate::{FailureKind, RemoteError};

pub const DOCUMENTS_BUCKET: &str = "documents";

/// Upper bound for a single downloaded document.
pub const MAX_DOWNLOAD_BYTES: u64 = 20 * 1024 * 1024;

/// Typed CRUD over one content collection.
pub struct CollectionService<D> {
    store: Arc<dyn RemoteStore>,
    _details: PhantomData<fn() -> D>,
}

impl<D> Clone for CollectionService<D> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _details: PhantomData,
        }
    }
}

impl<D> CollectionService<D>
where
    D: CollectionDetails + Serialize + DeserializeOwned,
{
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            _details: PhantomData,
        }
    }

    pub fn collection(&self) -> &'static str {
        D::COLLECTION
    }

    /// Newest first.
    pub async fn list_all(&self) -> Result<Vec<ContentRecord<D>>, RemoteError> {
        self.list(&ListQuery::default()).await
    }

    pub async fn list_by(&self, field: &str, value: &str) -> Result<Vec<ContentRecord<D>>, RemoteError> {
        self.list(&ListQuery::default().eq(field, value)).await
    }

    pub async fn list(&self, query: &ListQuery) -> Result<Vec<ContentRecord<D>>, RemoteError> {
        let rows = self.store.list(D::COLLECTION, query).await?;
        decode_rows(rows)
    }

    pub async fn create(&self, draft: &Draft<D>) -> Result<ContentRecord<D>, RemoteError> {
        decode(self.store.insert(D::COLLECTION, draft_row(draft)?).await?)
    }

    /// Applies a partial update; collections that track edits get `updated_at` stamped.
    pub async fn update(&self, id: &str, patch: Value) -> Result<ContentRecord<D>, RemoteError> {
        let mut patch = match patch {
            Value::Object(map) => map,
            _ => {
                return Err(RemoteError::new(
                    FailureKind::Decode,
                    "update patch must be a JSON object",
                ))
            }
        };
        if D::STAMPS_UPDATES {
            patch.insert("updated_at".to_string(), Value::String(Utc::now().to_rfc3339()));
        }
        decode(self.store.update(D::COLLECTION, id, Value::Object(patch)).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.store.delete(D::COLLECTION, id).await
    }
}

/// CVs and certificates: table rows plus the files they point at.
#[derive(Clone)]
pub struct DocumentsService {
    store: Arc<dyn RemoteStore>,
}

impl DocumentsService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    pub async fn list_all(&self) -> Result<Vec<Document>, RemoteError> {
        decode_rows(self.store.list(DOCUMENTS, &ListQuery::default()).await?)
    }

    pub async fn list_by_kind(&self, kind: DocumentKind) -> Result<Vec<Document>, RemoteError> {
        let query = ListQuery::default().eq("type", kind.as_str());
        decode_rows(self.store.list(DOCUMENTS, &query).await?)
    }

    /// Most recently uploaded CV, if any.
    pub async fn latest_cv(&self) -> Result<Option<Document>, RemoteError> {
        let query = ListQuery::default().eq("type", DocumentKind::Cv.as_str()).limit(1);
        let mut rows: Vec<Document> = decode_rows(self.store.list(DOCUMENTS, &query).await?)?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    pub async fn create(&self, document: &NewDocument) -> Result<Document, RemoteError> {
        decode(self.store.insert(DOCUMENTS, encode(document)?).await?)
    }

    pub async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        self.store.delete(DOCUMENTS, id).await
    }

    /// Fetches the file a document row points at.
    pub async fn download(&self, document: &Document, max_bytes: u64) -> Result<Vec<u8>, RemoteError> {
        self.store.download(&document.file_url, max_bytes).await
    }

    /// Stores the file under `{kind}s/{kind}-{millis}.{ext}`; the returned name is the
    /// caller's original file name.
    pub async fn upload(
        &self,
        kind: DocumentKind,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, RemoteError> {
        let upload = FileUpload {
            path: storage_path(kind, file_name, Utc::now().timestamp_millis()),
            file_name: file_name.to_string(),
            content_type: content_type_for(file_name).to_string(),
            bytes,
        };
        self.store.upload_file(DOCUMENTS_BUCKET, upload).await
    }

    /// Uploads the file and records it. When the row cannot be written the
    /// stored object is removed again, so no file is left without a row.
    pub async fn publish(
        &self,
        kind: DocumentKind,
        file_name: &str,
        title: Option<String>,
        bytes: Vec<u8>,
    ) -> Result<Document, RemoteError> {
        let uploaded = self.upload(kind, file_name, bytes).await?;
        let document = NewDocument {
            kind,
            title: title.unwrap_or_else(|| uploaded.name.clone()),
            file_url: uploaded.url.clone(),
            file_name: uploaded.name.clone(),
            file_size: uploaded.size,
        };
        match self.create(&document).await {
            Ok(created) => Ok(created),
            Err(err) => {
                let cleanup = self.store.delete_file(DOCUMENTS_BUCKET, &uploaded.path).await;
                if let Err(cleanup) = cleanup {
                    portfolio_warn!(
                        "Orphaned object {}/{} left in storage: {}",
                        DOCUMENTS_BUCKET,
                        uploaded.path,
                        cleanup
                    );
                }
                Err(err)
            }
        }
    }
}

/// Builds the insert body for a draft in the table's own columns: tags go to
/// the collection's tag column; title and category only where they exist.
pub fn draft_row<D>(draft: &Draft<D>) -> Result<Value, RemoteError>
where
    D: CollectionDetails + Serialize,
{
    let mut row = match encode(&draft.details)? {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    if D::HAS_TITLE_COLUMN {
        row.insert("title".to_string(), Value::String(draft.title.clone()));
    }
    row.insert("description".to_string(), Value::String(draft.description.clone()));
    row.insert(D::TAGS_COLUMN.to_string(), encode(&draft.tags)?);
    if D::HAS_CATEGORY_COLUMN {
        row.insert("category".to_string(), Value::String(draft.category.clone()));
    }
    Ok(Value::Object(row))
}

pub fn storage_path(kind: DocumentKind, file_name: &str, millis: i64) -> String {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_else(|| "bin".to_string());
    format!("{kind}s/{kind}-{millis}.{ext}")
}

fn content_type_for(file_name: &str) -> &'static str {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match ext.as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("doc") => "application/msword",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Value, RemoteError> {
    serde_json::to_value(value).map_err(|err| RemoteError::new(FailureKind::Decode, err.to_string()))
}

fn decode<T: DeserializeOwned>(row: Value) -> Result<T, RemoteError> {
    serde_json::from_value(row).map_err(|err| RemoteError::new(FailureKind::Decode, err.to_string()))
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, RemoteError> {
    rows.into_iter().map(decode).collect()
}

#[cfg(test)]
mod tests {
    use portfolio_core::{ExperienceDetails, ProjectDetails};
    use serde_json::json;

    use super::*;

    #[test]
    fn storage_path_uses_kind_folder_and_lowercased_extension() {
        assert_eq!(
            storage_path(DocumentKind::Cv, "My Resume.PDF", 1_700_000_000_000),
            "cvs/cv-1700000000000.pdf"
        );
        assert_eq!(
            storage_path(DocumentKind::Certificate, "badge", 5),
            "certificates/certificate-5.bin"
        );
    }

    #[test]
    fn experience_draft_row_has_no_title_or_category() {
        let draft = Draft {
            title: "Engineer at Acme".to_string(),
            description: "Routing".to_string(),
            tags: vec!["BGP".to_string()],
            category: "network".to_string(),
            details: ExperienceDetails {
                company: "Acme".to_string(),
                position: "Engineer".to_string(),
                duration: "2020 - 2021".to_string(),
            },
        };
        assert_eq!(
            draft_row(&draft).unwrap(),
            json!({
                "company": "Acme",
                "position": "Engineer",
                "duration": "2020 - 2021",
                "description": "Routing",
                "skills": ["BGP"]
            })
        );
    }

    #[test]
    fn project_draft_row_uses_tech_stack() {
        let draft = Draft {
            title: "Router Lab".to_string(),
            description: String::new(),
            tags: vec!["Go".to_string()],
            category: "network".to_string(),
            details: ProjectDetails::default(),
        };
        let row = draft_row(&draft).unwrap();
        assert_eq!(row["tech_stack"], json!(["Go"]));
        assert_eq!(row["title"], "Router Lab");
        assert_eq!(row["category"], "network");
        assert!(row.get("tags").is_none());
    }

    #[test]
    fn content_type_by_extension() {
        assert_eq!(content_type_for("a.pdf"), "application/pdf");
        assert_eq!(content_type_for("a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("a"), "application/octet-stream");
    }
}
