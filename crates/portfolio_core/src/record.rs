use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const PROJECTS: &str = "projects";
pub const EXPERIENCE: &str = "experience";
pub const DOCUMENTS: &str = "documents";
/// Certificate rows live in `documents`; this names their snapshot.
pub const CERTIFICATES: &str = "certificates";

/// Fields the filter view and the loader need from any collection row.
pub trait Record: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    /// Remote collection the record type lives in.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn description(&self) -> &str;
    fn tags(&self) -> &[String];
    fn category(&self) -> &str;
}

/// A row of a content collection: the shared shape plus per-collection details.
///
/// Rows are read in the backend's own column names (`tech_stack`, `skills`);
/// collections without a `title` column get one from their details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentRecord<D> {
    pub id: String,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub details: D,
}

#[derive(Deserialize)]
struct RecordRow<D> {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default, alias = "tech_stack", alias = "skills")]
    tags: Vec<String>,
    #[serde(default)]
    category: String,
    #[serde(deserialize_with = "timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default, deserialize_with = "optional_timestamp")]
    updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    details: D,
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN).and_utc())
}

fn timestamp<'de, De: Deserializer<'de>>(deserializer: De) -> Result<DateTime<Utc>, De::Error> {
    let text = String::deserialize(deserializer)?;
    parse_timestamp(&text)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{text}`")))
}

fn optional_timestamp<'de, De: Deserializer<'de>>(
    deserializer: De,
) -> Result<Option<DateTime<Utc>>, De::Error> {
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(text) => parse_timestamp(&text)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp `{text}`"))),
    }
}

impl<'de, D> Deserialize<'de> for ContentRecord<D>
where
    D: CollectionDetails + Deserialize<'de>,
{
    fn deserialize<De: Deserializer<'de>>(deserializer: De) -> Result<Self, De::Error> {
        let row = RecordRow::<D>::deserialize(deserializer)?;
        let title = if row.title.is_empty() {
            row.details.derived_title().unwrap_or_default()
        } else {
            row.title
        };
        Ok(Self {
            id: row.id,
            title,
            description: row.description,
            tags: row.tags,
            category: row.category,
            created_at: row.created_at,
            updated_at: row.updated_at,
            details: row.details,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProjectDetails {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub demo_url: Option<String>,
    #[serde(default)]
    pub repo_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExperienceDetails {
    pub company: String,
    pub position: String,
    pub duration: String,
}

pub type Project = ContentRecord<ProjectDetails>;
pub type Experience = ContentRecord<ExperienceDetails>;

/// Maps a details type to the collection its rows are stored in and to
/// that table's column layout.
pub trait CollectionDetails: Clone + fmt::Debug + PartialEq + Send + Sync + 'static {
    const COLLECTION: &'static str;
    /// Whether updates should stamp `updated_at`.
    const STAMPS_UPDATES: bool;
    /// Column the tags are stored in.
    const TAGS_COLUMN: &'static str;
    const HAS_TITLE_COLUMN: bool;
    const HAS_CATEGORY_COLUMN: bool;

    /// Title for rows of tables without a `title` column.
    fn derived_title(&self) -> Option<String> {
        None
    }
}

impl CollectionDetails for ProjectDetails {
    const COLLECTION: &'static str = PROJECTS;
    const STAMPS_UPDATES: bool = true;
    const TAGS_COLUMN: &'static str = "tech_stack";
    const HAS_TITLE_COLUMN: bool = true;
    const HAS_CATEGORY_COLUMN: bool = true;
}

impl CollectionDetails for ExperienceDetails {
    const COLLECTION: &'static str = EXPERIENCE;
    const STAMPS_UPDATES: bool = false;
    const TAGS_COLUMN: &'static str = "skills";
    const HAS_TITLE_COLUMN: bool = false;
    const HAS_CATEGORY_COLUMN: bool = false;

    fn derived_title(&self) -> Option<String> {
        Some(format!("{} at {}", self.position, self.company))
    }
}

impl<D: CollectionDetails> Record for ContentRecord<D> {
    const COLLECTION: &'static str = D::COLLECTION;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category(&self) -> &str {
        &self.category
    }
}

/// Insertable subset of a content record; the store assigns id and timestamps.
///
/// `title` and `category` are only written to tables that have those columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft<D> {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub details: D,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Cv,
    Certificate,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentKind::Cv => "cv",
            DocumentKind::Certificate => "certificate",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// An uploaded CV or certificate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    pub file_url: String,
    pub file_name: String,
    pub file_size: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDocument {
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub title: String,
    pub file_url: String,
    pub file_name: String,
    pub file_size: u64,
}

/// An uploaded certificate as listed next to the experience entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub title: String,
    pub file_url: String,
    #[serde(default)]
    pub file_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<Document> for Certificate {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            title: document.title,
            file_url: document.file_url,
            file_name: document.file_name,
            created_at: document.created_at,
        }
    }
}

impl Record for Certificate {
    const COLLECTION: &'static str = CERTIFICATES;

    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn description(&self) -> &str {
        &self.file_name
    }

    fn tags(&self) -> &[String] {
        &[]
    }

    fn category(&self) -> &str {
        ""
    }
}
