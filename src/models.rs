use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Document,
    Tag,
    Correspondent,
    DocumentType,
    StoragePath,
    SavedView,
    Task,
}

impl ResourceKind {
    pub fn path(self) -> &'static str {
        match self {
            Self::Document => "/api/documents/",
            Self::Tag => "/api/tags/",
            Self::Correspondent => "/api/correspondents/",
            Self::DocumentType => "/api/document_types/",
            Self::StoragePath => "/api/storage_paths/",
            Self::SavedView => "/api/saved_views/",
            Self::Task => "/api/tasks/",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Tag => "tag",
            Self::Correspondent => "correspondent",
            Self::DocumentType => "document type",
            Self::StoragePath => "storage path",
            Self::SavedView => "saved view",
            Self::Task => "task",
        }
    }

    pub fn record_path(self, id: i64) -> String {
        format!("{}{id}/", self.path())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A record served from one of the CRUD endpoints.
pub trait Resource: DeserializeOwned + Send + 'static {
    const KIND: ResourceKind;

    fn id(&self) -> i64;
}

/// A record users refer to by a human-readable name.
pub trait NamedResource: Resource {
    fn name(&self) -> &str;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<i64>,
    pub correspondent: Option<i64>,
    pub document_type: Option<i64>,
    #[serde(default)]
    pub storage_path: Option<i64>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub created_date: Option<NaiveDate>,
    #[serde(default)]
    pub modified: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub added: Option<DateTime<FixedOffset>>,
    #[serde(default)]
    pub archive_serial_number: Option<i64>,
    #[serde(default)]
    pub original_file_name: Option<String>,
    #[serde(default)]
    pub archived_file_name: Option<String>,
}

impl Document {
    pub fn tag_set(&self) -> BTreeSet<i64> {
        self.tags.iter().copied().collect()
    }

    /// Date shown in listings; falls back to the date part of `created`.
    pub fn created_display(&self) -> String {
        if let Some(date) = self.created_date {
            return date.to_string();
        }
        self.created
            .as_deref()
            .map(|created| created.chars().take(10).collect())
            .unwrap_or_default()
    }
}

impl Resource for Document {
    const KIND: ResourceKind = ResourceKind::Document;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub text_color: String,
    #[serde(default, rename = "match")]
    pub match_pattern: String,
    #[serde(default)]
    pub matching_algorithm: i64,
    #[serde(default)]
    pub is_insensitive: bool,
    #[serde(default)]
    pub is_inbox_tag: bool,
    #[serde(default)]
    pub document_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Correspondent {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    #[serde(default, rename = "match")]
    pub match_pattern: String,
    #[serde(default)]
    pub matching_algorithm: i64,
    #[serde(default)]
    pub is_insensitive: bool,
    #[serde(default)]
    pub document_count: i64,
    #[serde(default)]
    pub last_correspondence: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentType {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    #[serde(default, rename = "match")]
    pub match_pattern: String,
    #[serde(default)]
    pub matching_algorithm: i64,
    #[serde(default)]
    pub is_insensitive: bool,
    #[serde(default)]
    pub document_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePath {
    pub id: i64,
    #[serde(default)]
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub path: String,
    #[serde(default, rename = "match")]
    pub match_pattern: String,
    #[serde(default)]
    pub matching_algorithm: i64,
    #[serde(default)]
    pub is_insensitive: bool,
    #[serde(default)]
    pub document_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedView {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub show_on_dashboard: bool,
    #[serde(default)]
    pub show_in_sidebar: bool,
    #[serde(default)]
    pub sort_field: Option<String>,
    #[serde(default)]
    pub sort_reverse: bool,
    #[serde(default)]
    pub filter_rules: Vec<Value>,
}

macro_rules! named_resource {
    ($ty:ty, $kind:expr) => {
        impl Resource for $ty {
            const KIND: ResourceKind = $kind;

            fn id(&self) -> i64 {
                self.id
            }
        }

        impl NamedResource for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        }
    };
}

named_resource!(Tag, ResourceKind::Tag);
named_resource!(Correspondent, ResourceKind::Correspondent);
named_resource!(DocumentType, ResourceKind::DocumentType);
named_resource!(StoragePath, ResourceKind::StoragePath);
named_resource!(SavedView, ResourceKind::SavedView);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Started,
    Success,
    Failure,
    Retry,
    Revoked,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::Revoked)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Retry => "RETRY",
            Self::Revoked => "REVOKED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(label)
    }
}

/// Older servers send the related document as a string, newer ones as a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RelatedDocument {
    Id(i64),
    Text(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: Option<i64>,
    pub task_id: String,
    #[serde(default)]
    pub task_file_name: Option<String>,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_done: Option<String>,
    #[serde(default, rename = "type")]
    pub task_type: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub related_document: Option<RelatedDocument>,
}

impl Task {
    /// Id of the document produced by the task, once known.
    pub fn document_id(&self) -> Option<i64> {
        match self.related_document.as_ref()? {
            RelatedDocument::Id(id) => Some(*id),
            RelatedDocument::Text(text) => text.trim().parse().ok(),
        }
    }
}
