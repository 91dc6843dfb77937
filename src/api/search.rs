use std::collections::BTreeMap;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiResult;
use crate::models::{Correspondent, Document, DocumentType, SavedView, StoragePath, Tag};

use super::{ApiClient, QueryParams};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalSearchResult {
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub saved_views: Vec<SavedView>,
    #[serde(default)]
    pub correspondents: Vec<Correspondent>,
    #[serde(default)]
    pub document_types: Vec<DocumentType>,
    #[serde(default)]
    pub storage_paths: Vec<StoragePath>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl GlobalSearchResult {
    pub fn total(&self) -> usize {
        self.documents.len()
            + self.saved_views.len()
            + self.correspondents.len()
            + self.document_types.len()
            + self.storage_paths.len()
            + self.tags.len()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    #[serde(default)]
    pub documents_total: Option<u64>,
    #[serde(default)]
    pub documents_inbox: Option<u64>,
    #[serde(default)]
    pub character_count: Option<u64>,
    #[serde(default)]
    pub tag_count: Option<u64>,
    #[serde(default)]
    pub correspondent_count: Option<u64>,
    #[serde(default)]
    pub document_type_count: Option<u64>,
    #[serde(default)]
    pub storage_path_count: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Statistics {
    /// Known counters with their display labels, skipping ones the server
    /// did not report.
    pub fn counters(&self) -> Vec<(&'static str, u64)> {
        [
            ("Documents", self.documents_total),
            ("In Inbox", self.documents_inbox),
            ("Characters", self.character_count),
            ("Tags", self.tag_count),
            ("Correspondents", self.correspondent_count),
            ("Document Types", self.document_type_count),
            ("Storage Paths", self.storage_path_count),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.map(|value| (label, value)))
        .collect()
    }
}

impl ApiClient {
    pub async fn global_search(&self, query: &str) -> ApiResult<GlobalSearchResult> {
        let mut params = QueryParams::new();
        params.push("query", query);
        self.transport()
            .get(&params.apply("/api/search/"))
            .await?
            .expect_status(&[StatusCode::OK])?
            .json()
    }

    pub async fn statistics(&self) -> ApiResult<Statistics> {
        self.transport()
            .get("/api/statistics/")
            .await?
            .expect_status(&[StatusCode::OK])?
            .json()
    }
}
