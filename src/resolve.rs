use async_trait::async_trait;
use tracing::debug;

use crate::api::documents::DocumentFilter;
use crate::api::ApiClient;
use crate::error::{ApiError, ApiResult};
use crate::models::{NamedResource, ResourceKind};
use crate::pagination::PageRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntry {
    pub id: i64,
    pub name: String,
}

impl NamedEntry {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Source of `(id, name)` pairs for name lookups. `name` is a hint an
/// implementation may use to narrow the listing; matching happens in
/// [`resolve`].
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn candidates(&self, kind: ResourceKind, name: &str) -> ApiResult<Vec<NamedEntry>>;
}

#[async_trait]
impl Catalog for ApiClient {
    async fn candidates(&self, kind: ResourceKind, name: &str) -> ApiResult<Vec<NamedEntry>> {
        match kind {
            ResourceKind::Tag => Ok(entries(self.list_tags().await?)),
            ResourceKind::Correspondent => Ok(entries(self.list_correspondents().await?)),
            ResourceKind::DocumentType => Ok(entries(self.list_document_types().await?)),
            ResourceKind::StoragePath => Ok(entries(self.list_storage_paths().await?)),
            ResourceKind::SavedView => Ok(entries(self.list_saved_views().await?)),
            ResourceKind::Document => {
                let filter = DocumentFilter {
                    title: Some(name.to_string()),
                    page: PageRequest::everything(),
                    ..Default::default()
                };
                Ok(self
                    .list_documents(&filter)
                    .await?
                    .into_iter()
                    .map(|doc| NamedEntry::new(doc.id, doc.title))
                    .collect())
            }
            ResourceKind::Task => Err(ApiError::Unsupported(kind)),
        }
    }
}

fn entries<R: NamedResource>(records: Vec<R>) -> Vec<NamedEntry> {
    records
        .iter()
        .map(|record| NamedEntry::new(record.id(), record.name()))
        .collect()
}

/// Turns a user-supplied reference into an id. Integers are returned as
/// they are without contacting the server; anything else must match a
/// record name case-insensitively.
pub async fn resolve<C>(catalog: &C, kind: ResourceKind, token: &str) -> ApiResult<i64>
where
    C: Catalog + ?Sized,
{
    let token = token.trim();
    if let Ok(id) = token.parse::<i64>() {
        return Ok(id);
    }

    let entries = catalog.candidates(kind, token).await?;
    let id = match_by_name(&entries, token).ok_or_else(|| ApiError::not_found(kind, token))?;
    debug!(%kind, name = token, id, "resolved reference");
    Ok(id)
}

/// First entry whose name equals `name`, ignoring case.
pub fn match_by_name(entries: &[NamedEntry], name: &str) -> Option<i64> {
    let wanted = name.to_lowercase();
    entries
        .iter()
        .find(|entry| entry.name.to_lowercase() == wanted)
        .map(|entry| entry.id)
}
