use serde::Serialize;

use crate::error::ApiResult;
use crate::models::{ResourceKind, Tag};

use super::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct NewTag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TagChangeset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl TagChangeset {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none()
    }
}

impl ApiClient {
    pub async fn list_tags(&self) -> ApiResult<Vec<Tag>> {
        self.list_all().await
    }

    pub async fn get_tag(&self, id: i64) -> ApiResult<Tag> {
        self.get(id).await
    }

    pub async fn create_tag(&self, tag: &NewTag) -> ApiResult<Tag> {
        self.create(tag).await
    }

    pub async fn update_tag(&self, id: i64, changes: &TagChangeset) -> ApiResult<Tag> {
        self.update(id, changes).await
    }

    pub async fn delete_tag(&self, id: i64) -> ApiResult<()> {
        self.delete(ResourceKind::Tag, id).await
    }
}
