use serde::Serialize;

use crate::error::ApiResult;
use crate::models::{Correspondent, ResourceKind};

use super::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct NewCorrespondent {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrespondentChangeset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ApiClient {
    pub async fn list_correspondents(&self) -> ApiResult<Vec<Correspondent>> {
        self.list_all().await
    }

    pub async fn get_correspondent(&self, id: i64) -> ApiResult<Correspondent> {
        self.get(id).await
    }

    pub async fn create_correspondent(
        &self,
        correspondent: &NewCorrespondent,
    ) -> ApiResult<Correspondent> {
        self.create(correspondent).await
    }

    pub async fn update_correspondent(
        &self,
        id: i64,
        changes: &CorrespondentChangeset,
    ) -> ApiResult<Correspondent> {
        self.update(id, changes).await
    }

    pub async fn delete_correspondent(&self, id: i64) -> ApiResult<()> {
        self.delete(ResourceKind::Correspondent, id).await
    }
}
