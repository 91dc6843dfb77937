use serde::Serialize;

use crate::error::ApiResult;
use crate::models::{ResourceKind, StoragePath};

use super::ApiClient;

/// Storage paths are created with their template and never edited here.
#[derive(Debug, Clone, Serialize)]
pub struct NewStoragePath {
    pub name: String,
    pub path: String,
}

impl ApiClient {
    pub async fn list_storage_paths(&self) -> ApiResult<Vec<StoragePath>> {
        self.list_all().await
    }

    pub async fn get_storage_path(&self, id: i64) -> ApiResult<StoragePath> {
        self.get(id).await
    }

    pub async fn create_storage_path(&self, storage_path: &NewStoragePath) -> ApiResult<StoragePath> {
        self.create(storage_path).await
    }

    pub async fn delete_storage_path(&self, id: i64) -> ApiResult<()> {
        self.delete(ResourceKind::StoragePath, id).await
    }
}
