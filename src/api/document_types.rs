use serde::Serialize;

use crate::error::ApiResult;
use crate::models::{DocumentType, ResourceKind};

use super::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct NewDocumentType {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentTypeChangeset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ApiClient {
    pub async fn list_document_types(&self) -> ApiResult<Vec<DocumentType>> {
        self.list_all().await
    }

    pub async fn get_document_type(&self, id: i64) -> ApiResult<DocumentType> {
        self.get(id).await
    }

    pub async fn create_document_type(
        &self,
        document_type: &NewDocumentType,
    ) -> ApiResult<DocumentType> {
        self.create(document_type).await
    }

    pub async fn update_document_type(
        &self,
        id: i64,
        changes: &DocumentTypeChangeset,
    ) -> ApiResult<DocumentType> {
        self.update(id, changes).await
    }

    pub async fn delete_document_type(&self, id: i64) -> ApiResult<()> {
        self.delete(ResourceKind::DocumentType, id).await
    }
}
