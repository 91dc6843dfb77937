use crate::error::ApiResult;
use crate::models::SavedView;

use super::ApiClient;

impl ApiClient {
    pub async fn list_saved_views(&self) -> ApiResult<Vec<SavedView>> {
        self.list_all().await
    }

    pub async fn get_saved_view(&self, id: i64) -> ApiResult<SavedView> {
        self.get(id).await
    }
}
