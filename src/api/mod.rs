use reqwest::StatusCode;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::models::{Resource, ResourceKind};
use crate::pagination::{Page, PageRequest};
use crate::transport::Transport;

pub mod correspondents;
pub mod document_types;
pub mod documents;
pub mod query;
pub mod saved_views;
pub mod search;
pub mod storage_paths;
pub mod tags;
pub mod tasks;

pub use query::QueryParams;

/// Typed CRUD access to the document service. Every method performs a
/// single request; nothing is cached between calls.
#[derive(Clone)]
pub struct ApiClient {
    transport: Transport,
}

impl ApiClient {
    pub fn new(base_url: &str, token: &str) -> ApiResult<Self> {
        Ok(Self::from_transport(Transport::new(base_url, token)?))
    }

    pub fn from_transport(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// One page of `R`. `count` on the result is the server-wide total.
    pub async fn list<R: Resource>(&self, params: &QueryParams) -> ApiResult<Page<R>> {
        let path = params.apply(R::KIND.path());
        self.transport
            .get(&path)
            .await?
            .expect_status(&[StatusCode::OK])?
            .json()
    }

    /// Every record of a small auxiliary kind, fetched as one large page.
    pub async fn list_all<R: Resource>(&self) -> ApiResult<Vec<R>> {
        let mut params = QueryParams::new();
        params.push_page(PageRequest::everything());
        Ok(self.list::<R>(&params).await?.results)
    }

    pub async fn get<R: Resource>(&self, id: i64) -> ApiResult<R> {
        let response = self.transport.get(&R::KIND.record_path(id)).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(R::KIND, id.to_string()));
        }
        response.expect_status(&[StatusCode::OK])?.json()
    }

    pub async fn create<R, P>(&self, payload: &P) -> ApiResult<R>
    where
        R: Resource,
        P: Serialize + Sync + ?Sized,
    {
        self.transport
            .post(R::KIND.path(), payload)
            .await?
            .expect_status(&[StatusCode::CREATED, StatusCode::OK])?
            .json()
    }

    /// Partial update: only the fields present in `changes` are sent.
    pub async fn update<R, P>(&self, id: i64, changes: &P) -> ApiResult<R>
    where
        R: Resource,
        P: Serialize + Sync + ?Sized,
    {
        let response = self
            .transport
            .patch(&R::KIND.record_path(id), changes)
            .await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(R::KIND, id.to_string()));
        }
        response.expect_status(&[StatusCode::OK])?.json()
    }

    pub async fn delete(&self, kind: ResourceKind, id: i64) -> ApiResult<()> {
        let response = self.transport.delete(&kind.record_path(id)).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(kind, id.to_string()));
        }
        response.expect_status(&[StatusCode::NO_CONTENT, StatusCode::OK])?;
        Ok(())
    }
}
