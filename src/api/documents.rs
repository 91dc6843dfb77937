use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use percent_encoding::percent_decode_str;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::models::{Document, ResourceKind};
use crate::pagination::{Page, PageRequest};
use crate::transport::{Payload, RawResponse};

use super::{ApiClient, QueryParams};

pub const UPLOAD_PATH: &str = "/api/documents/post_document/";

/// Filters for the document listing. Every populated field narrows the
/// result; unset fields are left out of the query string.
#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub query: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub correspondent: Option<String>,
    pub document_type: Option<String>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    pub ordering: Option<String>,
    pub more_like_id: Option<i64>,
    pub page: PageRequest,
}

impl DocumentFilter {
    pub fn to_query(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params
            .push_opt("query", self.query.clone())
            .push_opt("title__iexact", self.title.clone());
        for tag in &self.tags {
            params.push("tags__name__iexact", tag.clone());
        }
        params
            .push_opt("correspondent__name__iexact", self.correspondent.clone())
            .push_opt("document_type__name__iexact", self.document_type.clone())
            .push_date("created__date__gt", self.created_after)
            .push_date("created__date__lt", self.created_before)
            .push_opt("more_like_id", self.more_like_id.map(|id| id.to_string()))
            .push_opt("ordering", self.ordering.clone())
            .push_page(self.page);
        params
    }
}

/// Partial update of a document. The outer `Option` decides whether a
/// field is sent at all; for references the inner `None` clears it.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentChangeset {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correspondent: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_serial_number: Option<i64>,
}

impl DocumentChangeset {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.correspondent.is_none()
            && self.document_type.is_none()
            && self.storage_path.is_none()
            && self.tags.is_none()
            && self.archive_serial_number.is_none()
    }
}

#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    pub path: PathBuf,
    pub title: Option<String>,
    pub correspondent: Option<i64>,
    pub document_type: Option<i64>,
    pub tags: Vec<i64>,
}

impl UploadRequest {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    async fn into_form(self) -> ApiResult<Form> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ApiError::Io {
                path: self.path.clone(),
                source,
            })?;
        let file_name = file_name_of(&self.path);
        let mime = mime_guess::from_path(&self.path).first_or_octet_stream();
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(mime.essence_str())?;

        let mut form = Form::new().part("document", part);
        if let Some(title) = self.title.filter(|title| !title.is_empty()) {
            form = form.text("title", title);
        }
        if let Some(correspondent) = self.correspondent {
            form = form.text("correspondent", correspondent.to_string());
        }
        if let Some(document_type) = self.document_type {
            form = form.text("document_type", document_type.to_string());
        }
        for tag in self.tags {
            form = form.text("tags", tag.to_string());
        }
        Ok(form)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// A downloaded rendition. `filename` is empty when the server did not
/// name the file.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub bytes: Vec<u8>,
    pub filename: String,
}

impl DownloadedFile {
    pub fn filename_or(&self, fallback: &str) -> String {
        if self.filename.is_empty() {
            fallback.to_string()
        } else {
            self.filename.clone()
        }
    }
}

impl ApiClient {
    pub async fn list_documents(&self, filter: &DocumentFilter) -> ApiResult<Page<Document>> {
        self.list(&filter.to_query()).await
    }

    pub async fn get_document(&self, id: i64) -> ApiResult<Document> {
        self.get(id).await
    }

    pub async fn update_document(
        &self,
        id: i64,
        changes: &DocumentChangeset,
    ) -> ApiResult<Document> {
        self.update(id, changes).await
    }

    pub async fn delete_document(&self, id: i64) -> ApiResult<()> {
        self.delete(ResourceKind::Document, id).await
    }

    pub async fn document_content(&self, id: i64) -> ApiResult<String> {
        Ok(self.get_document(id).await?.content)
    }

    pub async fn similar_documents(
        &self,
        id: i64,
        page_size: Option<u32>,
    ) -> ApiResult<Page<Document>> {
        let filter = DocumentFilter {
            more_like_id: Some(id),
            page: PageRequest {
                page: None,
                page_size: page_size.filter(|size| *size > 0),
            },
            ..Default::default()
        };
        self.list_documents(&filter).await
    }

    /// Hands a file to the ingestion queue. The returned string is the task
    /// handle; the document id is only known once that task finishes.
    pub async fn upload_document(&self, request: UploadRequest) -> ApiResult<String> {
        let path = request.path.clone();
        let form = request.into_form().await?;
        let response = self
            .transport()
            .execute(Method::POST, UPLOAD_PATH, Payload::Multipart(form))
            .await?
            .expect_status(&[StatusCode::OK, StatusCode::CREATED, StatusCode::ACCEPTED])?;
        let task_id = parse_task_id(&response.text());
        debug!(path = %path.display(), %task_id, "document queued for ingestion");
        Ok(task_id)
    }

    pub async fn download_document(&self, id: i64, original: bool) -> ApiResult<DownloadedFile> {
        let mut params = QueryParams::new();
        if original {
            params.push("original", "true");
        }
        let path = params.apply(&format!("{}download/", ResourceKind::Document.record_path(id)));
        let response = self.fetch_rendition(id, &path).await?;
        let filename = response
            .header("content-disposition")
            .map(parse_content_disposition_filename)
            .unwrap_or_default();
        Ok(DownloadedFile {
            bytes: response.body.to_vec(),
            filename,
        })
    }

    pub async fn document_thumbnail(&self, id: i64) -> ApiResult<Vec<u8>> {
        let path = format!("{}thumb/", ResourceKind::Document.record_path(id));
        Ok(self.fetch_rendition(id, &path).await?.body.to_vec())
    }

    pub async fn document_preview(&self, id: i64) -> ApiResult<Vec<u8>> {
        let path = format!("{}preview/", ResourceKind::Document.record_path(id));
        Ok(self.fetch_rendition(id, &path).await?.body.to_vec())
    }

    async fn fetch_rendition(&self, id: i64, path: &str) -> ApiResult<RawResponse> {
        let response = self.transport().get(path).await?;
        if response.status == StatusCode::NOT_FOUND {
            return Err(ApiError::not_found(ResourceKind::Document, id.to_string()));
        }
        response.expect_status(&[StatusCode::OK])
    }
}

/// The ingestion endpoint answers with a bare, usually JSON-quoted, UUID.
pub fn parse_task_id(body: &str) -> String {
    body.trim_matches(|c: char| c == '"' || c.is_whitespace())
        .to_string()
}

/// Pulls the filename out of a `Content-Disposition` header. Returns an
/// empty string when the header names no file.
pub fn parse_content_disposition_filename(header: &str) -> String {
    if let Some(start) = header.find("filename=") {
        let rest = header[start + "filename=".len()..].trim_start();
        let value = match rest.strip_prefix('"') {
            Some(quoted) => quoted.split('"').next().unwrap_or_default(),
            None => rest.split(';').next().unwrap_or_default(),
        };
        return value.trim().trim_matches('"').to_string();
    }

    if let Some(start) = header.find("filename*=") {
        let rest = header[start + "filename*=".len()..].trim_start();
        let value = rest.split(';').next().unwrap_or_default().trim();
        let encoded = value.rsplit("''").next().unwrap_or(value);
        return percent_decode_str(encoded).decode_utf8_lossy().into_owned();
    }

    String::new()
}
