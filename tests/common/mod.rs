use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::body::{to_bytes, Body};
use axum::extract::{FromRequest, Multipart, Request, State};
use axum::http::header::{AUTHORIZATION, CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use paperless_cli::{ApiClient, Transport};
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use url::form_urlencoded;
use uuid::Uuid;

pub const TOKEN: &str = "test-token";

const COLLECTIONS: [&str; 6] = [
    "documents",
    "tags",
    "correspondents",
    "document_types",
    "storage_paths",
    "saved_views",
];

#[allow(dead_code)]
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

#[allow(dead_code)]
impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn query_values(&self, key: &str) -> Vec<&str> {
        self.query
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
            .collect()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or(Value::Null)
    }
}

#[allow(dead_code)]
#[derive(Clone, Debug, Default)]
pub struct ReceivedUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Vec<u8>,
    pub fields: Vec<(String, String)>,
}

#[allow(dead_code)]
impl ReceivedUpload {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn fields_named(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
            .collect()
    }
}

#[derive(Clone)]
struct StoredFile {
    bytes: Vec<u8>,
    content_disposition: Option<String>,
}

#[derive(Default)]
struct Store {
    collections: HashMap<String, BTreeMap<i64, Value>>,
    next_id: i64,
    tasks: Vec<Value>,
    files: HashMap<i64, StoredFile>,
    uploads: Vec<ReceivedUpload>,
    rejected_uploads: HashSet<String>,
    requests: Vec<RecordedRequest>,
    delay: Option<Duration>,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

struct Stub {
    base_url: String,
    store: Mutex<Store>,
}

/// In-process stand-in for the document service, listening on a random
/// local port. Every request it receives is recorded.
pub struct StubServer {
    pub base_url: String,
    stub: Arc<Stub>,
    server: JoinHandle<()>,
}

impl StubServer {
    pub async fn start() -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind stub server")?;
        let base_url = format!("http://{}", listener.local_addr()?);

        let mut store = Store::default();
        for collection in COLLECTIONS {
            store.collections.insert(collection.to_string(), BTreeMap::new());
        }
        let stub = Arc::new(Stub {
            base_url: base_url.clone(),
            store: Mutex::new(store),
        });

        let router = Router::new().fallback(dispatch).with_state(stub.clone());
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self {
            base_url,
            stub,
            server,
        })
    }

    pub fn client(&self) -> Result<ApiClient> {
        Ok(ApiClient::new(&self.base_url, TOKEN)?)
    }

    #[allow(dead_code)]
    pub fn client_with_timeout(&self, timeout: Duration) -> Result<ApiClient> {
        Ok(ApiClient::from_transport(Transport::with_timeout(
            &self.base_url,
            TOKEN,
            timeout,
        )?))
    }

    /// Stores a record as the server would, filling in id, slug and counts.
    pub async fn insert(&self, collection: &str, record: Value) -> i64 {
        let mut store = self.stub.store.lock().await;
        let Value::Object(mut fields) = record else {
            panic!("records must be JSON objects");
        };
        let id = match fields.get("id").and_then(Value::as_i64) {
            Some(id) => {
                store.next_id = store.next_id.max(id);
                id
            }
            None => store.allocate_id(),
        };
        fields.insert("id".into(), json!(id));
        fill_server_fields(collection, &mut fields);
        store
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, Value::Object(fields));
        id
    }

    #[allow(dead_code)]
    pub async fn record(&self, collection: &str, id: i64) -> Option<Value> {
        let store = self.stub.store.lock().await;
        store.collections.get(collection)?.get(&id).cloned()
    }

    #[allow(dead_code)]
    pub async fn requests(&self) -> Vec<RecordedRequest> {
        self.stub.store.lock().await.requests.clone()
    }

    #[allow(dead_code)]
    pub async fn clear_requests(&self) {
        self.stub.store.lock().await.requests.clear();
    }

    #[allow(dead_code)]
    pub async fn uploads(&self) -> Vec<ReceivedUpload> {
        self.stub.store.lock().await.uploads.clone()
    }

    #[allow(dead_code)]
    pub async fn reject_uploads_named(&self, file_name: &str) {
        self.stub
            .store
            .lock()
            .await
            .rejected_uploads
            .insert(file_name.to_string());
    }

    #[allow(dead_code)]
    pub async fn set_file(&self, document_id: i64, bytes: &[u8], content_disposition: Option<&str>) {
        self.stub.store.lock().await.files.insert(
            document_id,
            StoredFile {
                bytes: bytes.to_vec(),
                content_disposition: content_disposition.map(str::to_string),
            },
        );
    }

    #[allow(dead_code)]
    pub async fn complete_task(&self, task_id: &str, document_id: i64) {
        let mut store = self.stub.store.lock().await;
        for task in store.tasks.iter_mut() {
            if task["task_id"] == task_id {
                task["status"] = json!("SUCCESS");
                task["result"] = json!(format!("Success. New document id {document_id} created"));
                task["related_document"] = json!(document_id.to_string());
                task["date_done"] = json!("2024-05-01T10:00:05+00:00");
            }
        }
    }

    #[allow(dead_code)]
    pub async fn set_delay(&self, delay: Duration) {
        self.stub.store.lock().await.delay = Some(delay);
    }
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.server.abort();
    }
}

fn fill_server_fields(collection: &str, fields: &mut Map<String, Value>) {
    if collection == "documents" {
        fields.entry("title").or_insert(json!(""));
        fields.entry("content").or_insert(json!(""));
        fields.entry("tags").or_insert(json!([]));
        fields.entry("correspondent").or_insert(Value::Null);
        fields.entry("document_type").or_insert(Value::Null);
        fields.entry("storage_path").or_insert(Value::Null);
        return;
    }
    if let Some(name) = fields.get("name").and_then(Value::as_str) {
        let slug = name.to_lowercase().replace(' ', "-");
        fields.insert("slug".into(), json!(slug));
    }
    if collection != "saved_views" {
        fields.entry("document_count").or_insert(json!(0));
    }
    if collection == "tags" {
        fields.entry("color").or_insert(json!("#a6cee3"));
        fields.entry("is_inbox_tag").or_insert(json!(false));
    }
}

async fn dispatch(State(stub): State<Arc<Stub>>, request: Request) -> Response {
    let delay = stub.store.lock().await.delay;
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => return detail(StatusCode::BAD_REQUEST, &err.to_string()),
    };
    let query: Vec<(String, String)> = parts
        .uri
        .query()
        .map(|raw| form_urlencoded::parse(raw.as_bytes()).into_owned().collect())
        .unwrap_or_default();
    let path = parts.uri.path().to_string();

    stub.store.lock().await.requests.push(RecordedRequest {
        method: parts.method.clone(),
        path: path.clone(),
        query: query.clone(),
        headers: parts.headers.clone(),
        body: bytes.to_vec(),
    });

    let expected = format!("Token {TOKEN}");
    let authorization = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    if authorization != Some(expected.as_str()) {
        return detail(StatusCode::UNAUTHORIZED, "Invalid token.");
    }

    let method = parts.method.as_str().to_string();
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method.as_str(), segments.as_slice()) {
        ("POST", ["api", "documents", "post_document"]) => {
            let request = Request::from_parts(parts, Body::from(bytes));
            receive_upload(&stub, request).await
        }
        ("GET", ["api", "documents", id, rendition @ ("download" | "thumb" | "preview")]) => {
            let store = stub.store.lock().await;
            serve_rendition(&store, id, rendition)
        }
        ("GET", ["api", "tasks"]) => {
            let store = stub.store.lock().await;
            let task_id = param(&query, "task_id").unwrap_or_default();
            let matching: Vec<Value> = store
                .tasks
                .iter()
                .filter(|task| task["task_id"] == task_id)
                .cloned()
                .collect();
            Json(Value::Array(matching)).into_response()
        }
        ("GET", ["api", "search"]) => {
            let store = stub.store.lock().await;
            global_search(&store, param(&query, "query").unwrap_or_default())
        }
        ("GET", ["api", "statistics"]) => {
            let store = stub.store.lock().await;
            statistics(&store)
        }
        ("GET", ["api", collection]) => {
            let store = stub.store.lock().await;
            list(&store, &stub.base_url, collection, &query)
        }
        ("POST", ["api", collection]) => {
            let mut store = stub.store.lock().await;
            create(&mut store, collection, &bytes)
        }
        ("GET", ["api", collection, id]) => {
            let store = stub.store.lock().await;
            match lookup(&store, collection, id) {
                Some(record) => Json(record.clone()).into_response(),
                None => detail(StatusCode::NOT_FOUND, "Not found."),
            }
        }
        ("PATCH", ["api", collection, id]) => {
            let mut store = stub.store.lock().await;
            update(&mut store, collection, id, &bytes)
        }
        ("DELETE", ["api", collection, id]) => {
            let mut store = stub.store.lock().await;
            let removed = id.parse::<i64>().ok().and_then(|id| {
                store
                    .collections
                    .get_mut(*collection)
                    .and_then(|records| records.remove(&id))
            });
            match removed {
                Some(_) => StatusCode::NO_CONTENT.into_response(),
                None => detail(StatusCode::NOT_FOUND, "Not found."),
            }
        }
        _ => detail(StatusCode::NOT_FOUND, "Not found."),
    }
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.as_str())
}

fn lookup<'a>(store: &'a Store, collection: &str, id: &str) -> Option<&'a Value> {
    let id = id.parse::<i64>().ok()?;
    store.collections.get(collection)?.get(&id)
}

fn text<'a>(record: &'a Value, field: &str) -> &'a str {
    record.get(field).and_then(Value::as_str).unwrap_or_default()
}

fn named_id(store: &Store, collection: &str, name: &str) -> Option<i64> {
    let wanted = name.to_lowercase();
    store
        .collections
        .get(collection)?
        .values()
        .find(|record| text(record, "name").to_lowercase() == wanted)
        .and_then(|record| record["id"].as_i64())
}

fn matches_filters(store: &Store, record: &Value, query: &[(String, String)]) -> bool {
    query.iter().all(|(key, value)| {
        let lowered = value.to_lowercase();
        match key.as_str() {
            "name__iexact" => text(record, "name").to_lowercase() == lowered,
            "title__iexact" => text(record, "title").to_lowercase() == lowered,
            "query" => {
                text(record, "title").to_lowercase().contains(&lowered)
                    || text(record, "content").to_lowercase().contains(&lowered)
            }
            "more_like_id" => record["id"].as_i64().map(|id| id.to_string()) != Some(value.clone()),
            "tags__name__iexact" => named_id(store, "tags", value).is_some_and(|tag| {
                record["tags"]
                    .as_array()
                    .is_some_and(|tags| tags.contains(&json!(tag)))
            }),
            "correspondent__name__iexact" => {
                named_id(store, "correspondents", value).is_some_and(|id| record["correspondent"] == id)
            }
            "document_type__name__iexact" => {
                named_id(store, "document_types", value).is_some_and(|id| record["document_type"] == id)
            }
            "created__date__gt" => created_date(record).is_some_and(|date| date > value.as_str()),
            "created__date__lt" => created_date(record).is_some_and(|date| date < value.as_str()),
            _ => true,
        }
    })
}

fn created_date(record: &Value) -> Option<&str> {
    record.get("created").and_then(Value::as_str).map(|created| &created[..10.min(created.len())])
}

fn list(store: &Store, base_url: &str, collection: &str, query: &[(String, String)]) -> Response {
    let Some(records) = store.collections.get(collection) else {
        return detail(StatusCode::NOT_FOUND, "Not found.");
    };
    let matching: Vec<&Value> = records
        .values()
        .filter(|record| matches_filters(store, record, query))
        .collect();

    let page_size = param(query, "page_size")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(25)
        .max(1);
    let page = param(query, "page")
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1);
    let start = (page - 1) * page_size;
    let results: Vec<Value> = matching
        .iter()
        .skip(start)
        .take(page_size)
        .map(|record| (*record).clone())
        .collect();
    let page_url =
        |number: usize| format!("{base_url}/api/{collection}/?page={number}&page_size={page_size}");
    let next = (start + page_size < matching.len()).then(|| page_url(page + 1));
    let previous = (page > 1).then(|| page_url(page - 1));

    Json(json!({
        "count": matching.len(),
        "next": next,
        "previous": previous,
        "results": results,
    }))
    .into_response()
}

fn singular(collection: &str) -> &str {
    match collection {
        "tags" => "tag",
        "correspondents" => "correspondent",
        "document_types" => "document type",
        "storage_paths" => "storage path",
        "saved_views" => "saved view",
        _ => "object",
    }
}

fn create(store: &mut Store, collection: &str, body: &[u8]) -> Response {
    if !store.collections.contains_key(collection) || collection == "documents" {
        return detail(StatusCode::METHOD_NOT_ALLOWED, "Method \"POST\" not allowed.");
    }
    let Ok(Value::Object(mut fields)) = serde_json::from_slice::<Value>(body) else {
        return detail(StatusCode::BAD_REQUEST, "JSON parse error");
    };
    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    if name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "name": ["This field is required."] })),
        )
            .into_response();
    }
    if named_id(store, collection, &name).is_some() {
        let message = format!("{} with this name already exists.", singular(collection));
        return (StatusCode::BAD_REQUEST, Json(json!({ "name": [message] }))).into_response();
    }

    let id = store.allocate_id();
    fields.insert("id".into(), json!(id));
    fill_server_fields(collection, &mut fields);
    let record = Value::Object(fields);
    if let Some(records) = store.collections.get_mut(collection) {
        records.insert(id, record.clone());
    }
    (StatusCode::CREATED, Json(record)).into_response()
}

fn update(store: &mut Store, collection: &str, id: &str, body: &[u8]) -> Response {
    let Ok(Value::Object(changes)) = serde_json::from_slice::<Value>(body) else {
        return detail(StatusCode::BAD_REQUEST, "JSON parse error");
    };
    let Some(record) = id
        .parse::<i64>()
        .ok()
        .and_then(|id| store.collections.get_mut(collection)?.get_mut(&id))
    else {
        return detail(StatusCode::NOT_FOUND, "Not found.");
    };
    let Value::Object(fields) = record else {
        return detail(StatusCode::INTERNAL_SERVER_ERROR, "corrupt record");
    };
    for (key, value) in changes {
        fields.insert(key, value);
    }
    if let Some(name) = fields.get("name").and_then(Value::as_str) {
        let slug = name.to_lowercase().replace(' ', "-");
        fields.insert("slug".into(), json!(slug));
    }
    Json(record.clone()).into_response()
}

async fn receive_upload(stub: &Stub, request: Request) -> Response {
    let mut multipart = match Multipart::from_request(request, &()).await {
        Ok(multipart) => multipart,
        Err(rejection) => return rejection.into_response(),
    };

    let mut upload = ReceivedUpload::default();
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => return detail(StatusCode::BAD_REQUEST, &err.to_string()),
        };
        let name = field.name().unwrap_or_default().to_string();
        if name == "document" {
            upload.file_name = field.file_name().unwrap_or_default().to_string();
            upload.content_type = field.content_type().map(str::to_string);
            match field.bytes().await {
                Ok(bytes) => upload.content = bytes.to_vec(),
                Err(err) => return detail(StatusCode::BAD_REQUEST, &err.to_string()),
            }
        } else {
            match field.text().await {
                Ok(value) => upload.fields.push((name, value)),
                Err(err) => return detail(StatusCode::BAD_REQUEST, &err.to_string()),
            }
        }
    }

    let mut store = stub.store.lock().await;
    store.uploads.push(upload.clone());
    if upload.file_name.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "document": ["No file was submitted."] })),
        )
            .into_response();
    }
    if store.rejected_uploads.contains(&upload.file_name) {
        let message = format!("{}: Unsupported file type.", upload.file_name);
        return (StatusCode::BAD_REQUEST, Json(json!({ "document": [message] }))).into_response();
    }

    let task_id = Uuid::new_v4().to_string();
    let id = store.tasks.len() + 1;
    store.tasks.push(json!({
        "id": id,
        "task_id": task_id,
        "task_file_name": upload.file_name,
        "date_created": "2024-05-01T10:00:00+00:00",
        "date_done": null,
        "type": "file",
        "status": "PENDING",
        "result": null,
        "acknowledged": false,
        "related_document": null,
    }));
    (StatusCode::OK, Json(Value::String(task_id))).into_response()
}

fn serve_rendition(store: &Store, id: &str, rendition: &str) -> Response {
    let Some(document) = lookup(store, "documents", id) else {
        return detail(StatusCode::NOT_FOUND, "Not found.");
    };
    let document_id = document["id"].as_i64().unwrap_or_default();
    let (bytes, content_type, disposition) = match rendition {
        "download" => match store.files.get(&document_id) {
            Some(file) => (
                file.bytes.clone(),
                "application/pdf",
                file.content_disposition.clone(),
            ),
            None => (b"%PDF-1.7 stub".to_vec(), "application/pdf", None),
        },
        "thumb" => (format!("thumb-{document_id}").into_bytes(), "image/webp", None),
        _ => (format!("preview-{document_id}").into_bytes(), "application/pdf", None),
    };

    let mut response = (StatusCode::OK, bytes).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    if let Some(disposition) = disposition {
        if let Ok(value) = HeaderValue::from_str(&disposition) {
            response.headers_mut().insert(CONTENT_DISPOSITION, value);
        }
    }
    response
}

fn global_search(store: &Store, query: &str) -> Response {
    let wanted = query.to_lowercase();
    let matching = |collection: &str, field: &str| -> Vec<Value> {
        store
            .collections
            .get(collection)
            .map(|records| {
                records
                    .values()
                    .filter(|record| text(record, field).to_lowercase().contains(&wanted))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    };
    Json(json!({
        "total": 0,
        "documents": matching("documents", "title"),
        "saved_views": matching("saved_views", "name"),
        "correspondents": matching("correspondents", "name"),
        "document_types": matching("document_types", "name"),
        "storage_paths": matching("storage_paths", "name"),
        "tags": matching("tags", "name"),
    }))
    .into_response()
}

fn statistics(store: &Store) -> Response {
    let count = |collection: &str| store.collections.get(collection).map_or(0, BTreeMap::len);
    let characters: usize = store
        .collections
        .get("documents")
        .map(|records| records.values().map(|doc| text(doc, "content").len()).sum())
        .unwrap_or_default();
    Json(json!({
        "documents_total": count("documents"),
        "documents_inbox": 0,
        "character_count": characters,
        "tag_count": count("tags"),
        "correspondent_count": count("correspondents"),
        "document_type_count": count("document_types"),
        "storage_path_count": count("storage_paths"),
        "document_file_type_counts": [],
    }))
    .into_response()
}
