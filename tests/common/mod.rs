//! In-process mock of the CMS REST backend for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub method: &'static str,
    pub path: String,
    pub body: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct UploadRecord {
    pub path: &'static str,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub size: usize,
    pub post_id: Option<String>,
}

#[derive(Default)]
pub struct Backend {
    posts: Mutex<Vec<Value>>,
    videos: Mutex<Vec<Value>>,
    requests: Mutex<Vec<Recorded>>,
    uploads: Mutex<Vec<UploadRecord>>,
    last_auth: Mutex<Option<String>>,
}

impl Backend {
    pub fn seed(&self, collection: &str, items: Vec<Value>) {
        *self.store(collection).lock().unwrap() = items;
    }

    /// Remove an entity behind the client's back.
    pub fn forget(&self, collection: &str, id: &str) {
        self.store(collection)
            .lock()
            .unwrap()
            .retain(|item| item["id"] != id);
    }

    pub fn items(&self, collection: &str) -> Vec<Value> {
        self.store(collection).lock().unwrap().clone()
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }

    pub fn uploads(&self) -> Vec<UploadRecord> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.last_auth.lock().unwrap().clone()
    }

    fn store(&self, collection: &str) -> &Mutex<Vec<Value>> {
        match collection {
            "posts" => &self.posts,
            _ => &self.videos,
        }
    }

    fn record(&self, method: &'static str, path: String, body: Option<Value>) {
        self.requests
            .lock()
            .unwrap()
            .push(Recorded { method, path, body });
    }

    fn list(&self, collection: &'static str, headers: &HeaderMap) -> Response {
        self.record("GET", format!("/{collection}"), None);
        *self.last_auth.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Json(Value::Array(self.items(collection))).into_response()
    }

    fn get(&self, collection: &'static str, id: &str) -> Response {
        self.record("GET", format!("/{collection}/{id}"), None);
        let items = self.store(collection).lock().unwrap();
        match items.iter().find(|item| item["id"] == id) {
            Some(item) => Json(item.clone()).into_response(),
            None => not_found(),
        }
    }

    fn create(&self, collection: &'static str, body: Value) -> Response {
        self.record("POST", format!("/{collection}"), Some(body.clone()));

        if body.get("title").and_then(Value::as_str) == Some("") {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({"status": "fail", "data": {"message": "title is required"}})),
            )
                .into_response();
        }

        let mut entity = body;
        entity["id"] = Value::String(uuid::Uuid::new_v4().to_string());
        self.store(collection).lock().unwrap().insert(0, entity.clone());
        (StatusCode::CREATED, Json(entity)).into_response()
    }

    fn patch(&self, collection: &'static str, id: &str, body: Value) -> Response {
        self.record("PATCH", format!("/{collection}/{id}"), Some(body.clone()));

        let mut items = self.store(collection).lock().unwrap();
        let Some(item) = items.iter_mut().find(|item| item["id"] == id) else {
            return not_found();
        };
        if let (Value::Object(fields), Value::Object(patch)) = (item, body) {
            for (key, value) in patch {
                fields.insert(key, value);
            }
        }
        let updated = items
            .iter()
            .find(|item| item["id"] == id)
            .cloned()
            .unwrap_or(Value::Null);
        Json(updated).into_response()
    }

    fn delete(&self, collection: &'static str, id: &str) -> Response {
        self.record("DELETE", format!("/{collection}/{id}"), None);

        let mut items = self.store(collection).lock().unwrap();
        let before = items.len();
        items.retain(|item| item["id"] != id);
        if items.len() == before {
            // Bare failure: no body at all.
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
        StatusCode::NO_CONTENT.into_response()
    }

    async fn upload(&self, path: &'static str, mut multipart: Multipart) -> Response {
        let mut record = UploadRecord {
            path,
            ..Default::default()
        };

        while let Ok(Some(field)) = multipart.next_field().await {
            let field_name = field.name().unwrap_or("").to_string();
            match field_name.as_str() {
                "file" => {
                    record.file_name = field.file_name().map(str::to_string);
                    record.content_type = field.content_type().map(str::to_string);
                    record.size = field.bytes().await.map(|b| b.len()).unwrap_or(0);
                }
                "postId" => record.post_id = field.text().await.ok(),
                _ => {}
            }
        }

        self.record("POST", path.to_string(), None);
        self.uploads.lock().unwrap().push(record.clone());

        let name = record.file_name.unwrap_or_default();
        if name == "reject.png" {
            return (
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                Json(json!({"message": "Unsupported media type"})),
            )
                .into_response();
        }

        match record.post_id {
            Some(post_id) => Json(json!({
                "status": "success",
                "data": {"url": format!("https://cdn.test/posts/{post_id}/{name}")}
            }))
            .into_response(),
            None => Json(json!({"url": format!("https://cdn.test/images/{name}")})).into_response(),
        }
    }
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "Not found"})),
    )
        .into_response()
}

fn collection_routes(collection: &'static str) -> Router<Arc<Backend>> {
    Router::new()
        .route(
            "/",
            get(
                move |State(backend): State<Arc<Backend>>, headers: HeaderMap| async move {
                    backend.list(collection, &headers)
                },
            )
            .post(
                move |State(backend): State<Arc<Backend>>, Json(body): Json<Value>| async move {
                    backend.create(collection, body)
                },
            ),
        )
        .route(
            "/:id",
            get(
                move |State(backend): State<Arc<Backend>>, Path(id): Path<String>| async move {
                    backend.get(collection, &id)
                },
            )
            .patch(
                move |State(backend): State<Arc<Backend>>,
                      Path(id): Path<String>,
                      Json(body): Json<Value>| async move {
                    backend.patch(collection, &id, body)
                },
            )
            .delete(
                move |State(backend): State<Arc<Backend>>, Path(id): Path<String>| async move {
                    backend.delete(collection, &id)
                },
            ),
        )
}

async fn upload_image(State(backend): State<Arc<Backend>>, multipart: Multipart) -> Response {
    backend.upload("/upload/image", multipart).await
}

async fn upload_post_images(State(backend): State<Arc<Backend>>, multipart: Multipart) -> Response {
    backend.upload("/upload/post-images", multipart).await
}

/// Start the mock backend on an ephemeral port. Returns the API base URL.
pub async fn spawn_backend() -> (String, Arc<Backend>) {
    let backend = Arc::new(Backend::default());

    let api = Router::new()
        .nest("/posts", collection_routes("posts"))
        .nest("/tik-tok-videos", collection_routes("tik-tok-videos"))
        .route("/upload/image", post(upload_image))
        .route("/upload/post-images", post(upload_post_images));
    let app = Router::new()
        .nest("/api", api)
        .with_state(Arc::clone(&backend));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api"), backend)
}

pub fn post_json(id: &str, title: &str) -> Value {
    json!({"id": id, "title": title, "content": "body", "imageUrl": ""})
}

pub fn video_json(id: &str, embed: &str) -> Value {
    json!({"id": id, "embed": embed})
}
