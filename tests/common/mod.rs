//! In-process mock of the task backend used by the integration tests.
//!
//! The backend records every request it sees so tests can assert on the
//! headers and bodies the client sent, or on the absence of a request.

#![allow(dead_code)]

use actix_web::{
    App, HttpRequest, HttpResponse, HttpServer,
    dev::ServerHandle,
    rt,
    web::{self, Json, Path},
};
use chrono::Utc;
use serde_json::{Value, json};
use std::sync::{
    Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};
use taskdeck::{ApiClient, ClientConfig, FileStore, SessionManager};
use tempfile::TempDir;

pub const GOOD_PASSWORD: &str = "secret1";
pub const TAKEN_EMAIL: &str = "taken@example.com";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
    pub body: Option<Value>,
}

#[derive(Default)]
pub struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    tasks: Mutex<Vec<Value>>,
    next_id: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
    pub fail_delete: AtomicBool,
    /// Answer successful updates with an empty `204`
    pub update_no_content: AtomicBool,
}

impl MockState {
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    pub fn tasks(&self) -> Vec<Value> {
        self.tasks.lock().unwrap().clone()
    }

    pub fn seed_task(&self, title: &str, completed: bool) -> String {
        self.seed_task_with_id(&self.new_id(), title, completed)
    }

    pub fn seed_task_with_id(&self, id: &str, title: &str, completed: bool) -> String {
        let id = id.to_string();
        self.tasks.lock().unwrap().push(json!({
            "_id": id,
            "title": title,
            "completed": completed,
            "createdAt": Utc::now().to_rfc3339(),
            "dueDate": null,
        }));
        id
    }

    fn new_id(&self) -> String {
        format!("65f0{:08x}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn record(&self, req: &HttpRequest, body: Option<&Value>) {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            method: req.method().to_string(),
            path: req.path().to_string(),
            authorization: header("authorization"),
            request_id: header("x-request-id"),
            body: body.cloned(),
        });
    }
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer tok-"))
}

/// The router leaves an encoded `/` in path parameters
fn decode_id(raw: &str) -> String {
    raw.replace("%2F", "/").replace("%2f", "/")
}

fn unauthorized() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({ "message": "No token, authorization denied" }))
}

async fn register(req: HttpRequest, state: web::Data<MockState>, body: Json<Value>) -> HttpResponse {
    state.record(&req, Some(&body.0));

    let email = body["email"].as_str().unwrap_or_default();
    let username = body["username"].as_str().unwrap_or_default();
    if email == TAKEN_EMAIL {
        return HttpResponse::BadRequest().json(json!({ "message": "User already exists" }));
    }

    HttpResponse::Created().json(json!({
        "username": username,
        "email": email,
        "token": format!("tok-{username}"),
    }))
}

async fn login(req: HttpRequest, state: web::Data<MockState>, body: Json<Value>) -> HttpResponse {
    state.record(&req, Some(&body.0));

    let email = body["email"].as_str().unwrap_or_default();
    if body["password"].as_str() != Some(GOOD_PASSWORD) {
        return HttpResponse::Unauthorized().json(json!({ "message": "Invalid credentials" }));
    }

    let username = email.split('@').next().unwrap_or_default();
    HttpResponse::Ok().json(json!({
        "username": username,
        "email": email,
        "token": format!("tok-{username}"),
    }))
}

async fn list_todos(req: HttpRequest, state: web::Data<MockState>) -> HttpResponse {
    state.record(&req, None);
    if !authorized(&req) {
        return unauthorized();
    }
    if state.fail_list.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().json(json!({ "message": "Server error" }));
    }
    HttpResponse::Ok().json(state.tasks())
}

async fn create_todo(req: HttpRequest, state: web::Data<MockState>, body: Json<Value>) -> HttpResponse {
    state.record(&req, Some(&body.0));
    if !authorized(&req) {
        return unauthorized();
    }
    if state.fail_create.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().json(json!({ "message": "Server error" }));
    }

    let task = json!({
        "_id": state.new_id(),
        "title": body["title"],
        "completed": false,
        "createdAt": Utc::now().to_rfc3339(),
        "dueDate": body.get("dueDate").cloned().unwrap_or(Value::Null),
    });
    state.tasks.lock().unwrap().push(task.clone());
    HttpResponse::Created().json(task)
}

async fn update_todo(
    req: HttpRequest,
    state: web::Data<MockState>,
    id: Path<String>,
    body: Json<Value>,
) -> HttpResponse {
    state.record(&req, Some(&body.0));
    if !authorized(&req) {
        return unauthorized();
    }
    if state.fail_update.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().json(json!({ "message": "Server error" }));
    }

    let id = decode_id(&id);
    let mut tasks = state.tasks.lock().unwrap();
    match tasks.iter_mut().find(|t| t["_id"] == id.as_str()) {
        Some(task) => {
            task["completed"] = body["completed"].clone();
            if state.update_no_content.load(Ordering::SeqCst) {
                return HttpResponse::NoContent().finish();
            }
            HttpResponse::Ok().json(task.clone())
        }
        None => HttpResponse::NotFound().json(json!({ "message": "Todo not found" })),
    }
}

async fn delete_todo(req: HttpRequest, state: web::Data<MockState>, id: Path<String>) -> HttpResponse {
    state.record(&req, None);
    if !authorized(&req) {
        return unauthorized();
    }
    if state.fail_delete.load(Ordering::SeqCst) {
        return HttpResponse::InternalServerError().json(json!({ "message": "Server error" }));
    }

    let id = decode_id(&id);
    let mut tasks = state.tasks.lock().unwrap();
    let before = tasks.len();
    tasks.retain(|t| t["_id"] != id.as_str());
    if tasks.len() == before {
        return HttpResponse::NotFound().json(json!({ "message": "Todo not found" }));
    }
    HttpResponse::Ok().json(json!({ "message": "Todo removed" }))
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/auth/register", web::post().to(register))
        .route("/api/auth/login", web::post().to(login))
        .route("/api/todos", web::get().to(list_todos))
        .route("/api/todos", web::post().to(create_todo))
        .route("/api/todos/{id}", web::patch().to(update_todo))
        .route("/api/todos/{id}", web::delete().to(delete_todo));
}

/// A running mock backend plus a private state directory
pub struct MockBackend {
    pub state: web::Data<MockState>,
    pub url: String,
    pub state_dir: TempDir,
    handle: ServerHandle,
}

impl MockBackend {
    /// Start the backend on an ephemeral port. Must run inside an actix runtime.
    pub async fn start() -> Self {
        let state = web::Data::new(MockState::default());
        let data = state.clone();

        let server = HttpServer::new(move || App::new().app_data(data.clone()).configure(routes))
            .workers(1)
            .disable_signals()
            .bind(("127.0.0.1", 0))
            .expect("Failed to bind mock backend");
        let addr = server.addrs()[0];

        let server = server.run();
        let handle = server.handle();
        rt::spawn(server);

        Self {
            state,
            url: format!("http://{addr}"),
            state_dir: tempfile::tempdir().expect("Failed to create state dir"),
            handle,
        }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_api_url(self.url.clone())
            .with_state_dir(self.state_dir.path())
    }

    pub fn api(&self) -> ApiClient {
        ApiClient::new(&self.config(), None).expect("Failed to create API client")
    }

    pub fn store(&self) -> std::sync::Arc<FileStore> {
        std::sync::Arc::new(FileStore::new(self.state_dir.path()))
    }

    /// A session manager over a fresh client and the backend's state dir,
    /// as a new process would build it
    pub fn session_manager(&self) -> SessionManager {
        SessionManager::new(self.api(), self.store())
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}
