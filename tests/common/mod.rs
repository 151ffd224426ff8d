#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use base64::Engine;
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;

use adreset::remote::RequestClient;
use adreset::session::{SessionModel, decode_claims};
use adreset::store::{MemoryTokenStore, TokenStore};

pub const ADMIN: &str = "admin";
pub const USER: &str = "alice";
pub const PASSWORD: &str = "P@ssw0rd";
const MAX_RESET_ATTEMPTS: u32 = 3;

#[derive(Clone)]
struct Account {
    password: String,
    role: &'static str,
    failed_resets: u32,
}

struct StoredQuestion {
    id: i64,
    text: String,
    enabled: bool,
}

impl StoredQuestion {
    fn to_json(&self) -> Value {
        json!({ "id": self.id, "question": self.text, "enabled": self.enabled })
    }
}

pub struct Stub {
    accounts: HashMap<String, Account>,
    questions: Vec<StoredQuestion>,
    answers: HashMap<String, Vec<(i64, i64, String)>>,
    revoked: HashSet<String>,
    next_id: i64,
    pub required_answers: usize,
    pub minimum_length: usize,
    pub token_ttl_secs: i64,
    /// Artificial latency for `GET /questions`, keyed by page.
    pub page_delays: HashMap<u32, Duration>,
    /// `METHOD /path?query` of every request, in arrival order.
    pub requests: Vec<String>,
}

impl Stub {
    pub fn revoked_insert(&mut self, token: &str) {
        self.revoked.insert(token.to_string());
    }

    /// Records answers for `username` directly, bypassing login.
    pub fn seed_answers(&mut self, username: &str, question_ids: &[i64]) {
        let mut list = Vec::new();
        for qid in question_ids {
            list.push((self.next_id, *qid, "seeded".to_string()));
            self.next_id += 1;
        }
        self.answers.insert(username.to_string(), list);
    }

    pub fn set_enabled(&mut self, id: i64, enabled: bool) {
        if let Some(q) = self.questions.iter_mut().find(|q| q.id == id) {
            q.enabled = enabled;
        }
    }
}

pub struct StubPortal {
    pub base_url: String,
    state: Arc<Mutex<Stub>>,
    server: tokio::task::JoinHandle<()>,
}

impl Drop for StubPortal {
    fn drop(&mut self) {
        self.server.abort();
    }
}

impl StubPortal {
    pub fn state(&self) -> MutexGuard<'_, Stub> {
        lock(&self.state)
    }

    pub fn requests(&self) -> Vec<String> {
        self.state().requests.clone()
    }

    pub fn client(&self) -> Result<(RequestClient, Arc<MemoryTokenStore>)> {
        let store = Arc::new(MemoryTokenStore::new());
        let session = SessionModel::new(store.clone() as Arc<dyn TokenStore>);
        let client = RequestClient::new(&self.base_url, session)?;
        Ok((client, store))
    }

    /// A token signed like the portal's, for `username` in `role`.
    pub fn mint(&self, username: &str, role: &str, ttl_secs: i64) -> String {
        mint_token(username, role, ttl_secs)
    }
}

/// Starts a portal with `questions` questions (all enabled) and the two
/// standard accounts.
pub async fn spawn_portal(questions: i64) -> Result<StubPortal> {
    let mut accounts = HashMap::new();
    for (name, role) in [(ADMIN, "admin"), (USER, "user"), ("bob", "user")] {
        accounts.insert(
            name.to_string(),
            Account {
                password: PASSWORD.to_string(),
                role,
                failed_resets: 0,
            },
        );
    }
    let stub = Stub {
        accounts,
        questions: (1..=questions)
            .map(|id| StoredQuestion {
                id,
                text: format!("Question {}?", id),
                enabled: true,
            })
            .collect(),
        answers: HashMap::new(),
        revoked: HashSet::new(),
        next_id: questions + 1,
        required_answers: 3,
        minimum_length: 2,
        token_ttl_secs: 3600,
        page_delays: HashMap::new(),
        requests: Vec::new(),
    };
    let state = Arc::new(Mutex::new(stub));

    let api = Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/about", get(about))
        .route("/questions", get(list_questions).post(add_question))
        .route("/questions/:id", patch(patch_question))
        .route(
            "/answers",
            get(get_answers).post(set_answers).delete(delete_answers),
        )
        .route("/answers/:username", get(user_answers))
        .route("/reset", post(reset))
        .with_state(state.clone());
    let app = Router::new().nest("/api/v1", api);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .context("bind stub portal")?;
    let addr = listener.local_addr().context("stub portal addr")?;
    let server = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(StubPortal {
        base_url: format!("http://{}/api/v1/", addr),
        state,
        server,
    })
}

pub fn mint_token(username: &str, role: &str, ttl_secs: i64) -> String {
    let engine = base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = json!({
        "sub": { "guid": format!("guid-{}", username), "username": username },
        "exp": OffsetDateTime::now_utc().unix_timestamp() + ttl_secs,
        "user_claims": { "roles": [role] },
    });
    format!("{}.{}.stub", header, engine.encode(payload.to_string()))
}

fn lock(state: &Arc<Mutex<Stub>>) -> MutexGuard<'_, Stub> {
    state
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

fn page_of(items: Vec<Value>, page: u32, per_page: u32) -> Value {
    let per_page = per_page.max(1);
    let total = items.len();
    let pages = total.div_ceil(per_page as usize);
    let start = (page.max(1) as usize - 1) * per_page as usize;
    let slice: Vec<Value> = items.into_iter().skip(start).take(per_page as usize).collect();
    json!({
        "items": slice,
        "meta": { "page": page, "pages": pages, "per_page": per_page, "total": total },
    })
}

/// Username of a valid bearer token carrying `role` (any role when `None`).
fn authorize(stub: &Stub, headers: &HeaderMap, role: Option<&str>) -> Result<String, Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| message(StatusCode::UNAUTHORIZED, "Missing Authorization Header"))?;
    let claims = decode_claims(token)
        .map_err(|_| message(StatusCode::UNAUTHORIZED, "Invalid token"))?;
    if stub.revoked.contains(token) || claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
        return Err(message(StatusCode::UNAUTHORIZED, "Token has expired"));
    }
    if let Some(role) = role
        && claims.user_claims.roles.first().map(String::as_str) != Some(role)
    {
        return Err(message(
            StatusCode::FORBIDDEN,
            "You don't have permission to perform this action",
        ));
    }
    Ok(claims.sub.username)
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(State(state): State<Arc<Mutex<Stub>>>, Json(body): Json<LoginBody>) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("POST /login".into());
    match stub.accounts.get(&body.username) {
        Some(acct) if acct.password == body.password => {
            let token = mint_token(&body.username, acct.role, stub.token_ttl_secs);
            Json(json!({ "token": token })).into_response()
        }
        _ => message(
            StatusCode::UNAUTHORIZED,
            "The username or password was incorrect",
        ),
    }
}

async fn logout(State(state): State<Arc<Mutex<Stub>>>, headers: HeaderMap) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("POST /logout".into());
    if let Err(resp) = authorize(&stub, &headers, None) {
        return resp;
    }
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .unwrap_or_default()
        .to_string();
    stub.revoked.insert(token);
    Json(json!({})).into_response()
}

async fn about(State(state): State<Arc<Mutex<Stub>>>) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("GET /about".into());
    Json(json!({
        "required_answers": stub.required_answers,
        "answers_minimum_length": stub.minimum_length,
        "allow_duplicate_answers": false,
        "account_status_enabled": false,
        "version": "stub",
    }))
    .into_response()
}

#[derive(Deserialize)]
struct ListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
    enabled: Option<bool>,
}

async fn list_questions(
    State(state): State<Arc<Mutex<Stub>>>,
    Query(q): Query<ListQuery>,
) -> Response {
    let page = q.page.unwrap_or(1);
    let per_page = q.per_page.unwrap_or(10);
    let delay = {
        let mut stub = lock(&state);
        let mut line = format!("GET /questions?page={}&per_page={}", page, per_page);
        if let Some(enabled) = q.enabled {
            line.push_str(&format!("&enabled={}", enabled));
        }
        stub.requests.push(line);
        stub.page_delays.get(&page).copied()
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let stub = lock(&state);
    let items = stub
        .questions
        .iter()
        .filter(|qn| q.enabled.is_none_or(|e| qn.enabled == e))
        .map(StoredQuestion::to_json)
        .collect();
    Json(page_of(items, page, per_page)).into_response()
}

#[derive(Deserialize)]
struct AddBody {
    question: String,
}

async fn add_question(
    State(state): State<Arc<Mutex<Stub>>>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("POST /questions".into());
    if let Err(resp) = authorize(&stub, &headers, Some("admin")) {
        return resp;
    }
    let id = stub.next_id;
    stub.next_id += 1;
    let question = StoredQuestion {
        id,
        text: body.question,
        enabled: true,
    };
    let out = question.to_json();
    stub.questions.push(question);
    (StatusCode::CREATED, Json(out)).into_response()
}

#[derive(Deserialize)]
struct PatchBody {
    question: Option<String>,
    enabled: Option<bool>,
}

async fn patch_question(
    State(state): State<Arc<Mutex<Stub>>>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<PatchBody>,
) -> Response {
    let mut stub = lock(&state);
    stub.requests.push(format!("PATCH /questions/{}", id));
    if let Err(resp) = authorize(&stub, &headers, Some("admin")) {
        return resp;
    }
    let Some(question) = stub.questions.iter_mut().find(|q| q.id == id) else {
        return message(StatusCode::NOT_FOUND, "The question was not found");
    };
    if let Some(text) = body.question {
        question.text = text;
    }
    if let Some(enabled) = body.enabled {
        question.enabled = enabled;
    }
    Json(question.to_json()).into_response()
}

fn configured_answers(stub: &Stub, username: &str) -> Vec<Value> {
    stub.answers
        .get(username)
        .map(|list| {
            list.iter()
                .filter_map(|(answer_id, qid, _)| {
                    let question = stub.questions.iter().find(|q| q.id == *qid)?;
                    Some(json!({ "id": answer_id, "question": question.to_json() }))
                })
                .collect()
        })
        .unwrap_or_default()
}

async fn get_answers(
    State(state): State<Arc<Mutex<Stub>>>,
    headers: HeaderMap,
    Query(q): Query<ListQuery>,
) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("GET /answers".into());
    let username = match authorize(&stub, &headers, Some("user")) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    let items = configured_answers(&stub, &username);
    Json(page_of(items, q.page.unwrap_or(1), q.per_page.unwrap_or(10))).into_response()
}

#[derive(Deserialize)]
struct AnswerBody {
    question_id: i64,
    answer: String,
}

async fn set_answers(
    State(state): State<Arc<Mutex<Stub>>>,
    headers: HeaderMap,
    Json(body): Json<Vec<AnswerBody>>,
) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("POST /answers".into());
    let username = match authorize(&stub, &headers, Some("user")) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    if stub.answers.get(&username).is_some_and(|a| !a.is_empty()) {
        return message(
            StatusCode::BAD_REQUEST,
            "The user has already set their answers",
        );
    }
    if body.len() != stub.required_answers {
        return message(
            StatusCode::BAD_REQUEST,
            &format!(
                "{} answers were supplied but {} are required",
                body.len(),
                stub.required_answers
            ),
        );
    }
    for a in &body {
        if a.answer.len() < stub.minimum_length {
            return message(
                StatusCode::BAD_REQUEST,
                &format!(
                    "The answer must be at least {} characters long",
                    stub.minimum_length
                ),
            );
        }
        if !stub.questions.iter().any(|q| q.id == a.question_id && q.enabled) {
            return message(
                StatusCode::BAD_REQUEST,
                &format!("The \"question_id\" of {} is to a disabled question", a.question_id),
            );
        }
    }
    let mut stored = Vec::new();
    for a in body {
        let id = stub.next_id;
        stub.next_id += 1;
        stored.push((id, a.question_id, a.answer.to_lowercase()));
    }
    stub.answers.insert(username.clone(), stored);
    let out = configured_answers(&stub, &username);
    (StatusCode::CREATED, Json(Value::Array(out))).into_response()
}

async fn delete_answers(State(state): State<Arc<Mutex<Stub>>>, headers: HeaderMap) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("DELETE /answers".into());
    let username = match authorize(&stub, &headers, Some("user")) {
        Ok(u) => u,
        Err(resp) => return resp,
    };
    stub.answers.remove(&username);
    StatusCode::NO_CONTENT.into_response()
}

async fn user_answers(
    State(state): State<Arc<Mutex<Stub>>>,
    Path(username): Path<String>,
    Query(q): Query<ListQuery>,
) -> Response {
    let mut stub = lock(&state);
    stub.requests.push(format!(
        "GET /answers/{}?page={}&per_page={}",
        username,
        q.page.unwrap_or(0),
        q.per_page.unwrap_or(0)
    ));
    let items = configured_answers(&stub, &username);
    Json(page_of(items, q.page.unwrap_or(1), q.per_page.unwrap_or(10))).into_response()
}

#[derive(Deserialize)]
struct ResetBody {
    answers: Vec<AnswerBody>,
    new_password: String,
    username: String,
}

async fn reset(State(state): State<Arc<Mutex<Stub>>>, Json(body): Json<ResetBody>) -> Response {
    let mut stub = lock(&state);
    stub.requests.push("POST /reset".into());
    let locked_msg = "Your account is locked. Please try again later.";
    let Some(acct) = stub.accounts.get(&body.username).cloned() else {
        return message(StatusCode::BAD_REQUEST, "The user does not exist");
    };
    if acct.failed_resets >= MAX_RESET_ATTEMPTS {
        return message(StatusCode::UNAUTHORIZED, locked_msg);
    }

    let stored = stub.answers.get(&body.username).cloned().unwrap_or_default();
    let correct = stored.len() == body.answers.len()
        && body.answers.iter().all(|a| {
            stored
                .iter()
                .any(|(_, qid, ans)| *qid == a.question_id && *ans == a.answer.to_lowercase())
        });

    let Some(acct) = stub.accounts.get_mut(&body.username) else {
        return message(StatusCode::BAD_REQUEST, "The user does not exist");
    };
    if !correct {
        acct.failed_resets += 1;
        if acct.failed_resets >= MAX_RESET_ATTEMPTS {
            return message(
                StatusCode::UNAUTHORIZED,
                "You have answered incorrectly too many times. Your account is now locked. Please try again later.",
            );
        }
        return message(
            StatusCode::UNAUTHORIZED,
            "One or more answers were incorrect. Please try again.",
        );
    }
    acct.failed_resets = 0;
    acct.password = body.new_password;
    Json(json!({})).into_response()
}
