// tests/common/mod.rs
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use evaluator::api::{Backend, FileUpload, Method};
use evaluator::config::Config;
use evaluator::error::AppError;
use evaluator::state::AppState;
use evaluator::utils::notify::RecordingNotifier;
use evaluator::utils::storage::MemoryStore;

/// One request seen by the fake backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Get { path: String, query: Vec<(String, String)> },
    Send { method: Method, path: String, body: Option<Value> },
    Upload { path: String, field: String, file_name: String, size: usize },
}

/// Scripted reply for a path.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    Status(u16, Value),
    Offline,
}

impl Reply {
    fn into_result(self) -> Result<Value, AppError> {
        match self {
            Reply::Json(v) => Ok(v),
            Reply::Status(status, body) => Err(AppError::from_status(status, &body)),
            Reply::Offline => Err(AppError::Network("connection refused".to_string())),
        }
    }
}

/// In-memory backend. Replies queued per path are consumed in order; the
/// last one is sticky. Unscripted paths answer `{}`.
#[derive(Default)]
pub struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, path: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn json(&self, path: &str, body: Value) {
        self.reply(path, Reply::Json(body));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn gets(&self, path: &str) -> Vec<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Get { path: p, query } if p == path => Some(query),
                _ => None,
            })
            .collect()
    }

    pub fn sends(&self) -> Vec<(Method, String, Option<Value>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Send { method, path, body } => Some((method, path, body)),
                _ => None,
            })
            .collect()
    }

    fn next(&self, path: &str) -> Result<Value, AppError> {
        let mut replies = self.replies.lock().unwrap();
        let reply = match replies.get_mut(path) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        reply.unwrap_or(Reply::Json(json!({}))).into_result()
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(Call::Get {
            path: path.to_string(),
            query: query.to_vec(),
        });
        self.next(path)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(Call::Send {
            method,
            path: path.to_string(),
            body,
        });
        self.next(path)
    }

    async fn upload(&self, path: &str, file: FileUpload) -> Result<Value, AppError> {
        self.calls.lock().unwrap().push(Call::Upload {
            path: path.to_string(),
            field: file.field,
            file_name: file.file_name,
            size: file.bytes.len(),
        });
        self.next(path)
    }

    fn link(&self, path: &str, query: &[(String, String)]) -> String {
        let mut url = format!("http://fake.test/{}", path.trim_start_matches('/'));
        if !query.is_empty() {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            url.push('?');
            url.push_str(&pairs.join("&"));
        }
        url
    }
}

pub struct Harness {
    pub state: AppState,
    pub backend: Arc<FakeBackend>,
    pub notifier: Arc<RecordingNotifier>,
    pub store: Arc<MemoryStore>,
}

pub fn harness() -> Harness {
    harness_with_store(Arc::new(MemoryStore::new()))
}

/// Shares `store` so a second harness sees what the first persisted.
pub fn harness_with_store(store: Arc<MemoryStore>) -> Harness {
    let backend = FakeBackend::new();
    let notifier = Arc::new(RecordingNotifier::new());
    let mut config = Config::with_api_url("http://fake.test");
    config.debounce = Duration::from_millis(300);
    config.poll_interval = Duration::from_secs(15);

    let state = AppState::new(backend.clone(), notifier.clone(), store.clone(), config);
    Harness {
        state,
        backend,
        notifier,
        store,
    }
}

/// Paginated body in the backend's shape.
pub fn page_of(rows: Vec<Value>, current_page: u32, total: u32) -> Value {
    let per_page = 10;
    json!({
        "data": rows,
        "current_page": current_page,
        "per_page": per_page,
        "total": total,
        "last_page": total.div_ceil(per_page).max(1),
        "links": [],
    })
}

pub fn question(id: i64, category: &str) -> Value {
    json!({
        "id": id,
        "question": format!("<p>Question {}</p>", id),
        "option_a": "Yes",
        "option_b": "No",
        "correct_answer": "A",
        "category": category,
    })
}

pub fn query_value<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}
