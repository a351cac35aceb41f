// src/api/backend.rs

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::AppError;

/// Query string as ordered key/value pairs.
pub type Query = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Post,
    Put,
    Patch,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// File sent as a multipart form field.
#[derive(Debug, Clone)]
pub struct FileUpload {
    pub field: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// The exam-management backend, seen from the evaluator's side.
///
/// Payloads are loosely typed JSON; callers decode them into models
/// leniently. Implementations map non-2xx statuses to [`AppError`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError>;

    async fn send(&self, method: Method, path: &str, body: Option<Value>)
    -> Result<Value, AppError>;

    async fn upload(&self, path: &str, file: FileUpload) -> Result<Value, AppError>;

    /// Absolute URL for endpoints that are opened, not fetched
    /// (exports, PDFs, exam links).
    fn link(&self, path: &str, query: &[(String, String)]) -> String;
}

/// Fetches `path` and decodes the body into `T`.
pub async fn get_as<T: DeserializeOwned>(
    backend: &dyn Backend,
    path: &str,
    query: &[(String, String)],
) -> Result<T, AppError> {
    let value = backend.get(path, query).await?;
    Ok(serde_json::from_value(value)?)
}

/// Query pair for the JSON variant of a page endpoint.
pub fn as_json() -> Query {
    vec![("as".to_string(), "json".to_string())]
}
