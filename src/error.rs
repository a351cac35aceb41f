// src/error.rs

use std::collections::BTreeMap;
use std::fmt;

use serde_json::Value;

/// Field-keyed validation messages.
/// Client-side checks and backend 422 responses both land here so the
/// form renders them in the same slots.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Global Application Error Enum.
/// Centralizes every failure the console can observe, from local
/// validation to HTTP status codes returned by the backend.
#[derive(Debug)]
pub enum AppError {
    // 422 Unprocessable Entity, or a local validation failure
    Validation(FieldErrors),

    // 400 Bad Request
    BadRequest(String),

    // 401 / 403
    AuthError(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // Any other non-2xx status
    Http { status: u16, message: String },

    // Connection refused, DNS failure, broken body stream
    Network(String),

    // Payload could not be decoded into the expected shape
    Decode(String),

    // Key-value store failure
    Storage(String),

    // Missing or malformed configuration
    Config(String),

    InternalServerError(String),
}

impl AppError {
    /// Maps a non-2xx status and its JSON body (if any) to an error.
    pub fn from_status(status: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .or_else(|| body.get("error"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("Request failed with status {}", status));

        match status {
            400 => AppError::BadRequest(message),
            401 | 403 => AppError::AuthError(message),
            404 => AppError::NotFound(message),
            409 => AppError::Conflict(message),
            422 => {
                let mut errors = field_errors_from_json(body);
                if errors.is_empty() {
                    errors.insert("general".to_string(), vec![message]);
                }
                AppError::Validation(errors)
            }
            500..=599 => AppError::InternalServerError(message),
            _ => AppError::Http { status, message },
        }
    }

    /// Short human-readable message, suitable for a notice.
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(errors) => errors
                .values()
                .flatten()
                .next()
                .cloned()
                .unwrap_or_else(|| "Validation failed".to_string()),
            AppError::BadRequest(msg)
            | AppError::AuthError(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Network(msg)
            | AppError::Decode(msg)
            | AppError::Storage(msg)
            | AppError::Config(msg)
            | AppError::InternalServerError(msg) => msg.clone(),
            AppError::Http { message, .. } => message.clone(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(errors) => write!(f, "Validation failed: {:?}", errors),
            AppError::Http { status, message } => write!(f, "HTTP {}: {}", status, message),
            other => write!(f, "{:?}", other),
        }
    }
}

impl std::error::Error for AppError {}

/// Reads `{"errors": {"field": ["msg", ...]}}`.
/// A bare string instead of an array is accepted too.
fn field_errors_from_json(body: &Value) -> FieldErrors {
    let mut errors = FieldErrors::new();
    let Some(map) = body.get("errors").and_then(Value::as_object) else {
        return errors;
    };

    for (field, messages) in map {
        let list: Vec<String> = match messages {
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            Value::String(msg) => vec![msg.clone()],
            _ => Vec::new(),
        };
        if !list.is_empty() {
            errors.insert(field.clone(), list);
        }
    }
    errors
}

/// Converts `validator` output into field-keyed messages.
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(field_errors(&err))
    }
}

pub fn field_errors(err: &validator::ValidationErrors) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for (field, list) in err.field_errors() {
        let messages = list
            .iter()
            .map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            })
            .collect();
        errors.insert(field.to_string(), messages);
    }
    errors
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            AppError::Decode(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Decode(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("Invalid URL: {}", err))
    }
}
