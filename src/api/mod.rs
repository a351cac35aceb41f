// src/api/mod.rs

pub mod backend;
pub mod http;

pub use backend::{Backend, FileUpload, Method, Query, as_json, get_as};
pub use http::HttpBackend;
