// src/api/http.rs

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use url::Url;

use super::backend::{Backend, FileUpload, Method};
use crate::error::AppError;

/// reqwest-backed [`Backend`].
/// Requests carry no timeout, so a hung request stays pending.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, AppError> {
        let mut base = Url::parse(base_url)?;
        // Url::join replaces the last segment unless the base ends with '/'.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Requested-With",
            HeaderValue::from_static("XMLHttpRequest"),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base,
            token,
        })
    }

    fn url(&self, path: &str, query: &[(String, String)]) -> Result<Url, AppError> {
        let mut url = self.base.join(path.trim_start_matches('/'))?;
        if !query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        }
        Ok(url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Reads the body as JSON; an empty body is `Null`, and a non-JSON body
    /// is kept as a string so error messages survive.
    async fn read(response: Response) -> Result<Value, AppError> {
        let status = response.status();
        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        if !status.is_success() {
            return Err(AppError::from_status(status.as_u16(), &body));
        }
        Ok(body)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn get(&self, path: &str, query: &[(String, String)]) -> Result<Value, AppError> {
        let url = self.url(path, query)?;
        tracing::debug!("GET {}", url);

        let response = self
            .authorize(self.client.get(url.clone()))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("GET {} failed: {:?}", url, e);
                AppError::from(e)
            })?;
        Self::read(response).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, AppError> {
        let url = self.url(path, &[])?;
        tracing::debug!("{} {}", method, url);

        let request = match method {
            Method::Post => self.client.post(url.clone()),
            Method::Put => self.client.put(url.clone()),
            Method::Patch => self.client.patch(url.clone()),
            Method::Delete => self.client.delete(url.clone()),
        };
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };

        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::error!("{} {} failed: {:?}", method, url, e);
            AppError::from(e)
        })?;
        Self::read(response).await
    }

    async fn upload(&self, path: &str, file: FileUpload) -> Result<Value, AppError> {
        let url = self.url(path, &[])?;
        tracing::debug!("POST {} (multipart, {} bytes)", url, file.bytes.len());

        let part = Part::bytes(file.bytes).file_name(file.file_name);
        let form = Form::new().part(file.field, part);

        let response = self
            .authorize(self.client.post(url.clone()).multipart(form))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Upload to {} failed: {:?}", url, e);
                AppError::from(e)
            })?;
        Self::read(response).await
    }

    fn link(&self, path: &str, query: &[(String, String)]) -> String {
        match self.url(path, query) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base, path.trim_start_matches('/')),
        }
    }
}
