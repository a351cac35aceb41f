// src/controller/collection.rs

use std::sync::{Arc, Weak};

use serde_json::{Value, json};
use tokio::sync::{Mutex, RwLock};

use super::debounce::Debouncer;
use super::filters::{FilterChange, ListParams};
use super::selection::SelectionTracker;
use crate::api::{Method, Query};
use crate::error::AppError;
use crate::models::page::{PageMeta, Paginated};
use crate::state::AppState;

/// Row type of a paginated listing.
pub trait Resource: serde::de::DeserializeOwned + Clone + Send + Sync + 'static {
    fn id(&self) -> i64;
}

/// Where a collection lives on the backend and what it supports.
#[derive(Debug, Clone, Default)]
pub struct ListEndpoint {
    pub path: String,
    /// Key of the paginated object when the response wraps it
    /// (`{"results": {...}, "stats": {...}}`).
    pub envelope_key: Option<String>,
    /// Store key the selection is mirrored under.
    pub selection_key: Option<String>,
    pub archive_path: Option<String>,
    pub restore_path: Option<String>,
    /// Sent with every fetch, after the filter parameters.
    pub extra_query: Query,
}

impl ListEndpoint {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn envelope(mut self, key: impl Into<String>) -> Self {
        self.envelope_key = Some(key.into());
        self
    }

    pub fn selection(mut self, key: impl Into<String>) -> Self {
        self.selection_key = Some(key.into());
        self
    }

    pub fn archive(mut self, path: impl Into<String>) -> Self {
        self.archive_path = Some(path.into());
        self
    }

    pub fn restore(mut self, path: impl Into<String>) -> Self {
        self.restore_path = Some(path.into());
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_query.push((key.into(), value.into()));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkAction {
    Archive,
    Restore,
}

impl BulkAction {
    fn past_tense(self) -> &'static str {
        match self {
            BulkAction::Archive => "archived",
            BulkAction::Restore => "restored",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkOutcome {
    /// Nothing was selected; no request was sent.
    Skipped,
    /// The backend accepted the request for this many ids.
    Applied(usize),
    /// The request failed; the selection is untouched.
    Failed,
}

struct View<R> {
    rows: Vec<R>,
    meta: PageMeta,
    envelope: Value,
    /// Parameters the rows were fetched with.
    loaded_params: ListParams,
    loading: bool,
}

struct Inner<R> {
    state: AppState,
    endpoint: ListEndpoint,
    params: Mutex<ListParams>,
    view: RwLock<View<R>>,
    selection: Mutex<SelectionTracker>,
    debouncer: Debouncer,
}

/// Generic paginated list controller shared by every page.
///
/// Holds the filter set, the rows of the last successful fetch, and the
/// bulk selection. Clones share the same state.
pub struct Collection<R: Resource> {
    inner: Arc<Inner<R>>,
}

impl<R: Resource> Clone for Collection<R> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<R: Resource> Collection<R> {
    /// Builds the controller and rehydrates its stored selection.
    /// Nothing is fetched until [`refresh`](Self::refresh) or a filter change.
    pub fn new(state: AppState, endpoint: ListEndpoint) -> Self {
        let selection =
            SelectionTracker::load(state.store.clone(), endpoint.selection_key.clone());
        let params = ListParams::new(state.config.per_page);
        let loaded_params = params.clone();
        let debouncer = Debouncer::new(state.config.debounce);

        Self {
            inner: Arc::new(Inner {
                state,
                endpoint,
                params: Mutex::new(params),
                view: RwLock::new(View {
                    rows: Vec::new(),
                    meta: PageMeta::default(),
                    envelope: Value::Null,
                    loaded_params,
                    loading: false,
                }),
                selection: Mutex::new(selection),
                debouncer,
            }),
        }
    }

    pub fn endpoint(&self) -> &ListEndpoint {
        &self.inner.endpoint
    }

    pub fn state(&self) -> &AppState {
        &self.inner.state
    }

    /// Merges a filter edit and schedules a debounced fetch.
    /// Category and sort edits also drop the selection.
    pub async fn apply(&self, change: FilterChange) {
        let resets_selection = change.resets_selection();
        self.inner.params.lock().await.apply(change);

        if resets_selection {
            self.inner.selection.lock().await.clear();
        }
        self.schedule_refresh();
    }

    /// Merges filter edits without fetching. For one-shot callers that
    /// follow up with [`refresh`](Self::refresh) themselves.
    pub async fn configure(&self, changes: impl IntoIterator<Item = FilterChange>) {
        let mut params = self.inner.params.lock().await;
        for change in changes {
            params.apply(change);
        }
    }

    /// Fetches after the quiet period, superseding any pending fetch.
    pub fn schedule_refresh(&self) {
        let weak: Weak<Inner<R>> = Arc::downgrade(&self.inner);
        self.inner.debouncer.schedule(async move {
            if let Some(inner) = weak.upgrade() {
                let collection = Collection { inner };
                let _ = collection.refresh().await;
            }
        });
    }

    pub fn has_pending_refresh(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Jumps to page `n` and fetches immediately.
    pub async fn fetch_page(&self, n: u32) -> Result<(), AppError> {
        self.inner.params.lock().await.apply(FilterChange::Page(n));
        self.refresh().await
    }

    /// Fetches with the current parameters and replaces the visible rows.
    ///
    /// On failure the previous rows stay visible, the loading flag is
    /// cleared and an error notice is raised. There is no retry.
    pub async fn refresh(&self) -> Result<(), AppError> {
        let requested = self.inner.params.lock().await.clone();
        let mut query = requested.to_query();
        query.extend(self.inner.endpoint.extra_query.iter().cloned());

        self.inner.view.write().await.loading = true;

        let path = &self.inner.endpoint.path;
        let result = match self.inner.state.backend.get(path, &query).await {
            Ok(body) => self.decode(&body).map(|page| (page, body)),
            Err(e) => Err(e),
        };

        let mut view = self.inner.view.write().await;
        view.loading = false;
        match result {
            Ok((page, body)) => {
                tracing::debug!(
                    "Loaded {} row(s) from {} (page {}/{})",
                    page.data.len(),
                    path,
                    page.current_page,
                    page.last_page
                );
                view.meta = page.meta();
                view.rows = page.data;
                view.envelope = body;
                view.loaded_params = requested;
                Ok(())
            }
            Err(e) => {
                drop(view);
                tracing::error!("Failed to load {}: {}", path, e);
                self.inner.state.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    fn decode(&self, body: &Value) -> Result<Paginated<R>, AppError> {
        let page_value = match &self.inner.endpoint.envelope_key {
            Some(key) => body.get(key).cloned().unwrap_or(Value::Null),
            None => body.clone(),
        };
        if page_value.is_null() {
            return Ok(Paginated::default());
        }
        Ok(serde_json::from_value(page_value)?)
    }

    pub async fn rows(&self) -> Vec<R> {
        self.inner.view.read().await.rows.clone()
    }

    pub async fn page(&self) -> PageMeta {
        self.inner.view.read().await.meta.clone()
    }

    /// Whole body of the last successful fetch, for sibling fields.
    pub async fn envelope(&self) -> Value {
        self.inner.view.read().await.envelope.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.view.read().await.loading
    }

    /// Current filters, including edits still waiting on the debouncer.
    pub async fn params(&self) -> ListParams {
        self.inner.params.lock().await.clone()
    }

    /// Filters of the last successful fetch, matching [`rows`](Self::rows).
    pub async fn loaded_params(&self) -> ListParams {
        self.inner.view.read().await.loaded_params.clone()
    }

    pub async fn toggle(&self, id: i64) {
        self.inner.selection.lock().await.toggle(id);
    }

    /// Select-all over the rows currently loaded, not every match.
    pub async fn toggle_all(&self) {
        let visible: Vec<i64> = self
            .inner
            .view
            .read()
            .await
            .rows
            .iter()
            .map(|row| row.id())
            .collect();
        self.inner.selection.lock().await.toggle_all(&visible);
    }

    pub async fn selected(&self) -> Vec<i64> {
        self.inner.selection.lock().await.ids()
    }

    pub async fn is_selected(&self, id: i64) -> bool {
        self.inner.selection.lock().await.contains(id)
    }

    pub async fn clear_selection(&self) {
        self.inner.selection.lock().await.clear();
    }

    /// Sends one request carrying every selected id.
    ///
    /// Archive goes back to page 1 afterwards, restore stays on the
    /// current page. A failure keeps the selection for a retry.
    pub async fn bulk(&self, action: BulkAction) -> BulkOutcome {
        let ids = self.selected().await;
        let notifier = &self.inner.state.notifier;

        if ids.is_empty() {
            notifier.warning("Select at least one item first.");
            return BulkOutcome::Skipped;
        }

        let path = match action {
            BulkAction::Archive => self.inner.endpoint.archive_path.as_deref(),
            BulkAction::Restore => self.inner.endpoint.restore_path.as_deref(),
        };
        let Some(path) = path else {
            tracing::warn!("{:?} is not available on {}", action, self.inner.endpoint.path);
            notifier.error("This list does not support that action.");
            return BulkOutcome::Failed;
        };

        let body = json!({ "ids": ids });
        match self
            .inner
            .state
            .backend
            .send(Method::Post, path, Some(body))
            .await
        {
            Ok(_) => {
                let count = ids.len();
                self.clear_selection().await;
                notifier.success(&format!("{} item(s) {}.", count, action.past_tense()));
                tracing::info!("Bulk {:?} of {} id(s) via {}", action, count, path);

                if action == BulkAction::Archive {
                    self.inner.params.lock().await.apply(FilterChange::Page(1));
                }
                let _ = self.refresh().await;
                BulkOutcome::Applied(count)
            }
            Err(e) => {
                tracing::error!("Bulk {:?} via {} failed: {}", action, path, e);
                notifier.error(&e.user_message());
                BulkOutcome::Failed
            }
        }
    }
}
