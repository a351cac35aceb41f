// src/pages/question_bank.rs

use std::collections::BTreeSet;

use serde_json::Value;

use crate::api::{FileUpload, Method};
use crate::controller::{
    BulkAction, BulkOutcome, Collection, FormController, ListEndpoint, SubmitOutcome,
};
use crate::error::AppError;
use crate::models::question::{Question, QuestionDraft};
use crate::routes;
use crate::state::AppState;

pub const SELECTION_KEY: &str = "question_bank.selected";
pub const ARCHIVED_SELECTION_KEY: &str = "question_bank.archived_selected";

/// Question-bank page: active and archived listings, each with its own
/// bulk selection, plus the create/edit form and file import.
pub struct QuestionBank {
    state: AppState,
    pub active: Collection<Question>,
    pub archived: Collection<Question>,
    pub form: FormController<QuestionDraft>,
    editing: Option<i64>,
}

impl QuestionBank {
    pub fn new(state: AppState) -> Self {
        let active = Collection::new(
            state.clone(),
            ListEndpoint::new(routes::QUESTIONS)
                .selection(SELECTION_KEY)
                .archive(routes::QUESTIONS_BULK_ARCHIVE),
        );
        let archived = Collection::new(
            state.clone(),
            ListEndpoint::new(routes::QUESTIONS_ARCHIVED)
                .selection(ARCHIVED_SELECTION_KEY)
                .restore(routes::QUESTIONS_BULK_RESTORE),
        );
        let form = FormController::new(state.notifier.clone());

        Self {
            state,
            active,
            archived,
            form,
            editing: None,
        }
    }

    /// Archives every selected active question in one request.
    pub async fn archive_selected(&self) -> BulkOutcome {
        let outcome = self.active.bulk(BulkAction::Archive).await;
        if matches!(outcome, BulkOutcome::Applied(_)) {
            let _ = self.archived.refresh().await;
        }
        outcome
    }

    /// Restores every selected archived question in one request.
    pub async fn restore_selected(&self) -> BulkOutcome {
        let outcome = self.archived.bulk(BulkAction::Restore).await;
        if matches!(outcome, BulkOutcome::Applied(_)) {
            let _ = self.active.refresh().await;
        }
        outcome
    }

    pub async fn archive_one(&self, id: i64) -> Result<(), AppError> {
        self.single(Method::Post, &routes::question_archive(id), "Question archived.")
            .await
    }

    pub async fn restore_one(&self, id: i64) -> Result<(), AppError> {
        self.single(Method::Post, &routes::question_restore(id), "Question restored.")
            .await
    }

    async fn single(&self, method: Method, path: &str, done: &str) -> Result<(), AppError> {
        match self.state.backend.send(method, path, None).await {
            Ok(_) => {
                self.state.notifier.success(done);
                let _ = self.active.refresh().await;
                let _ = self.archived.refresh().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("{} {} failed: {}", method, path, e);
                self.state.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    pub fn open_create(&mut self) {
        self.editing = None;
        self.form.open(QuestionDraft::default());
    }

    pub fn open_edit(&mut self, question: &Question) {
        self.editing = Some(question.id);
        self.form.open(QuestionDraft::from_question(question));
    }

    pub fn editing(&self) -> Option<i64> {
        self.editing
    }

    /// Creates or replaces the question in the form, then reloads the list.
    pub async fn save(&mut self) -> Result<SubmitOutcome, AppError> {
        let (method, path) = match self.editing {
            Some(id) => (Method::Put, routes::question(id)),
            None => (Method::Post, routes::QUESTIONS.to_string()),
        };

        let outcome = self
            .form
            .submit(self.state.backend.as_ref(), method, &path)
            .await?;

        if let SubmitOutcome::Saved(_) = outcome {
            let done = if self.editing.is_some() {
                "Question updated."
            } else {
                "Question created."
            };
            self.editing = None;
            self.state.notifier.success(done);
            let _ = self.active.refresh().await;
        }
        Ok(outcome)
    }

    /// Uploads a question file for the backend to parse.
    /// Returns `Ok(false)` without a request when the file is empty.
    pub async fn import(&self, file_name: &str, bytes: Vec<u8>) -> Result<bool, AppError> {
        if bytes.is_empty() {
            self.state.notifier.warning("Choose a non-empty file to import.");
            return Ok(false);
        }

        let upload = FileUpload {
            field: "file".to_string(),
            file_name: file_name.to_string(),
            bytes,
        };

        match self.state.backend.upload(routes::QUESTIONS_IMPORT, upload).await {
            Ok(body) => {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("Questions imported.");
                self.state.notifier.success(message);
                tracing::info!("Imported questions from {}", file_name);
                let _ = self.active.refresh().await;
                Ok(true)
            }
            Err(e) => {
                tracing::error!("Import of {} failed: {}", file_name, e);
                self.state.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    /// Distinct categories among the loaded active questions, sorted.
    pub async fn categories(&self) -> Vec<String> {
        self.active
            .rows()
            .await
            .into_iter()
            .map(|q| q.category.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}
