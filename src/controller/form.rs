// src/controller/form.rs

use std::sync::Arc;

use serde_json::Value;

use crate::api::{Backend, Method};
use crate::error::{AppError, FieldErrors};
use crate::utils::notify::Notifier;

/// Local edit buffer of a create/edit form.
pub trait Draft: Clone + Default + Send + Sync {
    /// Client-side validation, keyed by field name.
    fn check(&self) -> Result<(), FieldErrors>;

    /// JSON body sent on submit.
    fn payload(&self) -> Value;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Closed,
    Open,
    Submitting,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Accepted by the backend; the form is closed again.
    Saved(Value),
    /// Rejected by local or server validation; see `errors()`.
    Invalid,
    /// Request failed for another reason; an error notice was raised.
    Failed(String),
}

/// Form lifecycle: closed, open, validating, submitting, and back.
///
/// Local and server validation errors share one field-keyed map.
pub struct FormController<D: Draft> {
    phase: FormPhase,
    draft: D,
    errors: FieldErrors,
    notifier: Arc<dyn Notifier>,
}

impl<D: Draft> FormController<D> {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self {
            phase: FormPhase::Closed,
            draft: D::default(),
            errors: FieldErrors::new(),
            notifier,
        }
    }

    pub fn open(&mut self, draft: D) {
        self.draft = draft;
        self.errors.clear();
        self.phase = FormPhase::Open;
    }

    pub fn close(&mut self) {
        self.draft = D::default();
        self.errors.clear();
        self.phase = FormPhase::Closed;
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn draft(&self) -> &D {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut D {
        &mut self.draft
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error_for(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|list| list.first())
            .map(String::as_str)
    }

    pub async fn submit(
        &mut self,
        backend: &dyn Backend,
        method: Method,
        path: &str,
    ) -> Result<SubmitOutcome, AppError> {
        if self.phase != FormPhase::Open {
            return Err(AppError::BadRequest("The form is not open.".to_string()));
        }

        if let Err(errors) = self.draft.check() {
            tracing::debug!("Form for {} has {} invalid field(s)", path, errors.len());
            self.errors = errors;
            return Ok(SubmitOutcome::Invalid);
        }

        self.errors.clear();
        self.phase = FormPhase::Submitting;

        match backend.send(method, path, Some(self.draft.payload())).await {
            Ok(body) => {
                self.close();
                Ok(SubmitOutcome::Saved(body))
            }
            Err(AppError::Validation(errors)) => {
                self.errors = errors;
                self.phase = FormPhase::Open;
                Ok(SubmitOutcome::Invalid)
            }
            Err(e) => {
                tracing::error!("{} {} failed: {}", method, path, e);
                let message = e.user_message();
                self.notifier.error(&message);
                self.phase = FormPhase::Open;
                Ok(SubmitOutcome::Failed(message))
            }
        }
    }
}
