// src/pages/exams.rs

use std::str::FromStr;

use crate::api::Method;
use crate::controller::{
    Collection, DetailLoader, DetailSlot, FormController, ListEndpoint, SubmitOutcome,
};
use crate::error::AppError;
use crate::models::exam::{Exam, ExamDraft, ExamEditDraft, ExamPreview, GenerationMode};
use crate::routes;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl FromStr for StatusFilter {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            other => Err(AppError::BadRequest(format!("Unknown status filter: {}", other))),
        }
    }
}

impl StatusFilter {
    pub fn matches(self, exam: &Exam) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => exam.is_active(),
            StatusFilter::Inactive => !exam.is_active(),
        }
    }
}

/// Client-side view over the loaded exams.
/// `search` matches title or reference code, case-insensitively.
pub fn filter_exams(exams: &[Exam], status: StatusFilter, search: &str) -> Vec<Exam> {
    let needle = search.trim().to_lowercase();
    exams
        .iter()
        .filter(|e| status.matches(e))
        .filter(|e| {
            needle.is_empty()
                || e.title.to_lowercase().contains(&needle)
                || e.reference_code.to_lowercase().contains(&needle)
        })
        .cloned()
        .collect()
}

pub struct ExamsPage {
    state: AppState,
    pub list: Collection<Exam>,
    pub create_form: FormController<ExamDraft>,
    pub edit_form: FormController<ExamEditDraft>,
    pub preview: DetailLoader<ExamPreview>,
    editing: Option<i64>,
}

impl ExamsPage {
    pub fn new(state: AppState) -> Self {
        let list = Collection::new(state.clone(), ListEndpoint::new(routes::EXAMS));
        let create_form = FormController::new(state.notifier.clone());
        let edit_form = FormController::new(state.notifier.clone());
        let preview = DetailLoader::new(state.backend.clone());

        Self {
            state,
            list,
            create_form,
            edit_form,
            preview,
            editing: None,
        }
    }

    pub async fn filtered(&self, status: StatusFilter, search: &str) -> Vec<Exam> {
        filter_exams(&self.list.rows().await, status, search)
    }

    pub fn open_create(&mut self, mode: GenerationMode) {
        self.create_form.open(ExamDraft::new(mode));
    }

    /// Switches the open create form between manual and random selection,
    /// keeping title, time limit and passing score.
    pub fn switch_mode(&mut self, mode: GenerationMode) {
        self.create_form.draft_mut().mode = mode;
    }

    pub async fn save_new(&mut self) -> Result<SubmitOutcome, AppError> {
        let outcome = self
            .create_form
            .submit(self.state.backend.as_ref(), Method::Post, routes::EXAMS)
            .await?;
        if let SubmitOutcome::Saved(_) = outcome {
            self.state.notifier.success("Exam created.");
            let _ = self.list.refresh().await;
        }
        Ok(outcome)
    }

    pub fn open_edit(&mut self, exam: &Exam) {
        self.editing = Some(exam.id);
        self.edit_form.open(ExamEditDraft::from_exam(exam));
    }

    pub async fn save_edit(&mut self) -> Result<SubmitOutcome, AppError> {
        let Some(id) = self.editing else {
            return Err(AppError::BadRequest("No exam is being edited.".to_string()));
        };
        let outcome = self
            .edit_form
            .submit(self.state.backend.as_ref(), Method::Put, &routes::exam(id))
            .await?;
        if let SubmitOutcome::Saved(_) = outcome {
            self.editing = None;
            self.state.notifier.success("Exam updated.");
            let _ = self.list.refresh().await;
        }
        Ok(outcome)
    }

    pub async fn toggle_status(&self, id: i64) -> Result<(), AppError> {
        self.mutate(Method::Post, &routes::exam_toggle_status(id), "Exam status updated.")
            .await
    }

    /// Permanent. The backend also removes the exam's results.
    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.mutate(Method::Delete, &routes::exam(id), "Exam deleted.")
            .await
    }

    async fn mutate(&self, method: Method, path: &str, done: &str) -> Result<(), AppError> {
        match self.state.backend.send(method, path, None).await {
            Ok(_) => {
                self.state.notifier.success(done);
                let _ = self.list.refresh().await;
                Ok(())
            }
            Err(e) => {
                tracing::error!("{} {} failed: {}", method, path, e);
                self.state.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    pub async fn open_preview(&self, id: i64) -> DetailSlot<ExamPreview> {
        self.preview.open(&routes::exam_preview(id)).await
    }

    pub async fn close_preview(&self) {
        self.preview.close().await;
    }

    pub fn pdf_url(&self, id: i64) -> String {
        self.state.backend.link(&routes::exam_pdf(id), &[])
    }

    /// Link students open to take the exam; this is what the QR code encodes.
    pub fn exam_link(&self, exam: &Exam) -> String {
        self.state
            .backend
            .link(&routes::exam_link(&exam.reference_code), &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exam(id: i64, status: i64, title: &str, code: &str) -> Exam {
        Exam {
            id,
            status,
            title: title.to_string(),
            reference_code: code.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn active_filter_keeps_only_active_exams() {
        let exams = vec![exam(1, 1, "A", "A1"), exam(2, 0, "B", "B1")];
        let ids: Vec<i64> = filter_exams(&exams, StatusFilter::Active, "")
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![1]);

        let inactive = filter_exams(&exams, StatusFilter::Inactive, "");
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].id, 2);
    }

    #[test]
    fn search_matches_title_or_code() {
        let exams = vec![
            exam(1, 1, "Entrance Math", "ENT-01"),
            exam(2, 1, "Science", "SCI-77"),
        ];
        assert_eq!(filter_exams(&exams, StatusFilter::All, "math").len(), 1);
        assert_eq!(filter_exams(&exams, StatusFilter::All, "sci-7")[0].id, 2);
        assert_eq!(filter_exams(&exams, StatusFilter::All, "  ").len(), 2);
    }

    #[test]
    fn status_filter_parses() {
        assert_eq!("active".parse::<StatusFilter>().unwrap(), StatusFilter::Active);
        assert_eq!("ALL".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert!("archived".parse::<StatusFilter>().is_err());
    }
}
