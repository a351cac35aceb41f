// src/routes.rs

//! Route table of the evaluator backend.
//!
//! Every path is relative to the configured API base URL.

pub const QUESTIONS: &str = "evaluator/questions";
pub const QUESTIONS_ARCHIVED: &str = "evaluator/questions/archived";
pub const QUESTIONS_IMPORT: &str = "evaluator/questions/import";
pub const QUESTIONS_BULK_ARCHIVE: &str = "evaluator/questions/bulk-archive";
pub const QUESTIONS_BULK_RESTORE: &str = "evaluator/questions/bulk-restore";

pub const EXAMS: &str = "evaluator/exams";

pub const EXAM_RESULTS: &str = "evaluator/exam-results";
pub const EXAM_RESULTS_EXPORT: &str = "evaluator/exam-results/export";

pub const EXAM_MONITORING: &str = "evaluator/exam-monitoring";
pub const RECOMMENDATIONS: &str = "evaluator/recommendations";
pub const QUESTION_ANALYTICS: &str = "evaluator/question-analytics";
pub const PROFILE: &str = "evaluator/profile";

/// Public page a student opens to take the exam (what the QR code encodes).
pub const TAKE_EXAM: &str = "exam/take";

pub fn question(id: i64) -> String {
    format!("{}/{}", QUESTIONS, id)
}

pub fn question_archive(id: i64) -> String {
    format!("{}/{}/archive", QUESTIONS, id)
}

pub fn question_restore(id: i64) -> String {
    format!("{}/{}/restore", QUESTIONS, id)
}

pub fn exam(id: i64) -> String {
    format!("{}/{}", EXAMS, id)
}

pub fn exam_toggle_status(id: i64) -> String {
    format!("{}/{}/toggle-status", EXAMS, id)
}

pub fn exam_preview(id: i64) -> String {
    format!("{}/{}/preview", EXAMS, id)
}

pub fn exam_pdf(id: i64) -> String {
    format!("{}/{}/pdf", EXAMS, id)
}

pub fn exam_link(reference_code: &str) -> String {
    format!("{}/{}", TAKE_EXAM, reference_code)
}

pub fn exam_result(id: i64) -> String {
    format!("{}/{}", EXAM_RESULTS, id)
}

pub fn exam_result_pdf(id: i64) -> String {
    format!("{}/{}/pdf", EXAM_RESULTS, id)
}
