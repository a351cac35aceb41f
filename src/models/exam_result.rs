// src/models/exam_result.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::controller::Resource;
use crate::utils::serde_de::{
    bool_lenient, datetime_lenient, f64_lenient, i64_lenient, string_lenient, u32_lenient,
    vec_lenient,
};

/// One scored attempt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamResult {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub id: i64,

    #[serde(default, alias = "name", deserialize_with = "string_lenient")]
    pub student_name: String,

    #[serde(default, deserialize_with = "i64_lenient")]
    pub exam_id: i64,

    #[serde(default, deserialize_with = "string_lenient")]
    pub exam_title: String,

    #[serde(default, alias = "exam_code", deserialize_with = "string_lenient")]
    pub exam_reference: String,

    #[serde(default, deserialize_with = "f64_lenient")]
    pub score_percentage: f64,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub correct_answers: u32,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub total_questions: u32,

    /// "Pass" or "Fail".
    #[serde(default, alias = "remark", deserialize_with = "string_lenient")]
    pub remarks: String,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub completed_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ExamResult {
    pub fn passed(&self) -> bool {
        let remark = self.remarks.trim();
        remark.eq_ignore_ascii_case("pass") || remark.eq_ignore_ascii_case("passed")
    }

    /// Completion time, falling back to creation time.
    pub fn taken_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at.or(self.created_at)
    }
}

impl Resource for ExamResult {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Per-question line of a result breakdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnswerBreakdown {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub question_id: i64,
    #[serde(default, deserialize_with = "string_lenient")]
    pub question: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub student_answer: String,
    #[serde(default, deserialize_with = "string_lenient")]
    pub correct_answer: String,
    #[serde(default, deserialize_with = "bool_lenient")]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamResultDetail {
    #[serde(default)]
    pub result: ExamResult,
    #[serde(default, deserialize_with = "vec_lenient")]
    pub answers: Vec<AnswerBreakdown>,
}

impl ExamResultDetail {
    pub fn wrong_answers(&self) -> impl Iterator<Item = &AnswerBreakdown> {
        self.answers.iter().filter(|a| !a.is_correct)
    }
}

/// Server-side totals over every result matching the current filters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultStats {
    #[serde(default, alias = "total", deserialize_with = "u32_lenient")]
    pub total_results: u32,
    #[serde(default, alias = "passed", deserialize_with = "u32_lenient")]
    pub passed_count: u32,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub average_score: f64,
    #[serde(default, deserialize_with = "f64_lenient")]
    pub pass_rate: f64,
}

/// Entry of the exam filter dropdown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamOption {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub id: i64,
    #[serde(default, deserialize_with = "string_lenient")]
    pub title: String,
}
