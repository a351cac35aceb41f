// src/models/exam.rs

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::Validate;

use crate::controller::{Draft, Resource};
use crate::error::{FieldErrors, field_errors};
use crate::models::question::Question;
use crate::utils::serde_de::{
    datetime_lenient, i64_lenient, string_lenient, u32_lenient, vec_lenient,
};

/// Exam as listed on the exams page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Exam {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub id: i64,

    #[serde(default, deserialize_with = "string_lenient")]
    pub title: String,

    /// Short code students type to join.
    #[serde(default, alias = "exam_code", deserialize_with = "string_lenient")]
    pub reference_code: String,

    /// Minutes.
    #[serde(default, deserialize_with = "u32_lenient")]
    pub time_limit: u32,

    /// Percentage, 1..=100.
    #[serde(default, deserialize_with = "u32_lenient")]
    pub passing_score: u32,

    /// 1 = active, 0 = inactive.
    #[serde(default, deserialize_with = "i64_lenient")]
    pub status: i64,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub total_questions: u32,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub total_students: u32,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Exam {
    pub fn is_active(&self) -> bool {
        self.status == 1
    }
}

impl Resource for Exam {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Exam together with the questions a student would see.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExamPreview {
    #[serde(default)]
    pub exam: Exam,
    #[serde(default, deserialize_with = "vec_lenient")]
    pub questions: Vec<Question>,
}

/// How the question set of a new exam is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Explicit list of question ids.
    #[default]
    Manual,
    /// N random questions per category.
    Random,
}

/// Edit buffer for the exam creation form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExamDraft {
    #[validate(length(min = 1, max = 255, message = "The title is required."))]
    pub title: String,

    #[validate(range(min = 1, message = "The time limit must be at least 1 minute."))]
    pub time_limit: u32,

    #[validate(range(min = 1, max = 100, message = "The passing score must be between 1 and 100."))]
    pub passing_score: u32,

    pub mode: GenerationMode,

    pub question_ids: BTreeSet<i64>,

    pub category_counts: BTreeMap<String, u32>,
}

impl ExamDraft {
    pub fn new(mode: GenerationMode) -> Self {
        Self {
            mode,
            time_limit: 60,
            passing_score: 75,
            ..Default::default()
        }
    }

    pub fn toggle_question(&mut self, id: i64) {
        if !self.question_ids.remove(&id) {
            self.question_ids.insert(id);
        }
    }

    pub fn set_category_count(&mut self, category: impl Into<String>, count: u32) {
        self.category_counts.insert(category.into(), count);
    }

    pub fn requested_question_count(&self) -> u32 {
        match self.mode {
            GenerationMode::Manual => u32::try_from(self.question_ids.len()).unwrap_or(u32::MAX),
            GenerationMode::Random => self
                .category_counts
                .values()
                .copied()
                .fold(0u32, u32::saturating_add),
        }
    }
}

impl Draft for ExamDraft {
    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        if self.title.trim().is_empty() && !errors.contains_key("title") {
            errors.insert("title".to_string(), vec!["The title is required.".to_string()]);
        }

        match self.mode {
            GenerationMode::Manual if self.question_ids.is_empty() => {
                errors.insert(
                    "question_ids".to_string(),
                    vec!["Select at least one question.".to_string()],
                );
            }
            GenerationMode::Random if !self.category_counts.values().any(|c| *c > 0) => {
                errors.insert(
                    "category_counts".to_string(),
                    vec!["Request at least one question from a category.".to_string()],
                );
            }
            _ => {}
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn payload(&self) -> Value {
        let mut body = json!({
            "title": self.title.trim(),
            "time_limit": self.time_limit,
            "passing_score": self.passing_score,
            "generation_mode": self.mode,
        });
        if let Some(map) = body.as_object_mut() {
            match self.mode {
                GenerationMode::Manual => {
                    map.insert("question_ids".to_string(), json!(self.question_ids));
                }
                GenerationMode::Random => {
                    let counts: BTreeMap<&String, &u32> = self
                        .category_counts
                        .iter()
                        .filter(|(_, c)| **c > 0)
                        .collect();
                    map.insert("category_counts".to_string(), json!(counts));
                }
            }
        }
        body
    }
}

/// Edit buffer for an existing exam. Only these three fields are editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ExamEditDraft {
    #[validate(length(min = 1, max = 255, message = "The title is required."))]
    pub title: String,

    #[validate(range(min = 1, message = "The time limit must be at least 1 minute."))]
    pub time_limit: u32,

    #[validate(range(min = 1, max = 100, message = "The passing score must be between 1 and 100."))]
    pub passing_score: u32,
}

impl ExamEditDraft {
    pub fn from_exam(exam: &Exam) -> Self {
        Self {
            title: exam.title.clone(),
            time_limit: exam.time_limit,
            passing_score: exam.passing_score,
        }
    }
}

impl Draft for ExamEditDraft {
    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };
        if self.title.trim().is_empty() && !errors.contains_key("title") {
            errors.insert("title".to_string(), vec!["The title is required.".to_string()]);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn payload(&self) -> Value {
        json!({
            "title": self.title.trim(),
            "time_limit": self.time_limit,
            "passing_score": self.passing_score,
        })
    }
}
