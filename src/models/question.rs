// src/models/question.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use validator::{Validate, ValidationError};

use crate::controller::{Draft, Resource};
use crate::error::{FieldErrors, field_errors};
use crate::utils::html::{clean_html, plain_text};
use crate::utils::serde_de::{datetime_lenient, i64_lenient, opt_string_lenient, string_lenient};

pub const OPTION_LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// A question-bank entry as listed by the backend.
/// Options are flat columns `option_a` .. `option_e`, each with an optional
/// image payload next to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Question {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub id: i64,

    /// Plain prompt text.
    #[serde(default, alias = "question_text", deserialize_with = "string_lenient")]
    pub question: String,

    /// Rich-text variant of the prompt, if the author formatted it.
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub question_html: Option<String>,

    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_a: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_b: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_c: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_d: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_e: Option<String>,

    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_a_image: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_b_image: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_c_image: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_d_image: Option<String>,
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub option_e_image: Option<String>,

    /// Letter A..E.
    #[serde(default, deserialize_with = "string_lenient")]
    pub correct_answer: String,

    #[serde(default, deserialize_with = "string_lenient")]
    pub category: String,

    /// Shared instructions shown above a group of questions.
    #[serde(default, deserialize_with = "opt_string_lenient")]
    pub direction: Option<String>,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub archived_at: Option<DateTime<Utc>>,
}

/// One answer choice, with its letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOption {
    pub letter: char,
    pub text: String,
    pub image: Option<String>,
}

impl Question {
    /// Filled options in letter order. Blank slots are skipped.
    pub fn options(&self) -> Vec<QuestionOption> {
        let texts = [
            &self.option_a,
            &self.option_b,
            &self.option_c,
            &self.option_d,
            &self.option_e,
        ];
        let images = [
            &self.option_a_image,
            &self.option_b_image,
            &self.option_c_image,
            &self.option_d_image,
            &self.option_e_image,
        ];

        OPTION_LETTERS
            .iter()
            .zip(texts.iter().zip(images.iter()))
            .filter_map(|(letter, (text, image))| {
                let text = text.as_deref().unwrap_or("").trim();
                let image = image.as_ref().filter(|i| !i.is_empty()).cloned();
                if text.is_empty() && image.is_none() {
                    return None;
                }
                Some(QuestionOption {
                    letter: *letter,
                    text: text.to_string(),
                    image,
                })
            })
            .collect()
    }

    /// Sanitized rich prompt, falling back to the plain prompt.
    pub fn safe_html(&self) -> String {
        match self.question_html.as_deref().filter(|h| !h.trim().is_empty()) {
            Some(html) => clean_html(html),
            None => clean_html(&self.question),
        }
    }

    /// Single-line prompt for tables and chart labels.
    pub fn plain_prompt(&self) -> String {
        if !self.question.trim().is_empty() {
            return plain_text(&self.question);
        }
        self.question_html
            .as_deref()
            .map(plain_text)
            .unwrap_or_default()
    }

    pub fn is_archived(&self) -> bool {
        self.archived_at.is_some()
    }
}

impl Resource for Question {
    fn id(&self) -> i64 {
        self.id
    }
}

/// Edit buffer for creating or replacing a question.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct QuestionDraft {
    #[validate(length(min = 1, max = 5000, message = "The question text is required."))]
    pub question: String,

    pub question_html: Option<String>,

    /// Slots A..E. Empty strings are unused slots.
    #[validate(custom(function = validate_option_slots))]
    pub options: [String; 5],

    /// Optional base64 image payload per slot.
    pub option_images: [Option<String>; 5],

    #[validate(length(min = 1, max = 1, message = "Pick the correct answer."))]
    pub correct_answer: String,

    #[validate(length(min = 1, max = 100, message = "The category is required."))]
    pub category: String,

    #[validate(length(max = 5000))]
    pub direction: Option<String>,
}

fn validate_option_slots(options: &[String; 5]) -> Result<(), ValidationError> {
    let filled = options.iter().filter(|o| !o.trim().is_empty()).count();
    if filled < 2 {
        return Err(ValidationError::new("too_few_options")
            .with_message("At least two options are required.".into()));
    }
    if options.iter().any(|o| o.len() > 1000) {
        return Err(ValidationError::new("option_too_long"));
    }
    Ok(())
}

impl QuestionDraft {
    /// Loads an existing question into an edit buffer.
    pub fn from_question(question: &Question) -> Self {
        let slot = |o: &Option<String>| o.clone().unwrap_or_default();
        Self {
            question: question.question.clone(),
            question_html: question.question_html.clone(),
            options: [
                slot(&question.option_a),
                slot(&question.option_b),
                slot(&question.option_c),
                slot(&question.option_d),
                slot(&question.option_e),
            ],
            option_images: [
                question.option_a_image.clone(),
                question.option_b_image.clone(),
                question.option_c_image.clone(),
                question.option_d_image.clone(),
                question.option_e_image.clone(),
            ],
            correct_answer: question.correct_answer.clone(),
            category: question.category.clone(),
            direction: question.direction.clone(),
        }
    }
}

impl Draft for QuestionDraft {
    fn check(&self) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => field_errors(&e),
        };

        if self.question.trim().is_empty() && !errors.contains_key("question") {
            errors.insert(
                "question".to_string(),
                vec!["The question text is required.".to_string()],
            );
        }

        // The correct letter has to point at a filled slot.
        let letter = self.correct_answer.trim().to_ascii_uppercase();
        let slot = OPTION_LETTERS
            .iter()
            .position(|l| letter.starts_with(*l) && letter.len() == 1);
        let points_at_filled = slot.is_some_and(|i| !self.options[i].trim().is_empty());
        if !points_at_filled && !errors.contains_key("correct_answer") {
            errors.insert(
                "correct_answer".to_string(),
                vec!["The correct answer must be one of the filled options.".to_string()],
            );
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    fn payload(&self) -> Value {
        let mut body = json!({
            "question": self.question.trim(),
            "question_html": self.question_html,
            "correct_answer": self.correct_answer.trim().to_ascii_uppercase(),
            "category": self.category.trim(),
            "direction": self.direction,
        });
        if let Some(map) = body.as_object_mut() {
            for (i, letter) in OPTION_LETTERS.iter().enumerate() {
                let key = letter.to_ascii_lowercase();
                let text = self.options[i].trim();
                map.insert(
                    format!("option_{}", key),
                    if text.is_empty() { Value::Null } else { json!(text) },
                );
                map.insert(
                    format!("option_{}_image", key),
                    json!(self.option_images[i]),
                );
            }
        }
        body
    }
}
