// src/models/timing.rs

use serde::{Deserialize, Serialize};

use crate::utils::serde_de::{f64_lenient, i64_lenient, string_lenient, u32_lenient, vec_lenient};

/// Per-question answer-time aggregate, computed by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuestionTimingStat {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub question_id: i64,

    #[serde(default, alias = "question_text", deserialize_with = "string_lenient")]
    pub question: String,

    #[serde(default, deserialize_with = "string_lenient")]
    pub category: String,

    /// Seconds.
    #[serde(default, alias = "avg_time", deserialize_with = "f64_lenient")]
    pub average_time: f64,

    #[serde(default, alias = "attempts", deserialize_with = "u32_lenient")]
    pub attempt_count: u32,

    /// Share of attempts slower than the backend's threshold, 0..=100.
    #[serde(default, deserialize_with = "f64_lenient")]
    pub slow_percentage: f64,
}

/// `?as=json` payload of the analytics page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimingReport {
    #[serde(default, alias = "stats", deserialize_with = "vec_lenient")]
    pub questions: Vec<QuestionTimingStat>,
}
