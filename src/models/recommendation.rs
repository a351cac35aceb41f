// src/models/recommendation.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::controller::Resource;
use crate::utils::serde_de::{datetime_lenient, f64_lenient, i64_lenient, string_lenient, u32_lenient};

/// A student who passed and the courses recommended for them. Read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub id: i64,

    #[serde(default, alias = "name", deserialize_with = "string_lenient")]
    pub student_name: String,

    /// Comma-joined, e.g. "BSIT, BSCS".
    #[serde(default, alias = "recommended_course", deserialize_with = "string_lenient")]
    pub recommended_courses: String,

    #[serde(default, alias = "score_percentage", deserialize_with = "f64_lenient")]
    pub score: f64,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub correct_answers: u32,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub total_questions: u32,

    #[serde(default, deserialize_with = "string_lenient")]
    pub semester: String,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Recommendation {
    pub fn courses(&self) -> Vec<String> {
        self.recommended_courses
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}

impl Resource for Recommendation {
    fn id(&self) -> i64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn courses_are_split_and_trimmed() {
        let rec = Recommendation {
            recommended_courses: " BSIT,BSCS , ,BSIS,".to_string(),
            ..Default::default()
        };
        assert_eq!(rec.courses(), vec!["BSIT", "BSCS", "BSIS"]);
    }

    #[test]
    fn empty_course_string_yields_nothing() {
        assert!(Recommendation::default().courses().is_empty());
    }
}
