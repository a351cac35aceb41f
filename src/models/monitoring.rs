// src/models/monitoring.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::serde_de::{
    datetime_lenient, i64_lenient, string_lenient, u32_lenient, vec_lenient,
};

/// A student currently sitting an exam.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActiveTaker {
    #[serde(default, deserialize_with = "i64_lenient")]
    pub id: i64,

    #[serde(default, alias = "name", deserialize_with = "string_lenient")]
    pub student_name: String,

    #[serde(default, deserialize_with = "string_lenient")]
    pub exam_title: String,

    #[serde(default, deserialize_with = "datetime_lenient")]
    pub started_at: Option<DateTime<Utc>>,

    /// Minutes.
    #[serde(default, deserialize_with = "u32_lenient")]
    pub time_limit: u32,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub answered: u32,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub total_questions: u32,
}

impl ActiveTaker {
    /// Seconds left on the clock at `now`, never negative.
    /// `None` when the start time is unknown.
    pub fn remaining_seconds(&self, now: DateTime<Utc>) -> Option<i64> {
        let started = self.started_at?;
        let deadline = started + chrono::Duration::minutes(i64::from(self.time_limit));
        Some((deadline - now).num_seconds().max(0))
    }

    pub fn progress_percent(&self) -> f64 {
        if self.total_questions == 0 {
            return 0.0;
        }
        f64::from(self.answered) / f64::from(self.total_questions) * 100.0
    }
}

/// One poll of the monitoring endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MonitoringSnapshot {
    #[serde(default, alias = "takers", deserialize_with = "vec_lenient")]
    pub active: Vec<ActiveTaker>,

    #[serde(default, deserialize_with = "u32_lenient")]
    pub completed_today: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn remaining_time_counts_down_and_floors_at_zero() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let taker = ActiveTaker {
            started_at: Some(start),
            time_limit: 30,
            answered: 5,
            total_questions: 20,
            ..Default::default()
        };

        let ten_in = start + chrono::Duration::minutes(10);
        assert_eq!(taker.remaining_seconds(ten_in), Some(20 * 60));
        let late = start + chrono::Duration::minutes(45);
        assert_eq!(taker.remaining_seconds(late), Some(0));
        assert_eq!(taker.progress_percent(), 25.0);
    }

    #[test]
    fn unknown_start_has_no_countdown() {
        assert_eq!(ActiveTaker::default().remaining_seconds(Utc::now()), None);
    }
}
