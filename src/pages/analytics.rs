// src/pages/analytics.rs

use std::cmp::Ordering;
use std::sync::Arc;

use serde::Serialize;

use crate::api::{Backend, as_json, get_as};
use crate::error::AppError;
use crate::models::timing::{QuestionTimingStat, TimingReport};
use crate::routes;
use crate::utils::html::{plain_text, truncate};
use crate::utils::notify::Notifier;

const LABEL_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Difficulty {
    Easy,
    Moderate,
    Hard,
}

/// Buckets by share of slow attempts: <25 easy, <50 moderate, else hard.
pub fn difficulty(stat: &QuestionTimingStat) -> Difficulty {
    if stat.slow_percentage < 25.0 {
        Difficulty::Easy
    } else if stat.slow_percentage < 50.0 {
        Difficulty::Moderate
    } else {
        Difficulty::Hard
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

/// Shape a bar-chart library consumes directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

/// The `n` questions with the highest average answer time, slowest first.
pub fn slowest(stats: &[QuestionTimingStat], n: usize) -> Vec<QuestionTimingStat> {
    let mut sorted = stats.to_vec();
    sorted.sort_by(|a, b| {
        b.average_time
            .partial_cmp(&a.average_time)
            .unwrap_or(Ordering::Equal)
    });
    sorted.truncate(n);
    sorted
}

pub fn chart_data(stats: &[QuestionTimingStat], n: usize) -> ChartData {
    let top = slowest(stats, n);
    let labels = top
        .iter()
        .map(|s| {
            format!(
                "Q{}: {}",
                s.question_id,
                truncate(&plain_text(&s.question), LABEL_CHARS)
            )
        })
        .collect();

    ChartData {
        labels,
        datasets: vec![
            Dataset {
                label: "Average time (s)".to_string(),
                data: top.iter().map(|s| s.average_time).collect(),
            },
            Dataset {
                label: "Slow attempts (%)".to_string(),
                data: top.iter().map(|s| s.slow_percentage).collect(),
            },
        ],
    }
}

/// Question-difficulty dashboard.
pub struct QuestionAnalytics {
    backend: Arc<dyn Backend>,
    notifier: Arc<dyn Notifier>,
    stats: Vec<QuestionTimingStat>,
}

impl QuestionAnalytics {
    pub fn new(backend: Arc<dyn Backend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            stats: Vec::new(),
        }
    }

    /// Replaces the loaded stats. On failure the previous ones stay.
    pub async fn load(&mut self) -> Result<(), AppError> {
        match get_as::<TimingReport>(self.backend.as_ref(), routes::QUESTION_ANALYTICS, &as_json())
            .await
        {
            Ok(report) => {
                self.stats = report.questions;
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to load question analytics: {}", e);
                self.notifier.error(&e.user_message());
                Err(e)
            }
        }
    }

    pub fn stats(&self) -> &[QuestionTimingStat] {
        &self.stats
    }

    pub fn slowest(&self, n: usize) -> Vec<QuestionTimingStat> {
        slowest(&self.stats, n)
    }

    pub fn chart(&self, n: usize) -> ChartData {
        chart_data(&self.stats, n)
    }

    /// Attempt-weighted mean answer time over every question.
    pub fn overall_average_time(&self) -> f64 {
        let attempts: u32 = self.stats.iter().map(|s| s.attempt_count).sum();
        if attempts == 0 {
            return 0.0;
        }
        let weighted: f64 = self
            .stats
            .iter()
            .map(|s| s.average_time * f64::from(s.attempt_count))
            .sum();
        weighted / f64::from(attempts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stat(id: i64, avg: f64, slow: f64, attempts: u32) -> QuestionTimingStat {
        QuestionTimingStat {
            question_id: id,
            question: format!("<p>Question number {} asks something rather long indeed</p>", id),
            average_time: avg,
            slow_percentage: slow,
            attempt_count: attempts,
            ..Default::default()
        }
    }

    #[test]
    fn chart_lists_slowest_first() {
        let stats = vec![stat(1, 12.0, 10.0, 4), stat(2, 40.0, 60.0, 2), stat(3, 25.0, 30.0, 1)];
        let chart = chart_data(&stats, 2);

        assert_eq!(chart.labels.len(), 2);
        assert!(chart.labels[0].starts_with("Q2: Question number 2"));
        assert!(chart.labels[0].ends_with('…'));
        assert_eq!(chart.datasets[0].data, vec![40.0, 25.0]);
        assert_eq!(chart.datasets[1].data, vec![60.0, 30.0]);
    }

    #[test]
    fn difficulty_buckets() {
        assert_eq!(difficulty(&stat(1, 0.0, 10.0, 0)), Difficulty::Easy);
        assert_eq!(difficulty(&stat(1, 0.0, 25.0, 0)), Difficulty::Moderate);
        assert_eq!(difficulty(&stat(1, 0.0, 50.0, 0)), Difficulty::Hard);
    }
}
