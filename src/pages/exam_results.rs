// src/pages/exam_results.rs

use std::cmp::Ordering;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Value, json};

use crate::controller::{Collection, DetailLoader, DetailSlot, FilterChange, ListEndpoint};
use crate::error::AppError;
use crate::models::exam_result::{ExamOption, ExamResult, ExamResultDetail, ResultStats};
use crate::routes;
use crate::state::AppState;

pub const TABLE_COLLAPSED_KEY: &str = "exam_results.table_collapsed";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Date,
    Score,
    Name,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "date" => Ok(SortKey::Date),
            "score" => Ok(SortKey::Score),
            "name" => Ok(SortKey::Name),
            other => Err(AppError::BadRequest(format!("Unknown sort key: {}", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Stable client-side sort of the loaded rows. Never refetches.
pub fn sort_results(rows: &mut [ExamResult], key: SortKey, direction: SortDirection) {
    rows.sort_by(|a, b| {
        let ordering = match key {
            SortKey::Date => a.taken_at().cmp(&b.taken_at()),
            SortKey::Score => a
                .score_percentage
                .partial_cmp(&b.score_percentage)
                .unwrap_or(Ordering::Equal),
            SortKey::Name => a
                .student_name
                .to_lowercase()
                .cmp(&b.student_name.to_lowercase()),
        };
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Figures shown above the results table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplayedStats {
    pub total_results: u32,
    pub passed_count: u32,
    pub average_score: f64,
    pub pass_rate: f64,
}

/// Server totals when no exam is selected. With an exam selected, passes
/// and the average come from the loaded rows while the pass-rate
/// denominator stays the server's total for the filter.
pub fn derive_stats(
    rows: &[ExamResult],
    server: &ResultStats,
    server_total: u32,
    exam_filter: Option<i64>,
) -> DisplayedStats {
    if exam_filter.is_none() {
        return DisplayedStats {
            total_results: server.total_results,
            passed_count: server.passed_count,
            average_score: server.average_score,
            pass_rate: server.pass_rate,
        };
    }

    let passed_count = rows.iter().filter(|r| r.passed()).count() as u32;
    let average_score = if rows.is_empty() {
        0.0
    } else {
        rows.iter().map(|r| r.score_percentage).sum::<f64>() / rows.len() as f64
    };
    let pass_rate = if server_total == 0 {
        0.0
    } else {
        round2(f64::from(passed_count) / f64::from(server_total) * 100.0)
    };

    DisplayedStats {
        total_results: server_total,
        passed_count,
        average_score,
        pass_rate,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub struct ExamResultsPage {
    state: AppState,
    pub list: Collection<ExamResult>,
    pub detail: DetailLoader<ExamResultDetail>,
    sort_key: SortKey,
    direction: SortDirection,
}

impl ExamResultsPage {
    pub fn new(state: AppState) -> Self {
        let list = Collection::new(
            state.clone(),
            ListEndpoint::new(routes::EXAM_RESULTS).envelope("results"),
        );
        let detail = DetailLoader::new(state.backend.clone());

        Self {
            state,
            list,
            detail,
            sort_key: SortKey::default(),
            direction: SortDirection::default(),
        }
    }

    pub async fn select_exam(&self, exam_id: Option<i64>) {
        self.list.apply(FilterChange::Exam(exam_id)).await;
    }

    pub async fn stats(&self) -> DisplayedStats {
        let envelope = self.list.envelope().await;
        let server: ResultStats = envelope
            .get("stats")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();
        let total = self.list.page().await.total;
        let exam_filter = self.list.loaded_params().await.exam_id;
        let rows = self.list.rows().await;

        derive_stats(&rows, &server, total, exam_filter)
    }

    /// Exams for the filter dropdown, as sent with the last listing.
    pub async fn exam_options(&self) -> Vec<ExamOption> {
        self.list
            .envelope()
            .await
            .get("exams")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Clicking a column header: same key flips direction, a new key
    /// starts descending.
    pub fn sort_by(&mut self, key: SortKey) {
        if self.sort_key == key {
            self.direction = self.direction.flipped();
        } else {
            self.sort_key = key;
            self.direction = SortDirection::Desc;
        }
    }

    pub fn sort_state(&self) -> (SortKey, SortDirection) {
        (self.sort_key, self.direction)
    }

    pub async fn sorted_rows(&self) -> Vec<ExamResult> {
        let mut rows = self.list.rows().await;
        sort_results(&mut rows, self.sort_key, self.direction);
        rows
    }

    pub async fn open_detail(&self, id: i64) -> DetailSlot<ExamResultDetail> {
        self.detail.open(&routes::exam_result(id)).await
    }

    pub async fn close_detail(&self) {
        self.detail.close().await;
    }

    /// Spreadsheet export for the active filters (opened, not fetched).
    pub async fn export_url(&self) -> String {
        let query: Vec<(String, String)> = self
            .list
            .params()
            .await
            .to_query()
            .into_iter()
            .filter(|(k, _)| k != "page" && k != "per_page")
            .collect();
        self.state.backend.link(routes::EXAM_RESULTS_EXPORT, &query)
    }

    pub fn pdf_url(&self, id: i64) -> String {
        self.state.backend.link(&routes::exam_result_pdf(id), &[])
    }

    pub fn table_collapsed(&self) -> bool {
        match self.state.store.get(TABLE_COLLAPSED_KEY) {
            Ok(Some(Value::Bool(collapsed))) => collapsed,
            Ok(_) => false,
            Err(e) => {
                tracing::warn!("Could not read {}: {}", TABLE_COLLAPSED_KEY, e);
                false
            }
        }
    }

    pub fn set_table_collapsed(&self, collapsed: bool) {
        if let Err(e) = self.state.store.set(TABLE_COLLAPSED_KEY, json!(collapsed)) {
            tracing::warn!("Could not persist {}: {}", TABLE_COLLAPSED_KEY, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(id: i64, name: &str, score: f64, remark: &str) -> ExamResult {
        ExamResult {
            id,
            student_name: name.to_string(),
            score_percentage: score,
            remarks: remark.to_string(),
            ..Default::default()
        }
    }

    fn scores(rows: &[ExamResult]) -> Vec<f64> {
        rows.iter().map(|r| r.score_percentage).collect()
    }

    #[test]
    fn score_sort_ascending_and_reversed() {
        let mut rows = vec![
            result(1, "a", 80.0, "Pass"),
            result(2, "b", 40.0, "Fail"),
            result(3, "c", 95.0, "Pass"),
        ];
        sort_results(&mut rows, SortKey::Score, SortDirection::Asc);
        assert_eq!(scores(&rows), vec![40.0, 80.0, 95.0]);

        sort_results(&mut rows, SortKey::Score, SortDirection::Desc);
        assert_eq!(scores(&rows), vec![95.0, 80.0, 40.0]);
    }

    #[test]
    fn sort_is_stable_for_equal_scores() {
        let mut rows = vec![
            result(1, "first", 70.0, "Pass"),
            result(2, "low", 10.0, "Fail"),
            result(3, "second", 70.0, "Pass"),
        ];
        sort_results(&mut rows, SortKey::Score, SortDirection::Asc);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);

        sort_results(&mut rows, SortKey::Score, SortDirection::Desc);
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 3, 2]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let mut rows = vec![
            result(1, "bea", 1.0, ""),
            result(2, "Ana", 1.0, ""),
            result(3, "carl", 1.0, ""),
        ];
        sort_results(&mut rows, SortKey::Name, SortDirection::Asc);
        let names: Vec<&str> = rows.iter().map(|r| r.student_name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "bea", "carl"]);
    }

    #[test]
    fn unfiltered_stats_are_server_verbatim() {
        let server = ResultStats {
            total_results: 120,
            passed_count: 90,
            average_score: 77.3,
            pass_rate: 75.0,
        };
        let rows = vec![result(1, "a", 10.0, "Fail")];
        let stats = derive_stats(&rows, &server, 120, None);
        assert_eq!(stats.total_results, 120);
        assert_eq!(stats.passed_count, 90);
        assert_eq!(stats.average_score, 77.3);
        assert_eq!(stats.pass_rate, 75.0);
    }

    #[test]
    fn exam_filter_mixes_local_rows_and_server_total() {
        let rows = vec![
            result(1, "a", 80.0, "Pass"),
            result(2, "b", 40.0, "Fail"),
            result(3, "c", 95.0, "Pass"),
        ];
        let stats = derive_stats(&rows, &ResultStats::default(), 7, Some(4));
        assert_eq!(stats.passed_count, 2);
        assert_eq!(stats.average_score, (80.0 + 40.0 + 95.0) / 3.0);
        assert_eq!(stats.pass_rate, 28.57);
        assert_eq!(stats.total_results, 7);
    }

    #[test]
    fn exam_filter_with_nothing_loaded() {
        let stats = derive_stats(&[], &ResultStats::default(), 0, Some(1));
        assert_eq!(stats, DisplayedStats::default());
    }

    #[test]
    fn column_click_flips_direction() {
        assert_eq!(SortDirection::Asc.flipped(), SortDirection::Desc);
        assert_eq!("SCORE".parse::<SortKey>().unwrap(), SortKey::Score);
    }
}
