// src/pages/recommendations.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::controller::{Collection, FilterChange, ListEndpoint};
use crate::models::recommendation::Recommendation;
use crate::routes;
use crate::state::AppState;

/// Read-only listing of students who passed, with recommended courses.
pub struct RecommendationsPage {
    pub list: Collection<Recommendation>,
}

impl RecommendationsPage {
    pub fn new(state: AppState) -> Self {
        Self {
            list: Collection::new(state, ListEndpoint::new(routes::RECOMMENDATIONS)),
        }
    }

    pub async fn search(&self, text: impl Into<String>) {
        self.list.apply(FilterChange::Search(text.into())).await;
    }

    pub async fn filter_semester(&self, semester: Option<String>) {
        self.list.apply(FilterChange::Semester(semester)).await;
    }

    /// Semesters present in the loaded rows.
    pub async fn semesters(&self) -> Vec<String> {
        self.list
            .rows()
            .await
            .into_iter()
            .map(|r| r.semester)
            .filter(|s| !s.trim().is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// How often each course is recommended across the loaded rows.
    pub async fn course_counts(&self) -> BTreeMap<String, usize> {
        tally_courses(&self.list.rows().await)
    }
}

pub fn tally_courses(rows: &[Recommendation]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for course in rows.iter().flat_map(Recommendation::courses) {
        *counts.entry(course).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallies_split_courses() {
        let rows = vec![
            Recommendation {
                recommended_courses: "BSIT, BSCS".to_string(),
                ..Default::default()
            },
            Recommendation {
                recommended_courses: "BSCS".to_string(),
                ..Default::default()
            },
        ];
        let counts = tally_courses(&rows);
        assert_eq!(counts["BSCS"], 2);
        assert_eq!(counts["BSIT"], 1);
    }
}
