// src/controller/filters.rs

use crate::api::Query;

/// Canonical parameter set of a list fetch.
/// Every fetch sends the whole set, never a partial update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub category: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
    pub status: Option<String>,
    pub exam_id: Option<i64>,
    pub semester: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl ListParams {
    pub fn new(per_page: u32) -> Self {
        Self {
            category: None,
            search: None,
            sort: None,
            status: None,
            exam_id: None,
            semester: None,
            page: 1,
            per_page: per_page.max(1),
        }
    }

    /// Merges one change into the set.
    pub fn apply(&mut self, change: FilterChange) {
        if change.resets_page() {
            self.page = 1;
        }
        match change {
            FilterChange::Category(v) => self.category = normalize(v),
            FilterChange::Search(v) => self.search = normalize(Some(v)),
            FilterChange::Sort(v) => self.sort = normalize(v),
            FilterChange::Status(v) => self.status = normalize(v),
            FilterChange::Exam(v) => self.exam_id = v,
            FilterChange::Semester(v) => self.semester = normalize(v),
            FilterChange::PerPage(n) => self.per_page = n.max(1),
            FilterChange::Page(n) => self.page = n.max(1),
        }
    }

    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(value) = value {
                query.push((key.to_string(), value));
            }
        };
        push("category", self.category.clone());
        push("search", self.search.clone());
        push("sort", self.sort.clone());
        push("status", self.status.clone());
        push("exam_id", self.exam_id.map(|id| id.to_string()));
        push("semester", self.semester.clone());
        push("page", Some(self.page.to_string()));
        push("per_page", Some(self.per_page.to_string()));
        query
    }
}

/// One user edit of the filter bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    Category(Option<String>),
    Search(String),
    Sort(Option<String>),
    Status(Option<String>),
    Exam(Option<i64>),
    Semester(Option<String>),
    PerPage(u32),
    Page(u32),
}

impl FilterChange {
    /// Only a different category or ordering invalidates a bulk selection.
    pub fn resets_selection(&self) -> bool {
        matches!(self, FilterChange::Category(_) | FilterChange::Sort(_))
    }

    pub fn resets_page(&self) -> bool {
        !matches!(self, FilterChange::Page(_))
    }
}

/// Blank strings and the "all" sentinel mean "no filter".
fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_carries_the_full_merged_set() {
        let mut params = ListParams::new(10);
        params.apply(FilterChange::Category(Some("Math".to_string())));
        params.apply(FilterChange::PerPage(50));
        params.apply(FilterChange::Search("  ".to_string()));

        let query = params.to_query();
        assert_eq!(
            query,
            vec![
                ("category".to_string(), "Math".to_string()),
                ("page".to_string(), "1".to_string()),
                ("per_page".to_string(), "50".to_string()),
            ]
        );
    }

    #[test]
    fn filter_changes_return_to_first_page() {
        let mut params = ListParams::new(10);
        params.apply(FilterChange::Page(4));
        assert_eq!(params.page, 4);
        params.apply(FilterChange::Status(Some("active".to_string())));
        assert_eq!(params.page, 1);
    }

    #[test]
    fn all_sentinel_clears_category() {
        let mut params = ListParams::new(10);
        params.apply(FilterChange::Category(Some("Science".to_string())));
        params.apply(FilterChange::Category(Some("all".to_string())));
        assert_eq!(params.category, None);
    }

    #[test]
    fn only_category_and_sort_reset_selection() {
        assert!(FilterChange::Category(None).resets_selection());
        assert!(FilterChange::Sort(Some("newest".to_string())).resets_selection());
        assert!(!FilterChange::Page(2).resets_selection());
        assert!(!FilterChange::PerPage(50).resets_selection());
        assert!(!FilterChange::Search("x".to_string()).resets_selection());
    }
}
