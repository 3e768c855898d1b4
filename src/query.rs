//! Builds the one read shape every list in the app uses: substring filter,
//! single-column sort, optional page window.

use crate::model::SortKey;

/// Parameters of a listed read over the trips table.
///
/// The search text matches case-sensitively against `name` and
/// `destination` only. An empty string matches everything, so "no filter"
/// needs no special case downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct TripQuery {
    pub search: String,
    pub sort: SortKey,
    pub limit: Option<i64>,
    pub offset: i64,
}

impl TripQuery {
    /// Every record, newest first.
    pub fn all() -> Self {
        Self {
            search: String::new(),
            sort: SortKey::Newest,
            limit: None,
            offset: 0,
        }
    }

    /// Unpaged filtered view in natural order.
    pub fn filtered(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Self::all()
        }
    }

    /// One page of the filtered, sorted result. Pages count from zero and
    /// the window is always `offset = page * page_size`.
    pub fn page(search: impl Into<String>, sort: SortKey, page: i64, page_size: i64) -> Self {
        Self {
            search: search.into(),
            sort,
            limit: Some(page_size),
            offset: page.max(0) * page_size,
        }
    }

    /// SQL for this query. Bind order: search text (when non-empty), then
    /// limit and offset (when paged).
    pub(crate) fn to_sql(&self) -> String {
        let mut sql = String::from(
            "SELECT id, name, origin, destination, distance_km, income, cost, date FROM trips",
        );
        if !self.search.is_empty() {
            // LIKE folds ASCII case; instr keeps the match case-sensitive.
            sql.push_str(" WHERE instr(name, ?1) > 0 OR instr(destination, ?1) > 0");
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(order_clause(self.sort));
        if self.limit.is_some() {
            sql.push_str(" LIMIT ? OFFSET ?");
        }
        sql
    }
}

/// `id DESC` rides on every sort so rows with equal keys stay in a stable
/// newest-first order across pages.
fn order_clause(sort: SortKey) -> &'static str {
    match sort {
        SortKey::Name => "name ASC, id DESC",
        SortKey::Destination => "destination ASC, id DESC",
        SortKey::Distance => "distance_km ASC, id DESC",
        SortKey::Date => "date DESC, id DESC",
        SortKey::Newest => "id DESC",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_renders_bare_select_in_natural_order() {
        let sql = TripQuery::all().to_sql();
        assert!(sql.ends_with("FROM trips ORDER BY id DESC"));
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn search_filters_name_and_destination_with_one_bind() {
        let sql = TripQuery::filtered("Addis").to_sql();
        assert!(sql.contains("WHERE instr(name, ?1) > 0 OR instr(destination, ?1) > 0"));
    }

    #[test]
    fn empty_search_renders_no_filter() {
        let sql = TripQuery::filtered("").to_sql();
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn paged_query_appends_window_after_order() {
        let sql = TripQuery::page("", SortKey::Distance, 2, 20).to_sql();
        assert!(sql.ends_with("ORDER BY distance_km ASC, id DESC LIMIT ? OFFSET ?"));
    }

    #[test]
    fn page_offset_is_page_times_size() {
        let q = TripQuery::page("", SortKey::Date, 3, 20);
        assert_eq!(q.offset, 60);
        assert_eq!(q.limit, Some(20));
    }

    #[test]
    fn negative_page_clamps_to_first() {
        let q = TripQuery::page("", SortKey::Date, -2, 20);
        assert_eq!(q.offset, 0);
    }

    #[test]
    fn date_sort_is_descending_with_id_tiebreak() {
        let sql = TripQuery::page("", SortKey::Date, 0, 10).to_sql();
        assert!(sql.contains("ORDER BY date DESC, id DESC"));
    }
}
