//! Screen-facing query state: the parameters a list screen edits and the
//! live result derived from them.

use tracing::warn;

use crate::model::{SortKey, Trip};
use crate::observe::TripsSubscription;
use crate::repo::TripRepo;

pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Where the controller is in its requery cycle. There is no error phase:
/// a failed requery logs, keeps the previous snapshot, and lands back in
/// `Idle`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryPhase {
    #[default]
    Idle,
    Querying,
}

/// Owns one screen's search text, sort key, and page position, plus the
/// subscription those parameters derive. Parameter setters tear the old
/// subscription down before deriving the new one, so a superseded query
/// can never deliver into the screen's snapshot.
pub struct TripViewState {
    repo: TripRepo,
    search: String,
    sort: SortKey,
    page: i64,
    page_size: i64,
    phase: QueryPhase,
    sub: Option<TripsSubscription>,
    trips: Vec<Trip>,
}

impl TripViewState {
    pub fn new(repo: TripRepo) -> Self {
        Self::with_page_size(repo, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(repo: TripRepo, page_size: i64) -> Self {
        Self {
            repo,
            search: String::new(),
            sort: SortKey::default(),
            page: 0,
            page_size,
            phase: QueryPhase::Idle,
            sub: None,
            trips: Vec::new(),
        }
    }

    pub async fn set_search(&mut self, text: impl Into<String>) {
        self.search = text.into();
        self.refresh().await;
    }

    /// Changes the sort key. The page position is deliberately untouched;
    /// jumping back to the first page is the caller's explicit move.
    pub async fn set_sort(&mut self, sort: SortKey) {
        self.sort = sort;
        self.refresh().await;
    }

    /// Sort requested by field name from the UI; unrecognized names fall
    /// back to newest-first.
    pub async fn set_sort_field(&mut self, field: &str) {
        self.set_sort(SortKey::from_field(field)).await;
    }

    pub async fn first_page(&mut self) {
        self.page = 0;
        self.refresh().await;
    }

    /// Advances past the last page without complaint; the store just
    /// returns an empty page there.
    pub async fn next_page(&mut self) {
        self.page += 1;
        self.refresh().await;
    }

    pub async fn prev_page(&mut self) {
        self.page = (self.page - 1).max(0);
        self.refresh().await;
    }

    /// Re-derives the live result from the current parameters.
    ///
    /// The old subscription is dropped before the new query is issued. If
    /// this future is itself dropped mid-flight (superseded by a newer
    /// parameter change), nothing has been installed and the stale result
    /// dies with the future.
    pub async fn refresh(&mut self) {
        self.sub = None;
        self.phase = QueryPhase::Querying;
        match self
            .repo
            .observe_paged(&self.search, self.sort, self.page, self.page_size)
            .await
        {
            Ok(sub) => {
                self.trips = sub.current();
                self.sub = Some(sub);
            }
            Err(err) => {
                // Stale-but-valid beats empty: keep the previous snapshot.
                warn!(
                    target: "triplog",
                    event = "view_refresh_failed",
                    error = %err
                );
            }
        }
        self.phase = QueryPhase::Idle;
    }

    /// Waits for the next store-driven delivery and folds it into the
    /// snapshot. Returns `false` when no live subscription exists.
    pub async fn changed(&mut self) -> bool {
        let Some(sub) = self.sub.as_mut() else {
            return false;
        };
        if !sub.changed().await {
            return false;
        }
        self.trips = sub.current();
        true
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn phase(&self) -> QueryPhase {
        self.phase
    }

    pub fn count(&self) -> usize {
        self.trips.len()
    }

    /// Distance covered by the trips on screen.
    pub fn total_distance(&self) -> f64 {
        self.trips.iter().map(|t| t.distance_km).sum()
    }

    /// Most recently added record in the snapshot; ids are monotonic.
    pub fn latest_trip(&self) -> Option<&Trip> {
        self.trips.iter().max_by_key(|t| t.id)
    }
}
