//! The repository every caller goes through: validated mutations, one-shot
//! reads, and live subscriptions that requery after each change.

use std::future::Future;
use std::sync::Arc;

use sqlx::SqlitePool;
use tokio::sync::watch;

use crate::error::{InvalidField, TripResult};
use crate::model::{SortKey, Totals, Trip, TripInput};
use crate::observe::{Subscription, TotalsSubscription, TripsSubscription};
use crate::query::TripQuery;
use crate::store::{self, NumericField};

/// Handle over the trip store. Cheap to clone; all clones share the pool
/// and the change feed, so a mutation through any clone refreshes every
/// live subscription.
///
/// Constructed from a pool the caller opened (`db::open_pool`); the repo
/// itself owns no global state and closes with the pool.
#[derive(Clone)]
pub struct TripRepo {
    pool: SqlitePool,
    revision: Arc<watch::Sender<u64>>,
}

impl TripRepo {
    pub fn new(pool: SqlitePool) -> Self {
        let (revision, _) = watch::channel(0u64);
        Self {
            pool,
            revision: Arc::new(revision),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Validated insert. Returns the stored record with its assigned id.
    pub async fn add(&self, input: &TripInput) -> TripResult<Trip> {
        validate(&input.name, &input.destination, input.distance_km)?;
        let trip = store::insert(&self.pool, input).await?;
        self.notify();
        Ok(trip)
    }

    /// Validated whole-record update, matched by `trip.id`.
    pub async fn update(&self, trip: &Trip) -> TripResult<()> {
        validate(&trip.name, &trip.destination, trip.distance_km)?;
        store::update(&self.pool, trip).await?;
        self.notify();
        Ok(())
    }

    pub async fn remove(&self, trip: &Trip) -> TripResult<()> {
        self.remove_by_id(trip.id).await
    }

    pub async fn remove_by_id(&self, id: i64) -> TripResult<()> {
        store::delete(&self.pool, id).await?;
        self.notify();
        Ok(())
    }

    /// Re-adds a previously deleted trip, e.g. from an undo affordance.
    /// The record comes back as a new row under a fresh id.
    pub async fn restore(&self, trip: &Trip) -> TripResult<Trip> {
        self.add(&trip.to_input()).await
    }

    pub async fn get(&self, id: i64) -> TripResult<Option<Trip>> {
        store::fetch(&self.pool, id).await
    }

    /// One-shot listed read without a subscription.
    pub async fn list(&self, query: &TripQuery) -> TripResult<Vec<Trip>> {
        store::search(&self.pool, query).await
    }

    pub async fn count(&self) -> TripResult<i64> {
        store::count(&self.pool).await
    }

    pub async fn sum(&self, field: NumericField) -> TripResult<f64> {
        store::sum(&self.pool, field).await
    }

    pub async fn totals(&self) -> TripResult<Totals> {
        store::totals(&self.pool).await
    }

    /// Live view of every record, newest first.
    pub async fn observe_all(&self) -> TripResult<TripsSubscription> {
        self.observe_query(TripQuery::all()).await
    }

    /// Live filtered view in natural order. A blank search is simply the
    /// observe-all stream; the query renders no filter for it.
    pub async fn observe_filtered(&self, search: &str) -> TripResult<TripsSubscription> {
        self.observe_query(TripQuery::filtered(search)).await
    }

    /// Live view of one page of the filtered, sorted result.
    pub async fn observe_paged(
        &self,
        search: &str,
        sort: SortKey,
        page: i64,
        page_size: i64,
    ) -> TripResult<TripsSubscription> {
        self.observe_query(TripQuery::page(search, sort, page, page_size))
            .await
    }

    /// Live income/cost sums over the whole store.
    pub async fn observe_totals(&self) -> TripResult<TotalsSubscription> {
        let revisions = self.revision.subscribe();
        let first = store::totals(&self.pool).await?;
        Ok(self.spawn_refresh(revisions, first, move |pool| async move {
            store::totals(&pool).await
        }))
    }

    async fn observe_query(&self, query: TripQuery) -> TripResult<TripsSubscription> {
        // Subscribe before the first read: a write landing mid-read then
        // still triggers a refresh instead of going unseen.
        let revisions = self.revision.subscribe();
        let first = store::search(&self.pool, &query).await?;
        Ok(self.spawn_refresh(revisions, first, move |pool| {
            let query = query.clone();
            async move { store::search(&pool, &query).await }
        }))
    }

    /// Spawns the requery loop behind a subscription. Failed refreshes are
    /// logged and the last good value stands; the subscription only ends
    /// when its handle is dropped.
    fn spawn_refresh<T, F, Fut>(
        &self,
        mut revisions: watch::Receiver<u64>,
        first: T,
        refresh: F,
    ) -> Subscription<T>
    where
        T: Clone + Send + Sync + 'static,
        F: Fn(SqlitePool) -> Fut + Send + 'static,
        Fut: Future<Output = TripResult<T>> + Send + 'static,
    {
        let (tx, rx) = watch::channel(first);
        let pool = self.pool.clone();
        let task = tokio::spawn(async move {
            while revisions.changed().await.is_ok() {
                match refresh(pool.clone()).await {
                    Ok(value) => {
                        if tx.send(value).is_err() {
                            break;
                        }
                    }
                    Err(err) => {
                        tracing::warn!(
                            target: "triplog",
                            event = "subscription_refresh_failed",
                            error = %err
                        );
                    }
                }
            }
        });
        Subscription::new(rx, task)
    }

    fn notify(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

/// Mutation gate. Runs before any statement is issued, so a rejected
/// input leaves the store untouched.
fn validate(name: &str, destination: &str, distance_km: f64) -> TripResult<()> {
    if name.trim().is_empty() {
        return Err(InvalidField::BlankName.into());
    }
    if destination.trim().is_empty() {
        return Err(InvalidField::BlankDestination.into());
    }
    if !distance_km.is_finite() || distance_km <= 0.0 {
        return Err(InvalidField::NonPositiveDistance.into());
    }
    Ok(())
}
