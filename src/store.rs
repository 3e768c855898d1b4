//! Row-level persistence for trips. Callers hand in an open pool; nothing
//! here owns connection state or caches rows.

use sqlx::SqlitePool;

use crate::error::{TripError, TripResult};
use crate::model::{Totals, Trip, TripInput};
use crate::query::TripQuery;

/// Numeric columns `sum` may aggregate. Interpolated identifiers stay
/// closed to this set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericField {
    DistanceKm,
    Income,
    Cost,
}

impl NumericField {
    fn column(self) -> &'static str {
        match self {
            NumericField::DistanceKm => "distance_km",
            NumericField::Income => "income",
            NumericField::Cost => "cost",
        }
    }
}

/// Inserts the trip and returns the stored row, id assigned. Insert and
/// read-back share one transaction so the returned record is exactly what
/// landed on disk.
pub async fn insert(pool: &SqlitePool, input: &TripInput) -> TripResult<Trip> {
    let mut tx = pool.begin().await?;

    let res = sqlx::query(
        "INSERT INTO trips (name, origin, destination, distance_km, income, cost, date) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )
    .bind(&input.name)
    .bind(&input.origin)
    .bind(&input.destination)
    .bind(input.distance_km)
    .bind(input.income)
    .bind(input.cost)
    .bind(&input.date)
    .execute(&mut *tx)
    .await?;

    let id = res.last_insert_rowid();
    let row = sqlx::query(
        "SELECT id, name, origin, destination, distance_km, income, cost, date \
         FROM trips WHERE id = ?1",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let trip = Trip::from_row(row)?;
    tracing::debug!(target: "triplog", event = "trip_inserted", id = trip.id);
    Ok(trip)
}

/// Replaces every mutable column of the row; the id never changes.
pub async fn update(pool: &SqlitePool, trip: &Trip) -> TripResult<()> {
    let res = sqlx::query(
        "UPDATE trips SET name = ?1, origin = ?2, destination = ?3, distance_km = ?4, \
         income = ?5, cost = ?6, date = ?7 WHERE id = ?8",
    )
    .bind(&trip.name)
    .bind(&trip.origin)
    .bind(&trip.destination)
    .bind(trip.distance_km)
    .bind(trip.income)
    .bind(trip.cost)
    .bind(&trip.date)
    .bind(trip.id)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(TripError::NotFound { id: trip.id });
    }
    tracing::debug!(target: "triplog", event = "trip_updated", id = trip.id);
    Ok(())
}

/// Hard delete. A second delete of the same id reports `NotFound`; the id
/// is never handed out again.
pub async fn delete(pool: &SqlitePool, id: i64) -> TripResult<()> {
    let res = sqlx::query("DELETE FROM trips WHERE id = ?1")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(TripError::NotFound { id });
    }
    tracing::debug!(target: "triplog", event = "trip_deleted", id);
    Ok(())
}

pub async fn fetch(pool: &SqlitePool, id: i64) -> TripResult<Option<Trip>> {
    let row = sqlx::query(
        "SELECT id, name, origin, destination, distance_km, income, cost, date \
         FROM trips WHERE id = ?1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Trip::from_row).transpose()
}

/// Runs a listed read. Binds follow the order `to_sql` documents.
pub async fn search(pool: &SqlitePool, query: &TripQuery) -> TripResult<Vec<Trip>> {
    let sql = query.to_sql();
    let mut q = sqlx::query(&sql);
    if !query.search.is_empty() {
        q = q.bind(&query.search);
    }
    if let Some(limit) = query.limit {
        q = q.bind(limit).bind(query.offset);
    }
    let rows = q.fetch_all(pool).await?;
    rows.iter().map(Trip::try_from).collect()
}

pub async fn count(pool: &SqlitePool) -> TripResult<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM trips")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Whole-store sum of one numeric column; `0.0` when the store is empty.
pub async fn sum(pool: &SqlitePool, field: NumericField) -> TripResult<f64> {
    let sql = format!("SELECT COALESCE(SUM({}), 0.0) FROM trips", field.column());
    let value: f64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(value)
}

/// Both money sums from one statement, so income and cost always describe
/// the same snapshot.
pub async fn totals(pool: &SqlitePool) -> TripResult<Totals> {
    let (income, cost): (f64, f64) =
        sqlx::query_as("SELECT COALESCE(SUM(income), 0.0), COALESCE(SUM(cost), 0.0) FROM trips")
            .fetch_one(pool)
            .await?;
    Ok(Totals { income, cost })
}
