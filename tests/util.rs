#![allow(clippy::unwrap_used, clippy::expect_used)]
#![allow(dead_code)]

use triplog::model::TripInput;
use triplog::repo::TripRepo;

pub async fn memory_repo() -> TripRepo {
    let pool = triplog::db::open_memory_pool()
        .await
        .expect("open in-memory trip store");
    TripRepo::new(pool)
}

/// Minimal valid input; money fields zero, no origin, no date.
pub fn input(name: &str, destination: &str, distance_km: f64) -> TripInput {
    TripInput {
        name: name.into(),
        destination: destination.into(),
        distance_km,
        ..TripInput::default()
    }
}

pub fn full_input(
    name: &str,
    origin: &str,
    destination: &str,
    distance_km: f64,
    income: f64,
    cost: f64,
    date: &str,
) -> TripInput {
    TripInput {
        name: name.into(),
        origin: Some(origin.into()),
        destination: destination.into(),
        distance_km,
        income,
        cost,
        date: date.into(),
    }
}
