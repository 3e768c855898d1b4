use serde::{Deserialize, Serialize};
use sqlx::{sqlite::SqliteRow, Row};

use crate::error::TripError;

/// A stored trip. `id` is assigned by the store on insert and is never
/// reused, so a larger id always means a later insert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Trip {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub destination: String,
    pub distance_km: f64,
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub cost: f64,
    /// ISO-8601 date string; sorted lexically, stored verbatim.
    #[serde(default)]
    pub date: String,
}

/// Caller-supplied trip values, before the store assigns an id.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TripInput {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    pub destination: String,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub income: f64,
    #[serde(default)]
    pub cost: f64,
    #[serde(default)]
    pub date: String,
}

impl Trip {
    pub(crate) fn from_row(row: SqliteRow) -> Result<Self, TripError> {
        Self::try_from(&row)
    }

    /// The same values as a fresh submission. Re-adding a deleted trip this
    /// way yields a new record under a new id.
    pub fn to_input(&self) -> TripInput {
        TripInput {
            name: self.name.clone(),
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            distance_km: self.distance_km,
            income: self.income,
            cost: self.cost,
            date: self.date.clone(),
        }
    }
}

impl TryFrom<&SqliteRow> for Trip {
    type Error = TripError;

    fn try_from(row: &SqliteRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            origin: row.try_get("origin")?,
            destination: row.try_get("destination")?,
            distance_km: row.try_get("distance_km")?,
            income: row.try_get("income")?,
            cost: row.try_get("cost")?,
            date: row.try_get("date")?,
        })
    }
}

/// Column a listed read is ordered by. `Newest` is the store's natural
/// order and the fallback for anything unrecognized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    Name,
    Destination,
    Distance,
    #[default]
    Date,
    Newest,
}

impl SortKey {
    /// Maps a UI sort-field name. Unrecognized names fall back to `Newest`
    /// rather than erroring, so stale persisted UI state stays harmless.
    pub fn from_field(field: &str) -> Self {
        match field {
            "name" => SortKey::Name,
            "destination" => SortKey::Destination,
            "distance" => SortKey::Distance,
            "date" => SortKey::Date,
            _ => SortKey::Newest,
        }
    }
}

/// Whole-store sums of the two money columns, read in one statement so the
/// pair is always a consistent snapshot.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub cost: f64,
}

impl Totals {
    pub fn net(&self) -> f64 {
        self.income - self.cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trip_input_fills_money_fields_from_minimal_json() {
        let input: TripInput =
            serde_json::from_str(r#"{"name":"Mekelle run","destination":"Mekelle"}"#)
                .expect("minimal input parses");
        assert_eq!(input.name, "Mekelle run");
        assert_eq!(input.origin, None);
        assert_eq!(input.distance_km, 0.0);
        assert_eq!(input.income, 0.0);
        assert_eq!(input.cost, 0.0);
        assert_eq!(input.date, "");
    }

    #[test]
    fn sort_key_parses_known_fields_and_falls_back() {
        assert_eq!(SortKey::from_field("distance"), SortKey::Distance);
        assert_eq!(SortKey::from_field("date"), SortKey::Date);
        assert_eq!(SortKey::from_field("voyage"), SortKey::Newest);
        assert_eq!(SortKey::from_field(""), SortKey::Newest);
    }

    #[test]
    fn totals_net_subtracts_cost() {
        let totals = Totals {
            income: 150.0,
            cost: 40.5,
        };
        assert!((totals.net() - 109.5).abs() < f64::EPSILON);
    }
}
