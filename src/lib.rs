//! Local trip-log core: a durable SQLite store of trips, the query shapes
//! the screens use, and live subscriptions that keep those screens fed.

pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod observe;
pub mod query;
pub mod repo;
pub mod settings;
pub mod store;
pub mod view_state;

pub use error::{InvalidField, TripError, TripResult};
pub use model::{SortKey, Totals, Trip, TripInput};
pub use observe::{Subscription, TotalsSubscription, TripsSubscription};
pub use query::TripQuery;
pub use repo::TripRepo;
pub use settings::SettingsHandle;
pub use store::NumericField;
pub use view_state::{QueryPhase, TripViewState, DEFAULT_PAGE_SIZE};
