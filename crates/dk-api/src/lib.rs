//! dk-api
//!
//! HTTP collaborators of the reconciliation engine:
//! - the weekly weighted-average forecast feed (GET, bearer auth)
//! - the persistence sink (POST of JSON record arrays, one call per table)
//!
//! Tokens are resolved by the caller (see `dk_config::secrets`) and handed to
//! the constructors. Nothing here reads the environment.
//!
//! It does **not**:
//! - retry; a failed table is reported and left to the operator
//! - negotiate schemas with the sink

mod error;
mod feed;
mod sink;

pub use error::{FeedError, SinkError};
pub use feed::{parse_weekly, ForecastFeed, HttpForecastFeed, WeeklyWeightedAverageRecord};
pub use sink::{endpoint_for, publish_by_table, HttpRowSink, Record, RowSink, TableId, TableOutcome};
