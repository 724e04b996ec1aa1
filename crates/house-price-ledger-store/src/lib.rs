//! Persistence for house-price predictions.
//!
//! Writes go to a relational primary store when it accepts them and to an
//! append-only CSV file otherwise. Reads merge whatever both stores hold.
//!
//! - [`PersistenceGateway`] picks the store for each write and serves history.
//! - [`FallbackStore`] owns the CSV file.
//! - [`SqlitePrimaryStore`] adapts the `prediksi` table behind the
//!   [`PrimaryStore`] seam.
//! - [`PredictionService`] wires a [`house_price_ledger_core::PriceModel`] to
//!   the gateway.

use std::path::PathBuf;

mod fallback;
mod gateway;
mod listings;
mod primary;
mod service;

pub use fallback::{FallbackStore, DEFAULT_FALLBACK_FILE, FALLBACK_HEADER};
pub use gateway::{
    Ack, FallbackReason, HistoryReport, HistorySource, PersistenceGateway, DEFAULT_HISTORY_LIMIT,
};
pub use listings::{average_price_by_location, LocationAverage};
pub use primary::{
    PrimaryConfig, PrimaryConnection, PrimaryStore, SqlitePrimaryConnection, SqlitePrimaryStore,
    DEFAULT_CONNECT_TIMEOUT, PRIMARY_TABLE,
};
pub use service::{PredictionError, PredictionOutcome, PredictionService};

/// The primary store could not be reached. Every cause (missing
/// configuration, missing database, bad credentials, timeout) shares one
/// variant; `detail` is for logs only.
#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum ConnectFailure {
    #[error("primary store unavailable: {detail}")]
    Unavailable { detail: String },
}

impl ConnectFailure {
    pub(crate) fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable {
            detail: detail.into(),
        }
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        match self {
            Self::Unavailable { detail } => detail,
        }
    }
}

/// The primary store was reachable but did not accept the insert.
#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
#[error("primary insert failed: {0}")]
pub struct WriteFailure(pub String);

/// The primary store was reachable but history could not be read from it.
#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
#[error("primary history read failed: {0}")]
pub struct ReadFailure(pub String);

/// The primary schema could not be created.
#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
#[error("primary schema migration failed: {0}")]
pub struct MigrationFailure(pub String);

/// A local file could not be written or read back.
#[derive(Debug, thiserror::Error)]
pub enum StoreFailure {
    #[error("I/O failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed data in {} at line {line}: {detail}", path.display())]
    Malformed {
        path: PathBuf,
        line: u64,
        detail: String,
    },
}

impl StoreFailure {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn from_csv(path: impl Into<PathBuf>, err: csv::Error) -> Self {
        let line = err.position().map_or(0, csv::Position::line);
        let detail = err.to_string();
        match err.into_kind() {
            csv::ErrorKind::Io(source) => Self::io(path, source),
            _ => Self::Malformed {
                path: path.into(),
                line,
                detail,
            },
        }
    }
}
