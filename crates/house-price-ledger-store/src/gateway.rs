use std::collections::HashMap;
use std::path::PathBuf;

use house_price_ledger_core::{Record, RecordKey};
use serde::{Deserialize, Serialize};

use crate::{FallbackStore, PrimaryConnection, PrimaryStore, StoreFailure};

pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Which stores a history read consults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum HistorySource {
    /// Primary store (when reachable) and fallback file, de-duplicated.
    #[default]
    Merged,
    /// Fallback file only.
    FallbackOnly,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FallbackReason {
    PrimaryUnavailable,
    InsertRejected,
}

/// Where a record landed.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(tag = "store", rename_all = "snake_case")]
pub enum Ack {
    Primary,
    Fallback {
        path: PathBuf,
        reason: FallbackReason,
        detail: String,
    },
}

impl Ack {
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Short user-facing message describing the outcome.
    #[must_use]
    pub fn notice(&self) -> String {
        match self {
            Self::Primary => "prediction saved to the primary store".to_string(),
            Self::Fallback {
                path,
                reason: FallbackReason::PrimaryUnavailable,
                ..
            } => format!(
                "primary store unavailable, prediction saved to {}",
                path.display()
            ),
            Self::Fallback {
                path,
                reason: FallbackReason::InsertRejected,
                ..
            } => format!(
                "primary store rejected the insert, prediction saved to {}",
                path.display()
            ),
        }
    }
}

/// Recent records plus any degradation encountered while reading them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct HistoryReport {
    pub records: Vec<Record>,
    pub warnings: Vec<String>,
}

pub struct PersistenceGateway<P> {
    primary: P,
    fallback: FallbackStore,
    history_source: HistorySource,
}

impl<P: PrimaryStore> PersistenceGateway<P> {
    #[must_use]
    pub fn new(primary: P, fallback: FallbackStore) -> Self {
        Self {
            primary,
            fallback,
            history_source: HistorySource::default(),
        }
    }

    #[must_use]
    pub fn with_history_source(mut self, history_source: HistorySource) -> Self {
        self.history_source = history_source;
        self
    }

    #[must_use]
    pub fn primary(&self) -> &P {
        &self.primary
    }

    #[must_use]
    pub fn fallback(&self) -> &FallbackStore {
        &self.fallback
    }

    #[must_use]
    pub fn history_source(&self) -> HistorySource {
        self.history_source
    }

    /// Writes the record to the primary store, or to the fallback file when
    /// the primary cannot be reached or rejects the insert. One connect
    /// attempt per call; the connection is closed before returning.
    ///
    /// # Errors
    /// Returns [`StoreFailure`] only when the fallback write itself fails.
    pub fn persist(&self, record: Record) -> Result<Ack, StoreFailure> {
        let (reason, detail) = match self.primary.connect() {
            Ok(mut conn) => {
                let inserted = conn.insert(&record);
                conn.close();
                match inserted {
                    Ok(()) => {
                        tracing::info!(
                            price_pred = record.predicted_price(),
                            "prediction saved to primary store"
                        );
                        return Ok(Ack::Primary);
                    }
                    Err(failure) => {
                        tracing::warn!(error = %failure, "primary insert rejected, using fallback file");
                        (FallbackReason::InsertRejected, failure.to_string())
                    }
                }
            }
            Err(failure) => {
                tracing::warn!(detail = failure.detail(), "primary store unavailable, using fallback file");
                (FallbackReason::PrimaryUnavailable, failure.to_string())
            }
        };

        self.fallback.append(&record)?;

        let ack = Ack::Fallback {
            path: self.fallback.path().to_path_buf(),
            reason,
            detail,
        };
        tracing::info!(notice = %ack.notice(), "prediction saved to fallback file");
        Ok(ack)
    }

    /// Stamps and persists a prediction given as plain fields.
    ///
    /// # Errors
    /// See [`PersistenceGateway::persist`].
    pub fn persist_fields(
        &self,
        bedroom: u32,
        bathroom: u32,
        land_clean: u32,
        building_clean: u32,
        price_pred: u64,
    ) -> Result<Ack, StoreFailure> {
        self.persist(Record::stamped(
            bedroom,
            bathroom,
            land_clean,
            building_clean,
            price_pred,
        ))
    }

    /// Up to `limit` records, most recent first. Never fails: an unreadable
    /// source contributes no records and adds a warning instead.
    ///
    /// In merged mode a fallback row is dropped only when an identical row
    /// came back from the primary store, one for one. Repeats within a
    /// single store are all kept.
    #[must_use]
    pub fn history(&self, limit: usize) -> HistoryReport {
        let mut report = HistoryReport::default();
        let mut collected = Vec::new();

        if self.history_source == HistorySource::Merged {
            match self.primary.connect() {
                Ok(mut conn) => {
                    let rows = conn.recent(limit);
                    conn.close();
                    match rows {
                        Ok(rows) => collected.extend(rows),
                        Err(failure) => {
                            tracing::warn!(error = %failure, "primary history unavailable");
                            report.warnings.push(failure.to_string());
                        }
                    }
                }
                Err(failure) => {
                    tracing::debug!(detail = failure.detail(), "primary store skipped for history");
                    report
                        .warnings
                        .push("primary store unavailable, showing fallback history only".to_string());
                }
            }
        }

        match self.fallback.read_all() {
            Ok(rows) => {
                let mut shadowed: HashMap<RecordKey, usize> = HashMap::new();
                for record in &collected {
                    *shadowed.entry(record.key()).or_default() += 1;
                }
                collected.extend(rows.into_iter().filter(|record| {
                    match shadowed.get_mut(&record.key()) {
                        Some(remaining) if *remaining > 0 => {
                            *remaining -= 1;
                            false
                        }
                        _ => true,
                    }
                }));
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "fallback history unreadable");
                report
                    .warnings
                    .push(format!("failed to read fallback history: {failure}"));
            }
        }

        collected.sort_by(|lhs, rhs| rhs.created_at().cmp(&lhs.created_at()));
        collected.truncate(limit);
        report.records = collected;
        report
    }
}
