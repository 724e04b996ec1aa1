use house_price_ledger_core::{
    price_from_prediction, FeatureImportance, HouseFeatures, LedgerError, PriceModel, Record,
};
use serde::Serialize;

use crate::{Ack, PersistenceGateway, PrimaryStore, StoreFailure};

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreFailure),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PredictionOutcome {
    pub record: Record,
    pub ack: Ack,
}

/// Calls the model for validated inputs and records the result.
pub struct PredictionService<M, P> {
    model: M,
    gateway: PersistenceGateway<P>,
}

impl<M: PriceModel, P: PrimaryStore> PredictionService<M, P> {
    #[must_use]
    pub fn new(model: M, gateway: PersistenceGateway<P>) -> Self {
        Self { model, gateway }
    }

    #[must_use]
    pub fn gateway(&self) -> &PersistenceGateway<P> {
        &self.gateway
    }

    #[must_use]
    pub fn feature_importances(&self) -> Vec<FeatureImportance> {
        self.model.feature_importances()
    }

    /// Predicts a price and persists the resulting record.
    ///
    /// # Errors
    /// Returns [`PredictionError::Ledger`] when the model fails or yields an
    /// unusable price (nothing is written), and [`PredictionError::Store`]
    /// when neither store accepts the record.
    pub fn predict_and_record(
        &self,
        features: HouseFeatures,
    ) -> Result<PredictionOutcome, PredictionError> {
        let raw = self.model.predict(&features)?;
        let price = price_from_prediction(raw)?;
        let record = Record::new(&features, price);

        let ack = self.gateway.persist(record.clone())?;
        Ok(PredictionOutcome { record, ack })
    }
}
