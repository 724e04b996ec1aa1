use std::fmt::{Display, Formatter};
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{OffsetDateTime, PrimitiveDateTime, Time};

const TIMESTAMP_FORMAT: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

/// Largest price a prediction may carry; keeps prices exact in `f64` and
/// representable as a signed 64-bit column value.
pub const MAX_PREDICTED_PRICE: u64 = 1 << 53;

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum LedgerError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error("model error: {0}")]
    Model(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Bedroom,
    Bathroom,
    LandClean,
    BuildingClean,
}

impl Feature {
    pub const ALL: [Self; 4] = [
        Self::Bedroom,
        Self::Bathroom,
        Self::LandClean,
        Self::BuildingClean,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bedroom => "bedroom",
            Self::Bathroom => "bathroom",
            Self::LandClean => "land_clean",
            Self::BuildingClean => "building_clean",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bedroom" => Some(Self::Bedroom),
            "bathroom" => Some(Self::Bathroom),
            "land_clean" => Some(Self::LandClean),
            "building_clean" => Some(Self::BuildingClean),
            _ => None,
        }
    }

    /// Accepted input range for the feature.
    #[must_use]
    pub fn bounds(self) -> RangeInclusive<u32> {
        match self {
            Self::Bedroom | Self::Bathroom => 1..=10,
            Self::LandClean | Self::BuildingClean => 10..=1000,
        }
    }
}

impl Display for Feature {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Model input whose fields have been checked against [`Feature::bounds`].
#[derive(Debug, Clone, Copy, Serialize, Eq, PartialEq, Hash)]
pub struct HouseFeatures {
    bedroom: u32,
    bathroom: u32,
    land_clean: u32,
    building_clean: u32,
}

impl HouseFeatures {
    /// Builds a validated feature set.
    ///
    /// # Errors
    /// Returns [`LedgerError::Validation`] naming the first field outside its
    /// accepted range.
    pub fn new(
        bedroom: u32,
        bathroom: u32,
        land_clean: u32,
        building_clean: u32,
    ) -> Result<Self, LedgerError> {
        let features = Self {
            bedroom,
            bathroom,
            land_clean,
            building_clean,
        };

        for feature in Feature::ALL {
            let value = features.value(feature);
            let bounds = feature.bounds();
            if !bounds.contains(&value) {
                return Err(LedgerError::Validation(format!(
                    "{feature} MUST be in [{}, {}], got {value}",
                    bounds.start(),
                    bounds.end()
                )));
            }
        }

        Ok(features)
    }

    #[must_use]
    pub fn value(&self, feature: Feature) -> u32 {
        match feature {
            Feature::Bedroom => self.bedroom,
            Feature::Bathroom => self.bathroom,
            Feature::LandClean => self.land_clean,
            Feature::BuildingClean => self.building_clean,
        }
    }

    #[must_use]
    pub fn bedroom(&self) -> u32 {
        self.bedroom
    }

    #[must_use]
    pub fn bathroom(&self) -> u32 {
        self.bathroom
    }

    #[must_use]
    pub fn land_clean(&self) -> u32 {
        self.land_clean
    }

    #[must_use]
    pub fn building_clean(&self) -> u32 {
        self.building_clean
    }
}

/// One prediction: the four inputs, the predicted price and the moment it
/// was recorded. Fields are read-only once constructed.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq, Hash)]
pub struct Record {
    #[serde(rename = "timestamp", with = "timestamp_serde")]
    created_at: PrimitiveDateTime,
    #[serde(rename = "bedroom")]
    bedroom_count: u32,
    #[serde(rename = "bathroom")]
    bathroom_count: u32,
    #[serde(rename = "land_clean")]
    land_area_m2: u32,
    #[serde(rename = "building_clean")]
    building_area_m2: u32,
    #[serde(rename = "price_pred")]
    predicted_price: u64,
}

/// Identity used when the same prediction is visible in more than one store.
pub type RecordKey = (PrimitiveDateTime, u32, u32, u32, u32, u64);

impl Record {
    /// Builds a record for a validated prediction, stamped with the current
    /// local time.
    #[must_use]
    pub fn new(features: &HouseFeatures, predicted_price: u64) -> Self {
        Self::stamped(
            features.bedroom,
            features.bathroom,
            features.land_clean,
            features.building_clean,
            predicted_price,
        )
    }

    /// Builds a record stamped with the current local time without checking
    /// feature ranges. Range validation belongs to the caller.
    #[must_use]
    pub fn stamped(
        bedroom_count: u32,
        bathroom_count: u32,
        land_area_m2: u32,
        building_area_m2: u32,
        predicted_price: u64,
    ) -> Self {
        Self::restore(
            now_local_seconds(),
            bedroom_count,
            bathroom_count,
            land_area_m2,
            building_area_m2,
            predicted_price,
        )
    }

    /// Rebuilds a record read back from storage with its original timestamp.
    #[must_use]
    pub fn restore(
        created_at: PrimitiveDateTime,
        bedroom_count: u32,
        bathroom_count: u32,
        land_area_m2: u32,
        building_area_m2: u32,
        predicted_price: u64,
    ) -> Self {
        Self {
            created_at: truncate_to_seconds(created_at),
            bedroom_count,
            bathroom_count,
            land_area_m2,
            building_area_m2,
            predicted_price,
        }
    }

    #[must_use]
    pub fn created_at(&self) -> PrimitiveDateTime {
        self.created_at
    }

    #[must_use]
    pub fn bedroom_count(&self) -> u32 {
        self.bedroom_count
    }

    #[must_use]
    pub fn bathroom_count(&self) -> u32 {
        self.bathroom_count
    }

    #[must_use]
    pub fn land_area_m2(&self) -> u32 {
        self.land_area_m2
    }

    #[must_use]
    pub fn building_area_m2(&self) -> u32 {
        self.building_area_m2
    }

    #[must_use]
    pub fn predicted_price(&self) -> u64 {
        self.predicted_price
    }

    #[must_use]
    pub fn key(&self) -> RecordKey {
        (
            self.created_at,
            self.bedroom_count,
            self.bathroom_count,
            self.land_area_m2,
            self.building_area_m2,
            self.predicted_price,
        )
    }
}

/// Untyped record submission. Every field is required; a missing or null
/// field makes the draft malformed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Eq, PartialEq)]
pub struct RecordDraft {
    pub bedroom: Option<u32>,
    pub bathroom: Option<u32>,
    pub land_clean: Option<u32>,
    pub building_clean: Option<u32>,
    pub price_pred: Option<u64>,
}

impl RecordDraft {
    /// Decodes a draft from JSON.
    ///
    /// # Errors
    /// Returns [`LedgerError::Malformed`] when the JSON is not an object of
    /// non-negative integers.
    pub fn from_json(value: &Value) -> Result<Self, LedgerError> {
        serde_json::from_value(value.clone())
            .map_err(|err| LedgerError::Malformed(format!("invalid record JSON: {err}")))
    }

    /// Stamps the draft into a [`Record`].
    ///
    /// # Errors
    /// Returns [`LedgerError::Malformed`] naming the first missing field.
    pub fn into_record(self) -> Result<Record, LedgerError> {
        Ok(Record::stamped(
            required("bedroom", self.bedroom)?,
            required("bathroom", self.bathroom)?,
            required("land_clean", self.land_clean)?,
            required("building_clean", self.building_clean)?,
            required("price_pred", self.price_pred)?,
        ))
    }
}

fn required<T>(name: &str, value: Option<T>) -> Result<T, LedgerError> {
    value.ok_or_else(|| LedgerError::Malformed(format!("{name} is required")))
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeatureImportance {
    pub feature: Feature,
    pub importance: f64,
}

/// Pre-trained regression model treated as a black box.
pub trait PriceModel {
    /// Predicts a price for validated inputs.
    ///
    /// # Errors
    /// Returns [`LedgerError::Model`] when the model cannot produce a value.
    fn predict(&self, features: &HouseFeatures) -> Result<f64, LedgerError>;

    /// Per-feature weights, highest first.
    fn feature_importances(&self) -> Vec<FeatureImportance>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FeatureWeights {
    pub bedroom: f64,
    pub bathroom: f64,
    pub land_clean: f64,
    pub building_clean: f64,
}

impl FeatureWeights {
    #[must_use]
    pub fn get(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Bedroom => self.bedroom,
            Feature::Bathroom => self.bathroom,
            Feature::LandClean => self.land_clean,
            Feature::BuildingClean => self.building_clean,
        }
    }

    fn map(&self, op: impl Fn(f64) -> f64) -> Self {
        Self {
            bedroom: op(self.bedroom),
            bathroom: op(self.bathroom),
            land_clean: op(self.land_clean),
            building_clean: op(self.building_clean),
        }
    }

    fn sum(&self) -> f64 {
        Feature::ALL.iter().map(|feature| self.get(*feature)).sum()
    }
}

/// Linear model artifact exported from an offline training run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct LinearPriceModel {
    pub intercept: f64,
    pub weights: FeatureWeights,
    pub importances: FeatureWeights,
}

impl LinearPriceModel {
    /// Validates artifact numbers.
    ///
    /// # Errors
    /// Returns [`LedgerError::Configuration`] when any number is not finite,
    /// an importance is negative, or importances sum to zero.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if !self.intercept.is_finite() {
            return Err(LedgerError::Configuration(
                "intercept MUST be finite".to_string(),
            ));
        }

        for feature in Feature::ALL {
            if !self.weights.get(feature).is_finite() {
                return Err(LedgerError::Configuration(format!(
                    "weights.{feature} MUST be finite"
                )));
            }

            let importance = self.importances.get(feature);
            if !importance.is_finite() || importance < 0.0 {
                return Err(LedgerError::Configuration(format!(
                    "importances.{feature} MUST be finite and >= 0"
                )));
            }
        }

        if self.importances.sum() <= 0.0 {
            return Err(LedgerError::Configuration(
                "importances MUST sum to a positive value".to_string(),
            ));
        }

        Ok(())
    }

    /// Decodes, validates and normalizes a model artifact from JSON.
    ///
    /// # Errors
    /// Returns [`LedgerError::Configuration`] when decoding or validation
    /// fails.
    pub fn from_json(value: &Value) -> Result<Self, LedgerError> {
        let mut model: Self = serde_json::from_value(value.clone())
            .map_err(|err| LedgerError::Configuration(format!("invalid model JSON: {err}")))?;
        model.validate()?;

        let total = model.importances.sum();
        model.importances = model.importances.map(|weight| weight / total);
        Ok(model)
    }
}

impl PriceModel for LinearPriceModel {
    fn predict(&self, features: &HouseFeatures) -> Result<f64, LedgerError> {
        let raw = Feature::ALL.iter().fold(self.intercept, |acc, feature| {
            acc + self.weights.get(*feature) * f64::from(features.value(*feature))
        });

        if raw.is_finite() {
            Ok(raw)
        } else {
            Err(LedgerError::Model(format!(
                "prediction is not finite: {raw}"
            )))
        }
    }

    fn feature_importances(&self) -> Vec<FeatureImportance> {
        let mut ranked: Vec<FeatureImportance> = Feature::ALL
            .iter()
            .map(|feature| FeatureImportance {
                feature: *feature,
                importance: self.importances.get(*feature),
            })
            .collect();
        ranked.sort_by(|lhs, rhs| {
            rhs.importance
                .total_cmp(&lhs.importance)
                .then(lhs.feature.cmp(&rhs.feature))
        });
        ranked
    }
}

/// Converts a raw model output into a stored price, dropping the fractional
/// part.
///
/// # Errors
/// Returns [`LedgerError::Model`] when the value is not finite, negative or
/// above [`MAX_PREDICTED_PRICE`].
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn price_from_prediction(raw: f64) -> Result<u64, LedgerError> {
    if !raw.is_finite() {
        return Err(LedgerError::Model(format!(
            "prediction is not finite: {raw}"
        )));
    }

    if raw < 0.0 {
        return Err(LedgerError::Model(format!(
            "prediction MUST be >= 0, got {raw}"
        )));
    }

    let truncated = raw.trunc();
    if truncated > MAX_PREDICTED_PRICE as f64 {
        return Err(LedgerError::Model(format!(
            "prediction exceeds {MAX_PREDICTED_PRICE}: {raw}"
        )));
    }

    Ok(truncated as u64)
}

/// Parses a `YYYY-MM-DD HH:MM:SS` timestamp.
///
/// # Errors
/// Returns [`LedgerError::Malformed`] when the text does not match.
pub fn parse_timestamp(value: &str) -> Result<PrimitiveDateTime, LedgerError> {
    PrimitiveDateTime::parse(value, TIMESTAMP_FORMAT)
        .map_err(|err| LedgerError::Malformed(format!("invalid timestamp {value:?}: {err}")))
}

/// Formats a timestamp as `YYYY-MM-DD HH:MM:SS`.
///
/// # Errors
/// Returns [`LedgerError::Malformed`] when formatting fails.
pub fn format_timestamp(value: PrimitiveDateTime) -> Result<String, LedgerError> {
    value
        .format(TIMESTAMP_FORMAT)
        .map_err(|err| LedgerError::Malformed(format!("failed to format timestamp: {err}")))
}

/// Local wall-clock time at second precision. Uses UTC when the local offset
/// cannot be determined.
#[must_use]
pub fn now_local_seconds() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    truncate_to_seconds(PrimitiveDateTime::new(now.date(), now.time()))
}

fn truncate_to_seconds(value: PrimitiveDateTime) -> PrimitiveDateTime {
    let time = value.time();
    match Time::from_hms(time.hour(), time.minute(), time.second()) {
        Ok(whole) => value.replace_time(whole),
        Err(_) => value,
    }
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod timestamp_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::PrimitiveDateTime;

    /// # Errors
    /// Fails when the timestamp cannot be formatted.
    pub fn serialize<S>(value: &PrimitiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = super::format_timestamp(*value).map_err(serde::ser::Error::custom)?;
        serializer.serialize_str(&text)
    }

    /// # Errors
    /// Fails when the input is not a `YYYY-MM-DD HH:MM:SS` string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<PrimitiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        super::parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn must_ok<T, E: std::fmt::Display>(result: Result<T, E>) -> T {
        match result {
            Ok(value) => value,
            Err(err) => panic!("expected Ok(..), got error: {err}"),
        }
    }

    fn fixture_timestamp() -> PrimitiveDateTime {
        must_ok(parse_timestamp("2026-02-07 12:30:05"))
    }

    fn fixture_model() -> LinearPriceModel {
        must_ok(LinearPriceModel::from_json(&json!({
            "intercept": 50_000_000.0,
            "weights": {
                "bedroom": 25_000_000.0,
                "bathroom": 15_000_000.0,
                "land_clean": 1_500_000.0,
                "building_clean": 2_000_000.0
            },
            "importances": {
                "bedroom": 1.0,
                "bathroom": 1.0,
                "land_clean": 3.0,
                "building_clean": 5.0
            }
        })))
    }

    #[test]
    fn features_accept_bounds_inclusive() {
        let low = must_ok(HouseFeatures::new(1, 1, 10, 10));
        assert_eq!(low.bedroom(), 1);
        let high = must_ok(HouseFeatures::new(10, 10, 1000, 1000));
        assert_eq!(high.building_clean(), 1000);
    }

    #[test]
    fn features_reject_first_out_of_range_field() {
        let err = HouseFeatures::new(3, 11, 5, 80).err();
        assert_eq!(
            err,
            Some(LedgerError::Validation(
                "bathroom MUST be in [1, 10], got 11".to_string()
            ))
        );
    }

    #[test]
    fn timestamp_format_is_second_precision_text() {
        let value = fixture_timestamp();
        assert_eq!(must_ok(format_timestamp(value)), "2026-02-07 12:30:05");
        assert!(parse_timestamp("2026-02-07T12:30:05Z").is_err());
        assert!(parse_timestamp("2026-02-07 12:30").is_err());
    }

    #[test]
    fn now_local_has_no_subsecond_component() {
        assert_eq!(now_local_seconds().nanosecond(), 0);
    }

    #[test]
    fn restore_drops_subsecond_precision() {
        let precise = fixture_timestamp().replace_time(must_ok(Time::from_hms_milli(12, 30, 5, 250)));
        let record = Record::restore(precise, 3, 2, 120, 80, 450_000_000);
        assert_eq!(record.created_at(), fixture_timestamp());
    }

    #[test]
    fn record_json_uses_storage_column_names() {
        let record = Record::restore(fixture_timestamp(), 3, 2, 120, 80, 450_000_000);
        let value = must_ok(serde_json::to_value(&record));
        assert_eq!(
            value,
            json!({
                "timestamp": "2026-02-07 12:30:05",
                "bedroom": 3,
                "bathroom": 2,
                "land_clean": 120,
                "building_clean": 80,
                "price_pred": 450_000_000
            })
        );

        let decoded: Record = must_ok(serde_json::from_value(value));
        assert_eq!(decoded, record);
    }

    #[test]
    fn record_key_covers_price() {
        let lhs = Record::restore(fixture_timestamp(), 3, 2, 120, 80, 1);
        let rhs = Record::restore(fixture_timestamp(), 3, 2, 120, 80, 2);
        assert_ne!(lhs.key(), rhs.key());
        assert_eq!(
            lhs.key(),
            Record::restore(fixture_timestamp(), 3, 2, 120, 80, 1).key()
        );
    }

    #[test]
    fn draft_missing_field_is_malformed() {
        let draft = must_ok(RecordDraft::from_json(&json!({
            "bedroom": 3,
            "bathroom": 2,
            "land_clean": 120,
            "price_pred": 450_000_000
        })));
        assert_eq!(
            draft.into_record().err(),
            Some(LedgerError::Malformed(
                "building_clean is required".to_string()
            ))
        );
    }

    #[test]
    fn draft_null_field_is_malformed() {
        let draft = must_ok(RecordDraft::from_json(&json!({
            "bedroom": 3,
            "bathroom": null,
            "land_clean": 120,
            "building_clean": 80,
            "price_pred": 1
        })));
        assert!(matches!(
            draft.into_record(),
            Err(LedgerError::Malformed(message)) if message == "bathroom is required"
        ));
    }

    #[test]
    fn draft_with_wrong_types_is_malformed() {
        let result = RecordDraft::from_json(&json!({ "bedroom": "three" }));
        assert!(matches!(result, Err(LedgerError::Malformed(_))));

        let negative = RecordDraft::from_json(&json!({ "price_pred": -5 }));
        assert!(matches!(negative, Err(LedgerError::Malformed(_))));
    }

    #[test]
    fn complete_draft_is_stamped_now() {
        let record = must_ok(
            RecordDraft {
                bedroom: Some(3),
                bathroom: Some(2),
                land_clean: Some(120),
                building_clean: Some(80),
                price_pred: Some(450_000_000),
            }
            .into_record(),
        );
        assert_eq!(record.predicted_price(), 450_000_000);
        assert_eq!(record.created_at().nanosecond(), 0);
    }

    #[test]
    fn linear_model_predicts_weighted_sum() {
        let model = fixture_model();
        let features = must_ok(HouseFeatures::new(3, 2, 120, 80));
        let predicted = must_ok(model.predict(&features));
        let expected = 50_000_000.0 + 75_000_000.0 + 30_000_000.0 + 180_000_000.0 + 160_000_000.0;
        assert!((predicted - expected).abs() < 1e-6);
    }

    #[test]
    fn importances_are_normalized_and_ranked() {
        let ranked = fixture_model().feature_importances();
        let order: Vec<Feature> = ranked.iter().map(|item| item.feature).collect();
        assert_eq!(
            order,
            vec![
                Feature::BuildingClean,
                Feature::LandClean,
                Feature::Bedroom,
                Feature::Bathroom
            ]
        );
        let total: f64 = ranked.iter().map(|item| item.importance).sum();
        assert!((total - 1.0).abs() < 1e-9);
        assert!((ranked[0].importance - 0.5).abs() < 1e-9);
    }

    #[test]
    fn model_artifact_rejects_bad_numbers() {
        let zero_importance = LinearPriceModel::from_json(&json!({
            "intercept": 0.0,
            "weights": { "bedroom": 1.0, "bathroom": 1.0, "land_clean": 1.0, "building_clean": 1.0 },
            "importances": { "bedroom": 0.0, "bathroom": 0.0, "land_clean": 0.0, "building_clean": 0.0 }
        }));
        assert!(matches!(zero_importance, Err(LedgerError::Configuration(_))));

        let negative = LinearPriceModel::from_json(&json!({
            "intercept": 0.0,
            "weights": { "bedroom": 1.0, "bathroom": 1.0, "land_clean": 1.0, "building_clean": 1.0 },
            "importances": { "bedroom": -1.0, "bathroom": 1.0, "land_clean": 1.0, "building_clean": 1.0 }
        }));
        assert!(matches!(negative, Err(LedgerError::Configuration(_))));

        let missing = LinearPriceModel::from_json(&json!({ "intercept": 0.0 }));
        assert!(matches!(missing, Err(LedgerError::Configuration(_))));
    }

    #[test]
    fn price_conversion_truncates_and_rejects_invalid() {
        assert_eq!(must_ok(price_from_prediction(450_000_000.9)), 450_000_000);
        assert_eq!(must_ok(price_from_prediction(0.0)), 0);
        assert!(matches!(
            price_from_prediction(-1.0),
            Err(LedgerError::Model(_))
        ));
        assert!(matches!(
            price_from_prediction(f64::NAN),
            Err(LedgerError::Model(_))
        ));
        assert!(matches!(
            price_from_prediction(1e300),
            Err(LedgerError::Model(_))
        ));
    }

    #[test]
    fn feature_names_round_trip() {
        for feature in Feature::ALL {
            assert_eq!(Feature::parse(feature.as_str()), Some(feature));
        }
        assert_eq!(Feature::parse("price_clean"), None);
    }

    proptest! {
        #[test]
        fn prop_features_accepted_iff_in_bounds(
            bedroom in 0u32..12,
            bathroom in 0u32..12,
            land in 0u32..1100,
            building in 0u32..1100,
        ) {
            let in_bounds = (1..=10).contains(&bedroom)
                && (1..=10).contains(&bathroom)
                && (10..=1000).contains(&land)
                && (10..=1000).contains(&building);
            prop_assert_eq!(HouseFeatures::new(bedroom, bathroom, land, building).is_ok(), in_bounds);
        }
    }
}
