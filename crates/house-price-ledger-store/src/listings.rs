use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::StoreFailure;

#[derive(Debug, Deserialize)]
struct ListingRow {
    location: String,
    price_clean: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocationAverage {
    pub location: String,
    pub average_price: f64,
    pub listing_count: usize,
}

/// Average listing price per location, highest first. Rows with an empty
/// price are skipped; columns other than `location` and `price_clean` are
/// ignored.
///
/// # Errors
/// Returns [`StoreFailure::Io`] when the file cannot be read and
/// [`StoreFailure::Malformed`] when a row cannot be decoded.
#[allow(clippy::cast_precision_loss)]
pub fn average_price_by_location(path: &Path) -> Result<Vec<LocationAverage>, StoreFailure> {
    let file = File::open(path).map_err(|err| StoreFailure::io(path, err))?;
    let mut reader = csv::Reader::from_reader(BufReader::new(file));

    let mut totals: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for row in reader.deserialize::<ListingRow>() {
        let row = row.map_err(|err| StoreFailure::from_csv(path, err))?;
        let Some(price) = row.price_clean.filter(|value| value.is_finite()) else {
            continue;
        };
        let entry = totals.entry(row.location).or_insert((0.0, 0));
        entry.0 += price;
        entry.1 += 1;
    }

    let mut averages: Vec<LocationAverage> = totals
        .into_iter()
        .map(|(location, (sum, count))| LocationAverage {
            location,
            average_price: sum / count as f64,
            listing_count: count,
        })
        .collect();
    averages.sort_by(|lhs, rhs| {
        rhs.average_price
            .total_cmp(&lhs.average_price)
            .then_with(|| lhs.location.cmp(&rhs.location))
    });
    Ok(averages)
}
