//! Calculator input and persisted trade records.
//!
//! # Invariants
//! - `total` is expected to equal `price * quantity`; nothing enforces it.
//! - `counter` starts at 1 and grows by exactly 1 per accepted save.

use serde::{Deserialize, Deserializer, Serialize};

/// Values entered in the calculator form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InputData {
    #[serde(deserialize_with = "number_or_nan")]
    pub price: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub quantity: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub total: f64,
}

impl InputData {
    pub fn new(price: f64, quantity: f64, total: f64) -> Self {
        Self {
            price,
            quantity,
            total,
        }
    }

    /// Builds input with `total = price * quantity`.
    pub fn from_price_and_quantity(price: f64, quantity: f64) -> Self {
        Self::new(price, quantity, price * quantity)
    }

    /// Whether `total` is an even number. Fractional totals are never even.
    pub fn has_even_total(&self) -> bool {
        self.total % 2.0 == 0.0
    }
}

/// A saved calculation, as persisted under the `storage` key.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct StoredData {
    #[serde(deserialize_with = "number_or_nan")]
    pub price: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub quantity: f64,
    #[serde(deserialize_with = "number_or_nan")]
    pub total: f64,
    pub counter: u64,
}

impl StoredData {
    pub fn from_input(input: &InputData, counter: u64) -> Self {
        Self {
            price: input.price,
            quantity: input.quantity,
            total: input.total,
            counter,
        }
    }

    pub fn input(&self) -> InputData {
        InputData::new(self.price, self.quantity, self.total)
    }
}

/// JSON has no NaN or infinity; serde_json writes them as `null`. Reading
/// `null` back as NaN keeps one such record from invalidating the list.
fn number_or_nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}
