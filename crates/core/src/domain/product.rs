use std::fmt;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductKey(pub String);

impl ProductKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Manually entered facts for one supplement container.
///
/// Unit counts are `None` when the fact is unknown, which is distinct from a
/// recorded zero.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub brand: String,
    pub name: String,
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    pub softgels: Option<u32>,
    pub serving_softgels: Option<u32>,
    pub omega3_per_serving_mg: f64,
    pub epa_per_serving_mg: f64,
    pub dha_per_serving_mg: f64,
}

impl ProductRecord {
    pub fn price_value(&self) -> f64 {
        self.price.to_f64().unwrap_or(0.0)
    }
}
