use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::product::{ProductKey, ProductRecord};

/// Per-container indicators derived from a [`ProductRecord`].
///
/// Every derived quantity is either finite or `None`; a zero or missing
/// denominator never yields NaN or infinity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub key: ProductKey,
    pub brand: String,
    pub display_name: String,
    pub source: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub currency: String,
    pub softgels: Option<u32>,
    pub serving_softgels: Option<u32>,
    pub omega3_per_serving_mg: f64,
    pub epa_per_serving_mg: f64,
    pub dha_per_serving_mg: f64,
    pub servings_per_bottle: Option<f64>,
    pub total_omega3_mg_per_bottle: Option<f64>,
    pub price_per_softgel: Option<f64>,
    pub price_per_serving: Option<f64>,
    #[serde(rename = "pricePer1000mgOmega3")]
    pub price_per_1000mg_omega3: Option<f64>,
}

/// Divides unless the divisor is zero or absent. Non-finite results are
/// treated as absent too.
pub fn safe_div(numerator: f64, divisor: Option<f64>) -> Option<f64> {
    let divisor = divisor.filter(|value| *value != 0.0)?;
    let quotient = numerator / divisor;
    quotient.is_finite().then_some(quotient)
}

pub fn servings_per_container(product: &ProductRecord) -> Option<f64> {
    let softgels = product.softgels?;
    safe_div(f64::from(softgels), product.serving_softgels.map(f64::from))
}

pub fn total_omega3_mg(product: &ProductRecord) -> Option<f64> {
    let total = servings_per_container(product)? * product.omega3_per_serving_mg;
    total.is_finite().then_some(total)
}

pub fn price_per_softgel(product: &ProductRecord) -> Option<f64> {
    safe_div(product.price_value(), product.softgels.map(f64::from))
}

pub fn price_per_serving(product: &ProductRecord) -> Option<f64> {
    safe_div(product.price_value(), servings_per_container(product))
}

pub fn price_per_1000mg_omega3(product: &ProductRecord) -> Option<f64> {
    let grams = total_omega3_mg(product)? / 1000.0;
    safe_div(product.price_value(), Some(grams))
}

pub fn derive_metrics(key: &ProductKey, product: &ProductRecord) -> DerivedMetrics {
    DerivedMetrics {
        key: key.clone(),
        brand: product.brand.clone(),
        display_name: product.name.clone(),
        source: product.source.clone(),
        price: product.price,
        currency: product.currency.clone(),
        softgels: product.softgels,
        serving_softgels: product.serving_softgels,
        omega3_per_serving_mg: product.omega3_per_serving_mg,
        epa_per_serving_mg: product.epa_per_serving_mg,
        dha_per_serving_mg: product.dha_per_serving_mg,
        servings_per_bottle: servings_per_container(product),
        total_omega3_mg_per_bottle: total_omega3_mg(product),
        price_per_softgel: price_per_softgel(product),
        price_per_serving: price_per_serving(product),
        price_per_1000mg_omega3: price_per_1000mg_omega3(product),
    }
}
