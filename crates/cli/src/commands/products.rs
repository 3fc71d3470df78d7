use std::sync::Arc;

use omegapick_core::comparison::metrics::DerivedMetrics;
use omegapick_core::comparison::ComparisonEngine;
use serde::Serialize;

use super::{load_catalog, CommandResult};

#[derive(Serialize)]
struct ProductsPayload {
    products: Vec<DerivedMetrics>,
}

pub fn run() -> CommandResult {
    let (_config, catalog) = match load_catalog("products") {
        Ok(loaded) => loaded,
        Err(failure) => return failure,
    };

    let engine = ComparisonEngine::new(Arc::new(catalog));
    let products = engine.catalog_metrics();
    let message = format!("{} products: {}", products.len(), engine.catalog().supported_list());

    CommandResult::success("products", message, ProductsPayload { products })
}
