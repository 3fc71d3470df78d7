use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::config::CatalogConfig;
use crate::domain::product::{ProductKey, ProductRecord};
use crate::errors::DomainError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("could not read catalog file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("catalog contains no products")]
    Empty,
    #[error("catalog key `{0}` appears more than once")]
    DuplicateKey(String),
    #[error("catalog product `{key}` is invalid: {reason}")]
    InvalidProduct { key: String, reason: String },
}

/// Read-only product lookup, built once at startup and shared by reference.
#[derive(Clone, Debug)]
pub struct Catalog {
    products: Vec<(ProductKey, ProductRecord)>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    products: Vec<CatalogFileEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogFileEntry {
    key: String,
    #[serde(flatten)]
    record: ProductRecord,
}

impl Catalog {
    pub fn new(products: Vec<(ProductKey, ProductRecord)>) -> Result<Self, CatalogError> {
        if products.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = HashSet::new();
        for (key, record) in &products {
            if key.as_str().trim().is_empty() {
                return Err(CatalogError::InvalidProduct {
                    key: key.to_string(),
                    reason: "key must not be blank".to_string(),
                });
            }
            if !seen.insert(key.clone()) {
                return Err(CatalogError::DuplicateKey(key.to_string()));
            }
            validate_record(key, record)?;
        }

        Ok(Self { products })
    }

    /// The two manually entered products of the reference deployment.
    pub fn builtin() -> Self {
        Self {
            products: vec![
                (
                    ProductKey::from("Sports Research"),
                    ProductRecord {
                        brand: "Sports Research".to_string(),
                        name: "Alaskan Omega-3 Fish Oil (90 softgels)".to_string(),
                        source: "Manual from product page".to_string(),
                        price: Decimal::new(2999, 2),
                        currency: "USD".to_string(),
                        softgels: Some(90),
                        serving_softgels: Some(1),
                        omega3_per_serving_mg: 1250.0,
                        epa_per_serving_mg: 690.0,
                        dha_per_serving_mg: 260.0,
                    },
                ),
                (
                    ProductKey::from("NOW Foods"),
                    ProductRecord {
                        brand: "NOW Foods".to_string(),
                        name: "Super Omega EPA (Double Strength) (180 softgels)".to_string(),
                        source: "Manual from product page".to_string(),
                        price: Decimal::new(2499, 2),
                        currency: "USD".to_string(),
                        softgels: Some(180),
                        serving_softgels: Some(2),
                        omega3_per_serving_mg: 1000.0,
                        epa_per_serving_mg: 500.0,
                        dha_per_serving_mg: 250.0,
                    },
                ),
            ],
        }
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(raw)?;
        Self::new(
            file.products
                .into_iter()
                .map(|entry| (ProductKey(entry.key), entry.record))
                .collect(),
        )
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)
            .map_err(|source| CatalogError::ReadFile { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&raw)
    }

    /// The configured catalog file, or the built-in products when none is set.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, CatalogError> {
        match &config.path {
            Some(path) => Self::load(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn get(&self, key: &ProductKey) -> Option<&ProductRecord> {
        self.products.iter().find(|(candidate, _)| candidate == key).map(|(_, record)| record)
    }

    /// Like [`Catalog::get`], but a miss becomes a client-facing domain error.
    pub fn resolve(&self, key: &ProductKey) -> Result<&ProductRecord, DomainError> {
        self.get(key).ok_or_else(|| DomainError::UnknownProduct {
            key: key.to_string(),
            supported: self.supported_list(),
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &ProductKey> {
        self.products.iter().map(|(key, _)| key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProductKey, &ProductRecord)> {
        self.products.iter().map(|(key, record)| (key, record))
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Supported keys joined for human-readable messages, in catalog order.
    pub fn supported_list(&self) -> String {
        self.keys().map(ProductKey::as_str).collect::<Vec<_>>().join(" & ")
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn validate_record(key: &ProductKey, record: &ProductRecord) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidProduct {
        key: key.to_string(),
        reason: reason.to_string(),
    };

    if record.price <= Decimal::ZERO {
        return Err(invalid("price must be positive"));
    }
    if record.softgels == Some(0) || record.serving_softgels == Some(0) {
        return Err(invalid("unit counts must be positive; leave the field out when unknown"));
    }

    let nutrients = [
        record.omega3_per_serving_mg,
        record.epa_per_serving_mg,
        record.dha_per_serving_mg,
    ];
    if nutrients.iter().any(|value| !value.is_finite() || *value < 0.0) {
        return Err(invalid("nutrient quantities must be finite and non-negative"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use super::{Catalog, CatalogError};
    use crate::config::CatalogConfig;
    use crate::domain::product::ProductKey;
    use crate::errors::DomainError;

    const TWO_PRODUCTS: &str = r#"
[[products]]
key = "Alpha"
brand = "Alpha Labs"
name = "Alpha Omega (60 softgels)"
source = "test fixture"
price = 19.5
currency = "USD"
softgels = 60
serving_softgels = 2
omega3_per_serving_mg = 900.0
epa_per_serving_mg = 450.0
dha_per_serving_mg = 300.0

[[products]]
key = "Beta"
brand = "Beta Nutrition"
name = "Beta Fish Oil"
source = "test fixture"
price = 12.0
currency = "USD"
omega3_per_serving_mg = 600.0
epa_per_serving_mg = 300.0
dha_per_serving_mg = 200.0
"#;

    #[test]
    fn builtin_catalog_lists_both_reference_products_in_order() {
        let catalog = Catalog::builtin();
        let keys: Vec<&str> = catalog.keys().map(ProductKey::as_str).collect();

        assert_eq!(keys, vec!["Sports Research", "NOW Foods"]);
        assert_eq!(catalog.supported_list(), "Sports Research & NOW Foods");
    }

    #[test]
    fn unknown_key_is_a_defined_miss() {
        let catalog = Catalog::builtin();
        let key = ProductKey::from("Nordic Naturals");

        assert!(catalog.get(&key).is_none());
        assert!(matches!(
            catalog.resolve(&key),
            Err(DomainError::UnknownProduct { ref key, .. }) if key == "Nordic Naturals"
        ));
    }

    #[test]
    fn toml_catalog_keeps_absent_unit_counts_as_unknown() {
        let catalog = Catalog::from_toml_str(TWO_PRODUCTS).expect("catalog parses");
        let beta = catalog.get(&ProductKey::from("Beta")).expect("beta exists");

        assert_eq!(beta.softgels, None);
        assert_eq!(beta.serving_softgels, None);
        assert_eq!(beta.price, Decimal::new(120, 1));

        let alpha = catalog.get(&ProductKey::from("Alpha")).expect("alpha exists");
        assert_eq!(alpha.softgels, Some(60));
        assert_eq!(alpha.price, Decimal::new(195, 1));
    }

    #[test]
    fn load_reads_catalog_from_disk() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("catalog.toml");
        fs::write(&path, TWO_PRODUCTS).expect("write catalog");

        let catalog = Catalog::load(&path).expect("catalog loads");
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.supported_list(), "Alpha & Beta");
    }

    #[test]
    fn from_config_falls_back_to_builtin_without_path() {
        let builtin = Catalog::from_config(&CatalogConfig::default()).expect("builtin catalog");
        assert_eq!(builtin.supported_list(), "Sports Research & NOW Foods");

        let missing = CatalogConfig { path: Some("missing/catalog.toml".into()) };
        assert!(matches!(Catalog::from_config(&missing), Err(CatalogError::ReadFile { .. })));
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let duplicated = TWO_PRODUCTS.replace("key = \"Beta\"", "key = \"Alpha\"");
        let error = Catalog::from_toml_str(&duplicated).expect_err("duplicate key should fail");
        assert!(matches!(error, CatalogError::DuplicateKey(ref key) if key == "Alpha"));
    }

    #[test]
    fn zero_unit_count_is_rejected_in_favour_of_absent() {
        let zeroed = TWO_PRODUCTS.replace("softgels = 60", "softgels = 0");
        let error = Catalog::from_toml_str(&zeroed).expect_err("zero count should fail");
        assert!(matches!(error, CatalogError::InvalidProduct { ref key, .. } if key == "Alpha"));
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let free = TWO_PRODUCTS.replace("price = 12.0", "price = 0.0");
        let error = Catalog::from_toml_str(&free).expect_err("zero price should fail");
        assert!(matches!(error, CatalogError::InvalidProduct { ref key, .. } if key == "Beta"));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        let error = Catalog::from_toml_str("products = []").expect_err("empty catalog");
        assert!(matches!(error, CatalogError::Empty));
    }
}
