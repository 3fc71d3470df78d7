use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::comparison::metrics::DerivedMetrics;
use crate::domain::product::ProductKey;
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::RecommendationResult;
use crate::errors::DomainError;

/// Body accepted by the compare operation. Every field is optional on the
/// wire so that missing input surfaces as a domain error, not a parse error.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonRequest {
    pub profile: Option<UserProfile>,
    pub product_a: Option<String>,
    pub product_b: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub profile: UserProfile,
    pub product_a: ProductKey,
    pub product_b: ProductKey,
}

impl ComparisonRequest {
    pub fn validate(self) -> Result<ValidatedRequest, DomainError> {
        let product_a = non_blank(self.product_a);
        let product_b = non_blank(self.product_b);

        match (self.profile, product_a, product_b) {
            (Some(profile), Some(product_a), Some(product_b)) => Ok(ValidatedRequest {
                profile,
                product_a: ProductKey(product_a),
                product_b: ProductKey(product_b),
            }),
            _ => Err(DomainError::MissingInput(
                "profile, productA, productB are required".to_string(),
            )),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

/// Response contract of one comparison.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonResponse {
    pub beta_notice: String,
    pub used_fallback: bool,
    pub openai_error: Option<String>,
    pub profile_echo: UserProfile,
    pub products: BTreeMap<ProductKey, DerivedMetrics>,
    pub scores: BTreeMap<ProductKey, f64>,
    pub winner_from_score_model: ProductKey,
    pub gpt_json: RecommendationResult,
    pub gpt_raw: String,
}
