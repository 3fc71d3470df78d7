pub mod catalog;
pub mod fallback;
pub mod metrics;
pub mod scoring;

use std::collections::BTreeMap;
use std::sync::Arc;

use self::{
    catalog::Catalog,
    metrics::{derive_metrics, DerivedMetrics},
    scoring::{pick_winner, DecisionScorer},
};
use crate::domain::comparison::{ComparisonResponse, ValidatedRequest};
use crate::domain::product::ProductKey;
use crate::domain::profile::UserProfile;
use crate::domain::recommendation::RecommendationResult;
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredProduct {
    pub key: ProductKey,
    pub metrics: DerivedMetrics,
    pub score: f64,
}

/// Everything the recommendation producers need for one request.
#[derive(Clone, Debug, PartialEq)]
pub struct ComparisonContext {
    pub profile: UserProfile,
    pub first: ScoredProduct,
    pub second: ScoredProduct,
    pub winner: ProductKey,
}

impl ComparisonContext {
    /// Absolute score gap between the two products.
    pub fn margin(&self) -> f64 {
        (self.first.score - self.second.score).abs()
    }

    pub fn is_candidate(&self, key: &str) -> bool {
        self.first.key.as_str() == key || self.second.key.as_str() == key
    }

    pub fn into_response(
        self,
        outcome: RecommendationOutcome,
        beta_notice: String,
    ) -> ComparisonResponse {
        let Self { profile, first, second, winner } = self;

        let mut products = BTreeMap::new();
        let mut scores = BTreeMap::new();
        for product in [first, second] {
            scores.insert(product.key.clone(), product.score);
            products.insert(product.key, product.metrics);
        }

        ComparisonResponse {
            beta_notice,
            used_fallback: outcome.used_fallback,
            openai_error: outcome.generation_error,
            profile_echo: profile,
            products,
            scores,
            winner_from_score_model: winner,
            gpt_json: outcome.recommendation,
            gpt_raw: outcome.raw,
        }
    }
}

/// The recommendation finally chosen for a request and how it was obtained.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecommendationOutcome {
    pub recommendation: RecommendationResult,
    pub raw: String,
    pub used_fallback: bool,
    pub generation_error: Option<String>,
}

/// Resolves catalog keys and runs the deterministic half of a comparison.
#[derive(Clone, Debug)]
pub struct ComparisonEngine {
    catalog: Arc<Catalog>,
    scorer: DecisionScorer,
}

impl ComparisonEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self::with_scorer(catalog, DecisionScorer::default())
    }

    pub fn with_scorer(catalog: Arc<Catalog>, scorer: DecisionScorer) -> Self {
        Self { catalog, scorer }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Both keys must resolve before any metric is computed.
    pub fn prepare(&self, request: ValidatedRequest) -> Result<ComparisonContext, DomainError> {
        let ValidatedRequest { profile, product_a, product_b } = request;
        let record_a = self.catalog.resolve(&product_a)?;
        let record_b = self.catalog.resolve(&product_b)?;

        let first = self.score_product(&product_a, derive_metrics(&product_a, record_a))?;
        let second = self.score_product(&product_b, derive_metrics(&product_b, record_b))?;
        let winner = pick_winner(&first.key, first.score, &second.key, second.score).clone();

        Ok(ComparisonContext { profile, first, second, winner })
    }

    /// Metrics for every catalog entry, in catalog order.
    pub fn catalog_metrics(&self) -> Vec<DerivedMetrics> {
        self.catalog.iter().map(|(key, record)| derive_metrics(key, record)).collect()
    }

    pub fn beta_notice(&self) -> String {
        format!(
            "Beta: Only {} are supported. Product facts are manually entered due to scraping \
             blocks (403).",
            self.catalog.supported_list()
        )
    }

    fn score_product(
        &self,
        key: &ProductKey,
        metrics: DerivedMetrics,
    ) -> Result<ScoredProduct, DomainError> {
        let score = self.scorer.score(&metrics);
        if !score.is_finite() {
            return Err(DomainError::InvariantViolation(format!(
                "decision score for `{key}` is not finite"
            )));
        }
        Ok(ScoredProduct { key: key.clone(), metrics, score })
    }
}
