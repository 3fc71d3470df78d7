pub mod comparison;
pub mod config;
pub mod domain;
pub mod errors;

pub use comparison::catalog::{Catalog, CatalogError};
pub use comparison::fallback::FallbackGenerator;
pub use comparison::metrics::DerivedMetrics;
pub use comparison::scoring::{DecisionScorer, ScoringWeights};
pub use comparison::{ComparisonContext, ComparisonEngine, RecommendationOutcome, ScoredProduct};
pub use domain::comparison::{ComparisonRequest, ComparisonResponse, ValidatedRequest};
pub use domain::product::{ProductKey, ProductRecord};
pub use domain::profile::UserProfile;
pub use domain::recommendation::RecommendationResult;
pub use errors::{ApplicationError, DomainError, InterfaceError};
