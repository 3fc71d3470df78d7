use super::metrics::DerivedMetrics;
use super::ComparisonContext;
use crate::domain::product::ProductKey;
use crate::domain::recommendation::RecommendationResult;

pub const MEDICATION_CAUTION: &str =
    "If you take any medication (especially anticoagulants), check with a professional first.";
pub const DIGESTION_CAUTION: &str =
    "Stomach upset or fishy burps vary by person; consider taking it with a meal.";

/// Builds a recommendation from the quantitative model alone.
///
/// Pure and total: used whenever remote generation is unavailable or its
/// output cannot be normalized.
#[derive(Clone, Debug, Default)]
pub struct FallbackGenerator;

impl FallbackGenerator {
    pub fn new() -> Self {
        Self
    }

    pub fn generate(&self, context: &ComparisonContext) -> RecommendationResult {
        let first = &context.first.metrics;
        let second = &context.second.metrics;

        let budget = match context.profile.stated_budget() {
            Some(budget) => format!("budget ({budget})"),
            None => "budget".to_string(),
        };
        let cheaper = cheaper_per_1000mg(first, second);
        let more_potent = more_omega3_per_serving(first, second);

        RecommendationResult {
            winner: context.winner.to_string(),
            reason: format!(
                "The language model response could not be generated, so this recommendation is \
                 based on the quantitative metrics. From a {budget} standpoint {cheaper} has the \
                 better value (price per 1000mg omega-3), while for dose strength (omega-3 per \
                 serving) {more_potent} comes out ahead."
            ),
            value_summary: vec![
                format!(
                    "Scores (higher is better): {}={:.2}, {}={:.2}",
                    first.key, context.first.score, second.key, context.second.score
                ),
                "Value metric used: price per 1000mg omega-3 (lower is better)".to_string(),
            ],
            cautions: vec![MEDICATION_CAUTION.to_string(), DIGESTION_CAUTION.to_string()],
        }
    }
}

/// Absent cost loses to any finite cost; exact ties go to the second product.
fn cheaper_per_1000mg<'a>(
    first: &'a DerivedMetrics,
    second: &'a DerivedMetrics,
) -> &'a ProductKey {
    let first_cost = first.price_per_1000mg_omega3.unwrap_or(f64::INFINITY);
    let second_cost = second.price_per_1000mg_omega3.unwrap_or(f64::INFINITY);
    if first_cost < second_cost {
        &first.key
    } else {
        &second.key
    }
}

fn more_omega3_per_serving<'a>(
    first: &'a DerivedMetrics,
    second: &'a DerivedMetrics,
) -> &'a ProductKey {
    if first.omega3_per_serving_mg > second.omega3_per_serving_mg {
        &first.key
    } else {
        &second.key
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::{FallbackGenerator, DIGESTION_CAUTION, MEDICATION_CAUTION};
    use crate::comparison::catalog::Catalog;
    use crate::comparison::{ComparisonContext, ComparisonEngine};
    use crate::domain::comparison::ValidatedRequest;
    use crate::domain::product::ProductKey;
    use crate::domain::profile::UserProfile;

    fn context(first: &str, second: &str, budget: Option<&str>) -> ComparisonContext {
        let engine = ComparisonEngine::new(Arc::new(Catalog::builtin()));
        engine
            .prepare(ValidatedRequest {
                profile: UserProfile {
                    age: 45,
                    gender: "female".to_string(),
                    budget: budget.map(str::to_string),
                    ..UserProfile::default()
                },
                product_a: ProductKey::from(first),
                product_b: ProductKey::from(second),
            })
            .expect("builtin keys resolve")
    }

    #[test]
    fn winner_follows_decision_score() {
        let context = context("NOW Foods", "Sports Research", None);
        let result = FallbackGenerator::new().generate(&context);

        assert_eq!(result.winner, "Sports Research");
        assert_eq!(result.winner, context.winner.as_str());
    }

    #[test]
    fn summary_and_cautions_have_fixed_shape() {
        let context = context("Sports Research", "NOW Foods", None);
        let result = FallbackGenerator::new().generate(&context);

        assert_eq!(result.value_summary.len(), 2);
        assert_eq!(
            result.value_summary[0],
            format!(
                "Scores (higher is better): Sports Research={:.2}, NOW Foods={:.2}",
                context.first.score, context.second.score
            )
        );
        assert_eq!(
            result.value_summary[1],
            "Value metric used: price per 1000mg omega-3 (lower is better)"
        );
        assert_eq!(result.cautions, vec![MEDICATION_CAUTION, DIGESTION_CAUTION]);
    }

    #[test]
    fn reason_names_cheaper_and_more_potent_products() {
        let context = context("NOW Foods", "Sports Research", Some("under $30"));
        let result = FallbackGenerator::new().generate(&context);

        assert!(result.reason.contains("budget (under $30)"));
        assert!(result.reason.contains("standpoint Sports Research has the better value"));
        assert!(result.reason.contains("serving) Sports Research comes out ahead"));
    }

    #[test]
    fn missing_budget_uses_plain_wording() {
        let context = context("Sports Research", "NOW Foods", Some("   "));
        let result = FallbackGenerator::new().generate(&context);

        assert!(result.reason.contains("From a budget standpoint"));
    }

    #[test]
    fn absent_value_metric_loses_the_cheaper_comparison() {
        let mut context = context("Sports Research", "NOW Foods", None);
        context.first.metrics.price_per_1000mg_omega3 = None;
        let result = FallbackGenerator::new().generate(&context);

        assert!(result.reason.contains("standpoint NOW Foods has the better value"));
    }

    #[test]
    fn generation_is_deterministic() {
        let context = context("Sports Research", "NOW Foods", Some("$25"));
        let generator = FallbackGenerator::new();

        assert_eq!(generator.generate(&context), generator.generate(&context));
    }
}
