use std::fmt::Display;
use std::fmt::Write as _;

use omegapick_core::comparison::metrics::DerivedMetrics;
use omegapick_core::comparison::ComparisonContext;
use omegapick_core::domain::profile::UserProfile;

const FRAMING: &str = "You are a supplement decision assistant.\n\
Use the provided facts only (do NOT invent new facts). Keep it practical and consumer-focused.";

/// Formats the generation prompt for one comparison. Pure: no lookups, no I/O.
#[derive(Clone, Debug, Default)]
pub struct RecommendationRequestBuilder;

impl RecommendationRequestBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, context: &ComparisonContext) -> String {
        let mut prompt = String::with_capacity(2048);
        prompt.push_str(FRAMING);
        prompt.push_str("\n\n");

        push_profile(&mut prompt, &context.profile);
        push_facts(&mut prompt, "A", &context.first.metrics);
        push_facts(&mut prompt, "B", &context.second.metrics);

        let _ = writeln!(
            prompt,
            "Quantitative decision model suggests winner: {}\n\
             (Score A={:.2}, Score B={:.2}, margin={:.2})\n",
            context.winner,
            context.first.score,
            context.second.score,
            context.margin()
        );

        push_output_shape(&mut prompt, context);
        prompt
    }
}

fn push_profile(prompt: &mut String, profile: &UserProfile) {
    let _ = writeln!(prompt, "User profile:");
    let _ = writeln!(prompt, "- Age: {}", profile.age);
    let _ = writeln!(prompt, "- Gender: {}", or_none(&profile.gender));
    let _ = writeln!(prompt, "- Current meds: {}", profile.meds_or_none());
    let _ = writeln!(prompt, "- Health concerns: {}", profile.concerns_or_none());
    let _ = writeln!(prompt, "- Budget: {}", profile.budget_or_none());
    let _ = writeln!(prompt, "- Current supplements: {}", profile.current_supplements_or_none());
    prompt.push('\n');
}

fn push_facts(prompt: &mut String, label: &str, metrics: &DerivedMetrics) {
    let _ = writeln!(prompt, "Facts ({label}):");
    let _ = writeln!(prompt, "- key: {}", metrics.key);
    let _ = writeln!(prompt, "- product: {} {}", metrics.brand, metrics.display_name);
    let _ = writeln!(prompt, "- price: {} {}", metrics.price, metrics.currency);
    let _ = writeln!(prompt, "- count: {} softgels", fact(metrics.softgels));
    let _ = writeln!(prompt, "- serving: {} softgels", fact(metrics.serving_softgels));
    let _ = writeln!(prompt, "- servings per bottle: {}", fact(metrics.servings_per_bottle));
    let _ = writeln!(prompt, "- omega-3 per serving: {} mg", metrics.omega3_per_serving_mg);
    let _ = writeln!(prompt, "- EPA per serving: {} mg", metrics.epa_per_serving_mg);
    let _ = writeln!(prompt, "- DHA per serving: {} mg", metrics.dha_per_serving_mg);
    let _ = writeln!(
        prompt,
        "- total omega-3 per bottle: {} mg",
        fact(metrics.total_omega3_mg_per_bottle)
    );
    let _ = writeln!(prompt, "- $ per softgel: {}", fact(metrics.price_per_softgel));
    let _ = writeln!(prompt, "- $ per serving: {}", fact(metrics.price_per_serving));
    let _ = writeln!(prompt, "- $ per 1000mg omega-3: {}", fact(metrics.price_per_1000mg_omega3));
    prompt.push('\n');
}

fn push_output_shape(prompt: &mut String, context: &ComparisonContext) {
    let _ = write!(
        prompt,
        "Return JSON ONLY (no markdown, no code fences):\n\
         {{\n  \
           \"winner\": \"{first}\" | \"{second}\",\n  \
           \"reason\": \"2-4 sentences personalized to the user (mention budget/value if relevant)\",\n  \
           \"valueSummary\": [\n    \
             \"1 bullet about value (price per 1000mg omega-3)\",\n    \
             \"1 bullet about potency (omega-3/EPA/DHA per serving)\"\n  \
           ],\n  \
           \"cautions\": [\n    \
             \"1-2 short cautions (no medical claims)\"\n  \
           ]\n\
         }}\n",
        first = context.first.key,
        second = context.second.key,
    );
}

fn fact<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "unknown".to_string(), |value| value.to_string())
}

fn or_none(value: &str) -> &str {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        omegapick_core::domain::profile::NONE_SENTINEL
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use omegapick_core::comparison::catalog::Catalog;
    use omegapick_core::comparison::{ComparisonContext, ComparisonEngine};
    use omegapick_core::domain::comparison::ValidatedRequest;
    use omegapick_core::domain::product::ProductKey;
    use omegapick_core::domain::profile::UserProfile;

    use super::RecommendationRequestBuilder;

    fn context(profile: UserProfile) -> ComparisonContext {
        ComparisonEngine::new(Arc::new(Catalog::builtin()))
            .prepare(ValidatedRequest {
                profile,
                product_a: ProductKey::from("Sports Research"),
                product_b: ProductKey::from("NOW Foods"),
            })
            .expect("builtin keys resolve")
    }

    #[test]
    fn absent_profile_fields_render_as_none() {
        let prompt = RecommendationRequestBuilder::new().build(&context(UserProfile {
            age: 52,
            gender: "female".to_string(),
            meds: Some("  ".to_string()),
            ..UserProfile::default()
        }));

        assert!(prompt.contains("- Age: 52"));
        assert!(prompt.contains("- Gender: female"));
        assert!(prompt.contains("- Current meds: none"));
        assert!(prompt.contains("- Health concerns: none"));
        assert!(prompt.contains("- Budget: none"));
        assert!(prompt.contains("- Current supplements: none"));
    }

    #[test]
    fn lists_facts_for_both_products() {
        let prompt = RecommendationRequestBuilder::new().build(&context(UserProfile {
            budget: Some("under $30".to_string()),
            ..UserProfile::default()
        }));

        assert!(prompt.contains("Facts (A):\n- key: Sports Research"));
        assert!(prompt.contains("Facts (B):\n- key: NOW Foods"));
        assert!(prompt.contains("- price: 29.99 USD"));
        assert!(prompt.contains("- count: 180 softgels"));
        assert!(prompt.contains("- serving: 2 softgels"));
        assert!(prompt.contains("- omega-3 per serving: 1250 mg"));
        assert!(prompt.contains("- Budget: under $30"));
    }

    #[test]
    fn states_favoured_product_margin_and_output_shape() {
        let context = context(UserProfile::default());
        let prompt = RecommendationRequestBuilder::new().build(&context);

        assert!(prompt.contains("suggests winner: Sports Research"));
        assert!(prompt.contains(&format!("margin={:.2}", context.margin())));
        assert!(prompt.contains("Return JSON ONLY (no markdown, no code fences):"));
        assert!(prompt.contains("\"winner\": \"Sports Research\" | \"NOW Foods\""));
        assert!(prompt.contains("\"valueSummary\": ["));
        assert!(prompt.contains("\"cautions\": ["));
    }

    #[test]
    fn absent_metrics_render_as_unknown() {
        let mut context = context(UserProfile::default());
        context.second.metrics.softgels = None;
        context.second.metrics.price_per_1000mg_omega3 = None;

        let prompt = RecommendationRequestBuilder::new().build(&context);

        assert!(prompt.contains("- count: unknown softgels"));
        assert!(prompt.contains("- $ per 1000mg omega-3: unknown"));
    }
}
