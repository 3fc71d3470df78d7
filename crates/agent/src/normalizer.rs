//! Recovers a structured recommendation from free-form model output.

use omegapick_core::comparison::ComparisonContext;
use omegapick_core::domain::recommendation::RecommendationResult;
use thiserror::Error;

/// Output that could not be turned into a recommendation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct NormalizationFailure {
    /// Parser (or validation) message for the last attempt.
    pub message: String,
    /// The fence-stripped text that failed.
    pub cleaned: String,
}

/// Removes a leading code fence (optionally tagged `json`) and a trailing fence.
pub fn strip_code_fences(raw: &str) -> String {
    let mut text = raw.trim();

    if let Some(rest) = text.strip_prefix("```") {
        text = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }

    text.trim().to_string()
}

/// Parses the cleaned text directly, then the outermost `{ ... }` slice.
/// The winner must name one of the two compared products.
pub fn normalize(
    raw: &str,
    context: &ComparisonContext,
) -> Result<RecommendationResult, NormalizationFailure> {
    let cleaned = strip_code_fences(raw);

    let recommendation = match parse(&cleaned) {
        Ok(recommendation) => recommendation,
        Err(direct_error) => match outer_object(&cleaned) {
            Some(slice) => parse(slice)
                .map_err(|message| NormalizationFailure { message, cleaned: cleaned.clone() })?,
            None => return Err(NormalizationFailure { message: direct_error, cleaned }),
        },
    };

    if !context.is_candidate(&recommendation.winner) {
        return Err(NormalizationFailure {
            message: format!(
                "winner `{}` is not one of `{}` or `{}`",
                recommendation.winner, context.first.key, context.second.key
            ),
            cleaned,
        });
    }

    Ok(recommendation)
}

fn parse(text: &str) -> Result<RecommendationResult, String> {
    serde_json::from_str(text).map_err(|error| error.to_string())
}

fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}
