use serde::{Deserialize, Deserializer, Serialize};

/// Structured recommendation, identical in shape whether it came from the
/// language model or from the local fallback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResult {
    pub winner: String,
    pub reason: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub value_summary: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cautions: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}
