use serde::{Deserialize, Deserializer, Serialize};

/// Sentinel rendered wherever an optional profile field was not supplied.
pub const NONE_SENTINEL: &str = "none";

/// Self-reported user context. Only coerced into shape, never validated.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, deserialize_with = "coerce_age")]
    pub age: u32,
    #[serde(default)]
    pub gender: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meds: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concerns: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_supplements: Option<String>,
}

impl UserProfile {
    pub fn meds_or_none(&self) -> &str {
        or_none(self.meds.as_deref())
    }

    pub fn concerns_or_none(&self) -> &str {
        or_none(self.concerns.as_deref())
    }

    pub fn budget_or_none(&self) -> &str {
        or_none(self.budget.as_deref())
    }

    pub fn current_supplements_or_none(&self) -> &str {
        or_none(self.current_supplements.as_deref())
    }

    /// The budget text, if the user gave a non-blank one.
    pub fn stated_budget(&self) -> Option<&str> {
        present(self.budget.as_deref())
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn or_none(value: Option<&str>) -> &str {
    present(value).unwrap_or(NONE_SENTINEL)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AgeInput {
    Number(f64),
    Text(String),
}

fn coerce_age<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = match Option::<AgeInput>::deserialize(deserializer)? {
        None => return Ok(0),
        Some(AgeInput::Number(value)) => value,
        Some(AgeInput::Text(text)) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(0);
            }
            trimmed.parse::<f64>().map_err(|_| {
                serde::de::Error::custom(format!("age `{trimmed}` is not a number"))
            })?
        }
    };

    if !raw.is_finite() || raw < 0.0 {
        return Err(serde::de::Error::custom("age must be a non-negative number"));
    }
    Ok(raw.trunc() as u32)
}
