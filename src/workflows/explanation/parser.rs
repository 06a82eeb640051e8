use serde::Deserialize;

use super::domain::ExplanationContent;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ResponseParseError {
    #[error("response contains no JSON object")]
    NoJson,
    #[error("response JSON is invalid: {0}")]
    Invalid(String),
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(text) => vec![text],
            OneOrMany::Many(items) => items,
        }
    }
}

#[derive(Deserialize)]
struct RawExplanation {
    summary: Option<String>,
    #[serde(default)]
    reasons: Option<OneOrMany>,
    #[serde(default)]
    cautions: Option<OneOrMany>,
    #[serde(default)]
    recommendation: Option<String>,
}

fn clean(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse the model's reply into explanation content.
///
/// Models sometimes wrap the JSON in prose or code fences, so the outermost `{ ... }` span is
/// taken. `reasons` and `cautions` accept either a string or a list.
pub fn parse_explanation(text: &str) -> Result<ExplanationContent, ResponseParseError> {
    let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) else {
        return Err(ResponseParseError::NoJson);
    };
    if end < start {
        return Err(ResponseParseError::NoJson);
    }

    let raw: RawExplanation = serde_json::from_str(&text[start..=end])
        .map_err(|err| ResponseParseError::Invalid(err.to_string()))?;

    let summary = raw
        .summary
        .map(|summary| summary.trim().to_string())
        .filter(|summary| !summary.is_empty())
        .ok_or(ResponseParseError::MissingField("summary"))?;

    Ok(ExplanationContent {
        summary,
        reasons: clean(raw.reasons.map(OneOrMany::into_vec).unwrap_or_default()),
        cautions: clean(raw.cautions.map(OneOrMany::into_vec).unwrap_or_default()),
        recommendation: raw.recommendation.unwrap_or_default().trim().to_string(),
    })
}
