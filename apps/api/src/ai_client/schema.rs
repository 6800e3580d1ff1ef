//! Wire schemas for the AI service, one envelope per operation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::AiError;

/// Structured data extracted from a resume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedData {
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience: Vec<Experience>,
    #[serde(default)]
    pub education: Vec<Education>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub years: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub degree: Option<String>,
    #[serde(default)]
    pub school: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub year: Option<String>,
}

/// Outcome of `process-resume`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedResume {
    pub raw_text: String,
    pub parsed: Option<ParsedData>,
}

/// Outcome of `match-jobs`, with the score rescaled to [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    pub score: f64,
    pub missing_keywords: Vec<String>,
}

/// Outcome of `recommend-jobs`, passed through to the caller untouched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendations {
    pub criteria: Value,
    pub data: Vec<Value>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ErrorBody {
    pub detail: Value,
}

#[derive(Debug, Deserialize)]
pub(super) struct ScrapeEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<String>,
}

impl ScrapeEnvelope {
    pub(super) fn into_text(self) -> Result<String, AiError> {
        match (self.success, self.data) {
            (true, Some(text)) => Ok(text),
            (true, None) => Err(AiError::BadResponse("scrape-job: missing data".into())),
            (false, _) => Err(AiError::BadResponse("scrape-job: success=false".into())),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct ProcessResumeEnvelope {
    success: bool,
    #[serde(default)]
    text_preview: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

impl ProcessResumeEnvelope {
    pub(super) fn into_extracted(self) -> Result<ExtractedResume, AiError> {
        if !self.success {
            return Err(AiError::BadResponse("process-resume: success=false".into()));
        }
        let raw_text = self
            .text_preview
            .ok_or_else(|| AiError::BadResponse("process-resume: missing text_preview".into()))?;
        let parsed = match self.data {
            None | Some(Value::Null) => None,
            Some(value) => Some(serde_json::from_value::<ParsedData>(value).map_err(|e| {
                AiError::BadResponse(format!("process-resume: malformed data: {e}"))
            })?),
        };
        Ok(ExtractedResume { raw_text, parsed })
    }
}

#[derive(Debug, Deserialize)]
struct MatchData {
    match_percentage: f64,
    #[serde(default)]
    missing_keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct MatchEnvelope {
    success: bool,
    data: Option<MatchData>,
}

impl MatchEnvelope {
    pub(super) fn into_score(self) -> Result<MatchScore, AiError> {
        if !self.success {
            return Err(AiError::BadResponse("match-jobs: success=false".into()));
        }
        let data = self
            .data
            .ok_or_else(|| AiError::BadResponse("match-jobs: missing data".into()))?;
        if !data.match_percentage.is_finite() {
            return Err(AiError::BadResponse(
                "match-jobs: match_percentage is not a number".into(),
            ));
        }
        Ok(MatchScore {
            score: (data.match_percentage / 100.0).clamp(0.0, 1.0),
            missing_keywords: data.missing_keywords,
        })
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct RecommendEnvelope {
    #[serde(default)]
    criteria: Value,
    data: Vec<Value>,
}

impl From<RecommendEnvelope> for Recommendations {
    fn from(envelope: RecommendEnvelope) -> Self {
        Recommendations {
            criteria: envelope.criteria,
            data: envelope.data,
        }
    }
}

/// Accepts `3`, `3.5` or `"3"`; extraction models are loose with numeric fields.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Accepts `"2019"` or `2019`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
