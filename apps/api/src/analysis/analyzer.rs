//! Resume analyzer: one LLM call per analysis, with graceful degradation.
//!
//! The analyzer never surfaces an error to its caller: an upstream or parse
//! failure produces a structurally valid zeroed result carrying an `error`
//! message, so the HTTP response stays well-formed.
//!
//! `AppState` holds an `Arc<dyn ResumeAnalyzer>` so integration tests can
//! substitute a stub model.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::llm_client::parser::{parse_object, parse_skill_array};
use crate::llm_client::prompts::{
    build_analyze_prompt, build_extract_prompt, ANALYZE_SYSTEM, EXTRACT_SYSTEM,
};
use crate::llm_client::LlmClient;

const ANALYZE_MAX_TOKENS: u32 = 1024;
const EXTRACT_MAX_TOKENS: u32 = 512;

/// Skill-matching result as reported by the model.
///
/// `match_percentage` is passed through unchanged, never recomputed from the
/// matched/missing lists; callers must not assume the two are consistent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisResult {
    pub resume_skills: Vec<String>,
    pub job_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub match_percentage: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// All lists empty, score zero, with the failure message attached.
    pub fn degraded(message: String) -> Self {
        Self {
            error: Some(message),
            ..Self::default()
        }
    }
}

/// One analysis call and the accounting the orchestrator needs.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub result: AnalysisResult,
    /// Provider-reported total tokens, when the response carried usage data.
    pub reported_tokens: Option<u64>,
    /// False when the provider call itself failed; no tokens were consumed
    /// upstream, so the quota is not charged.
    pub upstream_ok: bool,
}

impl AnalysisOutcome {
    fn failed_upstream(message: String) -> Self {
        Self {
            result: AnalysisResult::degraded(message),
            reported_tokens: None,
            upstream_ok: false,
        }
    }
}

#[async_trait]
pub trait ResumeAnalyzer: Send + Sync {
    /// Never fails; may return a degraded result.
    async fn analyze(&self, resume_text: &str, job_description: &str) -> AnalysisOutcome;

    /// Standalone skill extraction. Degrades to an empty list on failure.
    async fn extract_skills(&self, text: &str) -> Vec<String>;
}

/// Production analyzer backed by the Groq chat-completions client.
pub struct GroqAnalyzer {
    client: LlmClient,
}

impl GroqAnalyzer {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ResumeAnalyzer for GroqAnalyzer {
    async fn analyze(&self, resume_text: &str, job_description: &str) -> AnalysisOutcome {
        let prompt = build_analyze_prompt(resume_text, job_description);

        let completion = match self
            .client
            .call(ANALYZE_SYSTEM, &prompt, ANALYZE_MAX_TOKENS, true)
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                warn!("Analysis call failed: {e}");
                return AnalysisOutcome::failed_upstream(e.to_string());
            }
        };

        let reported_tokens = completion.usage.map(|u| u.total_tokens);

        let result = match completion.text() {
            Some(content) => match parse_object(content) {
                Ok(map) => match serde_json::from_value::<AnalysisResult>(Value::Object(map)) {
                    Ok(result) => result,
                    Err(e) => AnalysisResult::degraded(format!("Malformed analysis object: {e}")),
                },
                Err(e) => {
                    warn!("Analysis response unparsable: {e}");
                    AnalysisResult::degraded(e.to_string())
                }
            },
            None => AnalysisResult::degraded("LLM returned empty content".to_string()),
        };

        AnalysisOutcome {
            result,
            reported_tokens,
            upstream_ok: true,
        }
    }

    async fn extract_skills(&self, text: &str) -> Vec<String> {
        let prompt = build_extract_prompt(text);

        let completion = match self
            .client
            .call(EXTRACT_SYSTEM, &prompt, EXTRACT_MAX_TOKENS, false)
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                warn!("Skill extraction call failed: {e}");
                return Vec::new();
            }
        };

        let Some(content) = completion.text() else {
            return Vec::new();
        };

        match parse_skill_array(content) {
            Ok(skills) => skills,
            Err(e) => {
                warn!("Skill extraction response unparsable: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_result_round_trips_unchanged() {
        let json = r#"{"resumeSkills":["X"],"jobSkills":["X","Y"],"matchedSkills":["X"],"missingSkills":["Y"],"matchPercentage":50}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();

        assert_eq!(result.resume_skills, vec!["X"]);
        assert_eq!(result.job_skills, vec!["X", "Y"]);
        assert_eq!(result.matched_skills, vec!["X"]);
        assert_eq!(result.missing_skills, vec!["Y"]);
        assert_eq!(result.match_percentage, 50.0);
        assert!(result.error.is_none());

        let back = serde_json::to_value(&result).unwrap();
        assert_eq!(back["matchedSkills"], serde_json::json!(["X"]));
        assert_eq!(back["missingSkills"], serde_json::json!(["Y"]));
        assert_eq!(back["matchPercentage"].as_f64(), Some(50.0));
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let result: AnalysisResult = serde_json::from_str(r#"{"matchPercentage":75}"#).unwrap();
        assert!(result.resume_skills.is_empty());
        assert!(result.missing_skills.is_empty());
        assert_eq!(result.match_percentage, 75.0);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let json = r#"{"matchPercentage":10,"confidence":"high"}"#;
        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.match_percentage, 10.0);
    }

    #[test]
    fn degraded_result_is_zeroed_with_error() {
        let result = AnalysisResult::degraded("connect timeout".to_string());
        assert!(result.resume_skills.is_empty());
        assert!(result.job_skills.is_empty());
        assert!(result.matched_skills.is_empty());
        assert!(result.missing_skills.is_empty());
        assert_eq!(result.match_percentage, 0.0);
        assert_eq!(result.error.as_deref(), Some("connect timeout"));
    }

    #[test]
    fn error_field_is_omitted_from_clean_serialization() {
        let json = serde_json::to_string(&AnalysisResult::default()).unwrap();
        assert!(!json.contains("error"));
    }
}
