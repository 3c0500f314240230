//! Axum route handlers for the analysis API.
//!
//! `handle_analyze_resume` is the whole pipeline for one request:
//! validate upload, extract text, admit against the quota, call the model,
//! commit consumption, assemble the response.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Multipart, State};
use axum::http::HeaderMap;
use axum::Json;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::analyzer::AnalysisResult;
use crate::errors::AppError;
use crate::extract::{extract_text, FileKind};
use crate::quota::identity::client_identity;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    #[serde(flatten)]
    pub result: AnalysisResult,
    pub token_quota: u64,
    pub tokens_used: u64,
    pub tokens_this_request: u64,
}

#[derive(Debug, Deserialize)]
pub struct ExtractSkillsRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ExtractSkillsResponse {
    pub skills: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze-resume
///
/// Multipart form: `resume` (PDF or DOCX file) and `jobDescription` (text).
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    headers: HeaderMap,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut resume: Option<(String, Bytes)> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("resume") => {
                let file_name = field.file_name().unwrap_or("resume").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read upload: {e}")))?;
                resume = Some((file_name, data));
            }
            Some("jobDescription") => {
                job_description = Some(field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read job description: {e}"))
                })?);
            }
            _ => {}
        }
    }

    let (file_name, data) =
        resume.ok_or_else(|| AppError::Validation("No file uploaded".to_string()))?;
    let job_description = job_description.unwrap_or_default();
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "Job description is required".to_string(),
        ));
    }

    let kind = FileKind::from_file_name(&file_name)?;
    let resume_text = extract_text(kind, &data)?;

    let identity = client_identity(&headers, connect_info.map(|ConnectInfo(addr)| addr));
    let handle = state.ledger.admit(&identity).await?;

    let outcome = state
        .analyzer
        .analyze(&resume_text, &job_description)
        .await;

    // A failed upstream call consumed nothing, so nothing is charged and
    // nothing is reported for this request.
    let (tokens_this_request, tokens_used) = if outcome.upstream_ok {
        let cost = outcome
            .reported_tokens
            .unwrap_or_else(|| estimate_tokens(&resume_text, &job_description));
        let total = state.ledger.commit(&handle, cost).await;
        (cost, total)
    } else {
        (0, handle.used())
    };

    info!(
        identity = %identity,
        tokens_this_request,
        tokens_used,
        degraded = outcome.result.error.is_some(),
        "Resume analysis completed"
    );

    Ok(Json(AnalyzeResponse {
        result: outcome.result,
        token_quota: state.ledger.quota(),
        tokens_used,
        tokens_this_request,
    }))
}

/// POST /api/v1/extract-skills
///
/// Standalone skill extraction from free text (typically a job description).
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    Json(request): Json<ExtractSkillsRequest>,
) -> Result<Json<ExtractSkillsResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".to_string()));
    }

    let skills = state.analyzer.extract_skills(&request.text).await;
    Ok(Json(ExtractSkillsResponse { skills }))
}

/// Length-based cost estimate used when the provider reports no usage:
/// roughly four characters per token.
fn estimate_tokens(resume_text: &str, job_description: &str) -> u64 {
    (resume_text.len() + job_description.len()).div_ceil(4) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_estimate_rounds_up() {
        assert_eq!(estimate_tokens("abcd", ""), 1);
        assert_eq!(estimate_tokens("abcde", ""), 2);
        assert_eq!(estimate_tokens("abc", "de"), 2);
        assert_eq!(estimate_tokens("", ""), 0);
    }

    #[test]
    fn analyze_response_flattens_result_fields() {
        let response = AnalyzeResponse {
            result: AnalysisResult {
                matched_skills: vec!["React".to_string()],
                match_percentage: 50.0,
                ..Default::default()
            },
            token_quota: 10_000,
            tokens_used: 120,
            tokens_this_request: 120,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["matchedSkills"], serde_json::json!(["React"]));
        assert_eq!(value["tokenQuota"], 10_000);
        assert_eq!(value["tokensThisRequest"], 120);
        assert!(value.get("result").is_none());
    }
}
