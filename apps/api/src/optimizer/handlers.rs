//! Axum route handlers for the JSON API.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::optimizer::invoker::Attempt;
use crate::optimizer::model_selector::{discover_candidates, CandidateList, CandidateSource};
use crate::optimizer::pipeline::{optimize, OptimizeRequest};
use crate::render::{
    attachment, render_pdf, text_payload, to_base64, PDF_FILE_NAME, PDF_MIME, TEXT_FILE_NAME,
    TEXT_MIME,
};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

/// Absent fields read as empty so the pipeline reports what is missing.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct OptimizeBody {
    pub api_key: String,
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct OptimizeResponse {
    pub model: String,
    pub candidate_source: CandidateSource,
    pub candidates: Vec<String>,
    pub attempts: Vec<Attempt>,
    pub text: String,
    pub html: String,
    pub text_file_name: &'static str,
    pub text_base64: String,
    pub pdf_file_name: &'static str,
    pub pdf_base64: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ModelsBody {
    pub api_key: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenderBody {
    pub text: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/optimize
///
/// Full pipeline: validate → discover candidates → failover invoke → render.
pub async fn handle_optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeBody>, JsonRejection>,
) -> Result<Json<OptimizeResponse>, AppError> {
    let Json(body) = payload?;
    let outcome = optimize(
        state.backend.as_ref(),
        OptimizeRequest {
            api_key: body.api_key,
            resume_text: body.resume_text,
            job_description: body.job_description,
        },
    )
    .await?;

    Ok(Json(OptimizeResponse {
        html: outcome.rendered.html.clone(),
        text_file_name: TEXT_FILE_NAME,
        text_base64: to_base64(&outcome.rendered.text),
        pdf_file_name: PDF_FILE_NAME,
        pdf_base64: to_base64(&outcome.rendered.pdf),
        model: outcome.model,
        candidate_source: outcome.candidate_source,
        candidates: outcome.candidates,
        attempts: outcome.attempts,
        text: outcome.text,
    }))
}

/// POST /api/v1/models
///
/// Returns the candidate list a request with this key would try, in order.
pub async fn handle_list_models(
    State(state): State<AppState>,
    payload: Result<Json<ModelsBody>, JsonRejection>,
) -> Result<Json<CandidateList>, AppError> {
    let Json(body) = payload?;
    if body.api_key.trim().is_empty() {
        return Err(AppError::Validation("api_key cannot be empty".to_string()));
    }
    Ok(Json(
        discover_candidates(state.backend.as_ref(), &body.api_key).await,
    ))
}

/// POST /api/v1/render/txt
pub async fn handle_render_txt(
    payload: Result<Json<RenderBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    Ok((
        [
            (header::CONTENT_TYPE, TEXT_MIME.to_string()),
            (header::CONTENT_DISPOSITION, attachment(TEXT_FILE_NAME)),
        ],
        text_payload(&body.text),
    )
        .into_response())
}

/// POST /api/v1/render/pdf
pub async fn handle_render_pdf(
    payload: Result<Json<RenderBody>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(body) = payload?;
    let pdf = tokio::task::spawn_blocking(move || render_pdf(&body.text))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, PDF_MIME.to_string()),
            (header::CONTENT_DISPOSITION, attachment(PDF_FILE_NAME)),
        ],
        pdf,
    )
        .into_response())
}
