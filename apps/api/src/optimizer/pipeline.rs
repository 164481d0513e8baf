//! The request pipeline: credential + two texts in, completion + renderings out.
//!
//! Presentation adapters (HTML form, JSON API) call `optimize` and format the result.

use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::build_optimize_prompt;
use crate::llm_client::CompletionBackend;
use crate::optimizer::invoker::{invoke, Attempt};
use crate::optimizer::model_selector::{discover_candidates, CandidateSource};
use crate::render::{render, RenderedOutput};

pub const MISSING_API_KEY: &str = "Please enter a valid Gemini API Key to continue.";
pub const MISSING_INPUT: &str = "Please upload or paste both your resume and job description.";

#[derive(Debug, Clone)]
pub struct OptimizeRequest {
    pub api_key: String,
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptimizeOutcome {
    pub model: String,
    pub candidate_source: CandidateSource,
    pub candidates: Vec<String>,
    pub attempts: Vec<Attempt>,
    pub text: String,
    #[serde(skip)]
    pub rendered: RenderedOutput,
}

impl OptimizeRequest {
    /// Rejects a request with a blank credential or a blank body.
    /// Bodies are trimmed; the credential is passed through unchanged.
    pub fn validated(self) -> Result<Self, AppError> {
        if self.api_key.trim().is_empty() {
            return Err(AppError::Validation(MISSING_API_KEY.to_string()));
        }

        let resume_text = self.resume_text.trim().to_string();
        let job_description = self.job_description.trim().to_string();
        if resume_text.is_empty() || job_description.is_empty() {
            return Err(AppError::Validation(MISSING_INPUT.to_string()));
        }

        Ok(OptimizeRequest {
            api_key: self.api_key,
            resume_text,
            job_description,
        })
    }
}

/// Runs one optimization end to end.
pub async fn optimize(
    backend: &dyn CompletionBackend,
    request: OptimizeRequest,
) -> Result<OptimizeOutcome, AppError> {
    let request = request.validated()?;
    info!(
        "Optimizing resume: resume_chars={}, jd_chars={}",
        request.resume_text.chars().count(),
        request.job_description.chars().count()
    );

    let prompt = build_optimize_prompt(&request.resume_text, &request.job_description);
    let candidates = discover_candidates(backend, &request.api_key).await;
    let completion = invoke(backend, &request.api_key, &prompt, &candidates.models).await?;

    let text = completion.text;
    let rendered = tokio::task::spawn_blocking({
        let text = text.clone();
        move || render(&text)
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("render task failed: {e}")))??;

    Ok(OptimizeOutcome {
        model: completion.model,
        candidate_source: candidates.source,
        candidates: candidates.models,
        attempts: completion.attempts,
        text,
        rendered,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimizer::invoker::testing::ScriptedBackend;
    use crate::optimizer::invoker::AttemptOutcome;
    use serde_json::json;

    fn request(resume: &str, jd: &str) -> OptimizeRequest {
        OptimizeRequest {
            api_key: "key".to_string(),
            resume_text: resume.to_string(),
            job_description: jd.to_string(),
        }
    }

    #[tokio::test]
    async fn test_missing_body_is_rejected_before_any_call() {
        let backend = ScriptedBackend::with_catalog(vec![json!("gemini-2.5-flash")]);
        let err = optimize(&backend, request("my resume", "   ")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn test_missing_api_key_is_rejected() {
        let backend = ScriptedBackend::default();
        let mut req = request("resume", "jd");
        req.api_key = " ".to_string();
        let err = optimize(&backend, req).await.unwrap_err();
        assert!(err.to_string().contains("API Key"));
    }

    #[tokio::test]
    async fn test_discovered_models_are_used_newest_first() {
        let backend = ScriptedBackend::with_catalog(vec![
            json!({"name": "models/gemini-1.5-flash"}),
            json!({"name": "models/gemini-2.5-flash"}),
        ])
        .reply("gemini-2.5-flash", Err("quota"))
        .reply("gemini-1.5-flash", Ok("**Summary** rewritten"));

        let outcome = optimize(&backend, request("resume", "jd")).await.unwrap();

        assert_eq!(outcome.model, "gemini-1.5-flash");
        assert_eq!(outcome.candidate_source, CandidateSource::Discovered);
        assert_eq!(backend.calls(), vec!["gemini-2.5-flash", "gemini-1.5-flash"]);
        assert_eq!(outcome.rendered.html, "<strong>Summary</strong> rewritten");
        assert_eq!(outcome.rendered.text.as_ref(), b"**Summary** rewritten");
        assert!(outcome.rendered.pdf.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_unreachable_catalog_falls_back() {
        let backend = ScriptedBackend::default().reply("gemini-2.1-flash", Ok("done"));

        let outcome = optimize(&backend, request("resume", "jd")).await.unwrap();

        assert_eq!(outcome.candidate_source, CandidateSource::Fallback);
        assert_eq!(outcome.model, "gemini-2.1-flash");
        assert_eq!(backend.calls(), vec!["gemini-2.5-flash", "gemini-2.1-flash"]);
        assert!(matches!(outcome.attempts[0].outcome, AttemptOutcome::Failed(_)));
    }

    #[tokio::test]
    async fn test_exhaustion_is_llm_error_with_last_message() {
        let backend = ScriptedBackend::with_catalog(vec![json!("gemini-2.5-flash")])
            .reply("gemini-2.5-flash", Err("RESOURCE_EXHAUSTED: quota"));

        let err = optimize(&backend, request("resume", "jd")).await.unwrap_err();

        match err {
            AppError::Llm(msg) => assert!(msg.contains("RESOURCE_EXHAUSTED")),
            other => panic!("expected Llm error, got {other:?}"),
        }
    }
}
