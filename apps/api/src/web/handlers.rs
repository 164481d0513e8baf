//! HTML form adapter over the optimization pipeline.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use minijinja::context;

use crate::documents::{resolve_input, UploadedDocument};
use crate::errors::AppError;
use crate::optimizer::pipeline::{optimize, OptimizeOutcome, OptimizeRequest, MISSING_API_KEY};
use crate::render::{data_uri, PDF_FILE_NAME, PDF_MIME, TEXT_FILE_NAME, TEXT_MIME};
use crate::state::AppState;

/// Fields of the multipart form posted by `index.html`.
#[derive(Debug, Default)]
struct OptimizeForm {
    api_key: String,
    resume_text: String,
    jd_text: String,
    resume_file: Option<UploadedDocument>,
    jd_file: Option<UploadedDocument>,
}

/// GET /
pub async fn handle_index(State(state): State<AppState>) -> Response {
    match render_template(&state, "index.html", context! {}) {
        Ok(html) => Html(html).into_response(),
        Err(err) => error_page(&state, err),
    }
}

/// POST /optimize
///
/// Resolves both inputs (upload wins over paste), runs the pipeline, and renders
/// the result page with the HTML view and both downloads inlined as data URIs.
pub async fn handle_optimize_form(State(state): State<AppState>, multipart: Multipart) -> Response {
    match optimize_form(&state, multipart).await {
        Ok(html) => Html(html).into_response(),
        Err(err) => error_page(&state, err),
    }
}

async fn optimize_form(state: &AppState, multipart: Multipart) -> Result<String, AppError> {
    let form = read_form(multipart).await?;

    let OptimizeForm {
        api_key,
        resume_text,
        jd_text,
        resume_file,
        jd_file,
    } = form;

    // A missing key is reported before any upload is parsed.
    if api_key.trim().is_empty() {
        return Err(AppError::Validation(MISSING_API_KEY.to_string()));
    }

    let (resume_text, job_description) = tokio::task::spawn_blocking(move || {
        Ok::<_, AppError>((
            resolve_input(resume_file.as_ref(), &resume_text)?,
            resolve_input(jd_file.as_ref(), &jd_text)?,
        ))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("extraction task failed: {e}")))??;

    let outcome = optimize(
        state.backend.as_ref(),
        OptimizeRequest {
            api_key,
            resume_text,
            job_description,
        },
    )
    .await?;

    render_result(state, &outcome)
}

async fn read_form(mut multipart: Multipart) -> Result<OptimizeForm, AppError> {
    let mut form = OptimizeForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume_file" | "jd_file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was chosen.
                if file_name.is_empty() && bytes.is_empty() {
                    continue;
                }
                let doc = Some(UploadedDocument { file_name, bytes });
                if name == "resume_file" {
                    form.resume_file = doc;
                } else {
                    form.jd_file = doc;
                }
            }
            "api_key" | "resume_text" | "jd_text" => {
                let value = field.text().await?;
                match name.as_str() {
                    "api_key" => form.api_key = value,
                    "resume_text" => form.resume_text = value,
                    _ => form.jd_text = value,
                }
            }
            _ => {}
        }
    }

    Ok(form)
}

fn render_result(state: &AppState, outcome: &OptimizeOutcome) -> Result<String, AppError> {
    render_template(
        state,
        "result.html",
        context! {
            candidate_source => outcome.candidate_source,
            candidates => &outcome.candidates,
            attempts => &outcome.attempts,
            model => &outcome.model,
            html => &outcome.rendered.html,
            txt_href => data_uri(TEXT_MIME, &outcome.rendered.text),
            txt_name => TEXT_FILE_NAME,
            pdf_href => data_uri(PDF_MIME, &outcome.rendered.pdf),
            pdf_name => PDF_FILE_NAME,
        },
    )
}

fn render_template(
    state: &AppState,
    name: &str,
    ctx: minijinja::Value,
) -> Result<String, AppError> {
    state
        .templates
        .get_template(name)
        .and_then(|template| template.render(ctx))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("template {name} failed: {e}")))
}

fn error_page(state: &AppState, err: AppError) -> Response {
    let status = err.status();
    let (title, severity) = match &err {
        AppError::Validation(_) => ("Missing input", "warning"),
        AppError::PayloadTooLarge(_) => ("Upload too large", "warning"),
        _ => ("Error", "error"),
    };
    let message = err.user_message();

    match render_template(
        state,
        "error.html",
        context! { title => title, severity => severity, message => &message },
    ) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, message).into_response(),
    }
}
