//! Photo analysis handlers.
//!
//! Each validated upload runs through the caption chain, the keyword
//! classifier, and optionally the expand and translate chains. The pipeline
//! runs in its own task so an unexpected panic becomes a `success: false`
//! entry instead of a dropped connection.

use crate::api::{
    parse_locale, AnalyzeImageQuery, ApiError, AppState, ImageAnalysisResponse,
    MultipleImagesResponse,
};
use crate::classifier::{classify_with_locale, Locale};
use crate::logging::content_preview;
use crate::strategy::{CaptionInput, TextInput, TranslateInput};
use crate::upload::ImageUpload;
use axum::{
    extract::{
        multipart::MultipartRejection, rejection::QueryRejection, Multipart, Query, State,
    },
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Per-request pipeline options.
#[derive(Debug, Clone, Copy)]
struct PipelineOptions {
    locale: Locale,
    expand: bool,
    translate: Option<Locale>,
}

impl PipelineOptions {
    fn from_query(query: &AnalyzeImageQuery, default_locale: Locale) -> Result<Self, ApiError> {
        let locale = parse_locale(query.locale.as_deref(), default_locale, "locale")?;
        let translate = match query.translate.as_deref() {
            Some(target) if !target.trim().is_empty() => {
                Some(parse_locale(Some(target), locale, "translate")?)
            }
            _ => None,
        };
        Ok(Self {
            locale,
            expand: query.expand,
            translate,
        })
    }
}

/// Caption, classify, expand and translate one validated image.
async fn run_pipeline(
    state: Arc<AppState>,
    input: CaptionInput,
    options: PipelineOptions,
) -> ImageAnalysisResponse {
    let caption = state.strategies.caption.run(&input).await;
    let description = caption.value;
    info!(
        filename = %input.filename,
        strategy = %caption.strategy,
        attempts = caption.attempts.len(),
        "Image captioned"
    );
    if let Some(preview) =
        content_preview(&description, state.config.logging.enable_content_logging)
    {
        debug!(filename = %input.filename, description = %preview, "Caption text");
    }

    let analysis = classify_with_locale(&description, options.locale);

    let expanded_description = if options.expand {
        let outcome = state
            .strategies
            .expand
            .run(&TextInput::new(description.clone(), options.locale))
            .await;
        Some(outcome.value)
    } else {
        None
    };

    let translated_description = match options.translate {
        Some(target) => {
            let source_text = expanded_description.as_deref().unwrap_or(&description);
            let outcome = state
                .strategies
                .translate
                .run(&TranslateInput {
                    text: source_text.to_string(),
                    source: options.locale,
                    target,
                })
                .await;
            Some(outcome.value)
        }
        None => None,
    };

    ImageAnalysisResponse {
        success: true,
        filename: input.filename.clone(),
        word_count: description.split_whitespace().count(),
        is_maintenance_related: analysis.is_maintenance_related,
        description,
        expanded_description,
        translated_description,
        analysis,
        strategy: Some(caption.strategy),
        error: None,
    }
}

/// Run the pipeline in a separate task and contain panics.
fn spawn_pipeline(
    state: &Arc<AppState>,
    input: CaptionInput,
    options: PipelineOptions,
) -> tokio::task::JoinHandle<ImageAnalysisResponse> {
    tokio::spawn(run_pipeline(Arc::clone(state), input, options))
}

fn join_failure(filename: &str, locale: Locale, err: tokio::task::JoinError) -> ImageAnalysisResponse {
    warn!(filename = %filename, error = %err, "Image analysis task failed");
    ImageAnalysisResponse::internal_failure(filename, locale, "internal processing error")
}

async fn read_upload(field: axum::extract::multipart::Field<'_>) -> Result<ImageUpload, ApiError> {
    let filename = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let bytes = field.bytes().await?;
    Ok(ImageUpload::new(filename, content_type, bytes.to_vec()))
}

/// POST /analyze-image
pub async fn analyze_image(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyzeImageQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ImageAnalysisResponse>, ApiError> {
    let Query(query) = query?;
    let mut multipart = multipart?;
    let options = PipelineOptions::from_query(&query, state.config.analysis.default_locale)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            upload = Some(read_upload(field).await?);
            break;
        }
    }
    let upload = upload.ok_or_else(|| ApiError::invalid_param("file", "No file provided"))?;

    info!(filename = %upload.filename, size = upload.bytes.len(), "Processing image");
    let input = upload.validate(state.config.analysis.min_image_dimension)?;

    let filename = input.filename.clone();
    let response = match spawn_pipeline(&state, input, options).await {
        Ok(response) => response,
        Err(e) => join_failure(&filename, options.locale, e),
    };
    Ok(Json(response))
}

/// POST /analyze-multiple-images
///
/// Files are analysed concurrently; results keep upload order.
pub async fn analyze_multiple_images(
    State(state): State<Arc<AppState>>,
    query: Result<Query<AnalyzeImageQuery>, QueryRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MultipleImagesResponse>, ApiError> {
    let Query(query) = query?;
    let mut multipart = multipart?;
    let options = PipelineOptions::from_query(&query, state.config.analysis.default_locale)?;
    let max_images = state.config.analysis.max_images_per_request;

    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if !matches!(field.name(), Some("files") | Some("file")) {
            continue;
        }
        if uploads.len() == max_images {
            return Err(ApiError::invalid_param(
                "files",
                &format!("Too many images (maximum {})", max_images),
            ));
        }
        uploads.push(read_upload(field).await?);
    }
    if uploads.is_empty() {
        return Err(ApiError::invalid_param("files", "No files provided"));
    }

    info!(count = uploads.len(), "Processing image batch");

    enum Pending {
        Running(String, tokio::task::JoinHandle<ImageAnalysisResponse>),
        Done(ImageAnalysisResponse),
    }

    let min_dimension = state.config.analysis.min_image_dimension;
    let pending: Vec<Pending> = uploads
        .into_iter()
        .map(|upload| {
            let filename = upload.filename.clone();
            match upload.validate(min_dimension) {
                Ok(input) => Pending::Running(filename, spawn_pipeline(&state, input, options)),
                Err(e) => {
                    warn!(filename = %filename, error = %e, "Rejected image in batch");
                    Pending::Done(ImageAnalysisResponse::failed(filename, options.locale, &e))
                }
            }
        })
        .collect();

    let mut results = Vec::with_capacity(pending.len());
    for entry in pending {
        let response = match entry {
            Pending::Done(response) => response,
            Pending::Running(filename, handle) => match handle.await {
                Ok(response) => response,
                Err(e) => join_failure(&filename, options.locale, e),
            },
        };
        results.push(response);
    }

    Ok(Json(MultipleImagesResponse { results }))
}
