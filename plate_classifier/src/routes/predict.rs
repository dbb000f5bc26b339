use crate::{
    inference_service::PredictError,
    model_service::ModelService,
    preprocess::PreprocessError,
    server::SharedState,
    telemetry::Outcome,
};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use plate_proto::{ErrorDetail, PredictionResult, IMAGE_FIELD};
use std::time::Instant;
use thiserror::Error;
use tracing::instrument;

const INVALID_IMAGE: &str = "Uploaded file is not a valid image.";
const IMAGE_TOO_LARGE: &str = "Uploaded image is too large to decode.";
const PREDICTION_FAILED: &str = "Prediction failed.";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Expected a multipart/form-data upload: {0}")]
    NotMultipart(#[from] MultipartRejection),
    #[error("Malformed multipart upload: {0}")]
    Multipart(#[from] MultipartError),
    #[error("Missing `file` field in upload")]
    MissingFile,
    #[error(transparent)]
    Predict(#[from] PredictError),
}

impl ApiError {
    fn outcome(&self) -> Outcome {
        match self {
            ApiError::Predict(PredictError::InvalidImage(_)) => Outcome::InvalidInput,
            ApiError::Predict(_) => Outcome::Failure,
            _ => Outcome::InvalidInput,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self {
            ApiError::NotMultipart(rejection) => (rejection.status(), self.to_string()),
            ApiError::Multipart(err) => (err.status(), self.to_string()),
            ApiError::MissingFile => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Predict(PredictError::InvalidImage(
                err @ PreprocessError::TooLarge(_),
            )) => {
                tracing::info!("Rejected upload: {}", err);
                (StatusCode::PAYLOAD_TOO_LARGE, IMAGE_TOO_LARGE.to_string())
            }
            ApiError::Predict(PredictError::InvalidImage(err)) => {
                tracing::info!("Rejected upload: {}", err);
                (StatusCode::BAD_REQUEST, INVALID_IMAGE.to_string())
            }
            ApiError::Predict(err) => {
                tracing::error!("Prediction failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    PREDICTION_FAILED.to_string(),
                )
            }
        };
        (status, Json(ErrorDetail::new(detail))).into_response()
    }
}

async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(IMAGE_FIELD) {
            tracing::debug!(
                file_name = field.file_name().unwrap_or_default(),
                content_type = field.content_type().unwrap_or_default(),
                "Reading uploaded image"
            );
            return Ok(field.bytes().await?);
        }
    }
    Err(ApiError::MissingFile)
}

#[instrument(skip(state, multipart))]
pub async fn predict<M: ModelService>(
    State(state): State<SharedState<M>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let start = Instant::now();
    let result = classify_upload(&state, multipart).await;
    let duration_ms = start.elapsed().as_millis() as u64;

    match &result {
        Ok(prediction) => {
            state.metrics.record_prediction(Outcome::Success, duration_ms);
            tracing::info!(
                label = %prediction.label,
                confidence = prediction.confidence,
                class_index = prediction.class_index,
                duration_ms,
                "Prediction served"
            );
        }
        Err(err) => state.metrics.record_prediction(err.outcome(), duration_ms),
    }

    result.map(Json)
}

async fn classify_upload<M: ModelService>(
    state: &SharedState<M>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<PredictionResult, ApiError> {
    let mut multipart = multipart?;
    let image_data = read_image_field(&mut multipart).await?;
    Ok(state.inference_service.predict(image_data).await?)
}
