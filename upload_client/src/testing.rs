use crate::config::PredictionServiceConfig;
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use plate_proto::{ErrorDetail, PredictionResult, IMAGE_FIELD, PREDICT_ROUTE};
use tokio::net::TcpListener;

#[derive(Clone)]
struct StubPrediction {
    label: String,
    confidence: f32,
}

/// Answers like the classifier: `reject me` is a bad image, `fail me` an
/// internal failure, anything else the configured prediction.
async fn stub_predict(State(stub): State<StubPrediction>, mut multipart: Multipart) -> Response {
    let mut image_data = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() == Some(IMAGE_FIELD) {
            image_data = field.bytes().await.ok();
        }
    }

    match image_data.as_deref() {
        None => (
            StatusCode::BAD_REQUEST,
            Json(ErrorDetail::new("Missing `file` field in upload")),
        )
            .into_response(),
        Some(b"reject me") => (
            StatusCode::BAD_REQUEST,
            Json(ErrorDetail::new("Uploaded file is not a valid image.")),
        )
            .into_response(),
        Some(b"fail me") => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorDetail::new("Prediction failed.")),
        )
            .into_response(),
        Some(_) => Json(PredictionResult {
            label: stub.label,
            confidence: stub.confidence,
            class_index: 18,
        })
        .into_response(),
    }
}

pub async fn spawn_stub_service(label: &str, confidence: f32) -> PredictionServiceConfig {
    let router = Router::new()
        .route(PREDICT_ROUTE, post(stub_predict))
        .with_state(StubPrediction {
            label: label.to_string(),
            confidence,
        });

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    PredictionServiceConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout_secs: 5,
    }
}

/// Points at a port nothing listens on.
pub async fn unreachable_config() -> PredictionServiceConfig {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    PredictionServiceConfig {
        host: "127.0.0.1".to_string(),
        port,
        timeout_secs: 5,
    }
}
