use crate::{
    page::{self, format_confidence, Notice, Preview},
    prediction::PredictionClientError,
    server::SharedState,
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
};
use bytes::Bytes;
use plate_proto::IMAGE_FIELD;
use tracing::instrument;

const DEFAULT_FILE_NAME: &str = "upload";

struct Upload {
    file_name: String,
    content_type: Option<String>,
    data: Bytes,
}

impl Upload {
    fn preview(&self) -> Option<Preview> {
        let content_type = self.content_type.as_deref()?;
        content_type.starts_with("image/").then(|| Preview {
            content_type: content_type.to_string(),
            data: self.data.to_vec(),
        })
    }
}

async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Option<Upload>, String> {
    let mut multipart = multipart.map_err(|e| e.body_text())?;

    while let Some(field) = multipart.next_field().await.map_err(|e| e.body_text())? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_FILE_NAME)
            .to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| e.body_text())?;

        if data.is_empty() {
            return Ok(None);
        }
        return Ok(Some(Upload {
            file_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}

pub async fn upload_form() -> Html<String> {
    Html(page::render(None, None))
}

#[instrument(skip(state, multipart))]
pub async fn submit_upload(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Html<String> {
    let upload = match read_upload(multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return Html(page::render(None, Some(&Notice::NoFileChosen))),
        Err(message) => {
            tracing::warn!("Rejected browser upload: {}", message);
            return Html(page::render(None, Some(&Notice::BadUpload(message))));
        }
    };

    tracing::info!(
        file_name = %upload.file_name,
        bytes = upload.data.len(),
        "Sending image to model"
    );

    let notice = match state
        .prediction_client
        .predict(&upload.file_name, upload.data.clone())
        .await
    {
        Ok(prediction) => Notice::Prediction {
            region: state.regions.display_name(&prediction.label).to_string(),
            confidence: format_confidence(prediction.confidence),
            code: prediction.label,
        },
        Err(PredictionClientError::Status { status, detail }) => {
            tracing::warn!("Prediction service answered {}: {}", status, detail);
            Notice::ServiceFailure
        }
        Err(PredictionClientError::Transport(e)) => {
            tracing::error!("Request to prediction service failed: {}", e);
            Notice::RequestError(e.to_string())
        }
    };

    Html(page::render(upload.preview().as_ref(), Some(&notice)))
}

#[cfg(test)]
mod tests {
    use crate::{
        prediction::PredictionClient,
        regions::RegionTable,
        server::{build_router, SharedState},
        testing::{spawn_stub_service, unreachable_config},
    };
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    const BOUNDARY: &str = "browser-boundary";

    async fn client_router(label: &str, confidence: f32) -> Router {
        let config = spawn_stub_service(label, confidence).await;
        router_for(PredictionClient::new(&config).unwrap())
    }

    fn router_for(prediction_client: PredictionClient) -> Router {
        let state = SharedState {
            prediction_client: Arc::new(prediction_client),
            regions: Arc::new(RegionTable::new()),
        };
        build_router(state, 1024 * 1024)
    }

    fn browser_submit(file_name: &str, content_type: &str, content: &[u8]) -> Request<Body> {
        let mut body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn page(router: Router, request: Request<Body>) -> String {
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_form_is_served() {
        let router = client_router("MH", 0.8732).await;
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();

        let html = page(router, request).await;

        assert!(html.contains("Indian Number Plate Classifier"));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
    }

    #[tokio::test]
    async fn test_known_code_shows_region_name() {
        let router = client_router("MH", 0.8732).await;

        let html = page(router, browser_submit("plate.png", "image/png", b"png bytes")).await;

        assert!(html.contains("<strong>Maharashtra</strong> (MH)"));
        assert!(html.contains("87.32%"));
        assert!(html.contains("data:image/png;base64,"));
    }

    #[tokio::test]
    async fn test_unknown_code_shows_fallback() {
        let router = client_router("ZZ", 0.5).await;

        let html = page(router, browser_submit("plate.jpg", "image/jpeg", b"jpg bytes")).await;

        assert!(html.contains("<strong>Unknown State</strong> (ZZ)"));
        assert!(html.contains("50.00%"));
    }

    #[tokio::test]
    async fn test_service_failure_shows_generic_notice() {
        let router = client_router("MH", 0.8732).await;

        let html = page(router, browser_submit("plate.png", "image/png", b"fail me")).await;

        assert!(html.contains("Prediction failed. Please try again."));
        assert!(!html.contains("Maharashtra"));
    }

    #[tokio::test]
    async fn test_invalid_image_shows_generic_notice() {
        let router = client_router("MH", 0.8732).await;

        let html = page(router, browser_submit("notes.txt", "text/plain", b"reject me")).await;

        assert!(html.contains("Prediction failed. Please try again."));
        assert!(!html.contains("data:text/plain"));
    }

    #[tokio::test]
    async fn test_unreachable_service_shows_transport_error() {
        let config = unreachable_config().await;
        let router = router_for(PredictionClient::new(&config).unwrap());

        let html = page(router, browser_submit("plate.png", "image/png", b"png bytes")).await;

        assert!(html.contains("Request error: "));
    }

    #[tokio::test]
    async fn test_empty_submit_asks_for_a_file() {
        let router = client_router("MH", 0.8732).await;

        let html = page(router, browser_submit("", "application/octet-stream", b"")).await;

        assert!(html.contains("Please choose an image to upload."));
    }
}
