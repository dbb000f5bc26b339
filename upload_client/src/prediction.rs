use crate::config::PredictionServiceConfig;
use bytes::Bytes;
use plate_proto::{ErrorDetail, PredictionResult, IMAGE_FIELD, PREDICT_ROUTE};
use reqwest::{
    multipart::{Form, Part},
    StatusCode,
};
use std::time::Duration;
use thiserror::Error;
use tracing::instrument;

#[derive(Error, Debug)]
pub enum PredictionClientError {
    #[error("{0}")]
    Transport(#[from] reqwest::Error),
    #[error("Prediction service answered {status}: {detail}")]
    Status { status: StatusCode, detail: String },
}

/// Thin HTTP client for the classifier's predict endpoint. No retries.
pub struct PredictionClient {
    client: reqwest::Client,
    predict_url: String,
}

impl PredictionClient {
    pub fn new(config: &PredictionServiceConfig) -> Result<Self, PredictionClientError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            predict_url: format!("{}{}", config.get_address(), PREDICT_ROUTE),
        })
    }

    #[instrument(skip(self, image_data), fields(bytes = image_data.len()))]
    pub async fn predict(
        &self,
        file_name: &str,
        image_data: Bytes,
    ) -> Result<PredictionResult, PredictionClientError> {
        let part = Part::bytes(image_data.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.predict_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = match response.json::<ErrorDetail>().await {
                Ok(body) => body.detail,
                Err(_) => status.canonical_reason().unwrap_or_default().to_string(),
            };
            return Err(PredictionClientError::Status { status, detail });
        }

        let prediction = response.json::<PredictionResult>().await?;
        tracing::debug!(
            "Service predicted {} ({:.4}) at index {}",
            prediction.label,
            prediction.confidence,
            prediction.class_index
        );

        Ok(prediction)
    }
}
