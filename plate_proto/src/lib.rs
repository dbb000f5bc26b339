//! Wire types exchanged between the plate classifier service and its clients.

use serde::{Deserialize, Serialize};

pub mod settings;

/// Multipart field carrying the uploaded image.
pub const IMAGE_FIELD: &str = "file";

/// Route of the prediction endpoint on the classifier service.
pub const PREDICT_ROUTE: &str = "/predict";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: String,
    pub confidence: f32,
    pub class_index: usize,
}

/// Error body returned alongside every non-2xx status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub detail: String,
}

impl ErrorDetail {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}
