use crate::{
    labels::LabelTable,
    model_service::{ModelService, ModelServiceError},
    preprocess::{transform_image, PreprocessError, INPUT_CHANNELS, INPUT_SIZE},
};
use bytes::Bytes;
use ndarray::Array;
use plate_proto::PredictionResult;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictError {
    #[error("Uploaded file is not a valid image: {0}")]
    InvalidImage(#[from] PreprocessError),
    #[error("Model inference failed: {0}")]
    Model(#[from] ModelServiceError),
    #[error("Model returned no usable class probabilities")]
    UnusableOutput,
    #[error("Class index {index} is outside the label table ({len} labels)")]
    LabelOutOfRange { index: usize, len: usize },
    #[error("Inference worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Warm-up inference failed: {0}")]
    WarmUp(#[from] ModelServiceError),
    #[error("Model outputs {outputs} classes but the label table has {labels} entries")]
    LabelCountMismatch { outputs: usize, labels: usize },
}

/// Read-only context shared by every request: the loaded model and its labels.
pub struct InferenceService<M: ModelService> {
    model_service: Arc<M>,
    labels: Arc<LabelTable>,
}

impl<M: ModelService> Clone for InferenceService<M> {
    fn clone(&self) -> Self {
        Self {
            model_service: self.model_service.clone(),
            labels: self.labels.clone(),
        }
    }
}

impl<M: ModelService> InferenceService<M> {
    /// Runs one forward pass on a blank image and refuses to build the context
    /// unless the model has exactly one output per label.
    pub fn new(model_service: M, labels: LabelTable) -> Result<Self, StartupError> {
        let side = INPUT_SIZE as usize;
        let blank = Array::zeros((1, side, side, INPUT_CHANNELS));
        let outputs = model_service.run(&blank)?.len();

        if outputs != labels.len() {
            return Err(StartupError::LabelCountMismatch {
                outputs,
                labels: labels.len(),
            });
        }

        tracing::info!("Model ready with {} classes", outputs);

        Ok(Self {
            model_service: Arc::new(model_service),
            labels: Arc::new(labels),
        })
    }

    pub async fn predict(&self, image_data: Bytes) -> Result<PredictionResult, PredictError> {
        let model_service = self.model_service.clone();
        let probabilities = tokio::task::spawn_blocking(move || -> Result<_, PredictError> {
            let input = transform_image(&image_data)?;
            Ok(model_service.run(&input)?)
        })
        .await??;

        self.select(&probabilities)
    }

    fn select(&self, probabilities: &[f32]) -> Result<PredictionResult, PredictError> {
        if probabilities.iter().any(|p| !p.is_finite()) {
            return Err(PredictError::UnusableOutput);
        }

        let (class_index, probability) = probabilities
            .iter()
            .copied()
            .enumerate()
            .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
            .ok_or(PredictError::UnusableOutput)?;

        let label = self
            .labels
            .get(class_index)
            .ok_or(PredictError::LabelOutOfRange {
                index: class_index,
                len: self.labels.len(),
            })?;

        tracing::debug!(
            "Class {} ({}) won with probability {:.6}",
            class_index,
            label,
            probability
        );

        Ok(PredictionResult {
            label: label.to_string(),
            confidence: round_confidence(probability),
            class_index,
        })
    }
}

/// Four decimal digits, clamped to `[0, 1]`.
fn round_confidence(probability: f32) -> f32 {
    ((probability * 10_000.0).round() / 10_000.0).clamp(0.0, 1.0)
}
