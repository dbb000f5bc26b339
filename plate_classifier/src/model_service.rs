use ndarray::{Array, Ix4};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelServiceError {
    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),
    #[error("Session mutex poisoned: {0}")]
    SessionPoisoned(String),
    #[error("Model declares no outputs")]
    NoOutputs,
}

/// One synchronous forward pass: a preprocessed batch of one in, class
/// probabilities out.
pub trait ModelService: Send + Sync + 'static {
    fn run(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, ModelServiceError>;
}
