use crate::{
    labels::LabelTable,
    model_service::{ModelService, ModelServiceError},
};
use bytes::Bytes;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use ndarray::{Array, Ix4};
use std::{
    io::Cursor,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

#[derive(Clone)]
pub struct MockModelService {
    probabilities: Arc<Mutex<Vec<f32>>>,
    failing: Arc<AtomicBool>,
}

impl MockModelService {
    pub fn new(probabilities: Vec<f32>) -> Self {
        Self {
            probabilities: Arc::new(Mutex::new(probabilities)),
            failing: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Changes what later runs return, after the warm-up pass has seen the original.
    pub fn set_probabilities(&self, probabilities: Vec<f32>) {
        *self.probabilities.lock().unwrap() = probabilities;
    }

    pub fn fail_next_runs(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }
}

impl ModelService for MockModelService {
    fn run(&self, input: &Array<f32, Ix4>) -> Result<Vec<f32>, ModelServiceError> {
        assert_eq!(input.shape(), &[1, 128, 128, 3]);
        if self.failing.load(Ordering::SeqCst) {
            return Err(ModelServiceError::NoOutputs);
        }
        Ok(self.probabilities.lock().unwrap().clone())
    }
}

pub fn labels(codes: &[&str]) -> LabelTable {
    LabelTable::new(codes.iter().map(|code| code.to_string()).collect()).unwrap()
}

pub fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut image_data: Vec<u8> = Vec::new();
    img.write_to(&mut Cursor::new(&mut image_data), format)
        .unwrap();
    image_data
}

/// A small white plate with a dark band, wider than it is tall.
pub fn plate_png() -> Bytes {
    let img = ImageBuffer::from_fn(220, 50, |_, y| {
        if (20..30).contains(&y) {
            Rgb([20u8, 20, 20])
        } else {
            Rgb([245u8, 245, 245])
        }
    });
    Bytes::from(encode(DynamicImage::ImageRgb8(img), ImageFormat::Png))
}
