use image::{
    imageops::{self, FilterType},
    ImageError, Limits,
};
use ndarray::{Array, Ix4};
use thiserror::Error;

/// Spatial resolution the classifier was trained on.
pub const INPUT_SIZE: u32 = 128;
pub const INPUT_CHANNELS: usize = 3;

#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("Error reading image: {0}")]
    Read(#[from] std::io::Error),
    #[error("Image exceeds the decoder limits: {0}")]
    TooLarge(ImageError),
    #[error("Error decoding image: {0}")]
    Decode(ImageError),
}

impl From<ImageError> for PreprocessError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::Limits(_) => PreprocessError::TooLarge(err),
            other => PreprocessError::Decode(other),
        }
    }
}

/// Decodes `image_data` and turns it into a `(1, 128, 128, 3)` NHWC tensor with
/// values in `[0, 1]`. The aspect ratio is not preserved.
pub fn transform_image(image_data: &[u8]) -> Result<Array<f32, Ix4>, PreprocessError> {
    transform_image_with_limits(image_data, Limits::default())
}

fn transform_image_with_limits(
    image_data: &[u8],
    limits: Limits,
) -> Result<Array<f32, Ix4>, PreprocessError> {
    let mut image_reader =
        image::ImageReader::new(std::io::Cursor::new(image_data)).with_guessed_format()?;
    image_reader.limits(limits);
    let original_img = image_reader.decode()?;

    tracing::debug!(
        width = original_img.width(),
        height = original_img.height(),
        "Decoded uploaded image"
    );

    let rgb = original_img.to_rgb8();
    let img = imageops::resize(&rgb, INPUT_SIZE, INPUT_SIZE, FilterType::CatmullRom);

    let side = INPUT_SIZE as usize;
    let mut input = Array::zeros((1, side, side, INPUT_CHANNELS));
    for (x, y, pixel) in img.enumerate_pixels() {
        let x = x as usize;
        let y = y as usize;
        let [r, g, b] = pixel.0;
        input[[0, y, x, 0]] = (r as f32) / 255.;
        input[[0, y, x, 1]] = (g as f32) / 255.;
        input[[0, y, x, 2]] = (b as f32) / 255.;
    }

    Ok(input)
}
