use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine};
use bytes::Bytes;
use image::{codecs::jpeg::JpegEncoder, RgbImage};
use tracing::debug;

use super::model::{ClassifyError, FoodModel};
use crate::config::ThumbnailConfig;

#[derive(Debug, Clone)]
pub struct Classification {
    pub label: String,
    /// Base64 JPEG thumbnail of the submitted image.
    pub thumbnail: String,
}

/// Classifier adapter: decodes uploads, runs the shared model and renders a
/// thumbnail for inline transport. Holds no per-call state.
#[derive(Clone)]
pub struct Classifier {
    model: Arc<dyn FoodModel>,
    thumbnail: ThumbnailConfig,
}

impl Classifier {
    pub fn new(model: Arc<dyn FoodModel>, thumbnail: ThumbnailConfig) -> Self {
        Self { model, thumbnail }
    }

    /// Runs [`Classifier::classify_blocking`] on the blocking pool.
    pub async fn classify(&self, image_bytes: Bytes) -> Result<Classification, ClassifyError> {
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.classify_blocking(&image_bytes))
            .await
            .map_err(|e| ClassifyError::Inference(format!("classifier task failed: {e}")))?
    }

    pub fn classify_blocking(&self, image_bytes: &[u8]) -> Result<Classification, ClassifyError> {
        let image = image::load_from_memory(image_bytes)?.to_rgb8();
        debug!(width = image.width(), height = image.height(), "image decoded");

        let label = self.model.predict(&image)?;
        let thumbnail = encode_thumbnail(&image, &self.thumbnail)?;
        Ok(Classification { label, thumbnail })
    }
}

/// Shrinks `image` to fit a `max_size` square keeping its aspect ratio (small
/// images are left as they are), then JPEG + base64 encodes it.
pub fn encode_thumbnail(image: &RgbImage, cfg: &ThumbnailConfig) -> Result<String, ClassifyError> {
    let (w, h) = thumbnail_dimensions(image.width(), image.height(), cfg.max_size);
    let resized;
    let thumb = if (w, h) == image.dimensions() {
        image
    } else {
        resized = image::imageops::thumbnail(image, w, h);
        &resized
    };

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, cfg.jpeg_quality)
        .encode_image(thumb)
        .map_err(|e| ClassifyError::Encode(e.to_string()))?;
    Ok(STANDARD.encode(jpeg))
}

fn thumbnail_dimensions(width: u32, height: u32, max_size: u32) -> (u32, u32) {
    let max_size = max_size.max(1);
    if width <= max_size && height <= max_size {
        return (width, height);
    }
    let scale = f64::min(
        max_size as f64 / width as f64,
        max_size as f64 / height as f64,
    );
    let w = ((width as f64 * scale).round() as u32).clamp(1, max_size);
    let h = ((height as f64 * scale).round() as u32).clamp(1, max_size);
    (w, h)
}
