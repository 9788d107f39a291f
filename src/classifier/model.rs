use image::RgbImage;

#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error(transparent)]
    Decode(#[from] image::ImageError),
    #[error("{0}")]
    Inference(String),
    #[error("thumbnail encoding failed: {0}")]
    Encode(String),
}

/// A pretrained food classifier.
///
/// Loaded once at startup and shared read-only between requests, so
/// implementations must tolerate concurrent `predict` calls.
pub trait FoodModel: Send + Sync {
    /// Returns the label of the single highest-scoring class.
    fn predict(&self, image: &RgbImage) -> Result<String, ClassifyError>;
}

/// Index of the largest score. Ties resolve to the first index.
pub fn argmax<I>(scores: I) -> Option<usize>
where
    I: IntoIterator<Item = f32>,
{
    scores
        .into_iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, s)| match best {
            Some((_, b)) if s <= b || s.is_nan() => best,
            _ => Some((i, s)),
        })
        .map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::argmax;

    #[test]
    fn argmax_picks_highest() {
        assert_eq!(argmax([0.1, 2.5, -1.0, 2.4]), Some(1));
    }

    #[test]
    fn argmax_ties_keep_first() {
        assert_eq!(argmax([3.0, 3.0, 1.0]), Some(0));
    }

    #[test]
    fn argmax_skips_nan_and_handles_empty() {
        assert_eq!(argmax([f32::NAN, -4.0, -2.0]), Some(2));
        assert_eq!(argmax(std::iter::empty()), None);
    }
}
