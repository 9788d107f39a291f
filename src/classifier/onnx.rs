use anyhow::Context;
use image::{imageops::FilterType, RgbImage};
use tract_onnx::prelude::*;
use tracing::info;

use super::labels::LabelMap;
use super::model::{argmax, ClassifyError, FoodModel};
use crate::config::ModelConfig;

type Plan = TypedRunnableModel<TypedModel>;

/// ONNX export of an image classifier, executed with tract.
pub struct OnnxModel {
    plan: Plan,
    labels: LabelMap,
    input_size: usize,
    mean: [f32; 3],
    std: [f32; 3],
}

impl OnnxModel {
    pub fn load(cfg: &ModelConfig, labels: LabelMap) -> anyhow::Result<Self> {
        let n = cfg.input_size;
        let plan = tract_onnx::onnx()
            .model_for_path(&cfg.model_path)
            .with_context(|| format!("load onnx model {}", cfg.model_path.display()))?
            .with_input_fact(0, f32::fact([1, 3, n, n]).into())
            .context("set model input shape")?
            .into_optimized()
            .context("optimize model")?
            .into_runnable()
            .context("build execution plan")?;

        info!(
            model = %cfg.model_path.display(),
            input_size = n,
            classes = labels.len(),
            "food classifier loaded"
        );

        Ok(Self {
            plan,
            labels,
            input_size: n,
            mean: cfg.mean,
            std: cfg.std,
        })
    }
}

impl FoodModel for OnnxModel {
    fn predict(&self, image: &RgbImage) -> Result<String, ClassifyError> {
        let input: Tensor = to_nchw(image, self.input_size, self.mean, self.std).into();
        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ClassifyError::Inference(format!("{e:#}")))?;
        let logits = outputs
            .first()
            .ok_or_else(|| ClassifyError::Inference("model produced no outputs".into()))?
            .to_array_view::<f32>()
            .map_err(|e| ClassifyError::Inference(format!("{e:#}")))?;

        let idx = argmax(logits.iter().copied())
            .ok_or_else(|| ClassifyError::Inference("model produced empty scores".into()))?;
        self.labels
            .get(idx)
            .map(str::to_string)
            .ok_or_else(|| {
                ClassifyError::Inference(format!(
                    "class index {idx} outside label map of {}",
                    self.labels.len()
                ))
            })
    }
}

/// Resizes to `size`x`size`, scales to [0, 1] and normalizes per channel into a
/// `[1, 3, size, size]` tensor.
fn to_nchw(
    image: &RgbImage,
    size: usize,
    mean: [f32; 3],
    std: [f32; 3],
) -> tract_ndarray::Array4<f32> {
    let resized = image::imageops::resize(image, size as u32, size as u32, FilterType::Triangle);
    tract_ndarray::Array4::from_shape_fn((1, 3, size, size), |(_, c, y, x)| {
        let v = resized.get_pixel(x as u32, y as u32)[c] as f32 / 255.0;
        (v - mean[c]) / std[c]
    })
}
