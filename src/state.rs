use crate::classifier::{labels::LabelMap, onnx::OnnxModel, Classifier, FoodModel};
use crate::config::AppConfig;
use crate::meals::MealStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub classifier: Classifier,
    pub meals: Arc<MealStore>,
}

impl AppState {
    /// Loads the model from disk; meals start empty.
    pub fn init(config: AppConfig) -> anyhow::Result<Self> {
        let labels = LabelMap::from_path(&config.model.labels_path)?;
        let model = Arc::new(OnnxModel::load(&config.model, labels)?) as Arc<dyn FoodModel>;
        let classifier = Classifier::new(model, config.thumbnail.clone());

        Ok(Self::from_parts(Arc::new(config), classifier, Arc::new(MealStore::new())))
    }

    pub fn from_parts(config: Arc<AppConfig>, classifier: Classifier, meals: Arc<MealStore>) -> Self {
        Self {
            config,
            classifier,
            meals,
        }
    }

    /// State with an empty store and a model that names the dominant color
    /// channel: red -> pizza, green -> salad, blue -> sushi.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::classifier::{model::argmax, ClassifyError};
        use crate::config::{ModelConfig, ThumbnailConfig};
        use image::RgbImage;

        struct FakeModel {
            labels: LabelMap,
        }
        impl FoodModel for FakeModel {
            fn predict(&self, image: &RgbImage) -> Result<String, ClassifyError> {
                let mut sums = [0f32; 3];
                for px in image.pixels() {
                    for (c, sum) in sums.iter_mut().enumerate() {
                        *sum += px[c] as f32;
                    }
                }
                let idx = argmax(sums)
                    .ok_or_else(|| ClassifyError::Inference("empty scores".into()))?;
                self.labels
                    .get(idx)
                    .map(str::to_string)
                    .ok_or_else(|| ClassifyError::Inference("index out of range".into()))
            }
        }

        let labels = LabelMap::from_lines("pizza\nsalad\nsushi").expect("static labels");
        let model = Arc::new(FakeModel { labels }) as Arc<dyn FoodModel>;

        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            model: ModelConfig {
                model_path: "fake.onnx".into(),
                labels_path: "fake.txt".into(),
                input_size: 224,
                mean: [0.5; 3],
                std: [0.5; 3],
            },
            thumbnail: ThumbnailConfig::default(),
            max_upload_bytes: 20 * 1024 * 1024,
        });

        let classifier = Classifier::new(model, config.thumbnail.clone());
        Self::from_parts(config, classifier, Arc::new(MealStore::new()))
    }
}
