use std::path::PathBuf;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub labels_path: PathBuf,
    pub input_size: usize,
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

#[derive(Debug, Clone)]
pub struct ThumbnailConfig {
    pub max_size: u32,
    pub jpeg_quality: u8,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub model: ModelConfig,
    pub thumbnail: ThumbnailConfig,
    pub max_upload_bytes: usize,
}

impl Default for ThumbnailConfig {
    fn default() -> Self {
        Self {
            max_size: 200,
            jpeg_quality: 75,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let model = ModelConfig {
            model_path: std::env::var("MODEL_PATH")
                .context("MODEL_PATH must point to the ONNX food classifier")?
                .into(),
            labels_path: std::env::var("MODEL_LABELS_PATH")
                .context("MODEL_LABELS_PATH must point to the label map")?
                .into(),
            input_size: parse_var("MODEL_INPUT_SIZE", 224)?,
            mean: parse_triple_var("MODEL_IMAGE_MEAN", [0.5; 3])?,
            std: parse_triple_var("MODEL_IMAGE_STD", [0.5; 3])?,
        };
        anyhow::ensure!(
            model.std.iter().all(|s| *s != 0.0),
            "MODEL_IMAGE_STD must not contain zero"
        );

        let thumbnail = ThumbnailConfig {
            max_size: parse_var("THUMBNAIL_MAX_SIZE", 200)?,
            jpeg_quality: parse_var("THUMBNAIL_JPEG_QUALITY", 75)?,
        };

        Ok(Self {
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_var("APP_PORT", 8000)?,
            model,
            thumbnail,
            max_upload_bytes: parse_var("MAX_UPLOAD_BYTES", 20 * 1024 * 1024)?,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<T>()
            .with_context(|| format!("invalid value for {name}: {v:?}")),
        Err(_) => Ok(default),
    }
}

fn parse_triple_var(name: &str, default: [f32; 3]) -> anyhow::Result<[f32; 3]> {
    match std::env::var(name) {
        Ok(v) => parse_triple(&v).with_context(|| format!("invalid value for {name}: {v:?}")),
        Err(_) => Ok(default),
    }
}

/// Parses `"a,b,c"` into three floats.
fn parse_triple(raw: &str) -> anyhow::Result<[f32; 3]> {
    let parts = raw
        .split(',')
        .map(|p| p.trim().parse::<f32>())
        .collect::<Result<Vec<_>, _>>()?;
    match parts.as_slice() {
        [a, b, c] => Ok([*a, *b, *c]),
        _ => anyhow::bail!("expected three comma-separated numbers, got {}", parts.len()),
    }
}
