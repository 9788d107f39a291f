use std::{collections::BTreeMap, path::Path};

use anyhow::Context;
use serde_json::Value;

/// Model output index to class name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelMap(Vec<String>);

impl LabelMap {
    pub fn new(labels: Vec<String>) -> anyhow::Result<Self> {
        anyhow::ensure!(!labels.is_empty(), "label map is empty");
        Ok(Self(labels))
    }

    /// Loads a label map from disk.
    ///
    /// `.json` files may be a Hugging Face `config.json` (its `id2label`
    /// object is used), a bare `{"0": "apple_pie", ...}` object or an array.
    /// Anything else is read as plain text, one label per line.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read label map {}", path.display()))?;
        let is_json = path
            .extension()
            .map(|e| e.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if is_json {
            Self::from_json(&raw).with_context(|| format!("parse label map {}", path.display()))
        } else {
            Self::from_lines(&raw)
        }
    }

    pub fn from_lines(raw: &str) -> anyhow::Result<Self> {
        let labels = raw
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect();
        Self::new(labels)
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        let table = value.get("id2label").unwrap_or(&value);
        match table {
            Value::Array(items) => {
                let labels = items
                    .iter()
                    .map(|v| v.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .context("label array must contain only strings")?;
                Self::new(labels)
            }
            Value::Object(map) => {
                let mut by_index = BTreeMap::new();
                for (k, v) in map {
                    let idx: usize = k
                        .parse()
                        .with_context(|| format!("label key {k:?} is not an index"))?;
                    let label = v
                        .as_str()
                        .with_context(|| format!("label {idx} is not a string"))?;
                    by_index.insert(idx, label.to_string());
                }
                // indices must cover 0..n with no gaps
                for (expected, idx) in by_index.keys().enumerate() {
                    anyhow::ensure!(*idx == expected, "label index {expected} is missing");
                }
                Self::new(by_index.into_values().collect())
            }
            _ => anyhow::bail!("expected a label array or an index -> label object"),
        }
    }

    pub fn get(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}
