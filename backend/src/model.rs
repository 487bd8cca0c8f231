use std::sync::Arc;

use image::imageops::FilterType;
use sha2::{Digest, Sha256};

pub const DEFAULT_LABELS: &[&str] = &["Melanoma", "Benign", "Carcinoma"];
pub const MODEL_VERSION: &str = "dev-stub";
const INPUT_SIZE: u32 = 224;

#[derive(Debug, thiserror::Error)]
pub enum InferenceError {
    #[error("Cannot decode image: {0}")]
    PreprocessingError(#[from] image::ImageError),
    #[error("No class labels configured")]
    NoLabels,
}

/// Development stand-in for the trained network: same input pipeline and
/// output shape, but the logits are derived from a digest of the resized
/// pixels. The same image always gets the same label.
#[derive(Clone)]
pub struct Model {
    labels: Arc<Vec<String>>,
}

impl Model {
    pub fn new(labels: Vec<String>) -> Result<Self, InferenceError> {
        if labels.is_empty() {
            return Err(InferenceError::NoLabels);
        }
        Ok(Self {
            labels: Arc::new(labels),
        })
    }

    /// Labels from `CLASSIFIER_LABELS` (comma separated), or the defaults.
    pub fn from_env() -> Result<Self, InferenceError> {
        let labels = match std::env::var("CLASSIFIER_LABELS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|label| !label.is_empty())
                .map(String::from)
                .collect(),
            Err(_) => DEFAULT_LABELS.iter().map(|l| l.to_string()).collect(),
        };
        Self::new(labels)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Class probabilities for an encoded image, in label order.
    pub fn inference(&self, image: &[u8]) -> Result<Vec<f32>, InferenceError> {
        let pixels = preprocess(image)?;
        let digest = Sha256::digest(&pixels);
        log::debug!("Input digest {}", hex::encode(&digest[..8]));

        let logits: Vec<f32> = (0..self.labels.len())
            .map(|i| digest[i % digest.len()] as f32 / 32.0)
            .collect();
        Ok(softmax(&logits))
    }

    /// Most likely label and its probability.
    pub fn calculate_result(&self, predictions: &[f32]) -> (String, f32) {
        predictions
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, &confidence)| (self.labels[i].clone(), confidence))
            .unwrap_or_else(|| (self.labels[0].clone(), 0.0))
    }
}

fn preprocess(image: &[u8]) -> Result<Vec<u8>, InferenceError> {
    let decoded = image::load_from_memory(image)?;
    let resized = decoded.resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle);
    Ok(resized.to_rgb8().into_raw())
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}
