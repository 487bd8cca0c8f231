use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

pub const SIMULATED_DISEASE: &str = "melanoma";
pub const SIMULATED_CONFIDENCE: f64 = 0.87;
pub const MODEL_VERSION: &str = "v1.0";
pub const ATTENTION_MAP_SIZE: usize = 7;

/// Published evaluation figures of the classifier, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelPerformance {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub auc_roc: f64,
    pub specificity: f64,
}

pub const MODEL_PERFORMANCE: ModelPerformance = ModelPerformance {
    accuracy: 94.2,
    precision: 92.1,
    recall: 89.3,
    f1_score: 90.7,
    auc_roc: 96.4,
    specificity: 95.8,
};

/// Gaussian blob centred slightly above the middle of the image, standing in
/// for a Grad-CAM heatmap. Weights are in `[0, 1]`, rounded to 3 decimals.
pub fn attention_map() -> Vec<Vec<f64>> {
    let centre_row = (ATTENTION_MAP_SIZE as f64 - 1.0) / 2.0 - 0.5;
    let centre_col = (ATTENTION_MAP_SIZE as f64 - 1.0) / 2.0;
    let spread = 2.0 * 1.5_f64.powi(2);

    (0..ATTENTION_MAP_SIZE)
        .map(|row| {
            (0..ATTENTION_MAP_SIZE)
                .map(|col| {
                    let dr = row as f64 - centre_row;
                    let dc = col as f64 - centre_col;
                    let weight = (-(dr * dr + dc * dc) / spread).exp();
                    (weight * 1000.0).round() / 1000.0
                })
                .collect()
        })
        .collect()
}

/// The response the simulated classifier returns. Identical on every call.
pub fn simulated_response() -> Value {
    json!({
        "prediction": SIMULATED_DISEASE,
        "confidence": SIMULATED_CONFIDENCE,
        "model_version": MODEL_VERSION,
        "attention_map": attention_map(),
        "performance": MODEL_PERFORMANCE,
        "simulated": true,
    })
}
