//! Prediction pipeline shared by the client and the development classifier:
//! response normalization, disease knowledge lookup and display metrics.

pub mod knowledge;
pub mod metrics;
pub mod prediction;
pub mod simulation;

pub use knowledge::{DiseaseRecord, SeverityTier, related, resolve};
pub use metrics::{ConfidenceTier, DerivedMetrics, ResolvedPrediction, derive};
pub use prediction::{CanonicalPrediction, canonicalize_key, normalize};

use serde_json::Value;

/// Runs a raw classifier response through normalize, resolve and derive.
pub fn process(raw: &Value) -> ResolvedPrediction {
    ResolvedPrediction::from_canonical(normalize(raw))
}

/// Response body of the development classifier's `/predict` route.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq)]
pub struct ClassifierResponse {
    pub class: String,
    pub confidence: f32,
    pub model_version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifier_response_feeds_the_pipeline() {
        let body = ClassifierResponse {
            class: "Basal Cell Carcinoma".into(),
            confidence: 0.625,
            model_version: simulation::MODEL_VERSION.into(),
        };
        let resolved = process(&serde_json::to_value(&body).unwrap());
        assert_eq!(resolved.record.display_name, "Basal Cell Carcinoma");
        assert_eq!(resolved.confidence_percent, 63);
        assert_eq!(resolved.confidence_tier, ConfidenceTier::Medium);
        assert_eq!(resolved.canonical.extras().get("model_version"), Some(&json!("v1.0")));
    }
}
