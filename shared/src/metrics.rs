use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::knowledge::{self, DiseaseRecord};
use crate::prediction::CanonicalPrediction;

pub const HIGH_CONFIDENCE_PERCENT: u8 = 80;
pub const MEDIUM_CONFIDENCE_PERCENT: u8 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    pub fn from_percent(percent: u8) -> Self {
        if percent >= HIGH_CONFIDENCE_PERCENT {
            ConfidenceTier::High
        } else if percent >= MEDIUM_CONFIDENCE_PERCENT {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedMetrics {
    pub confidence_percent: u8,
    pub confidence_tier: ConfidenceTier,
}

/// Display metrics for a prediction. The record's severity is independent
/// of confidence and is not consulted.
pub fn derive(prediction: &CanonicalPrediction, _record: &DiseaseRecord) -> DerivedMetrics {
    let confidence_percent = (prediction.confidence() * 100.0).round().clamp(0.0, 100.0) as u8;
    DerivedMetrics {
        confidence_percent,
        confidence_tier: ConfidenceTier::from_percent(confidence_percent),
    }
}

/// A canonical prediction joined with its knowledge base record and
/// display metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPrediction {
    pub canonical: CanonicalPrediction,
    pub record: DiseaseRecord,
    pub confidence_percent: u8,
    pub confidence_tier: ConfidenceTier,
}

impl ResolvedPrediction {
    pub fn from_canonical(canonical: CanonicalPrediction) -> Self {
        let record = knowledge::resolve(&canonical);
        let DerivedMetrics {
            confidence_percent,
            confidence_tier,
        } = derive(&canonical, &record);
        Self {
            canonical,
            record,
            confidence_percent,
            confidence_tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::SeverityTier;
    use crate::prediction::normalize;
    use serde_json::json;

    fn tier_for(confidence: f64) -> DerivedMetrics {
        let prediction = normalize(&json!({ "confidence": confidence }));
        derive(&prediction, &DiseaseRecord::fallback("x"))
    }

    #[test]
    fn tier_boundaries() {
        assert_eq!(ConfidenceTier::from_percent(100), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_percent(80), ConfidenceTier::High);
        assert_eq!(ConfidenceTier::from_percent(79), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_percent(60), ConfidenceTier::Medium);
        assert_eq!(ConfidenceTier::from_percent(59), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_percent(0), ConfidenceTier::Low);
    }

    #[test]
    fn percent_is_rounded() {
        assert_eq!(tier_for(0.796).confidence_percent, 80);
        assert_eq!(tier_for(0.794).confidence_percent, 79);
        assert_eq!(tier_for(0.596).confidence_tier, ConfidenceTier::Medium);
        assert_eq!(tier_for(1.0).confidence_percent, 100);
        assert_eq!(tier_for(0.0).confidence_percent, 0);
    }

    #[test]
    fn known_disease_scenario() {
        let resolved =
            ResolvedPrediction::from_canonical(normalize(&json!({"class": "Melanoma", "score": 0.87})));
        assert_eq!(resolved.canonical.disease_key(), "melanoma");
        assert_eq!(resolved.canonical.confidence(), 0.87);
        assert_eq!(resolved.record.display_name, "Melanoma");
        assert!(resolved.record.emergency);
        assert_eq!(resolved.confidence_percent, 87);
        assert_eq!(resolved.confidence_tier, ConfidenceTier::High);
    }

    #[test]
    fn unknown_disease_scenario() {
        let resolved = ResolvedPrediction::from_canonical(normalize(
            &json!({"prediction": "Psoriasis Type X", "confidence": 0.55}),
        ));
        assert_eq!(resolved.record.display_name, "Psoriasis Type X");
        assert_eq!(resolved.record.severity, SeverityTier::Unknown);
        assert_eq!(resolved.confidence_percent, 55);
        assert_eq!(resolved.confidence_tier, ConfidenceTier::Low);
    }
}
