use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Disease key used when the classifier response carries no usable label.
pub const UNKNOWN_DISEASE_KEY: &str = "unknown";

/// Fields probed for the predicted label, highest priority first.
pub const LABEL_FIELDS: &[&str] = &["prediction", "class", "disease", "label"];

/// Fields probed for the confidence score, highest priority first.
pub const CONFIDENCE_FIELDS: &[&str] = &["confidence", "score", "probability", "accuracy"];

/// Classifier output reduced to the fields the rest of the pipeline relies on.
///
/// Built only through [`normalize`], so `disease_key` is never empty and
/// `confidence` always lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPrediction {
    disease_key: String,
    label: String,
    confidence: f64,
    extras: Map<String, Value>,
}

impl CanonicalPrediction {
    pub fn disease_key(&self) -> &str {
        &self.disease_key
    }

    /// The label as the classifier sent it, before canonicalization.
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn extras(&self) -> &Map<String, Value> {
        &self.extras
    }
}

/// Lower-cases `raw` and collapses every whitespace run into a single `_`.
///
/// Leading and trailing whitespace is dropped, so
/// `"  Basal Cell\tCarcinoma "` becomes `basal_cell_carcinoma`.
pub fn canonicalize_key(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Turns any classifier response into a [`CanonicalPrediction`].
///
/// Never fails: a missing label becomes [`UNKNOWN_DISEASE_KEY`], a missing or
/// non-numeric confidence becomes `0`, and out-of-range confidences are
/// clamped. Non-object responses are treated as an empty object.
pub fn normalize(raw: &Value) -> CanonicalPrediction {
    let empty = Map::new();
    let fields = raw.as_object().unwrap_or(&empty);

    let label_hit = LABEL_FIELDS
        .iter()
        .find_map(|&field| fields.get(field).and_then(label_value).map(|v| (field, v)));
    let confidence_hit = CONFIDENCE_FIELDS
        .iter()
        .find_map(|&field| fields.get(field).and_then(confidence_value).map(|v| (field, v)));

    let consumed = [label_hit.as_ref().map(|(f, _)| *f), confidence_hit.as_ref().map(|(f, _)| *f)];
    let extras = fields
        .iter()
        .filter(|(key, _)| !consumed.contains(&Some(key.as_str())))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    let (disease_key, label) = match label_hit {
        Some((_, label)) => (canonicalize_key(&label), label),
        None => (UNKNOWN_DISEASE_KEY.to_string(), UNKNOWN_DISEASE_KEY.to_string()),
    };

    CanonicalPrediction {
        disease_key,
        label,
        confidence: confidence_hit.map(|(_, c)| c).unwrap_or(0.0).clamp(0.0, 1.0),
        extras,
    }
}

fn label_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn confidence_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|c| c.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn picks_label_by_priority() {
        let p = normalize(&json!({"label": "Benign Mole", "class": "Melanoma", "disease": "x"}));
        assert_eq!(p.disease_key(), "melanoma");
        assert_eq!(p.label(), "Melanoma");
        // lower-priority candidates that lost are kept as extras
        assert_eq!(p.extras().get("label"), Some(&json!("Benign Mole")));
        assert_eq!(p.extras().get("disease"), Some(&json!("x")));
        assert!(p.extras().get("class").is_none());
    }

    #[test]
    fn empty_label_falls_through_to_next_candidate() {
        let p = normalize(&json!({"prediction": "   ", "class": null, "disease": "Dermatofibroma"}));
        assert_eq!(p.disease_key(), "dermatofibroma");
        assert_eq!(p.extras().get("prediction"), Some(&json!("   ")));
    }

    #[test]
    fn missing_label_is_unknown() {
        let p = normalize(&json!({"confidence": 0.4}));
        assert_eq!(p.disease_key(), UNKNOWN_DISEASE_KEY);
        assert_eq!(p.label(), UNKNOWN_DISEASE_KEY);
    }

    #[test]
    fn numeric_label_is_stringified() {
        let p = normalize(&json!({"class": 2, "score": 0.5}));
        assert_eq!(p.disease_key(), "2");
    }

    #[test]
    fn canonicalizes_whitespace_and_case() {
        assert_eq!(canonicalize_key("Basal Cell Carcinoma"), "basal_cell_carcinoma");
        assert_eq!(canonicalize_key("  Squamous \t Cell\nCarcinoma "), "squamous_cell_carcinoma");
        assert_eq!(canonicalize_key("MELANOMA"), "melanoma");
    }

    #[test]
    fn canonicalization_is_idempotent() {
        for s in [
            "Basal Cell Carcinoma",
            "  padded  ",
            "already_canonical",
            "Mixed_Case And Spaces",
            "ÉCZÉMA Sévère",
            "",
            "\t\n",
        ] {
            let once = canonicalize_key(s);
            assert_eq!(canonicalize_key(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(normalize(&json!({"confidence": 1.4})).confidence(), 1.0);
        assert_eq!(normalize(&json!({"confidence": -0.2})).confidence(), 0.0);
    }

    #[test]
    fn confidence_by_priority_and_fallback() {
        let p = normalize(&json!({"accuracy": 0.9, "score": 0.3}));
        assert_eq!(p.confidence(), 0.3);
        assert_eq!(p.extras().get("accuracy"), Some(&json!(0.9)));

        let p = normalize(&json!({"confidence": "high", "probability": "0.75"}));
        assert_eq!(p.confidence(), 0.75);

        let p = normalize(&json!({"confidence": null, "score": [1]}));
        assert_eq!(p.confidence(), 0.0);
    }

    #[test]
    fn zero_confidence_is_a_present_value() {
        let p = normalize(&json!({"confidence": 0, "score": 0.8}));
        assert_eq!(p.confidence(), 0.0);
        assert_eq!(p.extras().get("score"), Some(&json!(0.8)));
    }

    #[test]
    fn differently_cased_fields_stay_in_extras() {
        let p = normalize(&json!({
            "class": "Melanoma",
            "Class": "Benign Mole",
            "confidence": 0.6,
            "CONFIDENCE": 0.1,
            "model_version": "v1.0"
        }));
        assert_eq!(p.disease_key(), "melanoma");
        assert_eq!(p.confidence(), 0.6);
        assert_eq!(p.extras().len(), 3);
        assert_eq!(p.extras().get("CONFIDENCE"), Some(&json!(0.1)));
    }

    #[test]
    fn normalize_is_total() {
        let inputs = [
            json!(null),
            json!(42),
            json!("melanoma"),
            json!([{"class": "Melanoma"}]),
            json!({}),
            json!({"prediction": {}, "confidence": {}}),
            json!({"prediction": "", "score": "NaN"}),
            json!({"label": false, "probability": 1e308}),
            json!({"disease": "x", "accuracy": -1e308}),
        ];
        for raw in inputs {
            let p = normalize(&raw);
            assert!(!p.disease_key().is_empty(), "input {raw}");
            assert!((0.0..=1.0).contains(&p.confidence()), "input {raw}");
        }
    }
}
