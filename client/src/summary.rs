use shared::{DiseaseRecord, ResolvedPrediction};

use crate::error::ErrorInfo;
use crate::image::SelectedImage;

const DISCLAIMER: &str = "This AI tool is for educational purposes only. Always consult with a \
                          qualified healthcare professional for medical diagnosis and treatment.";

/// Plain text rendering of a successful prediction.
pub fn prediction_summary(image: &SelectedImage, prediction: &ResolvedPrediction) -> String {
    let record = &prediction.record;
    let mut out = String::new();

    if record.emergency {
        out.push_str("!! URGENT MEDICAL ATTENTION REQUIRED !!\n");
        out.push_str("Contact your dermatologist immediately.\n\n");
    }
    out.push_str(&format!(
        "Image:       {} ({:.1} MB)\n",
        image.name(),
        megabytes(image.size())
    ));
    out.push_str(&format!("Condition:   {}\n", record.display_name));
    out.push_str(&format!(
        "Confidence:  {}% ({})\n",
        prediction.confidence_percent, prediction.confidence_tier
    ));
    out.push_str(&format!("Severity:    {}\n", severity(record)));
    out.push_str(&format!("\n{}\n", record.description));

    for (title, items) in [
        ("Symptoms", &record.symptoms),
        ("Treatments", &record.treatments),
        ("Prevention", &record.preventions),
        ("Risk factors", &record.risk_factors),
    ] {
        out.push_str(&format!("\n{}:\n", title));
        for item in items {
            out.push_str(&format!("  - {}\n", item));
        }
    }

    let related = shared::related(&prediction.canonical);
    if !related.is_empty() {
        out.push_str("\nSimilar conditions:\n");
        for other in related {
            out.push_str(&format!("  - {} [{}]: {}\n", other.display_name, severity(other), other.description));
            let key_symptoms: Vec<&str> = other.symptoms.iter().take(2).map(String::as_str).collect();
            out.push_str(&format!("    Key symptoms: {}\n", key_symptoms.join(", ")));
        }
    }

    out.push_str(&format!("\n{}", DISCLAIMER));
    if record.emergency {
        out.push_str(" This condition may require immediate medical attention.");
    }
    out.push('\n');
    out
}

fn severity(record: &DiseaseRecord) -> String {
    record.severity.as_ref().to_uppercase()
}

/// Plain text rendering of a failed submission.
pub fn error_summary(error: &ErrorInfo) -> String {
    let mut out = format!("Error: {}\n", error.message);
    if error.suggest_simulated {
        out.push_str("Re-run with --simulate to use the simulated classifier.\n");
    }
    out
}

fn megabytes(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}
