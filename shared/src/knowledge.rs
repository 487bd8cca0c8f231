use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};

use crate::prediction::CanonicalPrediction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SeverityTier {
    Low,
    Medium,
    High,
    Unknown,
}

/// Descriptive information shown alongside a diagnosis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseRecord {
    pub display_name: String,
    pub severity: SeverityTier,
    pub symptoms: Vec<String>,
    pub treatments: Vec<String>,
    pub preventions: Vec<String>,
    pub risk_factors: Vec<String>,
    /// Condition needs urgent medical attention.
    pub emergency: bool,
    pub description: String,
}

impl DiseaseRecord {
    /// Generic record for labels the knowledge base does not cover.
    pub fn fallback(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            severity: SeverityTier::Unknown,
            symptoms: strings(&["Symptoms vary"]),
            treatments: strings(&["Consult a dermatologist"]),
            preventions: strings(&["Regular skin checks"]),
            risk_factors: strings(&["Various factors"]),
            emergency: false,
            description: "Please consult with a healthcare professional for accurate diagnosis."
                .to_string(),
        }
    }
}

struct Seed {
    key: &'static str,
    name: &'static str,
    severity: SeverityTier,
    symptoms: &'static [&'static str],
    treatments: &'static [&'static str],
    preventions: &'static [&'static str],
    risk_factors: &'static [&'static str],
    emergency: bool,
    description: &'static str,
}

const SEEDS: &[Seed] = &[
    Seed {
        key: "melanoma",
        name: "Melanoma",
        severity: SeverityTier::High,
        symptoms: &[
            "Asymmetric moles",
            "Irregular borders",
            "Color variation",
            "Diameter >6mm",
            "Evolving appearance",
        ],
        treatments: &[
            "Surgical excision",
            "Immunotherapy",
            "Targeted therapy",
            "Radiation therapy",
        ],
        preventions: &[
            "Regular skin checks",
            "Sun protection",
            "Avoid tanning beds",
            "Know your skin",
        ],
        risk_factors: &["Fair skin", "History of sunburns", "Family history", "Multiple moles"],
        emergency: true,
        description: "The most serious type of skin cancer that can spread to other parts of the body.",
    },
    Seed {
        key: "basal_cell_carcinoma",
        name: "Basal Cell Carcinoma",
        severity: SeverityTier::Medium,
        symptoms: &["Pearl-like bump", "Pink or red patch", "Open sore that won't heal", "Shiny bump"],
        treatments: &["Surgical removal", "Mohs surgery", "Cryotherapy", "Topical treatments"],
        preventions: &["Sun protection", "Regular dermatologist visits", "Avoid peak sun hours"],
        risk_factors: &["Fair skin", "Chronic sun exposure", "Age over 50", "Male gender"],
        emergency: false,
        description: "Most common type of skin cancer, usually slow-growing and rarely spreads.",
    },
    Seed {
        key: "squamous_cell_carcinoma",
        name: "Squamous Cell Carcinoma",
        severity: SeverityTier::Medium,
        symptoms: &["Red, scaly patch", "Firm, red nodule", "Open sore", "Wart-like growth"],
        treatments: &[
            "Surgical removal",
            "Mohs surgery",
            "Radiation therapy",
            "Topical chemotherapy",
        ],
        preventions: &["Sun protection", "Regular skin exams", "Avoid tanning"],
        risk_factors: &[
            "Fair skin",
            "Chronic sun exposure",
            "Previous skin cancer",
            "Weakened immune system",
        ],
        emergency: false,
        description: "Second most common skin cancer, can spread if not treated early.",
    },
    Seed {
        key: "actinic_keratosis",
        name: "Actinic Keratosis",
        severity: SeverityTier::Low,
        symptoms: &["Rough, scaly patches", "Pink or red color", "Itching or burning", "Flat or raised"],
        treatments: &[
            "Cryotherapy",
            "Topical medications",
            "Photodynamic therapy",
            "Chemical peels",
        ],
        preventions: &["Sun protection", "Regular skin checks", "Avoid tanning"],
        risk_factors: &["Fair skin", "Chronic sun exposure", "Age over 40", "Outdoor occupation"],
        emergency: false,
        description: "Precancerous skin condition that can develop into squamous cell carcinoma.",
    },
    Seed {
        key: "seborrheic_keratosis",
        name: "Seborrheic Keratosis",
        severity: SeverityTier::Low,
        symptoms: &[
            "Waxy, stuck-on appearance",
            "Brown, black, or tan color",
            "Round or oval shape",
            "Slightly raised",
        ],
        treatments: &["Cryotherapy", "Shave removal", "Electrosurgery", "Laser therapy"],
        preventions: &["No specific prevention", "Regular monitoring"],
        risk_factors: &["Age over 50", "Family history", "Sun exposure"],
        emergency: false,
        description: "Benign skin growth that is very common in older adults.",
    },
    Seed {
        key: "dermatofibroma",
        name: "Dermatofibroma",
        severity: SeverityTier::Low,
        symptoms: &["Firm, raised bump", "Brown or reddish color", "Dimple when pinched", "Slightly itchy"],
        treatments: &["Surgical removal", "Cryotherapy", "Observation"],
        preventions: &["No specific prevention"],
        risk_factors: &["Minor skin trauma", "Insect bites", "Age 20-50"],
        emergency: false,
        description: "Benign skin growth that is harmless and doesn't require treatment.",
    },
    Seed {
        key: "benign_mole",
        name: "Benign Mole",
        severity: SeverityTier::Low,
        symptoms: &["Round or oval shape", "Even color", "Smooth borders", "Stable size"],
        treatments: &["No treatment needed", "Surgical removal if desired"],
        preventions: &["Sun protection", "Regular monitoring"],
        risk_factors: &["Genetics", "Sun exposure", "Age"],
        emergency: false,
        description: "Normal, harmless skin growth that is common in most people.",
    },
];

lazy_static! {
    static ref KNOWLEDGE_BASE: HashMap<&'static str, DiseaseRecord> = SEEDS
        .iter()
        .map(|seed| (seed.key, seed.to_record()))
        .collect();
}

impl Seed {
    fn to_record(&self) -> DiseaseRecord {
        DiseaseRecord {
            display_name: self.name.to_string(),
            severity: self.severity,
            symptoms: strings(self.symptoms),
            treatments: strings(self.treatments),
            preventions: strings(self.preventions),
            risk_factors: strings(self.risk_factors),
            emergency: self.emergency,
            description: self.description.to_string(),
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Looks up a canonical disease key.
pub fn lookup(disease_key: &str) -> Option<&'static DiseaseRecord> {
    KNOWLEDGE_BASE.get(disease_key)
}

/// Keys of every seeded record, in seed order.
pub fn known_keys() -> impl Iterator<Item = &'static str> {
    SEEDS.iter().map(|seed| seed.key)
}

/// Finds the record for a prediction, falling back to a generic record
/// named after the classifier's own label.
pub fn resolve(prediction: &CanonicalPrediction) -> DiseaseRecord {
    match lookup(prediction.disease_key()) {
        Some(record) => record.clone(),
        None => {
            log::debug!(
                "No knowledge base entry for '{}', using fallback record",
                prediction.disease_key()
            );
            DiseaseRecord::fallback(prediction.label())
        }
    }
}

/// Every other seeded record, in seed order, for comparison with the
/// predicted condition. An unknown prediction gets the whole table.
pub fn related(prediction: &CanonicalPrediction) -> Vec<&'static DiseaseRecord> {
    known_keys()
        .filter(|key| *key != prediction.disease_key())
        .filter_map(lookup)
        .collect()
}
