use ndarray::{Array2, ArrayD};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Attribution values as an engine hands them back, before normalization
#[derive(Debug, Clone)]
pub enum RawAttribution {
    /// One (samples × features) matrix per class
    PerClass(Vec<Array2<f64>>),
    /// A single dense tensor whose axis order is engine-specific
    Dense(ArrayD<f64>),
}

impl RawAttribution {
    /// Observed dimensions, for error messages
    pub fn describe_shape(&self) -> String {
        match self {
            RawAttribution::PerClass(matrices) => {
                let inner = matrices
                    .first()
                    .map(|m| format!("{:?}", m.shape()))
                    .unwrap_or_else(|| "[]".to_string());
                format!("list of {} x {}", matrices.len(), inner)
            }
            RawAttribution::Dense(array) => format!("{:?}", array.shape()),
        }
    }
}

/// Raw engine output: values plus expected value(s)
#[derive(Debug, Clone)]
pub struct RawExplanation {
    pub values: RawAttribution,
    /// Either one value shared by all classes or one per class
    pub expected_value: Vec<f64>,
}

/// Feature → contribution, in feature-layout order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributionMap {
    entries: Vec<(String, f64)>,
}

impl From<Vec<(String, f64)>> for ContributionMap {
    fn from(entries: Vec<(String, f64)>) -> Self {
        Self { entries }
    }
}

impl ContributionMap {
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }

    pub fn get(&self, feature: &str) -> Option<f64> {
        self.iter().find(|(name, _)| *name == feature).map(|(_, v)| v)
    }

    pub fn values(&self) -> Vec<f64> {
        self.entries.iter().map(|(_, v)| *v).collect()
    }

    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// Serialized as a JSON object that keeps layout order
impl Serialize for ContributionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Canonical per-feature attribution for one predicted class
#[derive(Debug, Clone, Serialize)]
pub struct AttributionResult {
    pub predicted_class_index: usize,
    pub contributions: ContributionMap,
    pub baseline: f64,
}

impl AttributionResult {
    /// `baseline + Σ contributions`, equal to the class margin for an
    /// additive engine
    pub fn reconstructed_margin(&self) -> f64 {
        self.baseline + self.contributions.sum()
    }
}

/// Direction a feature moved the predicted class's margin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Influence {
    /// Pushed toward the predicted class
    Toward,
    /// Pushed away from the predicted class
    Away,
    Neutral,
}

impl Influence {
    pub fn of(contribution: f64) -> Self {
        if contribution > 0.0 {
            Influence::Toward
        } else if contribution < 0.0 {
            Influence::Away
        } else {
            Influence::Neutral
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankedContribution {
    pub feature: String,
    pub contribution: f64,
    pub influence: Influence,
    pub description: Option<String>,
}
