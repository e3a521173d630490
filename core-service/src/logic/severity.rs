//! Severity levels reported by the classifier

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeverityLevel {
    Minor,
    Moderate,
    Serious,
    Critical,
}

impl SeverityLevel {
    pub const ALL: [SeverityLevel; 4] = [
        SeverityLevel::Minor,
        SeverityLevel::Moderate,
        SeverityLevel::Serious,
        SeverityLevel::Critical,
    ];

    pub fn from_score(score: i32) -> Option<Self> {
        match score {
            2 => Some(SeverityLevel::Minor),
            3 => Some(SeverityLevel::Moderate),
            4 => Some(SeverityLevel::Serious),
            5 => Some(SeverityLevel::Critical),
            _ => None,
        }
    }

    pub fn score(self) -> i32 {
        match self {
            SeverityLevel::Minor => 2,
            SeverityLevel::Moderate => 3,
            SeverityLevel::Serious => 4,
            SeverityLevel::Critical => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SeverityLevel::Minor => "Minor",
            SeverityLevel::Moderate => "Moderate",
            SeverityLevel::Serious => "Serious",
            SeverityLevel::Critical => "Critical",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            SeverityLevel::Minor => "Low-impact issues that may cause minor inconvenience",
            SeverityLevel::Moderate => "Medium-impact issues that create barriers for some users",
            SeverityLevel::Serious => "High-impact issues that significantly impair accessibility",
            SeverityLevel::Critical => "Severe issues that prevent access for many users",
        }
    }
}

/// Display name for a score; scores outside the table render as "Level N"
pub fn severity_name(score: i32) -> String {
    SeverityLevel::from_score(score)
        .map(|level| level.name().to_string())
        .unwrap_or_else(|| format!("Level {}", score))
}
