pub mod api;
pub mod config;
pub mod corpus;
pub mod error;
pub mod keywords;
pub mod logging;
pub mod matching;

use serde::{Deserialize, Serialize};

use error::ValidationError;

/// A venture already operating in the target regional market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
}

/// A concept observed in a global market, evaluated against the regional corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateConcept {
    #[serde(default)]
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub business_model: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
}

impl CandidateConcept {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Checked before any scoring step runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }

        if let Some(category) = self.category.as_deref() {
            if category.chars().any(char::is_control) {
                return Err(ValidationError::InvalidField {
                    field: "category",
                    value: category.escape_debug().to_string(),
                });
            }
        }

        Ok(())
    }

    /// Category with blank values treated as absent.
    pub fn category(&self) -> Option<&str> {
        self.category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
    }
}
