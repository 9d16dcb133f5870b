use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::matching::{GapAnalysis, SimilarityRecord};
use crate::ReferenceEntity;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapDetectRequest {
    #[serde(default)]
    pub candidate_description: String,
    #[serde(default)]
    pub candidate_category: Option<String>,
    /// Overrides the server's corpus for this call.
    #[serde(default)]
    pub reference_corpus: Option<Vec<ReferenceEntity>>,
}

impl GapDetectRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.candidate_description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        if let Some(category) = self.candidate_category.as_deref() {
            if category.chars().any(char::is_control) {
                return Err(ValidationError::InvalidField {
                    field: "candidateCategory",
                    value: category.escape_debug().to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarStartup {
    pub startup: ReferenceEntity,
    pub similarity_score: u8,
}

impl From<&SimilarityRecord> for SimilarStartup {
    fn from(record: &SimilarityRecord) -> Self {
        Self {
            startup: record.reference.clone(),
            similarity_score: record.score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysisResponse {
    pub is_gap: bool,
    pub confidence_score: u8,
    pub similar_startups: Vec<SimilarStartup>,
    pub recommendation: String,
}

impl From<&GapAnalysis> for GapAnalysisResponse {
    fn from(analysis: &GapAnalysis) -> Self {
        Self {
            is_gap: analysis.is_gap,
            confidence_score: analysis.confidence_score,
            similar_startups: analysis
                .similar_startups
                .iter()
                .map(SimilarStartup::from)
                .collect(),
            recommendation: analysis.recommendation.clone(),
        }
    }
}
