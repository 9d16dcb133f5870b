use serde::{Deserialize, Serialize};

use super::gap_detect::GapAnalysisResponse;
use super::ENGINE_VERSION;
use crate::matching::{DimensionScores, OpportunityLevel, ScoredOpportunity};
use crate::{CandidateConcept, ReferenceEntity};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    #[serde(flatten)]
    pub candidate: CandidateConcept,
    #[serde(default)]
    pub reference_corpus: Option<Vec<ReferenceEntity>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub scoring: DimensionScores,
    pub overall_score: u8,
    pub gap_analysis: GapAnalysisResponse,
    pub recommendations: Vec<String>,
    pub opportunity_level: OpportunityLevel,
    pub rationale: String,
    pub corpus_version: String,
    pub engine_version: String,
}

impl ScoreResponse {
    pub fn from_scored(scored: &ScoredOpportunity, corpus_version: &str) -> Self {
        Self {
            scoring: scored.dimension_scores,
            overall_score: scored.overall_score,
            gap_analysis: GapAnalysisResponse::from(&scored.gap_analysis),
            recommendations: scored.recommendations.clone(),
            opportunity_level: scored.opportunity_level,
            rationale: scored.rationale.clone(),
            corpus_version: corpus_version.to_string(),
            engine_version: ENGINE_VERSION.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScoreRequest {
    pub candidates: Vec<CandidateConcept>,
    #[serde(default)]
    pub reference_corpus: Option<Vec<ReferenceEntity>>,
    /// Keep only the top N after ranking.
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScoreResponse {
    pub results: Vec<ScoreResponse>,
}
