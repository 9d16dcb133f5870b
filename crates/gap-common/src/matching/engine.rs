use rayon::prelude::*;
use serde::Serialize;
use tracing::instrument;

use super::aggregate::{aggregate, rationale, Aggregate, OpportunityLevel};
use super::dimensions::{DimensionScorer, DimensionScores, RuleEvaluation};
use super::gap::{GapAnalysis, GapClassifier};
use crate::config::EngineConfig;
use crate::corpus::Corpus;
use crate::error::ValidationError;
use crate::CandidateConcept;

/// Outcome of one scoring call. Re-scoring builds a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredOpportunity {
    pub candidate: CandidateConcept,
    pub dimension_scores: DimensionScores,
    pub overall_score: u8,
    pub gap_analysis: GapAnalysis,
    pub recommendations: Vec<String>,
    pub opportunity_level: OpportunityLevel,
    pub rationale: String,
}

/// Configured once at startup and shared read-only across calls and threads.
#[derive(Debug, Clone)]
pub struct OpportunityEngine {
    config: EngineConfig,
    classifier: GapClassifier,
    scorer: DimensionScorer,
}

impl Default for OpportunityEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl OpportunityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            classifier: GapClassifier::new(config.gap.clone()),
            scorer: DimensionScorer::default(),
            config,
        }
    }

    pub fn with_scorer(mut self, scorer: DimensionScorer) -> Self {
        self.scorer = scorer;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[instrument(skip_all, fields(corpus = corpus.len()))]
    pub fn detect_gap(
        &self,
        description: &str,
        category: Option<&str>,
        corpus: &Corpus,
    ) -> Result<GapAnalysis, ValidationError> {
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(self.classifier.detect(description, category, corpus))
    }

    pub fn score_dimensions(&self, candidate: &CandidateConcept) -> DimensionScores {
        self.scorer.score(candidate)
    }

    /// Per-dimension scores with the labels of the rules that fired.
    pub fn explain(
        &self,
        candidate: &CandidateConcept,
    ) -> Result<Vec<RuleEvaluation>, ValidationError> {
        candidate.validate()?;
        Ok(self.scorer.explain(candidate))
    }

    pub fn aggregate(&self, scores: &DimensionScores) -> Aggregate {
        aggregate(scores, &self.config.weights, &self.config.bands)
    }

    #[instrument(skip_all, fields(title = %candidate.title, corpus = corpus.len()))]
    pub fn score(
        &self,
        candidate: &CandidateConcept,
        corpus: &Corpus,
    ) -> Result<ScoredOpportunity, ValidationError> {
        candidate.validate()?;

        let gap_analysis = self.classifier.detect_candidate(candidate, corpus);
        let dimension_scores = self.scorer.score(candidate);
        let Aggregate {
            overall_score,
            recommendations,
        } = self.aggregate(&dimension_scores);

        tracing::debug!(
            overall_score,
            is_gap = gap_analysis.is_gap,
            "candidate scored"
        );

        Ok(ScoredOpportunity {
            candidate: candidate.clone(),
            rationale: rationale(&dimension_scores, gap_analysis.is_gap),
            opportunity_level: OpportunityLevel::from_score(overall_score),
            dimension_scores,
            overall_score,
            gap_analysis,
            recommendations,
        })
    }

    /// Scores candidates in parallel; results stay in input order and every
    /// error carries the index of its candidate.
    #[instrument(skip_all, fields(candidates = candidates.len(), corpus = corpus.len()))]
    pub fn score_batch(
        &self,
        candidates: &[CandidateConcept],
        corpus: &Corpus,
    ) -> Vec<Result<ScoredOpportunity, ValidationError>> {
        candidates
            .par_iter()
            .enumerate()
            .map(|(index, candidate)| {
                self.score(candidate, corpus)
                    .map_err(|err| err.at_index(index))
            })
            .collect()
    }

    /// Validates the whole batch up front, then returns results ranked by
    /// overall score. Ties keep input order.
    pub fn rank(
        &self,
        candidates: &[CandidateConcept],
        corpus: &Corpus,
    ) -> Result<Vec<ScoredOpportunity>, ValidationError> {
        for (index, candidate) in candidates.iter().enumerate() {
            candidate.validate().map_err(|err| err.at_index(index))?;
        }

        let mut scored = self
            .score_batch(candidates, corpus)
            .into_iter()
            .collect::<Result<Vec<_>, _>>()?;
        scored.sort_by(|a, b| b.overall_score.cmp(&a.overall_score));
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReferenceEntity;

    fn engine() -> OpportunityEngine {
        OpportunityEngine::default()
    }

    fn candidate(description: &str) -> CandidateConcept {
        CandidateConcept::new("Test", description)
    }

    #[test]
    fn score_rejects_empty_description_before_work() {
        let result = engine().score(&candidate("  "), &Corpus::empty());
        assert_eq!(result, Err(ValidationError::EmptyDescription));
    }

    #[test]
    fn score_is_deterministic() {
        let corpus = Corpus::from_entities(vec![ReferenceEntity {
            id: "1".into(),
            name: "Dunzo".into(),
            description: "hyperlocal delivery app".into(),
            category: Some("Logistics".into()),
        }]);
        let concept = candidate("grocery delivery app for tier 2 cities").with_category("Logistics");

        let first = engine().score(&concept, &corpus).unwrap();
        let second = engine().score(&concept, &corpus).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.opportunity_level, OpportunityLevel::from_score(first.overall_score));
        assert!(first.recommendations.len() >= 1);
    }

    #[test]
    fn detect_gap_validates_description() {
        let corpus = Corpus::empty();
        assert_eq!(
            engine().detect_gap("", None, &corpus),
            Err(ValidationError::EmptyDescription)
        );
        let analysis = engine().detect_gap("drone spraying", None, &corpus).unwrap();
        assert!(analysis.is_gap);
    }

    #[test]
    fn batch_errors_carry_candidate_index() {
        let candidates = vec![candidate("invoice automation"), candidate("")];
        let results = engine().score_batch(&candidates, &Corpus::empty());

        assert!(results[0].is_ok());
        assert_eq!(
            results[1],
            Err(ValidationError::EmptyDescription.at_index(1))
        );
        assert_eq!(
            engine().rank(&candidates, &Corpus::empty()).unwrap_err().to_string(),
            "candidates[1]: candidate description must not be empty"
        );
    }

    #[test]
    fn rank_orders_by_overall_score_descending() {
        let candidates = vec![
            candidate("crypto lending on blockchain with hardware wallets"),
            candidate("AI invoicing software for small Indian businesses"),
            candidate("crypto lending on blockchain with hardware wallets"),
        ];
        let ranked = engine().rank(&candidates, &Corpus::empty()).unwrap();

        assert_eq!(ranked.len(), 3);
        assert!(ranked
            .windows(2)
            .all(|pair| pair[0].overall_score >= pair[1].overall_score));
        assert_eq!(ranked[0].candidate.description, candidates[1].description);
    }

    #[test]
    fn explain_reports_every_dimension() {
        let trace = engine()
            .explain(&candidate("marketplace with delivery"))
            .unwrap();
        assert_eq!(trace.len(), 7);
        assert!(engine().explain(&candidate("")).is_err());
    }
}
