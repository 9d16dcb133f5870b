use rayon::prelude::*;
use serde::Serialize;

use super::similarity::{similarity, SimilarityRecord};
use crate::config::GapConfig;
use crate::corpus::Corpus;
use crate::keywords::{extract_keywords, KeywordSet};
use crate::{CandidateConcept, ReferenceEntity};

/// Whether a candidate fills an unmet need in the reference corpus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub is_gap: bool,
    /// `100 - highest_similarity`
    pub confidence_score: u8,
    pub highest_similarity: u8,
    /// Descending by score, at most `max_similar` entries.
    pub similar_startups: Vec<SimilarityRecord>,
    pub recommendation: String,
}

#[derive(Debug, Clone, Default)]
pub struct GapClassifier {
    config: GapConfig,
}

impl GapClassifier {
    pub fn new(config: GapConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GapConfig {
        &self.config
    }

    /// Scores every entity against the candidate, descending by score.
    ///
    /// Ties keep corpus order.
    pub fn rank_similar(
        &self,
        candidate_keywords: &KeywordSet,
        candidate_category: Option<&str>,
        entities: &[ReferenceEntity],
        entity_keywords: &[KeywordSet],
    ) -> Vec<SimilarityRecord> {
        let mut records: Vec<SimilarityRecord> = entities
            .par_iter()
            .zip(entity_keywords.par_iter())
            .map(|(entity, keywords)| SimilarityRecord {
                score: similarity(
                    candidate_keywords,
                    candidate_category,
                    keywords,
                    entity.category.as_deref(),
                    self.config.category_bonus,
                ),
                reference: entity.clone(),
            })
            .collect();

        // stable: equal scores stay in corpus order
        records.sort_by(|a, b| b.score.cmp(&a.score));
        records
    }

    /// Classifies against a prepared corpus, reusing its extracted keywords.
    pub fn detect(&self, description: &str, category: Option<&str>, corpus: &Corpus) -> GapAnalysis {
        let candidate_keywords = extract_keywords(description);
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let ranked = self.rank_similar(
            &candidate_keywords,
            category,
            corpus.entities(),
            corpus.keywords(),
        );
        self.classify(ranked)
    }

    pub fn detect_candidate(&self, candidate: &CandidateConcept, corpus: &Corpus) -> GapAnalysis {
        self.detect(&candidate.description, candidate.category(), corpus)
    }

    /// Classifies against an ad-hoc list of entities.
    pub fn detect_gap(
        &self,
        description: &str,
        category: Option<&str>,
        entities: &[ReferenceEntity],
    ) -> GapAnalysis {
        let candidate_keywords = extract_keywords(description);
        let entity_keywords: Vec<KeywordSet> = entities
            .par_iter()
            .map(|entity| extract_keywords(&entity.description))
            .collect();
        let category = category.map(str::trim).filter(|c| !c.is_empty());
        let ranked = self.rank_similar(&candidate_keywords, category, entities, &entity_keywords);
        self.classify(ranked)
    }

    fn classify(&self, ranked: Vec<SimilarityRecord>) -> GapAnalysis {
        let highest_similarity = ranked.first().map(|record| record.score).unwrap_or(0);
        let is_gap = highest_similarity < self.config.gap_threshold;
        let confidence_score = 100 - highest_similarity.min(100);

        let recommendation = if is_gap {
            format!(
                "Strong opportunity: no close equivalent exists in the regional market \
                 ({confidence_score}% confidence)."
            )
        } else if highest_similarity > self.config.strong_similarity_threshold {
            let leader = ranked
                .first()
                .map(|record| record.reference.name.as_str())
                .unwrap_or_default();
            format!(
                "Market appears saturated: {leader} already offers a very similar product. \
                 Differentiate before entering."
            )
        } else {
            format!(
                "Moderate opportunity: similar players exist, but there is room for a \
                 differentiated or regionally adapted offering ({confidence_score}% confidence)."
            )
        };

        let similar_startups: Vec<SimilarityRecord> = ranked
            .into_iter()
            .filter(|record| record.score > self.config.similar_min_score)
            .take(self.config.max_similar)
            .collect();

        tracing::debug!(
            is_gap,
            highest_similarity,
            similar = similar_startups.len(),
            "gap classified"
        );

        GapAnalysis {
            is_gap,
            confidence_score,
            highest_similarity,
            similar_startups,
            recommendation,
        }
    }
}
