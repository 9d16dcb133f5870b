use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use super::dimensions::{Dimension, DimensionScores};
use super::weights::ScoringWeights;
use crate::config::RecommendationBands;

/// Coarse bucket of the overall score.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, AsRefStr, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OpportunityLevel {
    VeryLow,
    Low,
    Medium,
    High,
}

impl OpportunityLevel {
    pub fn from_score(overall: u8) -> Self {
        match overall {
            70.. => OpportunityLevel::High,
            50..=69 => OpportunityLevel::Medium,
            30..=49 => OpportunityLevel::Low,
            _ => OpportunityLevel::VeryLow,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Threshold {
    Below(u8),
    Above(u8),
}

/// Emits its advice when one raw dimension crosses a threshold.
#[derive(Debug, Clone, Copy)]
pub struct RecommendationRule {
    dimension: Dimension,
    threshold: Threshold,
    pub advice: &'static str,
}

impl RecommendationRule {
    pub fn applies(&self, scores: &DimensionScores) -> bool {
        let value = scores.get(self.dimension);
        match self.threshold {
            Threshold::Below(limit) => value < limit,
            Threshold::Above(limit) => value > limit,
        }
    }
}

/// Evaluated in order; output order follows this table.
pub const RECOMMENDATION_RULES: &[RecommendationRule] = &[
    RecommendationRule {
        dimension: Dimension::CulturalFit,
        threshold: Threshold::Below(70),
        advice: "Research local customer habits and adapt the product for regional languages and preferences.",
    },
    RecommendationRule {
        dimension: Dimension::PaymentReadiness,
        threshold: Threshold::Below(60),
        advice: "Revisit the monetization model: test pricing, freemium tiers or B2B sales before scaling.",
    },
    RecommendationRule {
        dimension: Dimension::RegulatoryRisk,
        threshold: Threshold::Above(60),
        advice: "Engage legal counsel early to map licensing and compliance requirements.",
    },
    RecommendationRule {
        dimension: Dimension::ExecutionFeasibility,
        threshold: Threshold::Below(60),
        advice: "Scope a minimal MVP that proves the core value with a small team and budget.",
    },
    RecommendationRule {
        dimension: Dimension::LogisticsComplexity,
        threshold: Threshold::Above(70),
        advice: "Plan a phased rollout, starting in one city before expanding the operational footprint.",
    },
    RecommendationRule {
        dimension: Dimension::TimingAlignment,
        threshold: Threshold::Below(50),
        advice: "Reassess market timing and track the signals that would indicate demand is forming.",
    },
    RecommendationRule {
        dimension: Dimension::MonopolyPotential,
        threshold: Threshold::Below(50),
        advice: "Identify a defensible moat such as proprietary data, network effects or deep integrations.",
    },
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregate {
    pub overall_score: u8,
    pub recommendations: Vec<String>,
}

/// Raw score as it enters the weighted sum. Only regulatory risk is inverted;
/// logistics complexity is weighted as scored.
fn weighted_input(scores: &DimensionScores, dimension: Dimension) -> f64 {
    let raw = scores.get(dimension) as f64;
    match dimension {
        Dimension::RegulatoryRisk => 100.0 - raw,
        _ => raw,
    }
}

pub fn overall_score(scores: &DimensionScores, weights: &ScoringWeights) -> u8 {
    let total: f64 = Dimension::ALL
        .iter()
        .map(|dimension| weighted_input(scores, *dimension) * weights.get(*dimension))
        .sum();
    total.round().clamp(0.0, 100.0) as u8
}

fn closing_recommendation(overall: u8, bands: &RecommendationBands) -> String {
    if overall >= bands.prioritize {
        format!("Prioritize: overall score {overall} indicates a strong opportunity worth pursuing now.")
    } else if overall >= bands.validate {
        format!("Validate: overall score {overall} is promising; run customer interviews before committing.")
    } else {
        format!("Reconsider: overall score {overall} suggests significant obstacles in this market.")
    }
}

/// Weighted overall score plus ordered recommendations ending in exactly one
/// closing line.
pub fn aggregate(
    scores: &DimensionScores,
    weights: &ScoringWeights,
    bands: &RecommendationBands,
) -> Aggregate {
    let overall = overall_score(scores, weights);

    let mut recommendations: Vec<String> = RECOMMENDATION_RULES
        .iter()
        .filter(|rule| rule.applies(scores))
        .map(|rule| rule.advice.to_string())
        .collect();
    recommendations.push(closing_recommendation(overall, bands));

    Aggregate {
        overall_score: overall,
        recommendations,
    }
}

/// One line naming the most and least favourable dimensions.
pub fn rationale(scores: &DimensionScores, is_gap: bool) -> String {
    // max_by_key / min_by_key keep the last / first extreme; iterate so that
    // ties resolve to the earliest dimension in both cases
    let strongest = Dimension::ALL
        .iter()
        .rev()
        .max_by_key(|dimension| scores.favourability(**dimension))
        .copied()
        .unwrap_or(Dimension::CulturalFit);
    let weakest = Dimension::ALL
        .iter()
        .min_by_key(|dimension| scores.favourability(**dimension))
        .copied()
        .unwrap_or(Dimension::CulturalFit);

    let verdict = if is_gap {
        "addresses an unmet need in the regional market"
    } else {
        "faces existing regional competition"
    };

    format!(
        "Strongest on {} ({}), weakest on {} ({}); the concept {verdict}.",
        strongest.label(),
        scores.get(strongest),
        weakest.label(),
        scores.get(weakest),
    )
}
