pub mod aggregate;
pub mod dimensions;
pub mod engine;
pub mod gap;
pub mod similarity;
pub mod weights;

pub use aggregate::{aggregate, rationale, Aggregate, OpportunityLevel};
pub use dimensions::{Dimension, DimensionScorer, DimensionScores, RuleEvaluation};
pub use engine::{OpportunityEngine, ScoredOpportunity};
pub use gap::{GapAnalysis, GapClassifier};
pub use similarity::{similarity, SimilarityRecord};
pub use weights::ScoringWeights;
