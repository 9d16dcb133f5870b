//! JSON request/response shapes shared by the HTTP server and the CLI.

pub mod gap_detect;
pub mod score;

pub use gap_detect::{GapAnalysisResponse, GapDetectRequest, SimilarStartup};
pub use score::{BatchScoreRequest, BatchScoreResponse, ScoreRequest, ScoreResponse};

/// Reported in every scoring response.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
