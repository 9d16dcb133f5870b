//! Offline front-end for the scoring engine.
//!
//! ```bash
//! gap --corpus corpus.json detect "AI bookkeeping for kirana stores" --category Fintech
//! gap --corpus corpus.json score --input candidate.json
//! gap --corpus corpus.json rank --input candidates.json --limit 10
//! gap explain "Marketplace for physical furniture with doorstep delivery"
//! ```

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use gap_common::CandidateConcept;
use gap_common::api::{BatchScoreResponse, GapAnalysisResponse, ScoreResponse};
use gap_common::config::EngineConfig;
use gap_common::corpus::Corpus;
use gap_common::error::{ConfigurationError, ValidationError};
use gap_common::logging::init_tracing_subscriber;
use gap_common::matching::OpportunityEngine;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Parser)]
#[command(name = "gap")]
#[command(about = "Gap detection and opportunity scoring over local JSON files", long_about = None)]
struct Cli {
    /// JSON array of reference entities
    #[arg(long, env = "GAP_CORPUS_PATH", global = true)]
    corpus: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a description as gap or covered market
    Detect {
        description: String,

        #[arg(long)]
        category: Option<String>,
    },

    /// Score one candidate read from a JSON file
    Score {
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Score and rank a JSON array of candidates
    Rank {
        #[arg(short, long)]
        input: PathBuf,

        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show which rules fired for every dimension
    Explain {
        description: String,

        #[arg(long)]
        category: Option<String>,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn candidate_from_args(description: String, category: Option<String>) -> CandidateConcept {
    CandidateConcept {
        description,
        category,
        ..CandidateConcept::default()
    }
}

fn explain_table(engine: &OpportunityEngine, candidate: &CandidateConcept) -> Result<String, CliError> {
    let mut out = String::new();
    for evaluation in engine.explain(candidate)? {
        let fired = if evaluation.fired.is_empty() {
            "-".to_string()
        } else {
            evaluation.fired.join(", ")
        };
        let _ = writeln!(
            out,
            "{:<22} {:>3}  {}",
            evaluation.dimension.label(),
            evaluation.score,
            fired
        );
    }
    Ok(out)
}

fn execute(cli: Cli, engine: &OpportunityEngine) -> Result<String, CliError> {
    let corpus = match cli.corpus.as_deref() {
        Some(path) => Corpus::from_json_file(path)?,
        None => Corpus::empty(),
    };

    match cli.command {
        Commands::Detect {
            description,
            category,
        } => {
            let analysis = engine.detect_gap(&description, category.as_deref(), &corpus)?;
            Ok(serde_json::to_string_pretty(&GapAnalysisResponse::from(
                &analysis,
            ))?)
        }
        Commands::Score { input } => {
            let candidate: CandidateConcept = read_json(&input)?;
            let scored = engine.score(&candidate, &corpus)?;
            Ok(serde_json::to_string_pretty(&ScoreResponse::from_scored(
                &scored,
                corpus.version(),
            ))?)
        }
        Commands::Rank { input, limit } => {
            let candidates: Vec<CandidateConcept> = read_json(&input)?;
            let ranked = engine.rank(&candidates, &corpus)?;
            let results = ranked
                .iter()
                .take(limit.unwrap_or(ranked.len()))
                .map(|scored| ScoreResponse::from_scored(scored, corpus.version()))
                .collect();
            Ok(serde_json::to_string_pretty(&BatchScoreResponse {
                results,
            })?)
        }
        Commands::Explain {
            description,
            category,
        } => explain_table(engine, &candidate_from_args(description, category)),
    }
}

fn main() {
    dotenv().ok();
    init_tracing_subscriber(env!("CARGO_PKG_NAME"));

    let cli = Cli::parse();
    let result = EngineConfig::from_env()
        .map_err(CliError::from)
        .and_then(|config| execute(cli, &OpportunityEngine::new(config)));

    match result {
        Ok(output) => println!("{output}"),
        Err(err) => {
            tracing::error!(error = %err, "gap command failed");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}
