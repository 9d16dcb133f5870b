use thiserror::Error;

/// Input rejected before any computation. Always recoverable by fixing the input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("candidate description must not be empty")]
    EmptyDescription,
    #[error("invalid {field}: {value}")]
    InvalidField { field: &'static str, value: String },
    #[error("candidates[{index}]: {source}")]
    InvalidCandidate {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Misconfiguration detected at load time.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    #[error("scoring weight missing for dimension {0}")]
    MissingWeight(&'static str),
    #[error("unknown scoring weight key: {0}")]
    UnknownWeight(String),
    #[error("scoring weight for {dimension} must be non-negative (got {value})")]
    NegativeWeight { dimension: &'static str, value: f64 },
    #[error("scoring weights must sum to 1.0 (got {sum})")]
    WeightSum { sum: f64 },
    #[error("invalid threshold {name}: {value}")]
    InvalidThreshold { name: &'static str, value: String },
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },
    #[error("invalid scoring weights: {0}")]
    InvalidWeights(String),
    #[error("failed to read {path}: {reason}")]
    ReadFile { path: String, reason: String },
    #[error("failed to parse {path}: {reason}")]
    ParseFile { path: String, reason: String },
}

impl ValidationError {
    pub fn at_index(self, index: usize) -> Self {
        ValidationError::InvalidCandidate {
            index,
            source: Box::new(self),
        }
    }
}
