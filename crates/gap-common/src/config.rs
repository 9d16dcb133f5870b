use std::str::FromStr;

use serde::Serialize;

use crate::error::ConfigurationError;
use crate::matching::weights::ScoringWeights;

/// Thresholds of the gap classifier and similarity matcher.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapConfig {
    /// Highest similarity strictly below this is a gap.
    pub gap_threshold: u8,
    /// Highest similarity strictly above this is a saturated market.
    pub strong_similarity_threshold: u8,
    /// Flat bonus added when both categories match.
    pub category_bonus: f64,
    /// Records must score strictly above this to be listed as similar.
    pub similar_min_score: u8,
    pub max_similar: usize,
}

impl Default for GapConfig {
    fn default() -> Self {
        Self {
            gap_threshold: 60,
            strong_similarity_threshold: 80,
            category_bonus: 30.0,
            similar_min_score: 30,
            max_similar: 5,
        }
    }
}

/// Overall-score bands for the closing recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationBands {
    pub prioritize: u8,
    pub validate: u8,
}

impl Default for RecommendationBands {
    fn default() -> Self {
        Self {
            prioritize: 75,
            validate: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub weights: ScoringWeights,
    pub gap: GapConfig,
    pub bands: RecommendationBands,
}

fn env_value<T: FromStr>(key: &str) -> Result<Option<T>, ConfigurationError> {
    match std::env::var(key) {
        Ok(raw) if raw.trim().is_empty() => Ok(None),
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigurationError::InvalidEnv {
                key: key.to_string(),
                value: raw,
            }),
        Err(_) => Ok(None),
    }
}

fn load_weights_from_env() -> Result<ScoringWeights, ConfigurationError> {
    if let Ok(raw) = std::env::var("GAP_SCORING_WEIGHTS") {
        if !raw.trim().is_empty() {
            return ScoringWeights::from_json(&raw);
        }
    }

    if let Ok(path) = std::env::var("GAP_SCORING_WEIGHTS_FILE") {
        let raw =
            std::fs::read_to_string(&path).map_err(|err| ConfigurationError::ReadFile {
                path: path.clone(),
                reason: err.to_string(),
            })?;
        return ScoringWeights::from_json(&raw);
    }

    Ok(ScoringWeights::default())
}

impl EngineConfig {
    /// Reads overrides from the environment. Unparsable values fail instead of
    /// silently falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let defaults = GapConfig::default();
        let gap = GapConfig {
            gap_threshold: env_value("GAP_THRESHOLD")?.unwrap_or(defaults.gap_threshold),
            strong_similarity_threshold: env_value("GAP_STRONG_SIMILARITY_THRESHOLD")?
                .unwrap_or(defaults.strong_similarity_threshold),
            category_bonus: env_value("GAP_CATEGORY_BONUS")?.unwrap_or(defaults.category_bonus),
            similar_min_score: env_value("GAP_SIMILAR_MIN_SCORE")?
                .unwrap_or(defaults.similar_min_score),
            max_similar: env_value("GAP_MAX_SIMILAR")?.unwrap_or(defaults.max_similar),
        };

        let default_bands = RecommendationBands::default();
        let bands = RecommendationBands {
            prioritize: env_value("GAP_PRIORITIZE_THRESHOLD")?
                .unwrap_or(default_bands.prioritize),
            validate: env_value("GAP_VALIDATE_THRESHOLD")?.unwrap_or(default_bands.validate),
        };

        let config = Self {
            weights: load_weights_from_env()?,
            gap,
            bands,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let percent = |name: &'static str, value: u8| {
            if value > 100 {
                Err(ConfigurationError::InvalidThreshold {
                    name,
                    value: value.to_string(),
                })
            } else {
                Ok(())
            }
        };

        percent("gap_threshold", self.gap.gap_threshold)?;
        percent(
            "strong_similarity_threshold",
            self.gap.strong_similarity_threshold,
        )?;
        percent("similar_min_score", self.gap.similar_min_score)?;
        percent("prioritize", self.bands.prioritize)?;
        percent("validate", self.bands.validate)?;

        if !self.gap.category_bonus.is_finite() || self.gap.category_bonus < 0.0 {
            return Err(ConfigurationError::InvalidThreshold {
                name: "category_bonus",
                value: self.gap.category_bonus.to_string(),
            });
        }

        if self.bands.validate > self.bands.prioritize {
            return Err(ConfigurationError::InvalidThreshold {
                name: "validate",
                value: format!(
                    "{} exceeds prioritize threshold {}",
                    self.bands.validate, self.bands.prioritize
                ),
            });
        }

        Ok(())
    }
}
