use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::dimensions::Dimension;
use crate::error::ConfigurationError;

/// Allowed drift of the weight sum from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Per-dimension weights for the overall score.
///
/// Only constructible through validation, so a value of this type always
/// covers all seven dimensions with non-negative weights summing to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringWeights {
    cultural_fit: f64,
    logistics_complexity: f64,
    payment_readiness: f64,
    timing_alignment: f64,
    monopoly_potential: f64,
    regulatory_risk: f64,
    execution_feasibility: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cultural_fit: 0.15,
            logistics_complexity: 0.15,
            payment_readiness: 0.15,
            timing_alignment: 0.15,
            monopoly_potential: 0.10,
            regulatory_risk: 0.15,
            execution_feasibility: 0.15,
        }
    }
}

impl ScoringWeights {
    /// Builds weights from a dimension-name → weight mapping.
    pub fn from_map(map: &BTreeMap<String, f64>) -> Result<Self, ConfigurationError> {
        for key in map.keys() {
            Dimension::from_str(key)
                .map_err(|_| ConfigurationError::UnknownWeight(key.clone()))?;
        }

        let mut values = [0.0_f64; 7];
        for (slot, dimension) in values.iter_mut().zip(Dimension::ALL) {
            let value = *map
                .get(dimension.name())
                .ok_or(ConfigurationError::MissingWeight(dimension.name()))?;
            if value.is_nan() || value < 0.0 {
                return Err(ConfigurationError::NegativeWeight {
                    dimension: dimension.name(),
                    value,
                });
            }
            *slot = value;
        }

        let weights = Self {
            cultural_fit: values[0],
            logistics_complexity: values[1],
            payment_readiness: values[2],
            timing_alignment: values[3],
            monopoly_potential: values[4],
            regulatory_risk: values[5],
            execution_feasibility: values[6],
        };

        let sum = weights.sum();
        if !sum.is_finite() || (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigurationError::WeightSum { sum });
        }

        Ok(weights)
    }

    /// Parses a JSON object such as `{"culturalFit": 0.15, ...}`.
    pub fn from_json(raw: &str) -> Result<Self, ConfigurationError> {
        let map: BTreeMap<String, f64> =
            serde_json::from_str(raw)
                .map_err(|err| ConfigurationError::InvalidWeights(err.to_string()))?;
        Self::from_map(&map)
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::CulturalFit => self.cultural_fit,
            Dimension::LogisticsComplexity => self.logistics_complexity,
            Dimension::PaymentReadiness => self.payment_readiness,
            Dimension::TimingAlignment => self.timing_alignment,
            Dimension::MonopolyPotential => self.monopoly_potential,
            Dimension::RegulatoryRisk => self.regulatory_risk,
            Dimension::ExecutionFeasibility => self.execution_feasibility,
        }
    }

    pub fn sum(&self) -> f64 {
        Dimension::ALL.iter().map(|d| self.get(*d)).sum()
    }

    pub fn to_map(&self) -> BTreeMap<String, f64> {
        Dimension::ALL
            .iter()
            .map(|d| (d.name().to_string(), self.get(*d)))
            .collect()
    }
}

impl<'de> Deserialize<'de> for ScoringWeights {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let map = BTreeMap::<String, f64>::deserialize(deserializer)?;
        Self::from_map(&map).map_err(serde::de::Error::custom)
    }
}
