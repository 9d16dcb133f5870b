use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::CandidateConcept;

/// The seven feasibility axes.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Dimension {
    CulturalFit,
    LogisticsComplexity,
    PaymentReadiness,
    TimingAlignment,
    MonopolyPotential,
    RegulatoryRisk,
    ExecutionFeasibility,
}

impl Dimension {
    pub const ALL: [Dimension; 7] = [
        Dimension::CulturalFit,
        Dimension::LogisticsComplexity,
        Dimension::PaymentReadiness,
        Dimension::TimingAlignment,
        Dimension::MonopolyPotential,
        Dimension::RegulatoryRisk,
        Dimension::ExecutionFeasibility,
    ];

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Human readable label, e.g. "Cultural Fit".
    pub fn label(self) -> &'static str {
        match self {
            Dimension::CulturalFit => "Cultural Fit",
            Dimension::LogisticsComplexity => "Logistics Complexity",
            Dimension::PaymentReadiness => "Payment Readiness",
            Dimension::TimingAlignment => "Timing Alignment",
            Dimension::MonopolyPotential => "Monopoly Potential",
            Dimension::RegulatoryRisk => "Regulatory Risk",
            Dimension::ExecutionFeasibility => "Execution Feasibility",
        }
    }

    pub fn lower_is_better(self) -> bool {
        matches!(
            self,
            Dimension::LogisticsComplexity | Dimension::RegulatoryRisk
        )
    }
}

/// Per-dimension scores, each in `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    pub cultural_fit: u8,
    pub logistics_complexity: u8,
    pub payment_readiness: u8,
    pub timing_alignment: u8,
    pub monopoly_potential: u8,
    pub regulatory_risk: u8,
    pub execution_feasibility: u8,
}

impl DimensionScores {
    pub fn from_fn(mut f: impl FnMut(Dimension) -> u8) -> Self {
        Self {
            cultural_fit: f(Dimension::CulturalFit),
            logistics_complexity: f(Dimension::LogisticsComplexity),
            payment_readiness: f(Dimension::PaymentReadiness),
            timing_alignment: f(Dimension::TimingAlignment),
            monopoly_potential: f(Dimension::MonopolyPotential),
            regulatory_risk: f(Dimension::RegulatoryRisk),
            execution_feasibility: f(Dimension::ExecutionFeasibility),
        }
    }

    pub fn get(&self, dimension: Dimension) -> u8 {
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

    pub fn with(mut self, dimension: Dimension, value: u8) -> Self {
        let slot = match dimension {
            Dimension::CulturalFit => &mut self.cultural_fit,
            Dimension::LogisticsComplexity => &mut self.logistics_complexity,
            Dimension::PaymentReadiness => &mut self.payment_readiness,
            Dimension::TimingAlignment => &mut self.timing_alignment,
            Dimension::MonopolyPotential => &mut self.monopoly_potential,
            Dimension::RegulatoryRisk => &mut self.regulatory_risk,
            Dimension::ExecutionFeasibility => &mut self.execution_feasibility,
        };
        *slot = value.min(100);
        self
    }

    /// Score where higher always means more favourable.
    pub fn favourability(&self, dimension: Dimension) -> u8 {
        let raw = self.get(dimension);
        if dimension.lower_is_better() {
            100 - raw.min(100)
        } else {
            raw
        }
    }
}

/// Lowercased description + category, punctuation turned into word gaps and
/// padded with spaces so phrase lookups can require whole-word boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringText(String);

impl ScoringText {
    pub fn new(text: &str) -> Self {
        let words: Vec<String> = text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect();
        Self(format!(" {} ", words.join(" ")))
    }

    pub fn for_candidate(candidate: &CandidateConcept) -> Self {
        match candidate.category() {
            Some(category) => Self::new(&format!("{} {}", candidate.description, category)),
            None => Self::new(&candidate.description),
        }
    }

    /// True when `phrase` occurs as a run of whole words.
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let haystack = self.0.as_bytes();
        self.0.match_indices(phrase).any(|(start, _)| {
            let end = start + phrase.len();
            start > 0 && haystack[start - 1] == b' ' && haystack.get(end) == Some(&b' ')
        })
    }
}

/// Keyword predicate of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Any(&'static [&'static str]),
    All(&'static [&'static str]),
}

impl Trigger {
    pub fn matches(&self, text: &ScoringText) -> bool {
        match self {
            Trigger::Any(phrases) => phrases.iter().any(|phrase| text.contains_phrase(phrase)),
            Trigger::All(phrases) => {
                !phrases.is_empty() && phrases.iter().all(|phrase| text.contains_phrase(phrase))
            }
        }
    }
}

/// What a firing rule does to the running score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Add(i32),
    Set(i32),
}

impl Effect {
    pub fn apply(self, current: i32) -> i32 {
        match self {
            Effect::Add(delta) => current + delta,
            Effect::Set(value) => value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule {
    pub label: &'static str,
    pub trigger: Trigger,
    pub effect: Effect,
}

impl Rule {
    pub const fn add(label: &'static str, trigger: Trigger, delta: i32) -> Self {
        Self {
            label,
            trigger,
            effect: Effect::Add(delta),
        }
    }

    pub const fn set(label: &'static str, trigger: Trigger, value: i32) -> Self {
        Self {
            label,
            trigger,
            effect: Effect::Set(value),
        }
    }
}

/// Baseline plus ordered rules for one dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    pub dimension: Dimension,
    pub baseline: i32,
    pub rules: &'static [Rule],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleEvaluation {
    pub dimension: Dimension,
    pub score: u8,
    pub fired: Vec<&'static str>,
}

impl RuleTable {
    /// Folds every matching rule over the baseline in table order, then clamps.
    pub fn evaluate(&self, text: &ScoringText) -> RuleEvaluation {
        let fired: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| rule.trigger.matches(text))
            .collect();

        let raw = fired
            .iter()
            .fold(self.baseline, |score, rule| rule.effect.apply(score));

        RuleEvaluation {
            dimension: self.dimension,
            score: raw.clamp(0, 100) as u8,
            fired: fired.iter().map(|rule| rule.label).collect(),
        }
    }
}

pub const CULTURAL_FIT_RULES: &[Rule] = &[
    Rule::add(
        "regional market terms",
        Trigger::Any(&[
            "india", "indian", "bharat", "hindi", "vernacular", "regional", "tier 2", "tier 3",
            "gst", "upi", "rupee", "kirana",
        ]),
        15,
    ),
    Rule::add(
        "small business focus",
        Trigger::Any(&[
            "small", "smb", "smbs", "sme", "smes", "msme", "msmes", "shopkeeper", "shopkeepers",
            "merchant", "merchants",
        ]),
        10,
    ),
    Rule::add(
        "everyday habits with local precedent",
        Trigger::Any(&["payments", "shopping", "food", "education", "mobility", "healthcare"]),
        5,
    ),
    Rule::add(
        "cultural barriers",
        Trigger::Any(&["dating", "pet", "pets", "alcohol", "subscription box"]),
        -15,
    ),
    Rule::add(
        "western concepts needing adaptation",
        Trigger::Any(&["gym membership", "meal kit", "home security", "elderly care", "tipping"]),
        -10,
    ),
];

pub const LOGISTICS_COMPLEXITY_RULES: &[Rule] = &[
    Rule::add(
        "purely digital delivery",
        Trigger::Any(&["saas", "software", "api", "digital", "online", "app"]),
        -15,
    ),
    Rule::set(
        "last mile delivery",
        Trigger::Any(&["delivery", "deliveries", "last mile", "courier", "shipping"]),
        80,
    ),
    Rule::set(
        "physical operations",
        Trigger::Any(&[
            "physical", "warehouse", "inventory", "hardware", "manufacturing", "offline",
        ]),
        70,
    ),
    Rule::set(
        "marketplace intermediation",
        Trigger::Any(&["marketplace", "marketplaces"]),
        60,
    ),
    Rule::add(
        "connected devices",
        Trigger::Any(&["iot", "smart home", "cold chain"]),
        10,
    ),
];

pub const PAYMENT_READINESS_RULES: &[Rule] = &[
    Rule::add(
        "business buyers",
        Trigger::Any(&[
            "b2b", "enterprise", "enterprises", "business", "businesses", "sme", "smes", "msme",
            "saas",
        ]),
        15,
    ),
    Rule::add(
        "consumer buyers",
        Trigger::Any(&["b2c", "consumer", "consumers", "individual", "individuals"]),
        -10,
    ),
    Rule::add(
        "money movement categories",
        Trigger::Any(&["fintech", "payments", "upi", "insurance", "invoicing"]),
        5,
    ),
    Rule::add(
        "low willingness to pay categories",
        Trigger::Any(&["social media", "entertainment", "gaming", "dating", "lifestyle"]),
        -15,
    ),
    Rule::add(
        "free tier expectations",
        Trigger::Any(&["free", "freemium", "ad supported"]),
        -10,
    ),
];

pub const TIMING_ALIGNMENT_RULES: &[Rule] = &[
    Rule::add(
        "ripe categories",
        Trigger::Any(&["ai", "automation", "saas", "fintech", "upi", "gst"]),
        10,
    ),
    Rule::add(
        "saturated categories",
        Trigger::Any(&[
            "food delivery", "ride sharing", "edtech", "ecommerce", "quick commerce",
        ]),
        -20,
    ),
    Rule::add(
        "early categories",
        Trigger::Any(&[
            "climate tech", "space tech", "synthetic biology", "quantum", "metaverse",
        ]),
        -10,
    ),
    Rule::add(
        "policy tailwinds",
        Trigger::Any(&["compliance", "ondc", "account aggregator", "digital india"]),
        5,
    ),
];

pub const MONOPOLY_POTENTIAL_RULES: &[Rule] = &[
    Rule::add(
        "network effects",
        Trigger::Any(&["marketplace", "network", "platform", "community"]),
        15,
    ),
    Rule::add(
        "data moats",
        Trigger::Any(&["ai", "ml", "machine learning", "algorithm", "data"]),
        10,
    ),
    Rule::add(
        "switching costs",
        Trigger::Any(&["workflow", "integration", "integrations", "embedded", "erp"]),
        10,
    ),
    Rule::add(
        "commoditized offering",
        Trigger::Any(&["generic", "simple", "basic", "reseller"]),
        -15,
    ),
];

pub const REGULATORY_RISK_RULES: &[Rule] = &[
    Rule::add(
        "regulated industry",
        Trigger::Any(&[
            "fintech", "lending", "loan", "loans", "crypto", "blockchain", "healthcare",
            "pharmacy", "insurance", "gambling", "betting", "telemedicine",
        ]),
        30,
    ),
    Rule::add(
        "tax and compliance obligations",
        Trigger::Any(&["gst", "kyc", "compliance", "tax"]),
        10,
    ),
    Rule::add(
        "sensitive personal data",
        Trigger::Any(&["personal data", "health records", "biometric", "aadhaar"]),
        15,
    ),
    Rule::add(
        "lightly regulated tooling",
        Trigger::Any(&["productivity", "developer tools", "design tool"]),
        -10,
    ),
];

pub const EXECUTION_FEASIBILITY_RULES: &[Rule] = &[
    Rule::add(
        "deep tech",
        Trigger::Any(&[
            "blockchain", "crypto", "quantum", "robotics", "biotech", "semiconductor",
        ]),
        -20,
    ),
    Rule::add(
        "capital intensive",
        Trigger::Any(&["hardware", "physical", "manufacturing", "fleet", "warehouse"]),
        -15,
    ),
    Rule::add(
        "simple scope",
        Trigger::Any(&["simple", "basic", "straightforward", "no code"]),
        10,
    ),
    Rule::add(
        "software talent pool",
        Trigger::Any(&["ai", "ml", "software", "mobile", "app", "saas", "tool"]),
        10,
    ),
    Rule::add(
        "licence gated",
        Trigger::Any(&["lending", "nbfc", "banking licence", "banking license", "insurance"]),
        -10,
    ),
];

/// The shipped rule book, one table per dimension.
pub fn default_rule_tables() -> Vec<RuleTable> {
    vec![
        RuleTable {
            dimension: Dimension::CulturalFit,
            baseline: 70,
            rules: CULTURAL_FIT_RULES,
        },
        RuleTable {
            dimension: Dimension::LogisticsComplexity,
            baseline: 40,
            rules: LOGISTICS_COMPLEXITY_RULES,
        },
        RuleTable {
            dimension: Dimension::PaymentReadiness,
            baseline: 60,
            rules: PAYMENT_READINESS_RULES,
        },
        RuleTable {
            dimension: Dimension::TimingAlignment,
            baseline: 65,
            rules: TIMING_ALIGNMENT_RULES,
        },
        RuleTable {
            dimension: Dimension::MonopolyPotential,
            baseline: 60,
            rules: MONOPOLY_POTENTIAL_RULES,
        },
        RuleTable {
            dimension: Dimension::RegulatoryRisk,
            baseline: 30,
            rules: REGULATORY_RISK_RULES,
        },
        RuleTable {
            dimension: Dimension::ExecutionFeasibility,
            baseline: 70,
            rules: EXECUTION_FEASIBILITY_RULES,
        },
    ]
}

#[derive(Debug, Clone)]
pub struct DimensionScorer {
    tables: Vec<RuleTable>,
}

impl Default for DimensionScorer {
    fn default() -> Self {
        Self::new(default_rule_tables())
    }
}

impl DimensionScorer {
    pub fn new(tables: Vec<RuleTable>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &[RuleTable] {
        &self.tables
    }

    /// Evaluates every table against the candidate text. A dimension without a
    /// table is reported at zero.
    pub fn explain(&self, candidate: &CandidateConcept) -> Vec<RuleEvaluation> {
        let text = ScoringText::for_candidate(candidate);
        Dimension::ALL
            .iter()
            .map(|dimension| {
                self.tables
                    .iter()
                    .find(|table| table.dimension == *dimension)
                    .map(|table| table.evaluate(&text))
                    .unwrap_or(RuleEvaluation {
                        dimension: *dimension,
                        score: 0,
                        fired: Vec::new(),
                    })
            })
            .collect()
    }

    pub fn score(&self, candidate: &CandidateConcept) -> DimensionScores {
        let evaluations = self.explain(candidate);
        DimensionScores::from_fn(|dimension| {
            evaluations
                .iter()
                .find(|evaluation| evaluation.dimension == dimension)
                .map(|evaluation| evaluation.score)
                .unwrap_or(0)
        })
    }
}
