//! Buyer-fit qualification scoring.
//!
//! Eight weighted signals are evaluated against the seller's targeting
//! criteria, the buyer's profile, and the latest email text. Weights and
//! recommendation thresholds are configuration, loaded through the
//! `[scoring]` section; the weight table must sum to 100.

mod engine;
mod keywords;

pub use engine::FitScorer;
pub use keywords::{
    mentions_decision_maker, mentions_intent, mentions_near_term, mentions_urgency,
};

use serde::Serialize;
use thiserror::Error;

/// A signal's per-evaluation value at or above this counts as "matched".
pub const MATCHED_VALUE: f64 = 0.7;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    IndustryMatch,
    CompanySize,
    GeographicMatch,
    NeedIntent,
    Timing,
    BudgetRange,
    Authority,
    StackCompatibility,
}

impl SignalKind {
    pub const ALL: [SignalKind; 8] = [
        Self::IndustryMatch,
        Self::CompanySize,
        Self::GeographicMatch,
        Self::NeedIntent,
        Self::Timing,
        Self::BudgetRange,
        Self::Authority,
        Self::StackCompatibility,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::IndustryMatch => "industry_match",
            Self::CompanySize => "company_size",
            Self::GeographicMatch => "geographic_match",
            Self::NeedIntent => "need_intent",
            Self::Timing => "timing",
            Self::BudgetRange => "budget_range",
            Self::Authority => "authority",
            Self::StackCompatibility => "stack_compatibility",
        }
    }
}

/// Static weight per signal. The defaults are the product-approved table;
/// overrides come from config and are validated to keep the 100 total.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SignalWeights {
    pub industry_match: u8,
    pub company_size: u8,
    pub geographic_match: u8,
    pub need_intent: u8,
    pub timing: u8,
    pub budget_range: u8,
    pub authority: u8,
    pub stack_compatibility: u8,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            industry_match: 20,
            company_size: 15,
            geographic_match: 10,
            need_intent: 15,
            timing: 10,
            budget_range: 15,
            authority: 10,
            stack_compatibility: 5,
        }
    }
}

impl SignalWeights {
    pub fn weight_of(&self, kind: SignalKind) -> u8 {
        match kind {
            SignalKind::IndustryMatch => self.industry_match,
            SignalKind::CompanySize => self.company_size,
            SignalKind::GeographicMatch => self.geographic_match,
            SignalKind::NeedIntent => self.need_intent,
            SignalKind::Timing => self.timing,
            SignalKind::BudgetRange => self.budget_range,
            SignalKind::Authority => self.authority,
            SignalKind::StackCompatibility => self.stack_compatibility,
        }
    }

    pub fn total(&self) -> u32 {
        SignalKind::ALL.iter().map(|kind| u32::from(self.weight_of(*kind))).sum()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ScoringConfig {
    pub weights: SignalWeights,
    /// Overall score at or above this proposes a meeting.
    pub propose_threshold: u8,
    /// Overall score at or above this (but below propose) asks to clarify.
    pub clarify_threshold: u8,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { weights: SignalWeights::default(), propose_threshold: 75, clarify_threshold: 50 }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringConfigError {
    #[error("scoring weights must sum to 100, got {0}")]
    WeightSum(u32),
    #[error("scoring thresholds must satisfy clarify < propose <= 100, got clarify={clarify} propose={propose}")]
    ThresholdOrder { clarify: u8, propose: u8 },
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), ScoringConfigError> {
        let total = self.weights.total();
        if total != 100 {
            return Err(ScoringConfigError::WeightSum(total));
        }
        if self.clarify_threshold >= self.propose_threshold || self.propose_threshold > 100 {
            return Err(ScoringConfigError::ThresholdOrder {
                clarify: self.clarify_threshold,
                propose: self.propose_threshold,
            });
        }
        Ok(())
    }
}

/// What the seller is hunting for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SellerCriteria {
    pub industries: Vec<String>,
    pub company_size_min: u32,
    pub company_size_max: u32,
    pub geographies: Vec<String>,
    pub budget_min: u32,
    pub budget_max: u32,
    pub required_stack: Option<Vec<String>>,
}

/// What is known about the buyer. Optional fields feed `missing_info`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuyerProfile {
    pub industry: String,
    pub company_size: u32,
    pub location: String,
    pub budget: Option<u32>,
    pub stack: Option<Vec<String>>,
    pub timing: Option<String>,
    pub authority: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignalScore {
    pub kind: SignalKind,
    pub weight: u8,
    pub value: f64,
    pub matched: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    ProposeMeeting,
    Clarify,
    Decline,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProposeMeeting => "propose_meeting",
            Self::Clarify => "clarify",
            Self::Decline => "decline",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    Budget,
    Timing,
    Authority,
    TechStack,
}

impl MissingField {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Budget => "budget",
            Self::Timing => "timing",
            Self::Authority => "authority",
            Self::TechStack => "tech stack",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FitReport {
    pub overall: u8,
    pub signals: Vec<SignalScore>,
    pub recommendation: Recommendation,
    pub missing_info: Vec<MissingField>,
}

#[cfg(test)]
mod tests {
    use super::{ScoringConfig, ScoringConfigError, SignalKind, SignalWeights};

    #[test]
    fn default_weights_sum_to_one_hundred() {
        assert_eq!(SignalWeights::default().total(), 100);
        assert!(ScoringConfig::default().validate().is_ok());
    }

    #[test]
    fn unbalanced_weights_are_rejected() {
        let mut config = ScoringConfig::default();
        config.weights.industry_match = 25;
        assert_eq!(config.validate(), Err(ScoringConfigError::WeightSum(105)));
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let config = ScoringConfig {
            propose_threshold: 40,
            clarify_threshold: 60,
            ..ScoringConfig::default()
        };
        assert!(matches!(config.validate(), Err(ScoringConfigError::ThresholdOrder { .. })));
    }

    #[test]
    fn every_signal_has_a_weight_entry() {
        let weights = SignalWeights::default();
        for kind in SignalKind::ALL {
            assert!(weights.weight_of(kind) > 0, "{} should carry weight", kind.name());
        }
    }
}
