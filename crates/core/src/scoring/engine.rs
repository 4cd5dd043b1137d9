use super::keywords::{
    mentions_decision_maker, mentions_intent, mentions_near_term, mentions_urgency,
};
use super::{
    BuyerProfile, FitReport, MissingField, Recommendation, ScoringConfig, SellerCriteria,
    SignalKind, SignalScore, MATCHED_VALUE,
};

/// Pure scorer: identical inputs always produce identical reports.
#[derive(Clone, Debug, Default)]
pub struct FitScorer {
    config: ScoringConfig,
}

impl FitScorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn score(
        &self,
        criteria: &SellerCriteria,
        buyer: &BuyerProfile,
        email_text: &str,
    ) -> FitReport {
        let signals: Vec<SignalScore> = SignalKind::ALL
            .iter()
            .map(|kind| {
                let value = signal_value(*kind, criteria, buyer, email_text);
                SignalScore {
                    kind: *kind,
                    weight: self.config.weights.weight_of(*kind),
                    value,
                    matched: value >= MATCHED_VALUE,
                }
            })
            .collect();

        let total_weight: f64 = signals.iter().map(|signal| f64::from(signal.weight)).sum();
        let weighted: f64 =
            signals.iter().map(|signal| f64::from(signal.weight) * signal.value).sum();
        let overall = if total_weight > 0.0 {
            (100.0 * weighted / total_weight).round().clamp(0.0, 100.0) as u8
        } else {
            0
        };

        FitReport {
            overall,
            signals,
            recommendation: self.recommend(overall),
            missing_info: missing_info(criteria, buyer),
        }
    }

    fn recommend(&self, overall: u8) -> Recommendation {
        if overall >= self.config.propose_threshold {
            Recommendation::ProposeMeeting
        } else if overall >= self.config.clarify_threshold {
            Recommendation::Clarify
        } else {
            Recommendation::Decline
        }
    }
}

fn signal_value(
    kind: SignalKind,
    criteria: &SellerCriteria,
    buyer: &BuyerProfile,
    email_text: &str,
) -> f64 {
    match kind {
        SignalKind::IndustryMatch => industry_value(criteria, buyer),
        SignalKind::CompanySize => company_size_value(criteria, buyer),
        SignalKind::GeographicMatch => geography_value(criteria, buyer),
        SignalKind::NeedIntent => need_intent_value(email_text),
        SignalKind::Timing => timing_value(buyer, email_text),
        SignalKind::BudgetRange => budget_value(criteria, buyer),
        SignalKind::Authority => authority_value(buyer),
        SignalKind::StackCompatibility => stack_value(criteria, buyer),
    }
}

fn substring_match(targets: &[String], candidate: &str) -> bool {
    let lowered = candidate.to_lowercase();
    targets.iter().any(|target| lowered.contains(&target.to_lowercase()))
}

fn industry_value(criteria: &SellerCriteria, buyer: &BuyerProfile) -> f64 {
    if substring_match(&criteria.industries, &buyer.industry) {
        1.0
    } else {
        0.0
    }
}

fn company_size_value(criteria: &SellerCriteria, buyer: &BuyerProfile) -> f64 {
    if (criteria.company_size_min..=criteria.company_size_max).contains(&buyer.company_size) {
        1.0
    } else {
        0.0
    }
}

fn geography_value(criteria: &SellerCriteria, buyer: &BuyerProfile) -> f64 {
    if substring_match(&criteria.geographies, &buyer.location) {
        1.0
    } else {
        0.0
    }
}

// Absence of explicit intent phrasing is weak evidence, not disqualifying.
fn need_intent_value(email_text: &str) -> f64 {
    if mentions_intent(email_text) {
        1.0
    } else {
        0.5
    }
}

fn timing_value(buyer: &BuyerProfile, email_text: &str) -> f64 {
    let near_term = buyer.timing.as_deref().map(mentions_near_term).unwrap_or(false);
    if near_term || mentions_urgency(email_text) {
        1.0
    } else if buyer.timing.is_some() {
        0.7
    } else {
        0.3
    }
}

fn budget_value(criteria: &SellerCriteria, buyer: &BuyerProfile) -> f64 {
    match buyer.budget {
        Some(budget) if (criteria.budget_min..=criteria.budget_max).contains(&budget) => 1.0,
        Some(_) => 0.3,
        None => 0.5,
    }
}

fn authority_value(buyer: &BuyerProfile) -> f64 {
    match buyer.authority.as_deref() {
        Some(label) if mentions_decision_maker(label) => 1.0,
        _ => 0.5,
    }
}

fn stack_value(criteria: &SellerCriteria, buyer: &BuyerProfile) -> f64 {
    let required = match criteria.required_stack.as_deref() {
        Some(stack) if !stack.is_empty() => stack,
        _ => return 0.5,
    };
    let buyer_stack = buyer.stack.as_deref().unwrap_or(&[]);
    if stack_overlap(required, buyer_stack) {
        1.0
    } else {
        0.3
    }
}

fn stack_overlap(required: &[String], available: &[String]) -> bool {
    required.iter().any(|item| {
        let needle = item.to_lowercase();
        available.iter().any(|owned| {
            let hay = owned.to_lowercase();
            hay.contains(&needle) || needle.contains(&hay)
        })
    })
}

fn missing_info(criteria: &SellerCriteria, buyer: &BuyerProfile) -> Vec<MissingField> {
    let mut missing = Vec::new();
    if buyer.budget.is_none() {
        missing.push(MissingField::Budget);
    }
    if buyer.timing.is_none() {
        missing.push(MissingField::Timing);
    }
    if buyer.authority.is_none() {
        missing.push(MissingField::Authority);
    }
    let stack_required =
        criteria.required_stack.as_deref().map(|stack| !stack.is_empty()).unwrap_or(false);
    if stack_required && buyer.stack.is_none() {
        missing.push(MissingField::TechStack);
    }
    missing
}
