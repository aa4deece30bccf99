//! Negotiation strategy from a customer's contract history
//!
//! Rules are evaluated in order and the first match wins, mirroring the
//! non-overlapping rows of an approval matrix:
//!
//! 1. Senior escalation with a customer that rarely gets deviations accepted
//!    (or has no history) and drags negotiations out: re-negotiate.
//! 2. A customer whose deviations are usually accepted quickly, asking for a
//!    deviation type accepted before: escalate directly.
//! 3. Anything else: cautious approach.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use shared_types::{
    CustomerProfile, EscalationLevel, HistoricalContract, Recommendation, RecommendedAction,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationThresholds {
    /// Rule 1 applies below this acceptance rate
    pub low_acceptance_rate: f64,
    /// Rule 1 applies above this many average rounds
    pub long_negotiation_rounds: f64,
    /// Rule 2 applies above this acceptance rate
    pub high_acceptance_rate: f64,
    /// Rule 2 applies below this many average rounds
    pub short_negotiation_rounds: f64,
}

impl Default for RecommendationThresholds {
    fn default() -> Self {
        Self {
            low_acceptance_rate: 0.30,
            long_negotiation_rounds: 4.0,
            high_acceptance_rate: 0.50,
            short_negotiation_rounds: 3.0,
        }
    }
}

/// Trimmed, lowercased form used to compare deviation conditions
pub fn normalize_condition(condition: &str) -> String {
    condition.trim().to_lowercase()
}

/// Aggregate a customer's contracts. No contracts gives the all-zero profile.
pub fn profile_from_history(contracts: &[HistoricalContract]) -> CustomerProfile {
    if contracts.is_empty() {
        return CustomerProfile::default();
    }

    let total_contracts = contracts.len();
    let total_accepted_deviations = contracts
        .iter()
        .map(|c| c.accepted_deviations.len())
        .sum();
    let total_rounds: u64 = contracts.iter().map(|c| u64::from(c.negotiation_rounds)).sum();
    let with_accepted = contracts
        .iter()
        .filter(|c| !c.accepted_deviations.is_empty())
        .count();
    let accepted_conditions: BTreeSet<String> = contracts
        .iter()
        .flat_map(|c| c.accepted_deviations.iter())
        .map(|d| normalize_condition(&d.condition))
        .collect();

    CustomerProfile {
        total_contracts,
        total_accepted_deviations,
        average_negotiation_rounds: total_rounds as f64 / total_contracts as f64,
        acceptance_rate: with_accepted as f64 / total_contracts as f64,
        accepted_conditions,
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecommendationEngine {
    thresholds: RecommendationThresholds,
}

impl RecommendationEngine {
    pub fn new(thresholds: RecommendationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &RecommendationThresholds {
        &self.thresholds
    }

    /// Classify the recommended course of action. Never consults a language
    /// model; the rationale is built from the numbers the matched rule used.
    pub fn recommend<S: AsRef<str>>(
        &self,
        profile: &CustomerProfile,
        required_escalation: EscalationLevel,
        current_conditions: &[S],
    ) -> Recommendation {
        let t = &self.thresholds;
        let has_history = profile.total_contracts > 0;
        let rate = percent(profile.acceptance_rate);
        let rounds = profile.average_negotiation_rounds;

        let senior = matches!(
            required_escalation,
            EscalationLevel::BaPresident | EscalationLevel::Ceo
        );
        let low_acceptance = !has_history || profile.acceptance_rate < t.low_acceptance_rate;
        // Rounds carry no signal without history
        let long_negotiations = has_history && rounds > t.long_negotiation_rounds;

        if senior && low_acceptance && long_negotiations {
            return Recommendation {
                action: RecommendedAction::ReNegotiate,
                rationale: format!(
                    "{} approval required; acceptance rate {} across {} contract(s) is below {} \
                     and negotiations average {:.1} rounds (over {:.1})",
                    required_escalation,
                    rate,
                    profile.total_contracts,
                    percent(t.low_acceptance_rate),
                    rounds,
                    t.long_negotiation_rounds
                ),
            };
        }

        let overlap: Vec<String> = current_conditions
            .iter()
            .map(|c| normalize_condition(c.as_ref()))
            .filter(|c| profile.accepted_conditions.contains(c))
            .collect();

        if has_history
            && profile.acceptance_rate > t.high_acceptance_rate
            && rounds < t.short_negotiation_rounds
            && !overlap.is_empty()
        {
            return Recommendation {
                action: RecommendedAction::EscalateDirectly,
                rationale: format!(
                    "acceptance rate {} across {} contract(s) is above {}, negotiations average \
                     {:.1} rounds (under {:.1}), and {} similar deviation(s) were accepted before: {}",
                    rate,
                    profile.total_contracts,
                    percent(t.high_acceptance_rate),
                    rounds,
                    t.short_negotiation_rounds,
                    overlap.len(),
                    overlap.join("; ")
                ),
            };
        }

        let rationale = if has_history {
            format!(
                "acceptance rate {} across {} contract(s) with an average of {:.1} negotiation \
                 rounds matches neither the re-negotiate nor the escalate-directly profile; \
                 {} approval required",
                rate, profile.total_contracts, rounds, required_escalation
            )
        } else {
            format!(
                "no contract history for this customer; {} approval required",
                required_escalation
            )
        };

        Recommendation {
            action: RecommendedAction::CautiousApproach,
            rationale,
        }
    }
}

fn percent(rate: f64) -> String {
    format!("{:.0}%", rate * 100.0)
}
