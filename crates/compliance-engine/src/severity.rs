//! Escalation level colors and the overall escalation of a violation set

use shared_types::{EscalationLevel, RgbColor};

use crate::error::{EngineError, Result};

pub struct SeverityResolver;

impl SeverityResolver {
    /// Highlight color for an escalation level
    pub fn color_for(level: EscalationLevel) -> RgbColor {
        match level {
            EscalationLevel::HeadOfBu => RgbColor::YELLOW,
            EscalationLevel::BaPresident => RgbColor::ORANGE,
            EscalationLevel::Ceo => RgbColor::RED,
        }
    }

    /// Highlight color for a raw approval-matrix label
    pub fn color_for_label(label: &str) -> Result<RgbColor> {
        let level: EscalationLevel = label.parse()?;
        Ok(Self::color_for(level))
    }

    /// Display name of the highlight color
    pub fn color_name(level: EscalationLevel) -> &'static str {
        match level {
            EscalationLevel::HeadOfBu => "Yellow",
            EscalationLevel::BaPresident => "Orange",
            EscalationLevel::Ceo => "Red",
        }
    }

    /// Highest escalation level in the set.
    ///
    /// Callers handle the "no violations" case before asking.
    pub fn highest_of<I>(levels: I) -> Result<EscalationLevel>
    where
        I: IntoIterator<Item = EscalationLevel>,
    {
        levels
            .into_iter()
            .max()
            .ok_or(EngineError::EmptyViolationSet)
    }
}
