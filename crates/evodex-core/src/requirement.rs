//! # Requirement Formatter
//!
//! Turns evolution metadata into the short text shown on an edge.
//!
//! - One lookup over [`EvolutionMethod`], no per-species special cases
//! - Total: every input, including all-null and unknown methods, has an output
//! - Bounded: text longer than the limit is cut and suffixed with `...`
//!
//! The formatter itself never logs. [`format_requirement`] is the standalone
//! entry point and writes the reported issue to the logging sink; the chain
//! resolver instead attaches issues to the chain it is building.

use crate::primitives::{ELLIPSIS, MAX_REQUIREMENT_LENGTH, MIN_REQUIREMENT_LENGTH, UNKNOWN_REQUIREMENT};
use crate::{EvodexWarning, EvolutionMethod, MissingData, SpeciesId};

/// Anomaly noticed while formatting one edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequirementIssue {
    /// The method tag is not one the formatter knows.
    UnrecognizedMethod(String),
    /// An item-based method arrived without an item name.
    MissingItem(EvolutionMethod),
}

impl RequirementIssue {
    /// Attach edge context and turn the issue into a warning.
    #[must_use]
    pub fn into_warning(self, edge: Option<(SpeciesId, SpeciesId)>) -> EvodexWarning {
        match self {
            Self::UnrecognizedMethod(method) => EvodexWarning::UnrecognizedMethod { edge, method },
            Self::MissingItem(method) => EvodexWarning::MissingData(MissingData::MissingItem {
                edge,
                method: method.as_str().to_string(),
            }),
        }
    }
}

/// Formatted text plus the issue found on the way, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub text: String,
    pub issue: Option<RequirementIssue>,
}

impl Requirement {
    fn clean(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            issue: None,
        }
    }

    fn flagged(text: impl Into<String>, issue: RequirementIssue) -> Self {
        Self {
            text: text.into(),
            issue: Some(issue),
        }
    }
}

/// Time-of-day tag carried in the trigger column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimeOfDay {
    Day,
    Night,
}

impl TimeOfDay {
    fn from_trigger(trigger: Option<&str>) -> Option<Self> {
        let trigger = trigger?.trim();
        if trigger.eq_ignore_ascii_case("day") {
            Some(Self::Day)
        } else if trigger.eq_ignore_ascii_case("night") {
            Some(Self::Night)
        } else {
            None
        }
    }
}

/// Requirement formatter with a fixed display limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequirementFormatter {
    max_chars: usize,
}

impl Default for RequirementFormatter {
    fn default() -> Self {
        Self {
            max_chars: MAX_REQUIREMENT_LENGTH,
        }
    }
}

impl RequirementFormatter {
    /// Create a formatter with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a formatter with a custom limit, clamped to `MIN_REQUIREMENT_LENGTH`.
    #[must_use]
    pub fn with_limit(max_chars: usize) -> Self {
        Self {
            max_chars: max_chars.max(MIN_REQUIREMENT_LENGTH),
        }
    }

    /// The display limit in characters.
    #[must_use]
    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Format one edge. Pure: identical inputs give identical output.
    #[must_use]
    pub fn format(
        &self,
        method: &EvolutionMethod,
        minimum_level: Option<u32>,
        item_name: Option<&str>,
        trigger: Option<&str>,
    ) -> Requirement {
        let item = item_name.map(str::trim).filter(|name| !name.is_empty());

        let mut requirement = match method {
            EvolutionMethod::Level => match minimum_level {
                Some(level) => Requirement::clean(format!("Level {level}")),
                None => Requirement::clean("Level"),
            },
            EvolutionMethod::Stone | EvolutionMethod::UseItem => match item {
                Some(item) => Requirement::clean(item),
                None => Requirement::flagged("", RequirementIssue::MissingItem(method.clone())),
            },
            EvolutionMethod::Trade => match item {
                Some(item) => Requirement::clean(format!("Trade holding {item}")),
                None => Requirement::clean("Trade"),
            },
            EvolutionMethod::TradeItem => match item {
                Some(item) => Requirement::clean(format!("Trade holding {item}")),
                None => Requirement::flagged("", RequirementIssue::MissingItem(method.clone())),
            },
            EvolutionMethod::Happiness => match TimeOfDay::from_trigger(trigger) {
                Some(TimeOfDay::Day) => Requirement::clean("High Friendship (Day)"),
                Some(TimeOfDay::Night) => Requirement::clean("High Friendship (Night)"),
                None => Requirement::clean("High Friendship"),
            },
            EvolutionMethod::HappinessDay => Requirement::clean("High Friendship (Day)"),
            EvolutionMethod::HappinessNight => Requirement::clean("High Friendship (Night)"),
            EvolutionMethod::LevelAttackHigher => Requirement::clean("Level (Atk > Def)"),
            EvolutionMethod::LevelDefenseHigher => Requirement::clean("Level (Def > Atk)"),
            EvolutionMethod::LevelAttackDefenseEqual => Requirement::clean("Level (Atk = Def)"),
            EvolutionMethod::None => Requirement::clean(""),
            EvolutionMethod::Unrecognized(tag) => Requirement::flagged(
                UNKNOWN_REQUIREMENT,
                RequirementIssue::UnrecognizedMethod(tag.clone()),
            ),
        };

        requirement.text = self.truncate(requirement.text);
        requirement
    }

    /// Cut text longer than the limit down to `limit - 3` characters plus `...`.
    fn truncate(&self, text: String) -> String {
        if text.chars().count() <= self.max_chars {
            return text;
        }
        let keep = self.max_chars.saturating_sub(ELLIPSIS.len());
        let mut truncated: String = text.chars().take(keep).collect();
        truncated.push_str(ELLIPSIS);
        truncated
    }
}

/// Format a requirement from raw column values with the default limit.
///
/// Unrecognized methods and missing item names are logged as warnings; the
/// returned text is unaffected by logging.
#[must_use]
pub fn format_requirement(
    method: Option<&str>,
    minimum_level: Option<u32>,
    item_name: Option<&str>,
    trigger: Option<&str>,
) -> String {
    let requirement = RequirementFormatter::default().format(
        &EvolutionMethod::parse(method),
        minimum_level,
        item_name,
        trigger,
    );
    if let Some(issue) = requirement.issue {
        issue.into_warning(None).emit();
    }
    requirement.text
}

// =============================================================================
// TESTS
// =============================================================================
