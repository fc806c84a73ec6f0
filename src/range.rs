//! Collection ranges: how many entries a section wants, whether the
//! maximum has been reached, and the copy introducing the section.
use super::requirements::Requirements;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RangeType {
    /// Min/max number of entries
    #[default]
    MinMax,
    /// `min` is a span of years of history
    Years,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Introduction {
    #[default]
    None,
    Years {
        years: u32,
    },
    MinOnly {
        min: u32,
    },
    MaxOnly {
        max: u32,
    },
    MinMax {
        min: u32,
        max: u32,
    },
}

impl Introduction {
    pub fn is_empty(&self) -> bool {
        matches!(self, Introduction::None)
    }
    /// Translation key for the section's introduction
    pub fn key(&self, section: &str) -> Option<String> {
        let base = format!("order.{section}.introduction");
        match self {
            Introduction::None => None,
            Introduction::Years { .. } => Some(base),
            Introduction::MinOnly { .. } => Some(format!("{base}.min_only")),
            Introduction::MaxOnly { .. } => Some(format!("{base}.max_only")),
            Introduction::MinMax { .. } => Some(format!("{base}.min_max")),
        }
    }
    /// Count the phrase is pluralized on
    pub fn choice(&self) -> Option<u32> {
        match self {
            Introduction::None => None,
            Introduction::Years { years } => Some(*years),
            Introduction::MinOnly { min } => Some(*min),
            Introduction::MaxOnly { max } | Introduction::MinMax { max, .. } => Some(*max),
        }
    }
}

fn plural(n: u32, one: &'static str, many: &'static str) -> &'static str {
    if n == 1 { one } else { many }
}

impl fmt::Display for Introduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Introduction::None => Ok(()),
            Introduction::Years { years } => write!(
                f,
                "Please provide {years} {} of history.",
                plural(*years, "year", "years")
            ),
            Introduction::MinOnly { min } => write!(
                f,
                "Please provide at least {min} {}.",
                plural(*min, "entry", "entries")
            ),
            Introduction::MaxOnly { max } => write!(
                f,
                "Please provide up to {max} {}.",
                plural(*max, "entry", "entries")
            ),
            Introduction::MinMax { min, max } => write!(
                f,
                "Please provide between {min} and {max} {}.",
                plural(*max, "entry", "entries")
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CollectionRangeState {
    pub min: u32,
    pub max: u32,
    pub max_met: bool,
    pub introduction: Introduction,
    pub gaps_confirmed: bool,
}

/// Derive the range state of a section from the requirements and its current entry count
pub fn compute(
    requirements: &Requirements,
    section: &str,
    current_count: usize,
    range_type: RangeType,
) -> CollectionRangeState {
    let (min, max) = requirements
        .component(section)
        .map(|c| (c.min().unwrap_or(0), c.max().unwrap_or(0)))
        .unwrap_or((0, 0));

    // a zero max means unbounded
    let max_met = max > 0 && current_count >= max as usize;

    let introduction = if range_type == RangeType::Years && min > 0 {
        Introduction::Years { years: min }
    } else if min == 0 && max == 0 {
        Introduction::None
    } else if max == 0 {
        Introduction::MinOnly { min }
    } else if min == 0 {
        Introduction::MaxOnly { max }
    } else {
        Introduction::MinMax { min, max }
    };

    CollectionRangeState {
        min,
        max,
        max_met,
        introduction,
        gaps_confirmed: false,
    }
}

/// Range tracking for the section a session is bound to. The gap
/// confirmation is stored with the order, not derived.
#[derive(Debug, Clone)]
pub struct CollectionRangeGuard {
    section: String,
    range_type: RangeType,
    state: CollectionRangeState,
}

impl CollectionRangeGuard {
    pub fn new(section: impl Into<String>, range_type: RangeType, gaps_confirmed: bool) -> Self {
        Self {
            section: section.into(),
            range_type,
            state: CollectionRangeState {
                gaps_confirmed,
                ..CollectionRangeState::default()
            },
        }
    }
    pub fn section(&self) -> &str {
        &self.section
    }
    pub fn range_type(&self) -> RangeType {
        self.range_type
    }
    pub fn state(&self) -> &CollectionRangeState {
        &self.state
    }
    /// Recompute after the entry count may have changed
    pub fn refresh(&mut self, requirements: &Requirements, current_count: usize) {
        let gaps_confirmed = self.state.gaps_confirmed;
        self.state = CollectionRangeState {
            gaps_confirmed,
            ..compute(requirements, &self.section, current_count, self.range_type)
        };
    }
    /// Set the local flag, returning the previous value for a rollback
    pub fn set_gaps_confirmed(&mut self, value: bool) -> bool {
        std::mem::replace(&mut self.state.gaps_confirmed, value)
    }
    pub fn rollback_gaps(&mut self, previous: bool) {
        self.state.gaps_confirmed = previous;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::Component;

    fn reqs(min: Option<u32>, max: Option<u32>) -> Requirements {
        let mut c = Component::new("education");
        if let Some(min) = min {
            c = c.with_min(min);
        }
        if let Some(max) = max {
            c = c.with_max(max);
        }
        Requirements::new("invite_1").with_component(c)
    }

    #[test]
    fn max_met_at_max() {
        let s = compute(&reqs(Some(1), Some(3)), "education", 3, RangeType::MinMax);
        assert!(s.max_met);
        let s = compute(&reqs(Some(1), Some(3)), "education", 2, RangeType::MinMax);
        assert!(!s.max_met);
    }

    #[test]
    fn zero_max_never_met() {
        for count in [0, 1, 50] {
            let s = compute(&reqs(Some(0), Some(0)), "education", count, RangeType::MinMax);
            assert!(!s.max_met);
            assert!(s.introduction.is_empty());
        }
    }

    #[test]
    fn years_phrase_uses_min() {
        let s = compute(&reqs(Some(2), Some(0)), "education", 0, RangeType::Years);
        assert_eq!(s.introduction, Introduction::Years { years: 2 });
        assert_eq!(
            s.introduction.key("education").as_deref(),
            Some("order.education.introduction")
        );
        assert_eq!(s.introduction.to_string(), "Please provide 2 years of history.");
    }

    #[test]
    fn template_selection() {
        let s = compute(&reqs(Some(2), None), "education", 0, RangeType::MinMax);
        assert_eq!(s.introduction, Introduction::MinOnly { min: 2 });
        assert_eq!(s.introduction.choice(), Some(2));

        let s = compute(&reqs(None, Some(1)), "education", 0, RangeType::MinMax);
        assert_eq!(s.introduction, Introduction::MaxOnly { max: 1 });
        assert_eq!(s.introduction.to_string(), "Please provide up to 1 entry.");

        let s = compute(&reqs(Some(1), Some(4)), "education", 0, RangeType::MinMax);
        assert_eq!(
            s.introduction.key("education").as_deref(),
            Some("order.education.introduction.min_max")
        );
        assert_eq!(s.introduction.choice(), Some(4));
    }

    #[test]
    fn missing_component_is_unbounded() {
        let s = compute(&Requirements::new("invite_1"), "education", 9, RangeType::MinMax);
        assert_eq!((s.min, s.max, s.max_met), (0, 0, false));
    }

    #[test]
    fn refresh_keeps_stored_gap_flag() {
        let mut guard = CollectionRangeGuard::new("education", RangeType::MinMax, true);
        guard.refresh(&reqs(Some(1), Some(2)), 2);

        assert!(guard.state().max_met);
        assert!(guard.state().gaps_confirmed);

        let previous = guard.set_gaps_confirmed(false);
        assert!(previous);
        guard.rollback_gaps(previous);
        assert!(guard.state().gaps_confirmed);
    }
}
