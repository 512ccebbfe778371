//! Auto-fit text policy: bounds headline and sub text against a per-size
//! character budget.
//!
//! Shrinking is modelled as a font delta only: it never changes the character
//! count, so any text still over budget after reaching the floor is truncated.
//! Guarantees: `chars(text) <= budget` when a budget exists, and
//! `font_adjust ∈ [MIN_FONT_ADJUST, 0]`.

use serde::Serialize;

use crate::synthesis::creative::SizeKey;

pub const MIN_FONT_ADJUST: i32 = -3;

/// Ratio of the headline budget applied to secondary text.
const SUB_BUDGET_RATIO: f32 = 0.8;

/// Headline character budgets. Sizes not listed are unbounded.
static HEADLINE_LIMITS: [(SizeKey, usize); 3] = [
    (SizeKey::new(300, 250), 36),
    (SizeKey::new(320, 50), 18),
    (SizeKey::new(728, 90), 28),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FittedText {
    pub text: String,
    /// Font-size delta in px, always in [MIN_FONT_ADJUST, 0].
    pub font_adjust: i32,
}

/// Returns the headline budget for `size`, if one is defined.
pub fn headline_budget(size: SizeKey) -> Option<usize> {
    HEADLINE_LIMITS
        .iter()
        .find(|(key, _)| *key == size)
        .map(|(_, limit)| *limit)
}

pub fn fit_headline(size: SizeKey, text: &str) -> FittedText {
    fit_to_budget(headline_budget(size), text)
}

/// Shrink-then-truncate against an explicit budget (`None` = unbounded).
pub fn fit_to_budget(budget: Option<usize>, text: &str) -> FittedText {
    let Some(limit) = budget else {
        return FittedText {
            text: text.to_string(),
            font_adjust: 0,
        };
    };

    let mut font_adjust = 0;
    let length = text.chars().count();
    if length <= limit {
        return FittedText {
            text: text.to_string(),
            font_adjust,
        };
    }

    while length > limit && font_adjust > MIN_FONT_ADJUST {
        font_adjust -= 1;
    }

    FittedText {
        text: truncate_chars(text, limit),
        font_adjust,
    }
}

/// Truncates secondary text to 80% of the headline budget. No font adjustment.
pub fn fit_sub_to_budget(headline_budget: Option<usize>, text: &str) -> String {
    match headline_budget {
        Some(limit) => {
            let sub_limit = (limit as f32 * SUB_BUDGET_RATIO).round() as usize;
            truncate_chars(text, sub_limit)
        }
        None => text.to_string(),
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => text[..byte_idx].to_string(),
        None => text.to_string(),
    }
}
