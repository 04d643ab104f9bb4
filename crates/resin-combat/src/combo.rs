//! Combo notation.
//!
//! A combo is whitespace-separated segments, each an optional repeat count
//! followed by actions:
//!
//! - `N<k>` expands to basic hits `N1..Nk`
//! - `C` is a charged attack
//! - `Q` is the burst; a segment containing it resolves against the burst
//!   table, every other segment against the basic-attack table
//! - `E` casts the skill. It always stands alone, splits the segment it
//!   appears in, and is never repeated by a count
//!
//! So `"E 12N1C Q"` is skill, twelve times (N1, C), then burst.

use resin_common::{AbilitySlot, ComboParseError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upper bound on expanded hits, guarding against absurd repeat counts.
pub const MAX_COMBO_HITS: usize = 10_000;

/// A single hit-tag in an expanded combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HitTag {
    /// `N<k>`: k-th hit of the basic attack string.
    Normal(u16),
    /// `C`: charged attack.
    Charged,
    /// `E`: skill cast.
    Skill,
    /// `Q`: burst cast.
    Burst,
}

impl HitTag {
    /// Column name used in multiplier tables.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::Normal(index) => format!("N{index}"),
            Self::Charged => "C".into(),
            Self::Skill => "E".into(),
            Self::Burst => "Q".into(),
        }
    }
}

impl fmt::Display for HitTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

/// A hit-tag together with the table it resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboStep {
    /// Hit-tag.
    pub tag: HitTag,
    /// Multiplier table (and ability level) used for the tag.
    pub slot: AbilitySlot,
}

/// A parsed, fully expanded combo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Combo {
    steps: Vec<ComboStep>,
}

impl Combo {
    /// Parse combo notation.
    pub fn parse(input: &str) -> Result<Self, ComboParseError> {
        let mut steps = Vec::new();

        for word in input.split_whitespace() {
            for part in split_skill_casts(word) {
                if part == "E" {
                    steps.push(ComboStep {
                        tag: HitTag::Skill,
                        slot: AbilitySlot::Skill,
                    });
                } else {
                    parse_segment(part, &mut steps)?;
                }
                if steps.len() > MAX_COMBO_HITS {
                    return Err(ComboParseError::InvalidCount(word.to_string()));
                }
            }
        }

        Ok(Self { steps })
    }

    /// Expanded steps in order.
    #[must_use]
    pub fn steps(&self) -> &[ComboStep] {
        &self.steps
    }

    /// Expanded hit-tags in order.
    pub fn tags(&self) -> impl Iterator<Item = HitTag> + '_ {
        self.steps.iter().map(|step| step.tag)
    }

    /// Number of expanded steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for an empty combo.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Position of the first cast of an ability.
    ///
    /// Skill and burst are found by their marker; the basic slot by its
    /// first hit resolved against the basic table.
    #[must_use]
    pub fn first_cast(&self, slot: AbilitySlot) -> Option<usize> {
        self.steps.iter().position(|step| match slot {
            AbilitySlot::Skill => step.tag == HitTag::Skill,
            AbilitySlot::Burst => step.tag == HitTag::Burst,
            AbilitySlot::Basic => step.slot == AbilitySlot::Basic,
        })
    }
}

impl FromStr for Combo {
    type Err = ComboParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tags: Vec<String> = self.tags().map(|t| t.key()).collect();
        f.write_str(&tags.join(" "))
    }
}

/// Split a word around every `E`, keeping each `E` as its own part.
fn split_skill_casts(word: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (index, ch) in word.char_indices() {
        if ch == 'E' {
            if index > start {
                parts.push(&word[start..index]);
            }
            parts.push(&word[index..=index]);
            start = index + 1;
        }
    }
    if start < word.len() {
        parts.push(&word[start..]);
    }
    parts
}

fn parse_segment(segment: &str, steps: &mut Vec<ComboStep>) -> Result<(), ComboParseError> {
    let digits_end = segment
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map_or(segment.len(), |(i, _)| i);
    let (count_str, body) = segment.split_at(digits_end);

    let count: usize = if count_str.is_empty() {
        1
    } else {
        match count_str.parse() {
            Ok(0) | Err(_) => return Err(ComboParseError::InvalidCount(segment.to_string())),
            Ok(n) => n,
        }
    };

    if body.is_empty() {
        return Err(ComboParseError::EmptyBody(segment.to_string()));
    }

    let slot = if body.contains('Q') {
        AbilitySlot::Burst
    } else {
        AbilitySlot::Basic
    };

    let mut tags = Vec::new();
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    let mut i = 0;
    while i < chars.len() {
        let (offset, ch) = chars[i];
        let position = digits_end + offset;
        match ch {
            'C' => tags.push(HitTag::Charged),
            'Q' => tags.push(HitTag::Burst),
            'N' => {
                let mut j = i + 1;
                while j < chars.len() && chars[j].1.is_ascii_digit() {
                    j += 1;
                }
                if j == i + 1 {
                    return Err(ComboParseError::MissingDigits {
                        segment: segment.to_string(),
                        position,
                    });
                }
                let end = chars.get(j).map_or(body.len(), |(o, _)| *o);
                let hits: u16 = match body[offset + 1..end].parse() {
                    Ok(0) | Err(_) => {
                        return Err(ComboParseError::InvalidCount(segment.to_string()))
                    }
                    Ok(n) => n,
                };
                tags.extend((1..=hits).map(HitTag::Normal));
                i = j;
                continue;
            }
            found => {
                return Err(ComboParseError::UnexpectedChar {
                    segment: segment.to_string(),
                    found,
                    position,
                })
            }
        }
        i += 1;
    }

    let total = count
        .checked_mul(tags.len())
        .filter(|total| steps.len() + total <= MAX_COMBO_HITS)
        .ok_or_else(|| ComboParseError::InvalidCount(segment.to_string()))?;
    steps.reserve(total);
    for _ in 0..count {
        steps.extend(tags.iter().map(|tag| ComboStep { tag: *tag, slot }));
    }
    Ok(())
}
