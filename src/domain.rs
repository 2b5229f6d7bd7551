use std::fmt;

/// Columns every listings file must provide, in clean-output order.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    "date",
    "seller_id",
    "region",
    "category",
    "item_id",
    "price_gbp",
    "condition",
];

/// Essential columns whose raw cells must be present and non-blank for a row
/// to be considered valid. Region and condition are covered by the
/// vocabulary checks instead.
pub const ESSENTIAL_COLUMNS: [&str; 5] =
    ["date", "seller_id", "category", "item_id", "price_gbp"];

/// Sales regions in the controlled vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    North,
    South,
    East,
    West,
}

impl Region {
    /// Resolves a title-cased cell against the region vocabulary.
    pub fn from_normalized(value: &str) -> Option<Self> {
        match value {
            "North" => Some(Region::North),
            "South" => Some(Region::South),
            "East" => Some(Region::East),
            "West" => Some(Region::West),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::East => "East",
            Region::West => "West",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item conditions in the controlled vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    New,
    Used,
    Refurbished,
}

impl Condition {
    /// Resolves a lower-cased cell against the condition vocabulary.
    pub fn from_normalized(value: &str) -> Option<Self> {
        match value {
            "new" => Some(Condition::New),
            "used" => Some(Condition::Used),
            "refurbished" => Some(Condition::Refurbished),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Condition::New => "new",
            Condition::Used => "used",
            Condition::Refurbished => "refurbished",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolution state of a controlled-vocabulary cell.
///
/// Cells that fail to resolve are kept, not discarded, so the validator can
/// count them and the invalid-rows artifact can show what was seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Vocab<T> {
    /// The cell matched a vocabulary term.
    Known(T),
    /// The cell held text outside the vocabulary; the normalized text is kept.
    Unrecognized(String),
    /// The cell was absent from the source row.
    Missing,
}

impl<T> Vocab<T> {
    pub fn known(&self) -> Option<&T> {
        match self {
            Vocab::Known(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Vocab::Known(_))
    }
}

impl<T: fmt::Display> Vocab<T> {
    /// The cell text as it should appear in diagnostic output.
    pub fn as_text(&self) -> String {
        match self {
            Vocab::Known(value) => value.to_string(),
            Vocab::Unrecognized(text) => text.clone(),
            Vocab::Missing => String::new(),
        }
    }
}

/// Upper-cases the first alphabetic character of each word and lower-cases
/// the rest. Any non-alphabetic character ends a word.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case_basic() {
        assert_eq!(title_case("north"), "North");
        assert_eq!(title_case("HOME & GARDEN"), "Home & Garden");
        assert_eq!(title_case("toys"), "Toys");
    }

    #[test]
    fn test_title_case_word_boundaries_are_non_alphabetic() {
        // Apostrophes and digits end a word, matching the casing rule used
        // for category cells.
        assert_eq!(title_case("o'brien's tools"), "O'Brien'S Tools");
        assert_eq!(title_case("mp3 players"), "Mp3 Players");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_region_vocabulary_is_exact() {
        assert_eq!(Region::from_normalized("North"), Some(Region::North));
        assert_eq!(Region::from_normalized("north"), None);
        assert_eq!(Region::from_normalized("Northeast"), None);
        assert_eq!(Region::from_normalized(""), None);
    }

    #[test]
    fn test_condition_vocabulary_is_exact() {
        assert_eq!(Condition::from_normalized("used"), Some(Condition::Used));
        assert_eq!(Condition::from_normalized("Used"), None);
        assert_eq!(Condition::from_normalized("mint"), None);
    }

    #[test]
    fn test_vocab_known_accessor() {
        let known: Vocab<Region> = Vocab::Known(Region::West);
        let unrecognized: Vocab<Region> = Vocab::Unrecognized("Centre".into());
        assert!(known.is_known());
        assert_eq!(known.known(), Some(&Region::West));
        assert!(!unrecognized.is_known());
        assert_eq!(unrecognized.known(), None);
        assert_eq!(unrecognized.as_text(), "Centre");
        assert_eq!(Vocab::<Region>::Missing.as_text(), "");
    }
}
