//! Stage 4: hierarchical question numbering.
//!
//! Top-level questions are numbered `1`, `2`, `3`, ... in list order. Conditional questions take
//! their parent's number plus a per-parent suffix: `a` to `z` for the first 26 children, then the
//! plain decimal count (`127` is the 27th child of question `1`).
//!
//! A child whose parent has not been numbered yet (the parent comes later or does not exist) is
//! numbered under [`ORPHAN_PARENT_NUMBER`]. Its suffix still counts against that parent
//! identifier.

use crate::constants::ORPHAN_PARENT_NUMBER;
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Numbered {
    pub(crate) question_number: String,
    /// False when the question had a parent that was not yet numbered.
    pub(crate) parent_found: bool,
}

#[derive(Debug, Default)]
pub(crate) struct NumberingEngine {
    top_level: u32,
    children: HashMap<String, u32>,
    assigned: HashMap<String, String>,
}

impl NumberingEngine {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Numbers the next question in list order.
    pub(crate) fn number(&mut self, id: &str, parent_id: Option<&str>) -> Numbered {
        let numbered = match parent_id {
            None => {
                self.top_level += 1;
                Numbered {
                    question_number: self.top_level.to_string(),
                    parent_found: true,
                }
            }
            Some(parent_id) => {
                let count = self.children.entry(parent_id.to_string()).or_insert(0);
                *count += 1;
                let suffix = sub_index_suffix(*count);

                match self.assigned.get(parent_id) {
                    Some(parent_number) => Numbered {
                        question_number: format!("{parent_number}{suffix}"),
                        parent_found: true,
                    },
                    None => Numbered {
                        question_number: format!("{ORPHAN_PARENT_NUMBER}{suffix}"),
                        parent_found: false,
                    },
                }
            }
        };

        self.assigned
            .insert(id.to_string(), numbered.question_number.clone());
        numbered
    }
}

/// Suffix for the `index`-th (1-based) child of a parent.
pub(crate) fn sub_index_suffix(index: u32) -> String {
    match index {
        1..=26 => char::from(b'a' + (index - 1) as u8).to_string(),
        _ => index.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sub_index_suffix() {
        assert_eq!(sub_index_suffix(1), "a");
        assert_eq!(sub_index_suffix(2), "b");
        assert_eq!(sub_index_suffix(26), "z");
        assert_eq!(sub_index_suffix(27), "27");
        assert_eq!(sub_index_suffix(100), "100");
    }

    #[test]
    fn test_top_level_and_children() {
        let mut engine = NumberingEngine::new();

        assert_eq!(engine.number("a", None).question_number, "1");
        assert_eq!(engine.number("b", None).question_number, "2");
        assert_eq!(engine.number("b1", Some("b")).question_number, "2a");
        assert_eq!(engine.number("a1", Some("a")).question_number, "1a");
        assert_eq!(engine.number("b2", Some("b")).question_number, "2b");
        assert_eq!(engine.number("c", None).question_number, "3");
    }

    #[test]
    fn test_grandchildren_extend_parent_number() {
        let mut engine = NumberingEngine::new();
        engine.number("a", None);
        engine.number("a1", Some("a"));

        let numbered = engine.number("a1x", Some("a1"));
        assert_eq!(numbered.question_number, "1aa");
        assert!(numbered.parent_found);
    }

    #[test]
    fn test_unnumbered_parent_uses_zero() {
        let mut engine = NumberingEngine::new();

        let first = engine.number("x", Some("later"));
        assert_eq!(first.question_number, "0a");
        assert!(!first.parent_found);

        let second = engine.number("y", Some("later"));
        assert_eq!(second.question_number, "0b");

        let other = engine.number("z", Some("elsewhere"));
        assert_eq!(other.question_number, "0a");
    }

    #[test]
    fn test_parent_numbered_after_orphan_keeps_counting() {
        let mut engine = NumberingEngine::new();
        engine.number("early", Some("p"));
        engine.number("p", None);

        assert_eq!(engine.number("late", Some("p")).question_number, "1b");
    }
}
