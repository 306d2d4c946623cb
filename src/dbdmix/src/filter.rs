//! Skip patterns applied to rule-valid combinations.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::combo::Combination;
use crate::settings::SkipEntry;

/// How a skip pattern is compared against a combination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Skip every combination containing all of the pattern's attachments
    #[default]
    Superset,
    /// Skip only the combination equal to the pattern
    Exact,
}

/// A compiled `combosToSkip` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipPattern {
    pub attachments: BTreeSet<String>,
    pub match_mode: MatchMode,
    /// Base models the pattern is limited to (empty = all)
    pub base_models: BTreeSet<String>,
}

impl SkipPattern {
    /// Build a pattern from parsed entries.
    ///
    /// Any `==` entry switches the whole pattern to exact matching; the base
    /// model scope is the union of every entry's scope.
    pub fn from_entries(entries: &[SkipEntry]) -> Self {
        let match_mode = if entries.iter().any(|e| e.exact) {
            MatchMode::Exact
        } else {
            MatchMode::Superset
        };

        SkipPattern {
            attachments: entries.iter().map(|e| e.attachment.clone()).collect(),
            match_mode,
            base_models: entries
                .iter()
                .flat_map(|e| e.base_models.iter().cloned())
                .collect(),
        }
    }

    pub fn applies_to(&self, base_model: &str) -> bool {
        self.base_models.is_empty() || self.base_models.contains(base_model)
    }

    pub fn matches(&self, combo: &Combination, base_model: &str) -> bool {
        if !self.applies_to(base_model) {
            return false;
        }

        match self.match_mode {
            MatchMode::Exact => combo.attachments() == &self.attachments,
            MatchMode::Superset => self.attachments.is_subset(combo.attachments()),
        }
    }
}

/// Skip patterns per slot
#[derive(Debug, Clone, Default)]
pub struct ComboFilter {
    patterns: BTreeMap<String, Vec<SkipPattern>>,
}

impl ComboFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, slot: &str, pattern: SkipPattern) {
        self.patterns
            .entry(slot.to_string())
            .or_default()
            .push(pattern);
    }

    pub fn patterns(&self, slot: &str) -> &[SkipPattern] {
        self.patterns.get(slot).map(Vec::as_slice).unwrap_or(&[])
    }

    /// True if `combo` should be left out of the mix for `base_model`
    pub fn should_skip(&self, slot: &str, combo: &Combination, base_model: &str) -> bool {
        self.patterns(slot)
            .iter()
            .any(|pattern| pattern.matches(combo, base_model))
    }

    pub fn len(&self) -> usize {
        self.patterns.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TORSO: &str = "SurvivorTorso";

    fn pattern(entries: &[&str]) -> SkipPattern {
        let entries: Vec<SkipEntry> = entries.iter().map(|e| SkipEntry::parse(e)).collect();
        SkipPattern::from_entries(&entries)
    }

    fn combo(ids: &[&str]) -> Combination {
        ids.iter().copied().collect()
    }

    #[test]
    fn test_superset_unscoped() {
        let p = pattern(&["X", "Y"]);

        assert_eq!(p.match_mode, MatchMode::Superset);
        assert!(p.matches(&combo(&["X", "Y"]), "M1"));
        assert!(p.matches(&combo(&["W", "X", "Y"]), "M2"));
        assert!(!p.matches(&combo(&["X"]), "M1"));
    }

    #[test]
    fn test_exact_scoped() {
        let p = pattern(&["X==:M1"]);

        assert_eq!(p.match_mode, MatchMode::Exact);
        assert!(p.matches(&combo(&["X"]), "M1"));
        assert!(!p.matches(&combo(&["X"]), "M2"));
        assert!(!p.matches(&combo(&["X", "Z"]), "M1"));
        assert!(!p.matches(&combo(&["X", "Z"]), "M2"));
    }

    #[test]
    fn test_scope_is_union_of_entries() {
        let p = pattern(&["X:M1", "Y:M2"]);

        assert!(p.matches(&combo(&["X", "Y"]), "M1"));
        assert!(p.matches(&combo(&["X", "Y"]), "M2"));
        assert!(!p.matches(&combo(&["X", "Y"]), "M3"));
    }

    #[test]
    fn test_filter_by_slot() {
        let mut filter = ComboFilter::new();
        filter.add(TORSO, pattern(&["KateGuitar", "KatePurpleHat"]));
        filter.add(TORSO, pattern(&["KateBlueGemNecklace", "KateGoldNecklaceNoRing"]));

        let hat_and_guitar = combo(&["KateGuitar", "KatePurpleHat"]);
        assert!(filter.should_skip(TORSO, &hat_and_guitar, "M1"));
        assert!(!filter.should_skip("SurvivorLegs", &hat_and_guitar, "M1"));
        assert!(!filter.should_skip(TORSO, &combo(&["KateGuitar"]), "M1"));
        assert_eq!(filter.len(), 2);
    }
}
