//! Attachment combinations and their enumeration.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::rules::RuleSet;

/// One candidate set of attachments for a slot, kept in ascending order
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Combination(BTreeSet<String>);

impl Combination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attachments(&self) -> &BTreeSet<String> {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Combination {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Combination(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, id) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{id}")?;
        }
        write!(f, "}}")
    }
}

/// Lazily yields every rule-valid combination of a slot's attachments.
///
/// Combinations are built depth-first, adding candidates in ascending id
/// order, and a branch is abandoned as soon as the newest attachment breaks a
/// rule. The empty combination comes first and the output is in lexicographic
/// order of the sorted attachment lists. A slot missing from the catalog
/// yields nothing.
#[derive(Debug)]
pub struct ComboEnumerator<'a> {
    rules: &'a RuleSet,
    slot: String,
    candidates: Vec<&'a str>,
    /// Indices into `candidates` of the current combination
    path: Vec<usize>,
    chosen: Vec<&'a str>,
    /// Next candidate index to try extending `path` with
    next: usize,
    started: bool,
}

impl<'a> ComboEnumerator<'a> {
    pub fn new(rules: &'a RuleSet, slot: &str, base_model: &str) -> Self {
        let known = rules.catalog().slot(slot).is_some();
        let candidates = rules.catalog().available(slot, base_model);
        tracing::trace!(
            "Enumerating {} candidate(s) for {slot} on {base_model}",
            candidates.len()
        );

        ComboEnumerator {
            rules,
            slot: slot.to_string(),
            candidates,
            path: Vec::new(),
            chosen: Vec::new(),
            next: 0,
            started: !known,
        }
    }

    fn current(&self) -> Combination {
        self.chosen.iter().copied().collect()
    }
}

impl Iterator for ComboEnumerator<'_> {
    type Item = Combination;

    fn next(&mut self) -> Option<Combination> {
        if !self.started {
            self.started = true;
            return Some(Combination::new());
        }

        loop {
            if self.next < self.candidates.len() {
                let index = self.next;
                self.next += 1;

                let candidate = self.candidates[index];
                if self.rules.admits(&self.slot, &self.chosen, candidate) {
                    self.path.push(index);
                    self.chosen.push(candidate);
                    return Some(self.current());
                }
            } else {
                // Exhausted this branch; backtrack
                let index = self.path.pop()?;
                self.chosen.pop();
                self.next = index + 1;
            }
        }
    }
}

impl std::iter::FusedIterator for ComboEnumerator<'_> {}
