//! Compiled mixing rules.
//!
//! The four rule families from the settings file (equivalent parts, superset
//! parts, mutually exclusive groups and attachment conflicts) are compiled per
//! slot into two primitive constraints:
//!
//! - forbidden pairs: two attachments that may never appear together
//! - forbidden sets: a set of attachments that may never all appear together
//!
//! Both are monotone. Once a partial combination violates one of them, every
//! extension of it does too, which is what lets the enumerator prune early.
//!
//! Skip patterns are validated here as well and compiled into a [`ComboFilter`].

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use crate::catalog::PartCatalog;
use crate::filter::{ComboFilter, SkipPattern};
use crate::settings::{PartSets, Settings};

const EQUIVALENT_PARTS: &str = "equivalentParts";
const SUPERSET_PARTS: &str = "supersetParts";
const MUTUALLY_EXCLUSIVE: &str = "mutuallyExclusive";
const ATTACHMENT_CONFLICTS: &str = "attachmentConflicts";
const COMBOS_TO_SKIP: &str = "combosToSkip";

/// Every problem found while compiling settings against the catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "invalid attachment settings ({} problem(s)):\n{}",
    .problems.len(),
    bullet_list(.problems)
)]
pub struct ConfigError {
    pub problems: Vec<String>,
}

fn bullet_list(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Forbidden pairs and sets for one slot
#[derive(Debug, Clone, Default)]
struct SlotRules {
    /// Symmetric: if `b` is in `pairs[a]` then `a` is in `pairs[b]`
    pairs: BTreeMap<String, BTreeSet<String>>,
    sets: Vec<BTreeSet<String>>,
    /// Attachment → indices into `sets` containing it
    sets_by_member: BTreeMap<String, Vec<usize>>,
}

impl SlotRules {
    fn forbid_pair(&mut self, a: &str, b: &str) {
        if a == b {
            return;
        }
        self.pairs
            .entry(a.to_string())
            .or_default()
            .insert(b.to_string());
        self.pairs
            .entry(b.to_string())
            .or_default()
            .insert(a.to_string());
    }

    fn forbid_set(&mut self, set: BTreeSet<String>) {
        if set.is_empty() || self.sets.contains(&set) {
            return;
        }
        let index = self.sets.len();
        for member in &set {
            self.sets_by_member
                .entry(member.clone())
                .or_default()
                .push(index);
        }
        self.sets.push(set);
    }

    fn pair_forbidden(&self, a: &str, b: &str) -> bool {
        self.pairs.get(a).is_some_and(|others| others.contains(b))
    }
}

/// Collects problems while walking the settings tables
struct Validator<'a> {
    catalog: &'a PartCatalog,
    problems: Vec<String>,
}

impl Validator<'_> {
    fn slot(&mut self, table: &str, slot: &str) -> bool {
        if self.catalog.slot(slot).is_some() {
            return true;
        }
        self.problems
            .push(format!("slot `{slot}` referenced in {table} is not defined"));
        false
    }

    fn attachment(&mut self, table: &str, slot: &str, id: &str) {
        if !self.catalog.contains(slot, id) {
            self.problems.push(format!(
                "attachment `{id}` referenced in {table}[{slot}] is not defined"
            ));
        }
    }

    fn base_model(&mut self, table: &str, slot: &str, model: &str) {
        if !self.catalog.has_base_model(slot, model) {
            self.problems.push(format!(
                "base model `{model}` referenced in {table}[{slot}] is not defined"
            ));
        }
    }

    fn push(&mut self, problem: String) {
        self.problems.push(problem);
    }
}

/// Validated, compiled rules over a fixed attachment catalog
#[derive(Debug, Clone)]
pub struct RuleSet {
    catalog: PartCatalog,
    slots: BTreeMap<String, SlotRules>,
    filter: ComboFilter,
}

impl RuleSet {
    /// Validate `settings` against `catalog` and compile the rule tables.
    ///
    /// Base models listed under `baseModels` are registered on the catalog
    /// first. All problems are reported together in one [`ConfigError`].
    pub fn compile(settings: &Settings, mut catalog: PartCatalog) -> Result<Self, ConfigError> {
        for (slot, models) in &settings.base_models {
            catalog.add_base_models(slot, models.iter().cloned());
        }

        let mut validator = Validator {
            catalog: &catalog,
            problems: Vec::new(),
        };
        let mut slots: BTreeMap<String, SlotRules> = BTreeMap::new();
        let mut filter = ComboFilter::new();

        validate_restrictions(&mut validator);

        compile_part_sets(
            &mut validator,
            &mut slots,
            EQUIVALENT_PARTS,
            &settings.equivalent_parts,
            |rules, whole, parts| {
                for part in parts {
                    rules.forbid_pair(whole, part);
                }
                rules.forbid_set(parts.iter().cloned().collect());
            },
        );

        compile_part_sets(
            &mut validator,
            &mut slots,
            SUPERSET_PARTS,
            &settings.superset_parts,
            |rules, superset, parts| {
                for part in parts {
                    rules.forbid_pair(superset, part);
                }
            },
        );

        for (slot, groups) in &settings.mutually_exclusive {
            if !validator.slot(MUTUALLY_EXCLUSIVE, slot) {
                continue;
            }
            let rules = slots.entry(slot.clone()).or_default();
            for group in groups {
                if group.is_empty() {
                    validator.push(format!("empty group in {MUTUALLY_EXCLUSIVE}[{slot}]"));
                    continue;
                }
                for (i, a) in group.iter().enumerate() {
                    validator.attachment(MUTUALLY_EXCLUSIVE, slot, a);
                    for b in &group[i + 1..] {
                        rules.forbid_pair(a, b);
                    }
                }
            }
        }

        for (slot, conflicts) in &settings.attachment_conflicts {
            if !validator.slot(ATTACHMENT_CONFLICTS, slot) {
                continue;
            }
            let rules = slots.entry(slot.clone()).or_default();
            for (target, others) in conflicts {
                validator.attachment(ATTACHMENT_CONFLICTS, slot, target);
                for other in others {
                    validator.attachment(ATTACHMENT_CONFLICTS, slot, other);
                    if other == target {
                        validator.push(format!(
                            "`{target}` conflicts with itself in {ATTACHMENT_CONFLICTS}[{slot}]"
                        ));
                    }
                    rules.forbid_pair(target, other);
                }
            }
        }

        for (slot, patterns) in &settings.combos_to_skip {
            if !validator.slot(COMBOS_TO_SKIP, slot) {
                continue;
            }
            for entries in patterns {
                if entries.is_empty() {
                    validator.push(format!("empty pattern in {COMBOS_TO_SKIP}[{slot}]"));
                    continue;
                }
                for entry in entries {
                    if entry.attachment.is_empty() {
                        validator.push(format!(
                            "empty attachment name `{entry}` in {COMBOS_TO_SKIP}[{slot}]"
                        ));
                    } else {
                        validator.attachment(COMBOS_TO_SKIP, slot, &entry.attachment);
                    }
                    for model in &entry.base_models {
                        validator.base_model(COMBOS_TO_SKIP, slot, model);
                    }
                }
                filter.add(slot, SkipPattern::from_entries(entries));
            }
        }

        let problems = validator.problems;
        if !problems.is_empty() {
            return Err(ConfigError { problems });
        }

        tracing::debug!(
            "Compiled rules for {} slot(s) and {} skip pattern(s)",
            slots.len(),
            filter.len()
        );
        Ok(RuleSet {
            catalog,
            slots,
            filter,
        })
    }

    pub fn catalog(&self) -> &PartCatalog {
        &self.catalog
    }

    pub fn filter(&self) -> &ComboFilter {
        &self.filter
    }

    /// True if `attachments` may be combined in `slot` on `base_model`.
    ///
    /// Every attachment must exist in the slot and fit the base model, no
    /// forbidden pair may be present, and no forbidden set may be fully present.
    pub fn is_compatible<'s, I>(&self, slot: &str, attachments: I, base_model: &str) -> bool
    where
        I: IntoIterator<Item = &'s str>,
    {
        let Some(catalog_slot) = self.catalog.slot(slot) else {
            return false;
        };
        let present: BTreeSet<&str> = attachments.into_iter().collect();

        let all_fit = present.iter().all(|id| {
            catalog_slot
                .attachment(id)
                .is_some_and(|attachment| attachment.fits(base_model))
        });
        if !all_fit {
            return false;
        }

        let Some(rules) = self.slots.get(slot) else {
            return true;
        };

        let pair_violation = present.iter().any(|a| {
            rules
                .pairs
                .get(*a)
                .is_some_and(|others| others.iter().any(|b| present.contains(b.as_str())))
        });
        let set_violation = rules
            .sets
            .iter()
            .any(|set| set.iter().all(|member| present.contains(member.as_str())));

        !pair_violation && !set_violation
    }

    /// True if `candidate` can extend `partial` without breaking a rule.
    ///
    /// `partial` is assumed to already be compatible.
    pub fn admits(&self, slot: &str, partial: &[&str], candidate: &str) -> bool {
        let Some(rules) = self.slots.get(slot) else {
            return true;
        };

        if partial.iter().any(|a| rules.pair_forbidden(candidate, a)) {
            return false;
        }

        let completes_set = rules.sets_by_member.get(candidate).is_some_and(|indices| {
            indices.iter().any(|&index| {
                rules.sets[index]
                    .iter()
                    .all(|member| member == candidate || partial.contains(&member.as_str()))
            })
        });

        !completes_set
    }
}

/// Every restricted attachment must name base models its slot declares
fn validate_restrictions(validator: &mut Validator<'_>) {
    let catalog = validator.catalog;
    for slot in catalog.slots() {
        for attachment in slot.attachments() {
            let Some(models) = &attachment.base_models else {
                continue;
            };
            for model in models {
                if !catalog.has_base_model(&slot.name, model) {
                    validator.push(format!(
                        "base model `{model}` referenced by attachment `{}` in {} is not defined",
                        attachment.id, slot.name
                    ));
                }
            }
        }
    }
}

fn compile_part_sets<F>(
    validator: &mut Validator<'_>,
    slots: &mut BTreeMap<String, SlotRules>,
    table: &str,
    part_sets: &PartSets,
    mut apply: F,
) where
    F: FnMut(&mut SlotRules, &str, &[String]),
{
    for (slot, by_attachment) in part_sets {
        if !validator.slot(table, slot) {
            continue;
        }
        let rules = slots.entry(slot.clone()).or_default();
        for (attachment, sets) in by_attachment {
            validator.attachment(table, slot, attachment);
            for parts in sets {
                if parts.is_empty() {
                    validator.push(format!(
                        "empty part set for `{attachment}` in {table}[{slot}]"
                    ));
                    continue;
                }
                for part in parts {
                    validator.attachment(table, slot, part);
                    if part == attachment {
                        validator.push(format!(
                            "`{attachment}` lists itself as a part in {table}[{slot}]"
                        ));
                    }
                }
                apply(&mut *rules, attachment, parts);
            }
        }
    }
}
