//! Property-based tests for combination enumeration
//!
//! These tests verify:
//! - Without rules every subset is produced exactly once
//! - Pruned enumeration agrees with filtering the full power set
//! - Exclusivity, equivalence and superset rules hold for every output
//! - Skip patterns respect match mode and base model scope
//! - Output order is deterministic and ascending

use std::collections::{BTreeMap, BTreeSet};

use dbdmix::{Attachment, Combination, Mixer, PartCatalog, Settings, SkipEntry};
use proptest::prelude::*;

const SLOT: &str = "SurvivorLegs";
const MODELS: [&str; 2] = ["M1", "M2"];

fn ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Part{i}")).collect()
}

fn catalog(n: usize) -> PartCatalog {
    let mut catalog = PartCatalog::new();
    for id in ids(n) {
        catalog.insert(Attachment::new(SLOT, id)).unwrap();
    }
    catalog.add_base_models(SLOT, MODELS);
    catalog
}

/// Randomly generated rule tables over `n` attachments
#[derive(Debug, Clone)]
struct RuleTables {
    n: usize,
    conflicts: Vec<(usize, usize)>,
    exclusive: Vec<usize>,
    equivalent: Option<(usize, Vec<usize>)>,
    superset: Option<(usize, usize)>,
}

impl RuleTables {
    fn settings(&self) -> Settings {
        let names = ids(self.n);
        let mut settings = Settings::default();

        let mut conflicts: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for &(a, b) in self.conflicts.iter().filter(|(a, b)| a != b) {
            conflicts
                .entry(names[a].clone())
                .or_default()
                .push(names[b].clone());
        }
        settings
            .attachment_conflicts
            .insert(SLOT.to_string(), conflicts);

        if !self.exclusive.is_empty() {
            let group = self.exclusive.iter().map(|&i| names[i].clone()).collect();
            settings
                .mutually_exclusive
                .insert(SLOT.to_string(), vec![group]);
        }

        if let Some((whole, parts)) = &self.equivalent {
            let parts: Vec<String> = parts
                .iter()
                .filter(|&&p| p != *whole)
                .map(|&p| names[p].clone())
                .collect();
            if !parts.is_empty() {
                let mut by_attachment = BTreeMap::new();
                by_attachment.insert(names[*whole].clone(), vec![parts]);
                settings
                    .equivalent_parts
                    .insert(SLOT.to_string(), by_attachment);
            }
        }

        if let Some((superset, part)) = self.superset {
            if superset != part {
                let mut by_attachment = BTreeMap::new();
                by_attachment.insert(names[superset].clone(), vec![vec![names[part].clone()]]);
                settings
                    .superset_parts
                    .insert(SLOT.to_string(), by_attachment);
            }
        }

        settings
    }
}

fn rule_tables_strategy() -> impl Strategy<Value = RuleTables> {
    (1usize..9).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n), 0..5),
            prop::collection::vec(0..n, 0..4),
            prop::option::of((0..n, prop::collection::vec(0..n, 1..3))),
            prop::option::of((0..n, 0..n)),
        )
            .prop_map(|(n, conflicts, exclusive, equivalent, superset)| RuleTables {
                n,
                conflicts,
                exclusive,
                equivalent,
                superset,
            })
    })
}

/// Every subset of `names` accepted by `is_compatible`, found without pruning
fn brute_force(mixer: &Mixer, names: &[String], model: &str) -> BTreeSet<Combination> {
    let mut valid = BTreeSet::new();
    for mask in 0u32..(1 << names.len()) {
        let subset: Vec<&str> = names
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, name)| name.as_str())
            .collect();
        if mixer.rules().is_compatible(SLOT, subset.iter().copied(), model) {
            valid.insert(subset.into_iter().collect());
        }
    }
    valid
}

proptest! {
    /// Without rules the enumerator yields the full power set, each subset once
    #[test]
    fn no_rules_yields_power_set(n in 0usize..10) {
        let mixer = Mixer::new(&Settings::default(), catalog(n)).unwrap();
        let combos: Vec<Combination> = mixer.enumerate_combinations(SLOT, "M1").collect();
        let unique: BTreeSet<&Combination> = combos.iter().collect();

        prop_assert_eq!(combos.len(), 1usize << n);
        prop_assert_eq!(unique.len(), combos.len());
    }

    /// Pruned enumeration matches post-hoc filtering of the power set, in ascending order
    #[test]
    fn pruning_matches_brute_force(tables in rule_tables_strategy()) {
        let mixer = Mixer::new(&tables.settings(), catalog(tables.n)).unwrap();
        let combos: Vec<Combination> = mixer.enumerate_combinations(SLOT, "M1").collect();

        prop_assert!(combos.windows(2).all(|w| w[0] < w[1]));

        let produced: BTreeSet<Combination> = combos.into_iter().collect();
        prop_assert_eq!(produced, brute_force(&mixer, &ids(tables.n), "M1"));
    }

    /// No output holds two members of an exclusive group, a superset with its part,
    /// or an equivalent with any part or with all of its parts
    #[test]
    fn rules_hold_for_every_output(tables in rule_tables_strategy()) {
        let settings = tables.settings();
        let mixer = Mixer::new(&settings, catalog(tables.n)).unwrap();

        for combo in mixer.enumerate_combinations(SLOT, "M2") {
            for group in settings.mutually_exclusive.get(SLOT).into_iter().flatten() {
                let members: BTreeSet<&String> = group.iter().collect();
                let present = members.iter().filter(|m| combo.contains(m)).count();
                prop_assert!(present <= 1, "{} breaks group {:?}", combo, group);
            }

            for (superset, sets) in settings.superset_parts.get(SLOT).into_iter().flatten() {
                for part in sets.iter().flatten() {
                    prop_assert!(!(combo.contains(superset) && combo.contains(part)));
                }
            }

            for (whole, sets) in settings.equivalent_parts.get(SLOT).into_iter().flatten() {
                for parts in sets {
                    for part in parts {
                        prop_assert!(!(combo.contains(whole) && combo.contains(part)));
                    }
                    prop_assert!(!parts.iter().all(|p| combo.contains(p)));
                }
            }
        }
    }

    /// Enumerating twice gives identical sequences
    #[test]
    fn enumeration_is_deterministic(tables in rule_tables_strategy()) {
        let mixer = Mixer::new(&tables.settings(), catalog(tables.n)).unwrap();
        let first: Vec<Combination> = mixer.enumerate_combinations(SLOT, "M1").collect();
        let second: Vec<Combination> = mixer.enumerate_combinations(SLOT, "M1").collect();

        prop_assert_eq!(first, second);
    }

    /// An unscoped superset pattern removes every combination containing it, for every model
    #[test]
    fn superset_skip_applies_everywhere(n in 2usize..8, x in 0usize..8, y in 0usize..8) {
        let (x, y) = (x % n, y % n);
        let names = ids(n);
        let mut settings = Settings::default();
        settings.combos_to_skip.insert(
            SLOT.to_string(),
            vec![vec![SkipEntry::parse(&names[x]), SkipEntry::parse(&names[y])]],
        );
        let mixer = Mixer::new(&settings, catalog(n)).unwrap();

        for model in MODELS {
            let kept: Vec<Combination> = mixer.mix(SLOT, model).collect();
            prop_assert!(kept.iter().all(|c| !(c.contains(&names[x]) && c.contains(&names[y]))));
            let removed = if x == y { 1usize << (n - 1) } else { 1usize << (n - 2) };
            prop_assert_eq!(kept.len(), (1usize << n) - removed);
        }
    }
}

#[test]
fn exact_scoped_skip_only_removes_the_exact_set() {
    let mut settings = Settings::default();
    settings
        .combos_to_skip
        .insert(SLOT.to_string(), vec![vec![SkipEntry::parse("Part0==:M1")]]);
    let mixer = Mixer::new(&settings, catalog(3)).unwrap();

    let only_x: Combination = ["Part0"].into_iter().collect();
    let x_and_z: Combination = ["Part0", "Part2"].into_iter().collect();

    let m1: Vec<Combination> = mixer.mix(SLOT, "M1").collect();
    let m2: Vec<Combination> = mixer.mix(SLOT, "M2").collect();

    assert!(!m1.contains(&only_x));
    assert!(m1.contains(&x_and_z));
    assert!(m2.contains(&only_x));
    assert!(m2.contains(&x_and_z));
    assert_eq!(m1.len(), 7);
    assert_eq!(m2.len(), 8);
}

#[test]
fn blue_chains_end_to_end() {
    let settings = Settings::from_yaml(
        r#"
baseModels:
  SurvivorLegs: [KateBikerVariantsRoughRider]
equivalentParts:
  SurvivorLegs:
    KateLegsBlueChains:
    - - KateLegsLeftBlueChain
      - KateLegsRightBlueChain
"#,
    )
    .unwrap();
    let mut catalog = PartCatalog::new();
    for id in [
        "KateLegsBlueChains",
        "KateLegsLeftBlueChain",
        "KateLegsRightBlueChain",
    ] {
        catalog.insert(Attachment::new(SLOT, id)).unwrap();
    }
    let mixer = Mixer::new(&settings, catalog).unwrap();

    let combos: Vec<Combination> = mixer
        .enumerate_combinations(SLOT, "KateBikerVariantsRoughRider")
        .collect();
    let expected: Vec<Combination> = vec![
        Combination::new(),
        ["KateLegsBlueChains"].into_iter().collect(),
        ["KateLegsLeftBlueChain"].into_iter().collect(),
        ["KateLegsRightBlueChain"].into_iter().collect(),
    ];
    assert_eq!(combos, expected);
}
