//! Grouping architectures by cache line size.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::arch::ArchitectureId;
use crate::rules::RuleTable;

/// Architectures partitioned by classified cache line size.
///
/// Both levels are ordered collections, so the grouping of a set of
/// architectures does not depend on the order they were supplied in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Grouping {
    /// Cache line size to the architectures assigned that size.
    pub groups: BTreeMap<u32, BTreeSet<ArchitectureId>>,
    /// Architectures no rule matched; these are also in the default group.
    pub unmatched: BTreeSet<ArchitectureId>,
}

impl Grouping {
    /// Architectures assigned `size`, if any.
    pub fn group(&self, size: u32) -> Option<&BTreeSet<ArchitectureId>> {
        self.groups.get(&size)
    }

    /// Distinct sizes present, ascending.
    pub fn sizes(&self) -> impl Iterator<Item = u32> + '_ {
        self.groups.keys().copied()
    }

    /// Total number of architectures grouped.
    pub fn len(&self) -> usize {
        self.groups.values().map(BTreeSet::len).sum()
    }

    /// Whether no architectures were grouped.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Classify every architecture with `table` and group by size.
pub fn group<'a, I>(archs: I, table: &RuleTable) -> Grouping
where
    I: IntoIterator<Item = &'a ArchitectureId>,
{
    let mut grouping = Grouping::default();
    for arch in archs {
        let classification = table.classify(arch);
        if classification.is_fallback() {
            grouping.unmatched.insert(arch.clone());
        }
        grouping
            .groups
            .entry(classification.size)
            .or_default()
            .insert(arch.clone());
    }
    grouping
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::parse_all;

    fn names(set: &BTreeSet<ArchitectureId>) -> Vec<&str> {
        set.iter().map(ArchitectureId::as_str).collect()
    }

    #[test]
    fn groups_reference_input() {
        let archs =
            parse_all(["s390x", "x86_64", "aarch64", "riscv32", "msp430", "unknownarch9"]).unwrap();
        let grouping = group(&archs, &RuleTable::builtin());

        assert_eq!(grouping.sizes().collect::<Vec<_>>(), vec![8, 32, 64, 128, 256]);
        assert_eq!(names(grouping.group(256).unwrap()), vec!["s390x"]);
        assert_eq!(names(grouping.group(128).unwrap()), vec!["aarch64", "x86_64"]);
        assert_eq!(names(grouping.group(32).unwrap()), vec!["riscv32"]);
        assert_eq!(names(grouping.group(8).unwrap()), vec!["msp430"]);
        assert_eq!(names(grouping.group(64).unwrap()), vec!["unknownarch9"]);
        assert_eq!(names(&grouping.unmatched), vec!["unknownarch9"]);
        assert_eq!(grouping.len(), 6);
    }

    #[test]
    fn input_order_does_not_matter() {
        let table = RuleTable::builtin();
        let mut archs = parse_all(["wasm32", "x86", "m68k", "arm", "powerpc", "bpf"]).unwrap();
        let expected = group(&archs, &table);

        archs.reverse();
        assert_eq!(group(&archs, &table), expected);
        archs.rotate_left(2);
        assert_eq!(group(&archs, &table), expected);
    }

    #[test]
    fn duplicates_collapse() {
        let archs = parse_all(["arm", "arm", "avr"]).unwrap();
        let grouping = group(&archs, &RuleTable::builtin());
        assert_eq!(names(grouping.group(32).unwrap()), vec!["arm", "avr"]);
    }

    #[test]
    fn empty_input() {
        let none: Vec<ArchitectureId> = Vec::new();
        let grouping = group(&none, &RuleTable::builtin());
        assert!(grouping.is_empty());
        assert!(grouping.unmatched.is_empty());
    }
}
