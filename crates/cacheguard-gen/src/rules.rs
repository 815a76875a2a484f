//! Cache line classification rules.
//!
//! A [`RuleTable`] is an ordered list of rules, each pairing a cache line
//! size with a set of architecture prefixes, plus a default size for
//! architectures no rule matches. Rule order is priority order: the first
//! rule with a matching pattern decides the size.

use serde::{Deserialize, Serialize};

use crate::arch::ArchitectureId;

/// Cache line sizes a rule may assign, in bytes.
pub const ALLOWED_SIZES: [u32; 6] = [8, 16, 32, 64, 128, 256];

/// Size used for architectures that match no rule.
pub const DEFAULT_SIZE: u32 = 64;

/// One classification rule: every architecture starting with one of
/// `patterns` has a cache line of `size` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClassificationRule {
    /// Cache line size in bytes.
    pub size: u32,
    /// Architecture prefixes. Alternatives; their order is irrelevant.
    pub patterns: Vec<String>,
}

impl ClassificationRule {
    /// Build a rule from a size and a list of prefixes.
    pub fn new(size: u32, patterns: &[&str]) -> Self {
        Self {
            size,
            patterns: patterns.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// The first pattern that is a prefix of `arch`, if any.
    pub fn matching_pattern(&self, arch: &ArchitectureId) -> Option<&str> {
        self.patterns
            .iter()
            .map(String::as_str)
            .find(|p| arch.has_prefix(p))
    }
}

/// Which rule and pattern produced a classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    /// Position of the rule in the table.
    pub rule_index: usize,
    /// The pattern that matched.
    pub pattern: String,
}

/// Outcome of classifying one architecture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Cache line size in bytes.
    pub size: u32,
    /// The deciding rule, or `None` when the default size was used.
    pub matched: Option<RuleMatch>,
}

impl Classification {
    /// Whether no rule matched and the default size was used.
    pub fn is_fallback(&self) -> bool {
        self.matched.is_none()
    }
}

/// Ordered rule list plus a default size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuleTable {
    /// Size for architectures no rule matches. Also emitted as the
    /// catch-all layout rule.
    pub default_size: u32,
    /// Rules in priority order.
    pub rules: Vec<ClassificationRule>,
}

impl RuleTable {
    /// The built-in table.
    ///
    /// Groups run from 256 bytes down to 8. Wherever a prefix of one group
    /// is a prefix of a pattern in another (`x86` and `x86_64`, `arm` and
    /// `arm64`, `mips` and `mips64`, `sparc` and `sparc64`), the longer
    /// pattern sits in the earlier rule.
    pub fn builtin() -> Self {
        Self {
            default_size: DEFAULT_SIZE,
            rules: vec![
                ClassificationRule::new(256, &["s390x"]),
                // mips64 and powerpc may be 32 on some parts; 128 covers both.
                // wasm has no line size of its own; its common hosts use 128.
                ClassificationRule::new(
                    128,
                    &[
                        "mips64", "arm64", "powerpc", "aarch64", "x86_64", "wasm", "amdgpu",
                        "nvptx64",
                    ],
                ),
                ClassificationRule::new(64, &["sparc64", "bpf", "csky", "loongarch64", "x86"]),
                ClassificationRule::new(
                    32,
                    &["mips", "hexagon", "sparc", "arm", "avr", "xtensa", "riscv"],
                ),
                ClassificationRule::new(16, &["m68k"]),
                ClassificationRule::new(8, &["msp430"]),
            ],
        }
    }

    /// Map an architecture to its cache line size.
    ///
    /// Rules are tried in order and the first matching one wins. If none
    /// matches, the result carries the default size and no [`RuleMatch`];
    /// callers decide whether to surface that.
    pub fn classify(&self, arch: &ArchitectureId) -> Classification {
        self.rules
            .iter()
            .enumerate()
            .find_map(|(rule_index, rule)| {
                rule.matching_pattern(arch).map(|pattern| Classification {
                    size: rule.size,
                    matched: Some(RuleMatch {
                        rule_index,
                        pattern: pattern.to_string(),
                    }),
                })
            })
            .unwrap_or(Classification {
                size: self.default_size,
                matched: None,
            })
    }

    /// Indices of every rule with a pattern matching `arch`, in priority order.
    pub fn all_matches(&self, arch: &ArchitectureId) -> Vec<usize> {
        self.rules
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.matching_pattern(arch).is_some())
            .map(|(i, _)| i)
            .collect()
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arch(s: &str) -> ArchitectureId {
        ArchitectureId::new(s).unwrap()
    }

    #[test]
    fn builtin_sizes() {
        let table = RuleTable::builtin();
        let cases = [
            ("s390x", 256),
            ("x86_64", 128),
            ("aarch64", 128),
            ("arm64ec", 128),
            ("powerpc64", 128),
            ("wasm32", 128),
            ("mips64r6", 128),
            ("x86", 64),
            ("sparc64", 64),
            ("loongarch64", 64),
            ("riscv32", 32),
            ("mips32r6", 32),
            ("arm", 32),
            ("sparc", 32),
            ("m68k", 16),
            ("msp430", 8),
        ];
        for (id, size) in cases {
            assert_eq!(table.classify(&arch(id)).size, size, "{id}");
        }
    }

    #[test]
    fn first_matching_rule_wins() {
        let table = RuleTable::builtin();
        // x86_64 matches both "x86_64" (128) and "x86" (64).
        let c = table.classify(&arch("x86_64"));
        assert_eq!(table.all_matches(&arch("x86_64")), vec![1, 2]);
        assert_eq!(c.size, 128);
        assert_eq!(
            c.matched,
            Some(RuleMatch {
                rule_index: 1,
                pattern: "x86_64".into()
            })
        );
    }

    #[test]
    fn reordering_rules_changes_result() {
        let table = RuleTable {
            default_size: 64,
            rules: vec![
                ClassificationRule::new(32, &["arm"]),
                ClassificationRule::new(128, &["arm64"]),
            ],
        };
        assert_eq!(table.classify(&arch("arm64ec")).size, 32);
    }

    #[test]
    fn unmatched_falls_back_to_default() {
        let table = RuleTable::builtin();
        let c = table.classify(&arch("unknownarch9"));
        assert!(c.is_fallback());
        assert_eq!(c.size, DEFAULT_SIZE);
    }

    #[test]
    fn classify_is_deterministic() {
        let table = RuleTable::builtin();
        let id = arch("riscv64");
        assert_eq!(table.classify(&id), table.classify(&id));
    }
}
