//! Rule table files: TOML loading, serialization, and validation.
//!
//! A rule table can be kept outside the binary as a `rules.toml`:
//!
//! ```toml
//! default-size = 64
//!
//! [[rules]]
//! size = 256
//! patterns = ["s390x"]
//! ```

use std::path::Path;

use crate::arch::{invalid_token, ArchitectureId};
use crate::error::{GenError, Result};
use crate::rules::{RuleTable, ALLOWED_SIZES};

/// A validation issue found in a rule table.
#[derive(Debug, Clone)]
pub struct ValidationIssue {
    /// Severity: "error" or "warning".
    pub severity: &'static str,
    /// Human-readable description.
    pub message: String,
}

impl ValidationIssue {
    fn error(message: String) -> Self {
        Self {
            severity: "error",
            message,
        }
    }

    fn warning(message: String) -> Self {
        Self {
            severity: "warning",
            message,
        }
    }

    /// Whether this issue should fail validation outright.
    pub fn is_error(&self) -> bool {
        self.severity == "error"
    }
}

/// Load a rule table from a TOML file.
pub fn load_rules_toml(path: &Path) -> Result<RuleTable> {
    if !path.exists() {
        return Err(GenError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let content = std::fs::read_to_string(path)?;
    parse_rules_toml(&content)
}

/// Parse a rule table from a TOML string.
pub fn parse_rules_toml(toml_str: &str) -> Result<RuleTable> {
    let table: RuleTable = toml::from_str(toml_str)?;
    Ok(table)
}

/// Serialize a rule table to pretty TOML.
pub fn rules_to_toml(table: &RuleTable) -> Result<String> {
    let toml_str = toml::to_string_pretty(table)?;
    Ok(toml_str)
}

/// Validate a rule table for structural correctness.
///
/// Returns `Ok(())` if there are no issues at all, or `Err(issues)`.
/// Callers that tolerate warnings should filter with
/// [`ValidationIssue::is_error`].
pub fn validate_rules(table: &RuleTable) -> std::result::Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if !ALLOWED_SIZES.contains(&table.default_size) {
        issues.push(ValidationIssue::error(format!(
            "default size {} is not one of {ALLOWED_SIZES:?}",
            table.default_size
        )));
    }

    for (i, rule) in table.rules.iter().enumerate() {
        if !ALLOWED_SIZES.contains(&rule.size) {
            issues.push(ValidationIssue::error(format!(
                "rule {i} has size {} which is not one of {ALLOWED_SIZES:?}",
                rule.size
            )));
        }
        if rule.patterns.is_empty() {
            issues.push(ValidationIssue::error(format!(
                "rule {i} ({} bytes) has no patterns",
                rule.size
            )));
        }
        for pattern in &rule.patterns {
            if let Some(detail) = invalid_token(pattern) {
                issues.push(ValidationIssue::error(format!(
                    "rule {i} pattern {pattern:?} is not an architecture prefix: {detail}"
                )));
            }
        }
    }

    // A pattern is unreachable when an earlier pattern is a prefix of it:
    // every identifier it could match is taken by the earlier rule first.
    let flat: Vec<(usize, u32, &str)> = table
        .rules
        .iter()
        .enumerate()
        .flat_map(|(i, r)| r.patterns.iter().map(move |p| (i, r.size, p.as_str())))
        .collect();
    for (pos, &(later_rule, later_size, later)) in flat.iter().enumerate() {
        for &(earlier_rule, earlier_size, earlier) in &flat[..pos] {
            if !later.starts_with(earlier) {
                continue;
            }
            if earlier == later {
                issues.push(ValidationIssue::warning(format!(
                    "pattern {later:?} appears in rule {earlier_rule} and again in rule {later_rule}"
                )));
            } else if earlier_size != later_size {
                issues.push(ValidationIssue::error(format!(
                    "pattern {later:?} ({later_size} bytes, rule {later_rule}) is unreachable: \
                     {earlier:?} ({earlier_size} bytes, rule {earlier_rule}) matches first"
                )));
            } else {
                issues.push(ValidationIssue::warning(format!(
                    "pattern {later:?} in rule {later_rule} is redundant with {earlier:?}"
                )));
            }
            break;
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

/// An architecture matched by rules assigning different sizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap {
    /// The architecture.
    pub arch: ArchitectureId,
    /// `(rule index, size)` for every matching rule, in priority order.
    /// The first entry is the one that applies.
    pub candidates: Vec<(usize, u32)>,
}

/// Report every architecture in `universe` that two or more rules of
/// different sizes would claim.
///
/// Overlaps are legal (priority resolves them) but each one is a place
/// where moving a rule changes the output, so they are worth reviewing.
pub fn audit_overlaps(table: &RuleTable, universe: &[ArchitectureId]) -> Vec<Overlap> {
    let mut overlaps: Vec<Overlap> = universe
        .iter()
        .filter_map(|arch| {
            let candidates: Vec<(usize, u32)> = table
                .all_matches(arch)
                .into_iter()
                .map(|i| (i, table.rules[i].size))
                .collect();
            let first = candidates.first()?.1;
            candidates.iter().any(|&(_, size)| size != first).then(|| Overlap {
                arch: arch.clone(),
                candidates,
            })
        })
        .collect();
    overlaps.sort_by(|a, b| a.arch.cmp(&b.arch));
    overlaps.dedup_by(|a, b| a.arch == b.arch);
    overlaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arch::parse_all;
    use crate::rules::ClassificationRule;

    #[test]
    fn round_trip_builtin() {
        let original = RuleTable::builtin();
        let toml_str = rules_to_toml(&original).unwrap();
        assert!(toml_str.contains("default-size = 64"));
        assert_eq!(parse_rules_toml(&toml_str).unwrap(), original);
    }

    #[test]
    fn parse_minimal_toml() {
        let toml_str = r#"
default-size = 64

[[rules]]
size = 128
patterns = ["x86_64", "aarch64"]

[[rules]]
size = 32
patterns = ["riscv"]
"#;
        let table = parse_rules_toml(toml_str).unwrap();
        assert_eq!(table.rules.len(), 2);
        assert_eq!(table.rules[0].patterns, vec!["x86_64", "aarch64"]);
        assert!(validate_rules(&table).is_ok());
    }

    #[test]
    fn parse_missing_field_returns_error() {
        assert!(parse_rules_toml("[[rules]]\nsize = 32\npatterns = []\n").is_err());
    }

    #[test]
    fn load_not_found() {
        let result = load_rules_toml(Path::new("/nonexistent/rules.toml"));
        assert!(matches!(result.unwrap_err(), GenError::NotFound { .. }));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, rules_to_toml(&RuleTable::builtin()).unwrap()).unwrap();
        assert_eq!(load_rules_toml(&path).unwrap(), RuleTable::builtin());
    }

    #[test]
    fn builtin_table_is_valid() {
        assert!(validate_rules(&RuleTable::builtin()).is_ok());
    }

    #[test]
    fn validate_bad_sizes() {
        let table = RuleTable {
            default_size: 48,
            rules: vec![ClassificationRule::new(512, &["x86"])],
        };
        let issues = validate_rules(&table).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("default size 48")));
        assert!(issues.iter().any(|i| i.message.contains("size 512")));
    }

    #[test]
    fn validate_empty_patterns() {
        let table = RuleTable {
            default_size: 64,
            rules: vec![ClassificationRule::new(32, &[])],
        };
        let issues = validate_rules(&table).unwrap_err();
        assert!(issues.iter().any(|i| i.message.contains("no patterns")));
    }

    #[test]
    fn validate_malformed_pattern() {
        let table = RuleTable {
            default_size: 64,
            rules: vec![ClassificationRule::new(32, &["^arm.*"])],
        };
        let issues = validate_rules(&table).unwrap_err();
        assert!(issues.iter().all(ValidationIssue::is_error));
        assert!(issues[0].message.contains("not an architecture prefix"));
    }

    #[test]
    fn validate_shadowed_pattern() {
        // "arm" first makes the later "arm64" dead.
        let table = RuleTable {
            default_size: 64,
            rules: vec![
                ClassificationRule::new(32, &["arm"]),
                ClassificationRule::new(128, &["arm64"]),
            ],
        };
        let issues = validate_rules(&table).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].is_error());
        assert!(issues[0].message.contains("unreachable"));
    }

    #[test]
    fn validate_duplicate_pattern_warns() {
        let table = RuleTable {
            default_size: 64,
            rules: vec![
                ClassificationRule::new(32, &["avr"]),
                ClassificationRule::new(16, &["avr"]),
            ],
        };
        let issues = validate_rules(&table).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert!(!issues[0].is_error());
    }

    #[test]
    fn audit_builtin_overlaps_resolve_to_specific_pattern() {
        let table = RuleTable::builtin();
        let universe = parse_all(["x86_64", "x86", "arm64ec", "mips64", "sparc64", "s390x"]).unwrap();
        let overlaps = audit_overlaps(&table, &universe);
        let names: Vec<_> = overlaps.iter().map(|o| o.arch.as_str()).collect();
        assert_eq!(names, vec!["arm64ec", "mips64", "sparc64", "x86_64"]);
        for o in &overlaps {
            let applied = table.classify(&o.arch);
            assert_eq!(applied.size, o.candidates[0].1);
            let pattern = applied.matched.unwrap().pattern;
            // The pattern that wins is the longest one that matches.
            let longest = table
                .rules
                .iter()
                .flat_map(|r| r.patterns.iter())
                .filter(|p| o.arch.has_prefix(p))
                .map(String::len)
                .max()
                .unwrap();
            assert_eq!(pattern.len(), longest, "{}", o.arch);
        }
    }
}
