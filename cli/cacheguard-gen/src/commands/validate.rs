//! `cacheguard-gen validate` — rule table diagnostics.

use anyhow::{Context, Result};

use cacheguard_gen::{audit_overlaps, validate_rules, ArchitectureSource, RuleTable};

/// Validate `table`, and audit overlaps against `universe` if given.
///
/// Returns `Ok(false)` if any error-level issue was found. Warnings and
/// overlaps are reported but do not fail validation.
pub fn run(table: &RuleTable, universe: Option<&dyn ArchitectureSource>) -> Result<bool> {
    let issues = validate_rules(table).err().unwrap_or_default();
    let errors = issues.iter().filter(|i| i.is_error()).count();
    for issue in &issues {
        println!("  [{}] {}", issue.severity, issue.message);
    }

    if let Some(source) = universe {
        let archs = source
            .list_architectures()
            .context("listing architectures")?;
        let overlaps = audit_overlaps(table, &archs);
        if !overlaps.is_empty() {
            println!("Overlapping rules (first one applies):");
        }
        for overlap in &overlaps {
            let candidates: Vec<String> = overlap
                .candidates
                .iter()
                .map(|(rule, size)| format!("rule {rule} ({size} bytes)"))
                .collect();
            println!("  {:<16} {}", overlap.arch, candidates.join(" > "));
        }
    }

    if errors == 0 {
        println!(
            "Rule table OK ({} rules, {} warnings)",
            table.rules.len(),
            issues.len()
        );
    } else {
        println!("Rule table has {errors} errors");
    }
    Ok(errors == 0)
}
