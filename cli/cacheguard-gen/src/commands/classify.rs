//! `cacheguard-gen classify` — explain the size chosen for architectures.

use anyhow::Result;

use cacheguard_gen::{ArchitectureId, RuleTable};

/// Print the cache line size and deciding rule for each architecture.
pub fn run(table: &RuleTable, archs: &[String]) -> Result<()> {
    for name in archs {
        let arch = ArchitectureId::new(name.as_str())?;
        let classification = table.classify(&arch);
        match &classification.matched {
            Some(m) => println!(
                "  {:<16} {:>3} bytes  (rule {}, pattern \"{}\")",
                arch, classification.size, m.rule_index, m.pattern
            ),
            None => println!(
                "  {:<16} {:>3} bytes  (default, no rule matched)",
                arch, classification.size
            ),
        }
    }
    Ok(())
}
