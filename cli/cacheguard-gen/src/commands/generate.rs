//! `cacheguard-gen generate` — regenerate the cacheguard source.

use std::path::Path;

use anyhow::{Context, Result};

use cacheguard_gen::{write_output, ArchitectureSource, Generator, RuleTable};

/// Run the pipeline and replace `output` with the result.
///
/// Nothing is written unless every step succeeds.
pub fn run(table: &RuleTable, source: &dyn ArchitectureSource, output: &Path) -> Result<()> {
    let generation = Generator::new(table.clone())
        .generate(source)
        .context("generating layout rules")?;
    write_output(output, &generation.source)
        .with_context(|| format!("writing {}", output.display()))?;

    println!(
        "Wrote {} ({} architectures, {} layout rules)",
        output.display(),
        generation.architectures.len(),
        generation.directives.len()
    );
    if !generation.grouping.unmatched.is_empty() {
        let names: Vec<_> = generation
            .grouping
            .unmatched
            .iter()
            .map(|a| a.as_str())
            .collect();
        println!(
            "Unclassified (default {} bytes): {}",
            table.default_size,
            names.join(", ")
        );
    }
    Ok(())
}
