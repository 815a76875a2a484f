//! `cacheguard-gen check` — detect a stale generated file.

use std::path::Path;

use anyhow::{Context, Result};

use cacheguard_gen::{check_output, ArchitectureSource, Freshness, Generator, RuleTable};

/// Returns `Ok(true)` if `output` matches what `generate` would write.
pub fn run(table: &RuleTable, source: &dyn ArchitectureSource, output: &Path) -> Result<bool> {
    let generation = Generator::new(table.clone())
        .generate(source)
        .context("generating layout rules")?;
    let freshness = check_output(output, &generation.source)
        .with_context(|| format!("reading {}", output.display()))?;

    match freshness {
        Freshness::UpToDate => println!("{} is up to date", output.display()),
        Freshness::Stale => {
            println!("{} is stale; run `cacheguard-gen generate`", output.display())
        }
        Freshness::Missing => println!("{} does not exist", output.display()),
    }
    Ok(freshness == Freshness::UpToDate)
}
