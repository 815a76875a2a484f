//! `cacheguard-gen groups` — show groups and layout directives.

use anyhow::{Context, Result};
use serde::Serialize;

use cacheguard_gen::{ArchitectureSource, Generator, Grouping, LayoutDirective, RuleTable};

/// JSON shape of `groups --json`.
#[derive(Serialize)]
struct GroupsReport<'a> {
    default_size: u32,
    grouping: &'a Grouping,
    directives: &'a [LayoutDirective],
}

/// Print the grouping and the directives derived from it.
pub fn run(table: &RuleTable, source: &dyn ArchitectureSource, json: bool) -> Result<()> {
    let generator = Generator::new(table.clone());
    generator.check_rules()?;
    let architectures = source
        .list_architectures()
        .context("listing architectures")?;
    let (grouping, directives) = generator.plan(&architectures);

    if json {
        let report = GroupsReport {
            default_size: table.default_size,
            grouping: &grouping,
            directives: &directives,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Groups:");
    for (size, archs) in &grouping.groups {
        let marker = if *size == table.default_size { " (default)" } else { "" };
        let names: Vec<_> = archs.iter().map(|a| a.as_str()).collect();
        println!("  {size:>3} bytes{marker}: {}", names.join(", "));
    }
    println!();
    println!("Layout rules:");
    for directive in &directives {
        println!(
            "  repr(align({})) when {}",
            directive.size(),
            directive.predicate()
        );
    }
    Ok(())
}
