//! cacheguard-gen — regenerates the `cacheguard` layout rules.

mod commands;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::Level;

use cacheguard_gen::{
    load_rules_toml, ArchitectureSource, ListFileSource, RuleTable, RustcSource,
};

/// Default location of the generated crate source, relative to the workspace root.
const DEFAULT_OUTPUT: &str = "crates/cacheguard/src/lib.rs";

#[derive(Parser)]
#[command(
    name = "cacheguard-gen",
    version,
    about = "Generate cache line alignment rules for cacheguard"
)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Regenerate the cacheguard source file
    Generate {
        #[command(flatten)]
        input: InputArgs,
        /// Output file
        #[arg(long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Exit with an error if the source file is not up to date
    Check {
        #[command(flatten)]
        input: InputArgs,
        /// File to compare against
        #[arg(long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },
    /// Show the cache line size chosen for architectures
    Classify {
        /// Architecture identifiers (e.g., x86_64, riscv32)
        #[arg(required = true)]
        archs: Vec<String>,
        /// Rule table TOML (default: built-in table)
        #[arg(long)]
        rules: Option<PathBuf>,
    },
    /// Show architecture groups and the layout directives they produce
    Groups {
        #[command(flatten)]
        input: InputArgs,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Check a rule table for unreachable or malformed rules
    Validate {
        /// Rule table TOML (default: built-in table)
        #[arg(long)]
        rules: Option<PathBuf>,
        /// Architectures to audit for overlapping rules
        #[arg(long)]
        arch_list: Option<PathBuf>,
    },
}

/// Where the rule table and architecture list come from.
#[derive(Args)]
struct InputArgs {
    /// Rule table TOML (default: built-in table)
    #[arg(long)]
    rules: Option<PathBuf>,
    /// Read architectures from a list file instead of querying rustc
    #[arg(long, conflicts_with_all = ["rustc", "toolchain"])]
    arch_list: Option<PathBuf>,
    /// rustc executable to query
    #[arg(long, default_value = "rustc")]
    rustc: PathBuf,
    /// Rustup toolchain passed as +<name>; empty for none
    #[arg(long, default_value = "nightly")]
    toolchain: String,
}

impl InputArgs {
    fn table(&self) -> Result<RuleTable> {
        load_table(self.rules.as_deref())
    }

    fn source(&self) -> Box<dyn ArchitectureSource> {
        match &self.arch_list {
            Some(path) => Box::new(ListFileSource::new(path)),
            None => Box::new(RustcSource {
                rustc: self.rustc.clone(),
                toolchain: (!self.toolchain.is_empty()).then(|| self.toolchain.clone()),
            }),
        }
    }
}

fn load_table(rules: Option<&std::path::Path>) -> Result<RuleTable> {
    match rules {
        Some(path) => load_rules_toml(path)
            .with_context(|| format!("loading rule table {}", path.display())),
        None => Ok(RuleTable::builtin()),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        (false, _) => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("error: {e:#}");
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but reported a failure.
fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Generate { input, output } => {
            commands::generate::run(&input.table()?, input.source().as_ref(), &output)?;
            Ok(true)
        }
        Commands::Check { input, output } => {
            commands::check::run(&input.table()?, input.source().as_ref(), &output)
        }
        Commands::Classify { archs, rules } => {
            commands::classify::run(&load_table(rules.as_deref())?, &archs)?;
            Ok(true)
        }
        Commands::Groups { input, json } => {
            commands::groups::run(&input.table()?, input.source().as_ref(), json)?;
            Ok(true)
        }
        Commands::Validate { rules, arch_list } => {
            let universe = arch_list.map(ListFileSource::new);
            commands::validate::run(
                &load_table(rules.as_deref())?,
                universe.as_ref().map(|s| s as &dyn ArchitectureSource),
            )
        }
    }
}
