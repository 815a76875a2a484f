//! The generation pipeline: source → classify → group → emit → render.

use std::io::Write as _;
use std::path::Path;

use crate::arch::ArchitectureId;
use crate::config::validate_rules;
use crate::directive::{emit, LayoutDirective};
use crate::error::{GenError, Result};
use crate::group::{group, Grouping};
use crate::render::render_source;
use crate::rules::RuleTable;
use crate::source::ArchitectureSource;

/// Everything a generation run produced.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Architectures reported by the source, sorted.
    pub architectures: Vec<ArchitectureId>,
    /// Architectures grouped by cache line size.
    pub grouping: Grouping,
    /// Layout directives, explicit ones first, catch-all last.
    pub directives: Vec<LayoutDirective>,
    /// The rendered `lib.rs`.
    pub source: String,
}

/// Whether an output file matches what would be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// The file matches byte for byte.
    UpToDate,
    /// The file exists but differs.
    Stale,
    /// The file does not exist.
    Missing,
}

/// Runs the pipeline with one rule table.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    table: RuleTable,
}

impl Generator {
    /// A generator using `table`.
    pub fn new(table: RuleTable) -> Self {
        Self { table }
    }

    /// A generator using [`RuleTable::builtin`].
    pub fn builtin() -> Self {
        Self::new(RuleTable::builtin())
    }

    /// The rule table in use.
    pub fn table(&self) -> &RuleTable {
        &self.table
    }

    /// Reject a rule table with validation errors.
    ///
    /// Warnings are logged and do not fail the check.
    pub fn check_rules(&self) -> Result<()> {
        let Err(issues) = validate_rules(&self.table) else {
            return Ok(());
        };
        let (errors, warnings): (Vec<_>, Vec<_>) =
            issues.into_iter().partition(|issue| issue.is_error());
        for issue in &warnings {
            tracing::warn!(issue = %issue.message, "rule table");
        }
        if errors.is_empty() {
            return Ok(());
        }
        Err(GenError::InvalidRules {
            detail: errors
                .iter()
                .map(|issue| issue.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        })
    }

    /// Group and emit directives for an already collected list.
    ///
    /// Unmatched architectures are logged as warnings and folded into the
    /// catch-all directive.
    pub fn plan(&self, architectures: &[ArchitectureId]) -> (Grouping, Vec<LayoutDirective>) {
        let grouping = group(architectures, &self.table);
        for arch in &grouping.unmatched {
            tracing::warn!(
                %arch,
                default_size = self.table.default_size,
                "no cache line rule matches architecture, using default"
            );
        }
        let directives = emit(&grouping, self.table.default_size);
        tracing::debug!(
            architectures = grouping.len(),
            directives = directives.len(),
            "emitted layout directives"
        );
        (grouping, directives)
    }

    /// Run the whole pipeline against `source`.
    ///
    /// An invalid rule table or a source failure aborts the run before
    /// anything is rendered.
    pub fn generate(&self, source: &dyn ArchitectureSource) -> Result<Generation> {
        self.check_rules()?;
        let architectures = source.list_architectures()?;
        tracing::info!(count = architectures.len(), "classifying architectures");
        let (grouping, directives) = self.plan(&architectures);
        let source = render_source(&grouping, &directives);
        Ok(Generation {
            architectures,
            grouping,
            directives,
            source,
        })
    }
}

/// Replace `path` with `contents`.
///
/// The data is written to a temporary file next to `path` and renamed
/// over it, so readers never observe a partially written file.
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "wrote generated source");
    Ok(())
}

/// Compare `path` against `expected`.
pub fn check_output(path: &Path, expected: &str) -> Result<Freshness> {
    if !path.exists() {
        return Ok(Freshness::Missing);
    }
    let current = std::fs::read_to_string(path)?;
    Ok(if current == expected {
        Freshness::UpToDate
    } else {
        Freshness::Stale
    })
}
