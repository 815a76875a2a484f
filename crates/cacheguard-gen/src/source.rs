//! Where architecture identifiers come from.
//!
//! The authoritative source is the compiler itself ([`RustcSource`]). A
//! list file ([`ListFileSource`]) lets the crate be regenerated offline
//! from a recorded snapshot, and [`StaticSource`] serves embedding and tests.

use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::arch::ArchitectureId;
use crate::error::{GenError, Result};

/// Supplies the architectures known to a toolchain.
pub trait ArchitectureSource {
    /// Every architecture identifier, deduplicated and sorted.
    ///
    /// An error here is fatal to a generation run.
    fn list_architectures(&self) -> Result<Vec<ArchitectureId>>;
}

/// A fixed list of architectures.
#[derive(Debug, Clone, Default)]
pub struct StaticSource(pub Vec<ArchitectureId>);

impl ArchitectureSource for StaticSource {
    fn list_architectures(&self) -> Result<Vec<ArchitectureId>> {
        Ok(sorted_unique(self.0.iter().cloned()))
    }
}

/// Architectures read from a text file, one per line.
///
/// Blank lines and `#` comments are ignored.
#[derive(Debug, Clone)]
pub struct ListFileSource {
    path: PathBuf,
}

impl ListFileSource {
    /// Read from `path` when queried.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The file this source reads.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchitectureSource for ListFileSource {
    fn list_architectures(&self) -> Result<Vec<ArchitectureId>> {
        if !self.path.exists() {
            return Err(GenError::NotFound {
                path: self.path.clone(),
            });
        }
        let content = std::fs::read_to_string(&self.path)?;
        parse_arch_list(&content)
    }
}

/// Parse the list file format.
pub fn parse_arch_list(content: &str) -> Result<Vec<ArchitectureId>> {
    let ids = content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty())
        .map(ArchitectureId::new)
        .collect::<Result<Vec<_>>>()?;
    Ok(sorted_unique(ids))
}

/// Render architectures in the list file format.
pub fn arch_list_to_string(archs: &[ArchitectureId]) -> String {
    let mut out = String::from("# target_arch values, one per line\n");
    for arch in archs {
        out.push_str(arch.as_str());
        out.push('\n');
    }
    out
}

/// Queries `rustc` for its target list and each target's `target_arch`.
#[derive(Debug, Clone)]
pub struct RustcSource {
    /// The `rustc` executable.
    pub rustc: PathBuf,
    /// Rustup toolchain to select with `+<name>`, if any.
    pub toolchain: Option<String>,
}

impl Default for RustcSource {
    fn default() -> Self {
        Self {
            rustc: PathBuf::from("rustc"),
            toolchain: Some("nightly".into()),
        }
    }
}

impl RustcSource {
    /// Run `rustc` with `args` and return its stdout.
    fn run(&self, args: &[&str]) -> Result<String> {
        let mut command = Command::new(&self.rustc);
        if let Some(toolchain) = &self.toolchain {
            command.arg(format!("+{toolchain}"));
        }
        command.args(args);
        let rendered = format!("{command:?}");

        tracing::debug!(command = %rendered, "querying toolchain");
        let output = command.output().map_err(|e| GenError::Toolchain {
            command: rendered.clone(),
            detail: format!("failed to spawn: {e}"),
        })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GenError::Toolchain {
                command: rendered,
                detail: format!("{}: {}", output.status, stderr.trim()),
            });
        }
        String::from_utf8(output.stdout).map_err(|e| GenError::Toolchain {
            command: rendered,
            detail: format!("output is not UTF-8: {e}"),
        })
    }
}

impl ArchitectureSource for RustcSource {
    fn list_architectures(&self) -> Result<Vec<ArchitectureId>> {
        let targets = self.run(&["--print=target-list"])?;
        let representatives = representative_targets(&targets);
        tracing::info!(
            targets = targets.lines().count(),
            queried = representatives.len(),
            "collected target list"
        );

        let mut archs = Vec::new();
        for target in representatives {
            let cfg = self.run(&["--print=cfg", &format!("--target={target}")])?;
            match parse_cfg_target_arch(&cfg) {
                Some(arch) => archs.push(ArchitectureId::new(arch)?),
                None => tracing::warn!(triple = %target, "no target_arch in cfg output"),
            }
        }
        Ok(sorted_unique(archs))
    }
}

/// The first triple for each distinct leading component of the target
/// list, in list order.
///
/// Triples sharing a leading component (`x86_64-unknown-linux-gnu`,
/// `x86_64-pc-windows-msvc`) share a `target_arch`, so one query each is
/// enough.
pub fn representative_targets(target_list: &str) -> Vec<&str> {
    let mut seen = HashSet::new();
    target_list
        .lines()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter(|&t| seen.insert(t.split('-').next().unwrap_or(t)))
        .collect()
}

/// Extract the value of `target_arch="..."` from `rustc --print=cfg` output.
pub fn parse_cfg_target_arch(cfg: &str) -> Option<&str> {
    cfg.lines().find_map(|line| {
        line.trim()
            .strip_prefix("target_arch=\"")?
            .strip_suffix('"')
    })
}

fn sorted_unique(ids: impl IntoIterator<Item = ArchitectureId>) -> Vec<ArchitectureId> {
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
