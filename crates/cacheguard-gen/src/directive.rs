//! Layout directives: the `cfg` conditions that pick an alignment per target.
//!
//! [`emit`] turns a [`Grouping`] into one [`LayoutDirective::Explicit`] per
//! non-default size and a single [`LayoutDirective::CatchAll`] for the
//! default size. The catch-all condition is the negation of the union of
//! the explicit conditions, so every architecture identifier, known or
//! not, satisfies exactly one directive.

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::arch::ArchitectureId;
use crate::group::Grouping;

/// A `cfg` predicate over `target_arch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CfgPredicate {
    /// `target_arch = "<arch>"`
    TargetArch(ArchitectureId),
    /// `any(...)`; false when empty.
    Any(Vec<CfgPredicate>),
    /// `not(...)`
    Not(Box<CfgPredicate>),
}

impl CfgPredicate {
    /// Equality for one architecture, `any` over equalities for several.
    pub fn one_of<'a, I>(archs: I) -> Self
    where
        I: IntoIterator<Item = &'a ArchitectureId>,
    {
        let mut preds: Vec<CfgPredicate> = archs
            .into_iter()
            .map(|a| CfgPredicate::TargetArch(a.clone()))
            .collect();
        if preds.len() == 1 {
            preds.remove(0)
        } else {
            CfgPredicate::Any(preds)
        }
    }

    /// Evaluate the predicate as if compiling for `arch`.
    pub fn eval(&self, arch: &ArchitectureId) -> bool {
        match self {
            CfgPredicate::TargetArch(a) => a == arch,
            CfgPredicate::Any(preds) => preds.iter().any(|p| p.eval(arch)),
            CfgPredicate::Not(inner) => !inner.eval(arch),
        }
    }
}

impl fmt::Display for CfgPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfgPredicate::TargetArch(a) => write!(f, "target_arch = \"{a}\""),
            CfgPredicate::Any(preds) => {
                write!(f, "any(")?;
                for (i, p) in preds.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{p}")?;
                }
                write!(f, ")")
            }
            CfgPredicate::Not(inner) => write!(f, "not({inner})"),
        }
    }
}

/// One conditional alignment rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum LayoutDirective {
    /// Align to `size` on exactly these architectures.
    Explicit {
        /// Alignment in bytes.
        size: u32,
        /// Architectures the directive applies to, sorted.
        architectures: BTreeSet<ArchitectureId>,
    },
    /// Align to `size` on every architecture not in `excluded`.
    CatchAll {
        /// Alignment in bytes.
        size: u32,
        /// Architectures covered by explicit directives, sorted.
        excluded: BTreeSet<ArchitectureId>,
    },
}

impl LayoutDirective {
    /// Alignment in bytes.
    pub fn size(&self) -> u32 {
        match self {
            LayoutDirective::Explicit { size, .. } | LayoutDirective::CatchAll { size, .. } => {
                *size
            }
        }
    }

    /// Whether this is the catch-all directive.
    pub fn is_catch_all(&self) -> bool {
        matches!(self, LayoutDirective::CatchAll { .. })
    }

    /// The `cfg` condition under which the directive applies.
    pub fn predicate(&self) -> CfgPredicate {
        match self {
            LayoutDirective::Explicit { architectures, .. } => CfgPredicate::one_of(architectures),
            LayoutDirective::CatchAll { excluded, .. } => {
                CfgPredicate::Not(Box::new(CfgPredicate::one_of(excluded)))
            }
        }
    }

    /// Whether the directive applies when compiling for `arch`.
    pub fn matches(&self, arch: &ArchitectureId) -> bool {
        match self {
            LayoutDirective::Explicit { architectures, .. } => architectures.contains(arch),
            LayoutDirective::CatchAll { excluded, .. } => !excluded.contains(arch),
        }
    }
}

/// Build the layout directives for a grouping.
///
/// Explicit directives come first, ascending by size, one per non-empty
/// group other than `default_size`. The final directive is the catch-all
/// for `default_size`, excluding every architecture named above it.
pub fn emit(grouping: &Grouping, default_size: u32) -> Vec<LayoutDirective> {
    let mut directives = Vec::new();
    let mut excluded = BTreeSet::new();

    for (&size, archs) in &grouping.groups {
        if size == default_size || archs.is_empty() {
            continue;
        }
        excluded.extend(archs.iter().cloned());
        directives.push(LayoutDirective::Explicit {
            size,
            architectures: archs.clone(),
        });
    }

    directives.push(LayoutDirective::CatchAll {
        size: default_size,
        excluded,
    });
    directives
}

/// The directive that applies to `arch`.
///
/// Returns `None` only if the directives are not exhaustive, which
/// [`emit`] output never is.
pub fn select<'a>(
    directives: &'a [LayoutDirective],
    arch: &ArchitectureId,
) -> Option<&'a LayoutDirective> {
    directives.iter().find(|d| d.matches(arch))
}
