//! Cache line size classification and layout rule generation for `cacheguard`.
//!
//! Decides, for every architecture a toolchain knows, what alignment
//! `CacheGuard` needs, and emits that decision as a set of mutually
//! exclusive `cfg_attr(..., repr(align(N)))` rules.
//!
//! ## Modules
//!
//! - [`arch`] — Validated `target_arch` identifiers
//! - [`source`] — Architecture lists from rustc, list files, or memory
//! - [`rules`] — Ordered classification rules and the built-in table
//! - [`config`] — Rule table TOML files and validation
//! - [`group`] — Grouping architectures by cache line size
//! - [`directive`] — Layout directives and their `cfg` predicates
//! - [`render`] — The generated `lib.rs`
//! - [`pipeline`] — End-to-end generation and output writing

pub mod arch;
pub mod config;
pub mod directive;
pub mod error;
pub mod group;
pub mod pipeline;
pub mod render;
pub mod rules;
pub mod source;

// Re-export key types for convenience
pub use arch::ArchitectureId;
pub use config::{audit_overlaps, load_rules_toml, validate_rules, ValidationIssue};
pub use directive::{emit, CfgPredicate, LayoutDirective};
pub use error::{GenError, Result};
pub use group::{group, Grouping};
pub use pipeline::{check_output, write_output, Freshness, Generation, Generator};
pub use render::render_source;
pub use rules::{Classification, ClassificationRule, RuleTable, DEFAULT_SIZE};
pub use source::{ArchitectureSource, ListFileSource, RustcSource, StaticSource};
