//! Rendering the `cacheguard` crate source.
//!
//! The output is laid out the way rustfmt formats it, so a regenerated
//! file diffs cleanly against the checked-in one.

use std::fmt::Write as _;

use crate::directive::{CfgPredicate, LayoutDirective};
use crate::group::Grouping;

/// Column limit for the catch-all comment.
const MAX_WIDTH: usize = 100;

/// Everything before the layout attributes.
pub const PREAMBLE: &str = r#"// @generated by `cacheguard-gen generate`. Edit the rule table, not this file.

//! A wrapper that aligns its contents to the cache line size of the target.
//!
//! Independently written values that share a cache line slow each other
//! down: every write invalidates the whole line on the other cores (false
//! sharing). Wrapping each value in a [`CacheGuard`] gives it a line of its
//! own.
//!
//! The alignment for every known `target_arch` is fixed when this file is
//! generated. Architectures the generator has never seen fall under the
//! catch-all rule.

#![no_std]
// some target_arch values are only known to nightly toolchains
#![allow(unexpected_cfgs)]

use core::fmt;
use core::ops::{Deref, DerefMut};

/// Pads and aligns a value to the cache line size of the target architecture.
///
/// `CacheGuard` only changes layout. Access goes through [`Deref`] and
/// [`DerefMut`], and the wrapper is `Send` or `Sync` exactly when `T` is.
///
/// # Examples
///
/// ```
/// use cacheguard::CacheGuard;
/// use core::sync::atomic::{AtomicUsize, Ordering};
///
/// let head = CacheGuard::new(AtomicUsize::new(0));
/// let tail = CacheGuard::new(AtomicUsize::new(0));
/// tail.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(head.load(Ordering::Relaxed), 0);
/// assert_eq!(tail.into_inner().into_inner(), 1);
/// ```
#[derive(Clone, Copy, Default, Hash, PartialEq, Eq)]
"#;

/// The wrapper definition after the layout attributes.
pub const WRAPPER: &str = r#"pub struct CacheGuard<T> {
    inner: T,
}

impl<T> CacheGuard<T> {
    /// Wraps `inner`, taking ownership of it.
    pub const fn new(inner: T) -> CacheGuard<T> {
        CacheGuard { inner }
    }

    /// Consumes the guard and returns the wrapped value.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: fmt::Debug> fmt::Debug for CacheGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheGuard")
            .field("inner", &self.inner)
            .finish()
    }
}

impl<T: fmt::Display> fmt::Display for CacheGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.inner, f)
    }
}

impl<T> From<T> for CacheGuard<T> {
    fn from(inner: T) -> CacheGuard<T> {
        CacheGuard::new(inner)
    }
}

impl<T> Deref for CacheGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T> DerefMut for CacheGuard<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}
"#;

/// Render the complete `lib.rs` for the given directives.
///
/// `grouping` is only consulted for the catch-all comment, which names
/// every architecture in the default-size group, including those no rule
/// matched.
pub fn render_source(grouping: &Grouping, directives: &[LayoutDirective]) -> String {
    let mut out = String::from(PREAMBLE);
    for directive in directives {
        if directive.is_catch_all() {
            let size = directive.size();
            let defaulted = grouping
                .group(size)
                .map(|archs| archs.iter().map(|a| a.as_str()).collect::<Vec<_>>())
                .unwrap_or_default();
            write_comment(&mut out, &catch_all_comment(size, &defaulted));
        }
        write_attribute(&mut out, &directive.predicate(), directive.size());
    }
    out.push_str(WRAPPER);
    out
}

fn catch_all_comment(size: u32, archs: &[&str]) -> String {
    if archs.is_empty() {
        format!("Defaults to {size}-byte alignment for all other targets")
    } else {
        format!(
            "Defaults to {size}-byte alignment for targets such as {} and all the others",
            archs.join(", ")
        )
    }
}

/// Write `text` as `//` line comments, wrapped greedily at [`MAX_WIDTH`].
fn write_comment(out: &mut String, text: &str) {
    let mut line = String::from("//");
    for word in text.split_whitespace() {
        if line.len() > 2 && line.len() + 1 + word.len() > MAX_WIDTH {
            out.push_str(&line);
            out.push('\n');
            line = String::from("//");
        }
        line.push(' ');
        line.push_str(word);
    }
    out.push_str(&line);
    out.push('\n');
}

/// Split a predicate into the opening, closing, and listed parts of its
/// multi-line form, or `None` if it fits on one line.
fn multiline_parts(
    predicate: &CfgPredicate,
) -> Option<(&'static str, &'static str, &[CfgPredicate])> {
    match predicate {
        CfgPredicate::Any(items) if !items.is_empty() => Some(("any(", ")", items)),
        CfgPredicate::Not(inner) => match inner.as_ref() {
            CfgPredicate::Any(items) if !items.is_empty() => Some(("not(any(", "))", items)),
            _ => None,
        },
        _ => None,
    }
}

fn write_attribute(out: &mut String, predicate: &CfgPredicate, size: u32) {
    // Writing into a String cannot fail.
    match multiline_parts(predicate) {
        None => {
            let _ = writeln!(out, "#[cfg_attr({predicate}, repr(align({size})))]");
        }
        Some((open, close, items)) => {
            out.push_str("#[cfg_attr(\n");
            let _ = writeln!(out, "    {open}");
            for item in items {
                let _ = writeln!(out, "        {item},");
            }
            let _ = writeln!(out, "    {close},");
            let _ = writeln!(out, "    repr(align({size}))");
            out.push_str(")]\n");
        }
    }
}
