// @generated by `cacheguard-gen generate`. Edit the rule table, not this file.

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
#[cfg_attr(target_arch = "msp430", repr(align(8)))]
#[cfg_attr(target_arch = "m68k", repr(align(16)))]
#[cfg_attr(
    any(
        target_arch = "arm",
        target_arch = "avr",
        target_arch = "hexagon",
        target_arch = "mips",
        target_arch = "mips32r6",
        target_arch = "riscv32",
        target_arch = "riscv64",
        target_arch = "sparc",
        target_arch = "xtensa",
    ),
    repr(align(32))
)]
#[cfg_attr(
    any(
        target_arch = "aarch64",
        target_arch = "amdgpu",
        target_arch = "arm64ec",
        target_arch = "mips64",
        target_arch = "mips64r6",
        target_arch = "nvptx64",
        target_arch = "powerpc",
        target_arch = "powerpc64",
        target_arch = "wasm32",
        target_arch = "wasm64",
        target_arch = "x86_64",
    ),
    repr(align(128))
)]
#[cfg_attr(target_arch = "s390x", repr(align(256)))]
// Defaults to 64-byte alignment for targets such as bpf, csky, loongarch64, sparc64, x86 and all
// the others
#[cfg_attr(
    not(any(
        target_arch = "aarch64",
        target_arch = "amdgpu",
        target_arch = "arm",
        target_arch = "arm64ec",
        target_arch = "avr",
        target_arch = "hexagon",
        target_arch = "m68k",
        target_arch = "mips",
        target_arch = "mips32r6",
        target_arch = "mips64",
        target_arch = "mips64r6",
        target_arch = "msp430",
        target_arch = "nvptx64",
        target_arch = "powerpc",
        target_arch = "powerpc64",
        target_arch = "riscv32",
        target_arch = "riscv64",
        target_arch = "s390x",
        target_arch = "sparc",
        target_arch = "wasm32",
        target_arch = "wasm64",
        target_arch = "x86_64",
        target_arch = "xtensa",
    )),
    repr(align(64))
)]
pub struct CacheGuard<T> {
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
