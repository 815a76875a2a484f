//! CLI command implementations.

pub mod check;
pub mod classify;
pub mod generate;
pub mod groups;
pub mod validate;
