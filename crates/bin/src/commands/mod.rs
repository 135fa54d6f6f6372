//! Subcommand implementations.

pub(crate) mod extract;
pub(crate) mod fetch;
