//! Shared helpers.

pub mod exec;
pub mod fs;
pub mod plural;
