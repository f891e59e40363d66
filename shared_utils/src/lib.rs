//! Helpers shared by the workspace binaries.

pub mod env;
