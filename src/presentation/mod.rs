//! Terminal rendering for the `browse` command.

pub mod commands;
pub mod overview;
