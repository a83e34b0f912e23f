//! Blog post API with a reactive terminal overview.

pub mod application;
pub mod config;
pub mod domain;
pub mod infra;
pub mod presentation;
mod util;
