//! Application services layer.

pub mod error;
pub mod gateway;
pub mod overview;
pub mod posts;
pub mod repos;
