//! Pipeline orchestration

pub mod build;
pub mod error;

pub use build::{select_targets, Builder};
pub use error::BuildError;
