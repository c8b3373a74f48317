//! Shared helpers

pub mod error;
pub mod prompt;
pub mod text;
