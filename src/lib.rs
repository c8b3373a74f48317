//! installer-storage library - storage configuration model for a Linux installer

pub mod api;
pub mod backend;
pub mod config;
pub mod context;
pub mod describe;
pub mod edit;
pub mod hooks;
pub mod menu;
pub mod model;
pub mod routes;
pub mod utils;

pub use config::Settings;
pub use context::{LoadState, StorageContext};
pub use hooks::{Hooks, Outcome};
pub use model::Model;
pub use utils::error::{Result, StorageError};
