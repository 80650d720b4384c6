//! Shared types, error model, and configuration for reeltab.
//!
//! This crate is the foundation depended on by all other reeltab crates.
//! It provides:
//! - [`ReeltabError`], the unified error type
//! - Domain types ([`Value`], [`FieldKind`], [`PageSnapshot`], [`RunId`])
//! - Configuration ([`AppConfig`], [`ScrapeProfile`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ChartSpec, DefaultsConfig, FieldSpec, MissingSpec, ScrapeProfile, config_dir,
    config_file_path, init_config, load_config, load_config_from, load_profile_from,
};
pub use error::{ReeltabError, Result};
pub use types::{FieldKind, PageSnapshot, RunId, Value};
