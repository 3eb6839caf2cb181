//! Shared types, error model, and configuration for BookAdvisor.
//!
//! This crate is the foundation depended on by all other BookAdvisor crates.
//! It provides:
//! - The unified error type ([`BookAdvisorError`])
//! - Domain types ([`BookRecord`], [`BookRecordBuilder`], [`RawHit`])
//! - Configuration ([`AppConfig`], [`CatalogConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, CatalogSection, LibrarySection, MAX_DESCRIPTION_CHARS,
    MAX_RESULT_LIMIT, SaveMode, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_config,
};
pub use error::{BookAdvisorError, Result};
pub use types::{
    BookRecord, BookRecordBuilder, ELLIPSIS, RawHit, UNKNOWN_AUTHOR, UNKNOWN_PUBLISH_DATE,
    single_line,
};
