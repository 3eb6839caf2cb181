//! Core orchestration and domain logic for BookAdvisor.
//!
//! This crate ties together catalog search, description lookup and result
//! assembly into the end-to-end search workflow, plus the library
//! maintenance operations used by the CLI.

pub mod assembler;
pub mod library;
pub mod pipeline;

pub use assembler::{RESULTS_GROUP, ResultTree, assemble, to_record};
pub use pipeline::{SearchPipeline, SearchProgress, SilentProgress, validate_query};
