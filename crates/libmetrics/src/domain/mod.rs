//! Core domain types and operations for library metrics.
//!
//! This module provides the domain layer containing:
//! - **types**: Core data structures (Domain, Library, Issue, LastDiscussion)
//! - **queries**: Pure lookups and per-metric series over domain collections
//!
//! The domain layer has no knowledge of the source tables and can be used
//! directly by any renderer.

pub mod queries;
pub mod types;

pub use types::*;
