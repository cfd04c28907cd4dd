//! Common types and utilities shared across pagetree.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and runtime options
//! - Error types
//! - Identifiers and records (PageId, Key, Value)

pub mod config;
pub mod error;
mod page_id;
mod value;

pub use config::TreeOptions;
pub use error::{Error, Result};
pub use page_id::PageId;
pub use value::{Key, Value};
