//! Storage layer - disk I/O and page formats.
//!
//! This module handles persistent storage:
//! - [`DiskManager`] - Page store over a single file
//! - [`FileHeader`] - Page 0 layout
//! - [`page`] - Page buffer and the shared node header
//! - [`IoStats`] - I/O and split counters

mod disk_manager;
mod file_header;
pub mod page;
mod stats;

pub use disk_manager::DiskManager;
pub use file_header::FileHeader;
pub use stats::{IoStats, StatsSnapshot};
