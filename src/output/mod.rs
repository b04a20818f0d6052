//! Output module for harvest reports
//!
//! This module handles loading aggregate counts from the download-state
//! database and printing them after a run.

pub mod stats;

pub use stats::{format_statistics, load_statistics, print_statistics, StoreStatistics};
