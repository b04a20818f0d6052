//! URL handling module for Listing-Harvester
//!
//! This module provides domain extraction, politeness-pattern matching and
//! resolution of page-relative links.

mod domain;
mod link;
mod matcher;

pub use domain::{domain_of, extract_domain};
pub use link::resolve_link;
pub use matcher::matches_wildcard;
