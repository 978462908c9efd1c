//! Topology graph module.
//!
//! This module contains the typed topology model, the parser that builds it
//! from a decoded JSON document, and structural analysis helpers.

pub mod analysis;
pub mod model;
pub mod parser;

// Re-export key types and functions for easier access
pub use analysis::{connected_components, summarize, GraphSummary};
pub use model::{AttrValue, GraphModel, Link, Node};
pub use parser::parse_topology;
