//! # tgraph - Network topology visualizer
//!
//! This library turns a JSON description of a network topology (hosts,
//! switches, routers and the links between them) into a deterministic 2D
//! layout and draws it, either interactively in a terminal or as a static
//! SVG, GraphViz DOT, text or JSON artifact.
//!
//! ## Architecture
//!
//! - `graph`: typed topology model, the JSON parser that builds it, and
//!   structural analysis (degrees, components)
//! - `layout`: deterministic force-directed layout engine
//! - `render`: scene construction and the SVG/DOT/text/JSON/interactive backends
//! - `topology`: the `Topology` facade driving parse -> layout -> render
//! - `config` / `config_loader`: layout and style configuration
//! - `error`: error types shared by all stages
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use tgraph::{ExportFormat, Topology};
//! use serde_json::json;
//!
//! let config = json!({
//!     "nodes": [ { "id": "h1" }, { "id": "s1", "kind": "switch" } ],
//!     "links": [ { "from": "h1", "to": "s1", "bandwidth": "1Gbit" } ]
//! });
//!
//! let mut topology = Topology::new(config);
//! topology.export("network.svg".as_ref(), ExportFormat::Svg)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Input Format
//!
//! ```json
//! { "nodes": [ { "id": "r1", "kind": "router", "label": "Edge", "asn": 65001 } ],
//!   "links": [ { "from": "r1", "to": "s1", "bandwidth": "10Gbit", "label": "uplink" } ] }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return `Result<T, TopologyError>`. Schema, duplicate
//! node and dangling link errors are always reported before any layout or
//! rendering work starts.

pub mod config;
pub mod config_loader;
pub mod error;
pub mod graph;
pub mod layout;
pub mod render;
pub mod topology;

pub use config::{LayoutConfig, StyleConfig, ViewerConfig};
pub use error::{RenderError, TopologyError};
pub use graph::{GraphModel, Link, Node};
pub use layout::{Layout, LayoutEngine, Point};
pub use render::{ExportFormat, RenderTarget, Renderer, Scene};
pub use topology::{Topology, TopologyState};
