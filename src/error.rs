//! Error types shared by the parser, renderer and the `Topology` facade.

use std::path::PathBuf;

use crate::config::ValidationError;

/// Errors surfaced by the topology pipeline
///
/// Parsing and validation errors (`Schema`, `DuplicateNode`,
/// `DanglingLink`) are always raised before any layout or render work.
#[derive(Debug, thiserror::Error)]
pub enum TopologyError {
    #[error("Invalid topology configuration: {0}")]
    Schema(String),
    #[error("Duplicate node identifier '{id}'")]
    DuplicateNode { id: String },
    #[error("Link #{index} ({from} -- {to}) references unknown node '{missing}'")]
    DanglingLink {
        index: usize,
        from: String,
        to: String,
        missing: String,
    },
    #[error(transparent)]
    Config(#[from] ValidationError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl TopologyError {
    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        TopologyError::Schema(msg.into())
    }
}

/// Errors raised while drawing or exporting a laid-out graph
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No display surface available for interactive view: {0}")]
    NoDisplay(String),
    #[error("Failed to write '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported export format '{0}' (expected svg, dot, txt or json)")]
    UnsupportedFormat(String),
    #[error("Failed to serialize scene: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("Interactive session I/O failed: {0}")]
    Session(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TopologyError::DanglingLink {
            index: 0,
            from: "A".to_string(),
            to: "Z".to_string(),
            missing: "Z".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Link #0 (A -- Z) references unknown node 'Z'"
        );

        let err = TopologyError::DuplicateNode { id: "sw1".to_string() };
        assert_eq!(err.to_string(), "Duplicate node identifier 'sw1'");

        let err: TopologyError = RenderError::UnsupportedFormat("png".to_string()).into();
        assert!(err.to_string().contains("'png'"));
    }
}
