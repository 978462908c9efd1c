//! Rendering of laid-out topologies.
//!
//! The [`Renderer`] turns a [`GraphModel`] plus its [`Layout`] into a
//! [`Scene`] and hands it to one of the targets: an interactive terminal
//! session, a file export, or standard output.

pub mod ascii;
pub mod dot;
pub mod interactive;
pub mod scene;
pub mod svg;

pub use interactive::{InteractiveSession, SessionEnd};
pub use scene::{Scene, SceneLink, SceneNode};

use std::fmt;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;

use crate::config::StyleConfig;
use crate::error::RenderError;
use crate::graph::{summarize, GraphModel};
use crate::layout::Layout;

/// Static artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Dot,
    Txt,
    Json,
}

impl ExportFormat {
    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, RenderError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| RenderError::UnsupportedFormat(path.display().to_string()))?;
        ext.parse()
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Svg => "svg",
            ExportFormat::Dot => "dot",
            ExportFormat::Txt => "txt",
            ExportFormat::Json => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "svg" => Ok(ExportFormat::Svg),
            "dot" | "gv" => Ok(ExportFormat::Dot),
            "txt" | "text" => Ok(ExportFormat::Txt),
            "json" => Ok(ExportFormat::Json),
            _ => Err(RenderError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where a view is drawn
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RenderTarget {
    /// Blocking terminal session; returns when the user closes it
    #[default]
    Interactive,
    /// Write a static artifact to a file
    File { path: PathBuf, format: ExportFormat },
    /// Write a static artifact to standard output
    Stdout(ExportFormat),
}

/// True when both standard input and output are attached to a terminal
pub fn stdio_is_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Draws topologies according to an explicit [`StyleConfig`]
#[derive(Debug, Clone)]
pub struct Renderer {
    style: StyleConfig,
    /// Decides whether the interactive target has a terminal to run on
    terminal_check: fn() -> bool,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(StyleConfig::default())
    }
}

impl Renderer {
    pub fn new(style: StyleConfig) -> Self {
        Self {
            style,
            terminal_check: stdio_is_terminal,
        }
    }

    /// Replace the terminal detection used by the interactive target
    pub fn with_terminal_check(mut self, check: fn() -> bool) -> Self {
        self.terminal_check = check;
        self
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }

    pub fn scene(&self, graph: &GraphModel, layout: &Layout) -> Scene {
        Scene::build(graph, layout, &self.style)
    }

    /// Build the scene and draw it on `target`
    ///
    /// Static targets return as soon as the artifact is written; the
    /// interactive target blocks until the session ends.
    pub fn render(
        &self,
        graph: &GraphModel,
        layout: &Layout,
        target: &RenderTarget,
    ) -> Result<Scene, RenderError> {
        let scene = self.scene(graph, layout);

        match target {
            RenderTarget::Interactive => self.interactive(&scene, graph)?,
            RenderTarget::File { path, format } => {
                let artifact = self.artifact(&scene, graph, *format)?;
                fs::write(path, artifact).map_err(|source| RenderError::Io {
                    path: path.clone(),
                    source,
                })?;
                info!("Exported {} rendering to {:?}", format, path);
            }
            RenderTarget::Stdout(format) => {
                let artifact = self.artifact(&scene, graph, *format)?;
                let mut stdout = io::stdout().lock();
                stdout
                    .write_all(artifact.as_bytes())
                    .and_then(|_| stdout.flush())
                    .map_err(|source| RenderError::Io {
                        path: PathBuf::from("<stdout>"),
                        source,
                    })?;
            }
        }

        Ok(scene)
    }

    /// Produce the text of a static artifact
    pub fn artifact(
        &self,
        scene: &Scene,
        graph: &GraphModel,
        format: ExportFormat,
    ) -> Result<String, RenderError> {
        Ok(match format {
            ExportFormat::Svg => svg::render_svg(scene),
            ExportFormat::Dot => dot::generate_dot(scene),
            ExportFormat::Txt => ascii::render_text(
                scene,
                &summarize(graph),
                self.style.text_columns,
                self.style.text_rows,
            ),
            ExportFormat::Json => {
                let mut json = serde_json::to_string_pretty(scene)?;
                json.push('\n');
                json
            }
        })
    }

    fn interactive(&self, scene: &Scene, graph: &GraphModel) -> Result<(), RenderError> {
        if !(self.terminal_check)() {
            return Err(RenderError::NoDisplay(
                "standard input and output must be a terminal (use --export or --text instead)"
                    .to_string(),
            ));
        }
        let (stdin, stdout) = (io::stdin(), io::stdout());

        let mut session =
            InteractiveSession::new(scene, graph, self.style.text_columns, self.style.text_rows);
        let end = session
            .run(stdin.lock(), stdout.lock())
            .map_err(RenderError::Session)?;
        info!("Interactive view closed ({:?})", end);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::parse_topology;
    use crate::layout::LayoutEngine;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("SVG".parse::<ExportFormat>().unwrap(), ExportFormat::Svg);
        assert_eq!("gv".parse::<ExportFormat>().unwrap(), ExportFormat::Dot);
        assert_eq!("text".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert!(matches!("png".parse::<ExportFormat>(), Err(RenderError::UnsupportedFormat(_))));

        assert_eq!(ExportFormat::from_path(Path::new("out/net.json")).unwrap(), ExportFormat::Json);
        assert!(ExportFormat::from_path(Path::new("noext")).is_err());
        assert_eq!(ExportFormat::Dot.to_string(), "dot");
    }

    #[test]
    fn test_render_to_file() {
        let graph = parse_topology(&json!({
            "nodes": [ { "id": "A" }, { "id": "B" } ],
            "links": [ { "from": "A", "to": "B" } ]
        }))
        .unwrap();
        let layout = LayoutEngine::default().compute(&graph);
        let dir = tempdir().unwrap();
        let path = dir.path().join("net.json");

        let renderer = Renderer::default();
        let target = RenderTarget::File {
            path: path.clone(),
            format: ExportFormat::Json,
        };
        let scene = renderer.render(&graph, &layout, &target).unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["nodes"].as_array().unwrap().len(), 2);
        assert_eq!(written["links"].as_array().unwrap().len(), 1);
        assert_eq!(written["nodes"][0]["shape"], "circle");
        assert_eq!(scene.nodes.len(), 2);
    }

    #[test]
    fn test_interactive_without_terminal() {
        let graph = GraphModel::new();
        let layout = LayoutEngine::default().compute(&graph);
        let renderer = Renderer::default().with_terminal_check(|| false);

        let err = renderer.render(&graph, &layout, &RenderTarget::Interactive).unwrap_err();
        assert!(matches!(err, RenderError::NoDisplay(_)));
    }

    #[test]
    fn test_unwritable_path_is_render_error() {
        let graph = GraphModel::new();
        let layout = LayoutEngine::default().compute(&graph);
        let target = RenderTarget::File {
            path: PathBuf::from("/nonexistent-dir/out.svg"),
            format: ExportFormat::Svg,
        };

        let err = Renderer::default().render(&graph, &layout, &target).unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
