//! The `Topology` facade.
//!
//! Owns the decoded configuration and drives parse -> layout -> render.
//! Parsing happens once; every `view()` call after that restarts from the
//! already validated model.

use std::path::Path;

use log::{debug, info};
use serde_json::Value;

use crate::config::ViewerConfig;
use crate::error::TopologyError;
use crate::graph::{parse_topology, GraphModel};
use crate::layout::LayoutEngine;
use crate::render::{ExportFormat, RenderTarget, Renderer, Scene};

/// Progress of the facade through its pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyState {
    Uninitialized,
    Parsed,
    LaidOut,
    Rendered,
}

pub struct Topology {
    config: Value,
    model: Option<GraphModel>,
    state: TopologyState,
    engine: LayoutEngine,
    renderer: Renderer,
    target: RenderTarget,
    last_scene: Option<Scene>,
}

impl Topology {
    /// Wrap a decoded topology document; nothing is validated until `view()`
    pub fn new(config: Value) -> Self {
        Self {
            config,
            model: None,
            state: TopologyState::Uninitialized,
            engine: LayoutEngine::default(),
            renderer: Renderer::default(),
            target: RenderTarget::default(),
            last_scene: None,
        }
    }

    /// Use the given layout and style settings
    ///
    /// # Errors
    /// `TopologyError::Config` if the settings fail validation.
    pub fn with_viewer_config(mut self, viewer: ViewerConfig) -> Result<Self, TopologyError> {
        viewer.validate()?;
        self.engine = LayoutEngine::new(viewer.layout);
        self.renderer = Renderer::new(viewer.style);
        Ok(self)
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn with_target(mut self, target: RenderTarget) -> Self {
        self.target = target;
        self
    }

    pub fn state(&self) -> TopologyState {
        self.state
    }

    /// The validated model, once parsing has succeeded
    pub fn model(&self) -> Option<&GraphModel> {
        self.model.as_ref()
    }

    /// Scene drawn by the most recent successful render
    pub fn last_scene(&self) -> Option<&Scene> {
        self.last_scene.as_ref()
    }

    /// Parse (first call only), lay out and render on the configured target
    ///
    /// # Errors
    /// Parse failures leave the facade `Uninitialized` and nothing is drawn.
    /// Render failures leave it `LaidOut`.
    pub fn view(&mut self) -> Result<(), TopologyError> {
        let target = self.target.clone();
        self.run(&target)
    }

    /// Lay out and write a static artifact to `path`
    pub fn export(&mut self, path: &Path, format: ExportFormat) -> Result<(), TopologyError> {
        let target = RenderTarget::File {
            path: path.to_path_buf(),
            format,
        };
        self.run(&target)
    }

    fn run(&mut self, target: &RenderTarget) -> Result<(), TopologyError> {
        let model = match self.model.take() {
            Some(model) => {
                debug!("Reusing validated topology model");
                model
            }
            None => parse_topology(&self.config)?,
        };
        let model = self.model.insert(model);
        self.state = TopologyState::Parsed;

        let layout = self.engine.compute(model);
        self.state = TopologyState::LaidOut;

        let scene = self.renderer.render(model, &layout, target)?;
        self.state = TopologyState::Rendered;
        info!(
            "Rendered {} nodes and {} links",
            scene.nodes.len(),
            scene.links.len()
        );
        self.last_scene = Some(scene);
        Ok(())
    }
}
