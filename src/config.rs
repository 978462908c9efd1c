use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Viewer configuration: layout tuning and rendering style
///
/// Every field has a default, so an empty file (or no file at all) is valid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub layout: LayoutConfig,
    pub style: StyleConfig,
}

impl ViewerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.layout.validate()?;
        self.style.validate()?;
        Ok(())
    }
}

/// Force-directed layout parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Hard cap on solver iterations
    pub max_iterations: usize,
    /// Stop once the largest per-node move of an iteration is below this
    pub convergence_threshold: f64,
    /// Rest distance between two linked nodes
    pub ideal_length: f64,
    /// Spring constant of the attractive force
    pub spring: f64,
    /// Step scale of the first iteration
    pub initial_temperature: f64,
    /// Multiplier applied to the temperature after every iteration
    pub cooling_factor: f64,
    /// Distances are clamped to at least this value when computing repulsion
    pub min_distance: f64,
    /// Largest move a node may make in one iteration
    pub max_displacement: f64,
    /// Amplitude of the seeded initial jitter
    pub jitter: f64,
    pub seed: u64,
}

impl LayoutConfig {
    /// Repulsion constant that balances `spring` at `ideal_length`
    pub fn repulsion(&self) -> f64 {
        self.spring * self.ideal_length.powi(3)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_iterations == 0 {
            return Err(ValidationError::InvalidLayout(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("ideal_length", self.ideal_length),
            ("spring", self.spring),
            ("initial_temperature", self.initial_temperature),
            ("min_distance", self.min_distance),
            ("max_displacement", self.max_displacement),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidLayout(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !(self.cooling_factor > 0.0 && self.cooling_factor <= 1.0) {
            return Err(ValidationError::InvalidLayout(format!(
                "cooling_factor must be in (0, 1], got {}",
                self.cooling_factor
            )));
        }
        if !(self.convergence_threshold.is_finite() && self.convergence_threshold >= 0.0) {
            return Err(ValidationError::InvalidLayout(format!(
                "convergence_threshold must be non-negative, got {}",
                self.convergence_threshold
            )));
        }
        // The jitter range spans [-jitter, jitter]
        if !(self.jitter >= 0.0 && (2.0 * self.jitter).is_finite()) {
            return Err(ValidationError::InvalidLayout(format!(
                "jitter must be non-negative and finite, got {}",
                self.jitter
            )));
        }
        let repulsion = self.repulsion();
        if !(repulsion.is_finite() && repulsion > 0.0) {
            return Err(ValidationError::InvalidLayout(format!(
                "spring * ideal_length^3 must be a positive finite number, got {}",
                repulsion
            )));
        }
        Ok(())
    }
}

/// Shape used to draw a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeShape {
    Circle,
    Square,
    Diamond,
}

/// Per-kind node appearance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KindStyle {
    pub fill: String,
    pub shape: NodeShape,
}

impl KindStyle {
    fn new(fill: &str, shape: NodeShape) -> Self {
        Self {
            fill: fill.to_string(),
            shape,
        }
    }
}

/// Rendering style, passed explicitly to the renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Canvas size in pixels for image exports
    pub width: f64,
    pub height: f64,
    pub margin: f64,
    pub node_radius: f64,
    pub font_size: f64,
    pub background: String,
    pub link_color: String,
    pub min_line_width: f64,
    pub max_line_width: f64,
    /// Link attribute whose numeric value drives line width
    pub weight_attribute: String,
    /// Style for kinds missing from `kinds`
    pub default_kind: KindStyle,
    pub kinds: BTreeMap<String, KindStyle>,
    /// Character grid size for text and interactive rendering
    pub text_columns: usize,
    pub text_rows: usize,
}

impl StyleConfig {
    pub fn kind_style(&self, kind: &str) -> &KindStyle {
        self.kinds.get(kind).unwrap_or(&self.default_kind)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("width", self.width),
            ("height", self.height),
            ("node_radius", self.node_radius),
            ("font_size", self.font_size),
            ("min_line_width", self.min_line_width),
            ("max_line_width", self.max_line_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ValidationError::InvalidStyle(format!(
                    "{} must be a positive number, got {}",
                    name, value
                )));
            }
        }
        if !(self.margin.is_finite() && self.margin >= 0.0) {
            return Err(ValidationError::InvalidStyle(format!(
                "margin must be non-negative, got {}",
                self.margin
            )));
        }
        if 2.0 * self.margin >= self.width.min(self.height) {
            return Err(ValidationError::InvalidStyle(
                "margin leaves no drawable area".to_string(),
            ));
        }
        if self.min_line_width > self.max_line_width {
            return Err(ValidationError::InvalidStyle(format!(
                "min_line_width ({}) exceeds max_line_width ({})",
                self.min_line_width, self.max_line_width
            )));
        }
        if self.text_columns < 10 || self.text_rows < 5 {
            return Err(ValidationError::InvalidStyle(
                "text canvas must be at least 10 columns by 5 rows".to_string(),
            ));
        }
        if self.weight_attribute.is_empty() {
            return Err(ValidationError::InvalidStyle(
                "weight_attribute cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid layout configuration: {0}")]
    InvalidLayout(String),
    #[error("Invalid style configuration: {0}")]
    InvalidStyle(String),
}

/// Default implementations
impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_iterations: 500,
            convergence_threshold: 0.01,
            ideal_length: 100.0,
            spring: 0.01,
            initial_temperature: 10.0,
            cooling_factor: 0.95,
            min_distance: 1.0,
            max_displacement: 50.0,
            jitter: 1.0,
            seed: 42,
        }
    }
}

impl Default for StyleConfig {
    fn default() -> Self {
        let kinds = [
            ("host", KindStyle::new("#1f77b4", NodeShape::Circle)),
            ("switch", KindStyle::new("#2ca02c", NodeShape::Square)),
            ("router", KindStyle::new("#ff7f0e", NodeShape::Diamond)),
        ]
        .into_iter()
        .map(|(kind, style)| (kind.to_string(), style))
        .collect();

        Self {
            width: 800.0,
            height: 600.0,
            margin: 40.0,
            node_radius: 14.0,
            font_size: 12.0,
            background: "#ffffff".to_string(),
            link_color: "#7f7f7f".to_string(),
            min_line_width: 1.0,
            max_line_width: 6.0,
            weight_attribute: "bandwidth".to_string(),
            default_kind: KindStyle::new("#9467bd", NodeShape::Circle),
            kinds,
            text_columns: 100,
            text_rows: 32,
        }
    }
}
