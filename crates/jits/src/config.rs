//! Configuration types for Jits sessions.
//!
//! This module provides configuration structures that control how technique trees
//! are laid out and styled. All types implement [`serde::Deserialize`] for
//! flexible loading from external sources; every field is optional and falls back
//! to the defaults documented on it.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining layout and style settings.
//! - [`LayoutConfig`] - Spacing units of the tree layout and the [`PositioningPolicy`].
//! - [`StyleConfig`] - Colors and node box dimensions used by the SVG exporter.
//!
//! # Example
//!
//! ```
//! # use jits::config::{AppConfig, PositioningPolicy};
//! let config = AppConfig::default();
//! assert_eq!(config.layout().positioning(), PositioningPolicy::AutoLayout);
//! assert!(config.style().background_color().is_ok());
//! ```

use serde::Deserialize;

use jits_core::{color::Color, semantic::NodeType};

/// Top-level application configuration combining layout and style settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified layout and style configurations.
    pub fn new(layout: LayoutConfig, style: StyleConfig) -> Self {
        Self { layout, style }
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// What happens to positions the user set by dragging a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositioningPolicy {
    /// Every layout pass overwrites every position, including dragged ones.
    #[default]
    AutoLayout,

    /// Dragged nodes stay where they were dropped until the tree is reorganized.
    PreserveManual,
}

/// Spacing units of the tree layout.
///
/// Roots sit on the row `y = origin_y`, starting at `x = origin_x` and spaced
/// `horizontal_spacing * root_spread` apart. Level `d` sits at
/// `y = origin_y + d * vertical_spacing`, and siblings are spaced
/// `horizontal_spacing` apart around their parent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// X coordinate of the first root. Default `200`.
    origin_x: f32,

    /// Y coordinate of the root row. Default `80`.
    origin_y: f32,

    /// Horizontal distance between siblings. Default `180`.
    horizontal_spacing: f32,

    /// Vertical distance between levels. Default `120`.
    vertical_spacing: f32,

    /// Multiplier applied to the horizontal spacing between roots. Default `4`.
    root_spread: f32,

    /// Manual drag policy. Default [`PositioningPolicy::AutoLayout`].
    positioning: PositioningPolicy,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            origin_x: 200.0,
            origin_y: 80.0,
            horizontal_spacing: 180.0,
            vertical_spacing: 120.0,
            root_spread: 4.0,
            positioning: PositioningPolicy::default(),
        }
    }
}

impl LayoutConfig {
    pub fn origin_x(&self) -> f32 {
        self.origin_x
    }

    pub fn origin_y(&self) -> f32 {
        self.origin_y
    }

    pub fn horizontal_spacing(&self) -> f32 {
        self.horizontal_spacing
    }

    pub fn vertical_spacing(&self) -> f32 {
        self.vertical_spacing
    }

    pub fn root_spread(&self) -> f32 {
        self.root_spread
    }

    pub fn positioning(&self) -> PositioningPolicy {
        self.positioning
    }

    /// Returns a copy with a different positioning policy.
    pub fn with_positioning(mut self, positioning: PositioningPolicy) -> Self {
        self.positioning = positioning;
        self
    }

    /// Checks that all spacing values are usable.
    ///
    /// # Errors
    ///
    /// Returns a message naming the first non-finite or non-positive spacing value.
    pub fn validate(&self) -> Result<(), String> {
        let spacings = [
            ("horizontal_spacing", self.horizontal_spacing),
            ("vertical_spacing", self.vertical_spacing),
            ("root_spread", self.root_spread),
        ];
        for (name, value) in spacings {
            if !value.is_finite() || value <= 0.0 {
                return Err(format!("layout.{name} must be a positive number, got {value}"));
            }
        }
        if !self.origin_x.is_finite() || !self.origin_y.is_finite() {
            return Err("layout origin must be finite".to_string());
        }
        Ok(())
    }
}

/// Per node type fill colors, as CSS color strings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeColors {
    variant: String,
    my_move: String,
    opponent_move: String,
    outcome: String,
}

impl Default for NodeColors {
    fn default() -> Self {
        Self {
            variant: "#4f46e5".to_string(),
            my_move: "#16a34a".to_string(),
            opponent_move: "#dc2626".to_string(),
            outcome: "#d97706".to_string(),
        }
    }
}

/// Visual styling configuration for rendered trees.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    /// Background color of the canvas, as a color string. Transparent if unset.
    background_color: Option<String>,

    /// Stroke color of the selected node. Default `"#facc15"`.
    selected_color: String,

    /// Color of edges and labels. Default `"#334155"`.
    edge_color: String,

    /// Node box width. Default `150`.
    node_width: f32,

    /// Node box height. Default `40`.
    node_height: f32,

    /// Fill color per node type.
    node_colors: NodeColors,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            background_color: None,
            selected_color: "#facc15".to_string(),
            edge_color: "#334155".to_string(),
            node_width: 150.0,
            node_height: 40.0,
            node_colors: NodeColors::default(),
        }
    }
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` if no color is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the parsed highlight color of the selected node.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn selected_color(&self) -> Result<Color, String> {
        Color::new(&self.selected_color)
            .map_err(|err| format!("Invalid selected color in config: {err}"))
    }

    /// Returns the parsed edge color.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn edge_color(&self) -> Result<Color, String> {
        Color::new(&self.edge_color).map_err(|err| format!("Invalid edge color in config: {err}"))
    }

    /// Returns the parsed fill color for a node type.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured color string cannot be parsed.
    pub fn node_color(&self, node_type: NodeType) -> Result<Color, String> {
        let colors = &self.node_colors;
        let color = match node_type {
            NodeType::Variant => &colors.variant,
            NodeType::MyMove => &colors.my_move,
            NodeType::OpponentMove => &colors.opponent_move,
            NodeType::Outcome => &colors.outcome,
        };
        Color::new(color).map_err(|err| format!("Invalid {node_type} color in config: {err}"))
    }

    pub fn node_width(&self) -> f32 {
        self.node_width
    }

    pub fn node_height(&self) -> f32 {
        self.node_height
    }
}
