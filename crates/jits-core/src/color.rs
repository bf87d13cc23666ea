//! Colors for rendered technique trees.
//!
//! [`Color`] keeps a parsed CSS color and prints it back in a form SVG attributes
//! accept.

use std::{fmt, str::FromStr};

use color::{DynamicColor, palette::css};

/// A CSS color as configured for node types, edges and the selection outline.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Parses any CSS color: `#4f46e5`, `rgb(79 70 229)`, `indigo`, ...
    ///
    /// ```
    /// use jits_core::color::Color;
    ///
    /// assert!(Color::new("#4f46e5").is_ok());
    /// assert!(Color::new("guard-blue").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        DynamicColor::from_str(color_str)
            .map(|color| Self { color })
            .map_err(|err| format!("invalid color `{color_str}`: {err}"))
    }

    /// Derives a marker id fragment from the color.
    ///
    /// Only ASCII letters, digits and underscores are kept, and the result never
    /// starts with a digit.
    pub fn to_id_safe_string(self) -> String {
        let sanitized: String = self
            .to_string()
            .replace('#', "hex")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();

        if sanitized.starts_with(|c: char| c.is_ascii_digit()) {
            format!("c_{sanitized}")
        } else {
            sanitized
        }
    }

    /// Opacity in `0.0..=1.0`, rendered as `fill-opacity` or `stroke-opacity`.
    pub fn alpha(&self) -> f32 {
        self.color.components[3]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self {
            color: DynamicColor::from_alpha_color(css::BLACK),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}
