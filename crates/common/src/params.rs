use crate::types::Rgb;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tunable inputs of the grid shading pipeline.
///
/// Widths are in grid-cell units, divisions are counts. Any finite value is
/// accepted; degenerate values only make lines invisible or fully filled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridParams {
    pub major_line_width: f32,
    pub minor_line_width: f32,
    pub axis_line_width: f32,
    /// Minor cells per world unit.
    pub grid_div: f32,
    /// Minor cells per major cell. Rounded and clamped to at least 2.
    pub major_grid_div: f32,
    pub base_alpha: f32,
    pub base_color: Rgb,
    pub minor_line_color: Rgb,
    pub major_line_color: Rgb,
    pub x_axis_color: Rgb,
    pub z_axis_color: Rgb,
}

impl Default for GridParams {
    fn default() -> Self {
        Self {
            major_line_width: 0.04,
            minor_line_width: 0.01,
            axis_line_width: 0.15,
            grid_div: 4.0,
            major_grid_div: 10.0,
            base_alpha: 0.5,
            base_color: Rgb::from_srgb8(0x70, 0x70, 0x70),
            minor_line_color: Rgb::from_srgb8(0xf1, 0xf1, 0xf1),
            major_line_color: Rgb::WHITE,
            x_axis_color: Rgb::new(1.0, 0.3, 0.3),
            z_axis_color: Rgb::new(0.3, 0.3, 1.0),
        }
    }
}

impl GridParams {
    /// Effective major-grid divisor: `max(2, round(major_grid_div))`.
    pub fn major_divisor(&self) -> f32 {
        self.major_grid_div.round().max(2.0)
    }

    /// Nominal axis line width, never thinner than a major line.
    pub fn axis_width(&self) -> f32 {
        self.major_line_width.max(self.axis_line_width)
    }

    /// Name of the first field holding a NaN or infinity, if any.
    pub fn first_non_finite(&self) -> Option<&'static str> {
        let scalars = [
            ("major_line_width", self.major_line_width),
            ("minor_line_width", self.minor_line_width),
            ("axis_line_width", self.axis_line_width),
            ("grid_div", self.grid_div),
            ("major_grid_div", self.major_grid_div),
            ("base_alpha", self.base_alpha),
        ];
        let colors = [
            ("base_color", self.base_color),
            ("minor_line_color", self.minor_line_color),
            ("major_line_color", self.major_line_color),
            ("x_axis_color", self.x_axis_color),
            ("z_axis_color", self.z_axis_color),
        ];
        scalars
            .iter()
            .find(|(_, v)| !v.is_finite())
            .map(|(name, _)| *name)
            .or_else(|| {
                colors
                    .iter()
                    .find(|(_, c)| !c.is_finite())
                    .map(|(name, _)| *name)
            })
    }
}

/// Which recorded form of the pipeline to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
    /// Axis lines suppress grid lines and every mask boosts alpha.
    #[default]
    Canonical,
    /// No suppression; alpha stays at `base_alpha`.
    Simplified,
}

impl PipelineVariant {
    pub const ALL: [Self; 2] = [Self::Canonical, Self::Simplified];

    pub fn suppresses_grid_on_axes(self) -> bool {
        matches!(self, Self::Canonical)
    }

    pub fn boosts_alpha(self) -> bool {
        matches!(self, Self::Canonical)
    }
}

impl fmt::Display for PipelineVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => f.write_str("canonical"),
            Self::Simplified => f.write_str("simplified"),
        }
    }
}
