use glam::{Mat4, Vec3};
use gridview_common::types::{linear_to_srgb, luminance};
use gridview_common::{GridParams, PipelineVariant, Rgb};
use gridview_shade::{FragmentInput, GridShader};

/// Camera/view configuration for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    /// Camera position in world space.
    pub eye: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 10.0, 15.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }
}

impl RenderView {
    pub fn view_matrix(&self) -> Mat4 {
        let forward = (self.target - self.eye).normalize_or_zero();
        // Looking straight up or down: Y cannot be the up vector.
        let up = if forward.dot(Vec3::Y).abs() > 0.999 {
            Vec3::NEG_Z
        } else {
            Vec3::Y
        };
        Mat4::look_at_rh(self.eye, self.target, up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), aspect, 0.1, 20_000.0)
    }

    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        self.projection_matrix(aspect) * self.view_matrix()
    }
}

/// Renderer-agnostic interface. All renderers implement this trait.
///
/// The renderer reads grid parameters and a view configuration, then
/// produces output. Parameters are owned by the caller and may change
/// between calls.
pub trait Renderer {
    /// The output type produced by this renderer.
    type Output;

    /// Render one frame from the given parameters and view.
    fn render(&self, params: &GridParams, view: &RenderView) -> Self::Output;
}

/// An opaque image in linear RGB, row-major from the top-left pixel.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Rgb>,
}

impl Frame {
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgb> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    pub fn mean_luminance(&self) -> f32 {
        if self.pixels.is_empty() {
            return 0.0;
        }
        self.pixels.iter().map(|c| luminance(*c)).sum::<f32>() / self.pixels.len() as f32
    }
}

/// CPU renderer for the grid plane.
///
/// One ray per pixel is intersected with the `y = 0` plane. Screen-space
/// derivatives come from the hit points of the right and lower neighbour
/// pixels (left/upper at the image border or when the neighbour misses).
/// Both faces of the plane are visible.
#[derive(Debug, Clone, Copy)]
pub struct SoftwareRenderer {
    pub width: u32,
    pub height: u32,
    pub variant: PipelineVariant,
    pub clear_color: Rgb,
    /// Side length of the square grid plane, centered on the origin.
    pub plane_extent: f32,
}

impl SoftwareRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            variant: PipelineVariant::Canonical,
            clear_color: Rgb::new(0.1, 0.1, 0.15),
            plane_extent: 10_000.0,
        }
    }

    pub fn with_variant(mut self, variant: PipelineVariant) -> Self {
        self.variant = variant;
        self
    }

    /// World-space hit of every pixel's ray with the grid plane.
    fn plane_hits(&self, view: &RenderView) -> Vec<Option<Vec3>> {
        let aspect = self.width as f32 / self.height as f32;
        let inv = view.view_projection(aspect).inverse();
        let half = self.plane_extent * 0.5;
        let mut hits = Vec::with_capacity(self.width as usize * self.height as usize);
        for py in 0..self.height {
            for px in 0..self.width {
                let ndc_x = (px as f32 + 0.5) / self.width as f32 * 2.0 - 1.0;
                let ndc_y = 1.0 - (py as f32 + 0.5) / self.height as f32 * 2.0;
                let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
                let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
                let dir = (far - near).normalize_or_zero();
                hits.push(intersect_ground(view.eye, dir).filter(|p| {
                    p.x.abs() <= half && p.z.abs() <= half
                }));
            }
        }
        hits
    }

    fn neighbour_delta(
        hits: &[Option<Vec3>],
        here: Vec3,
        forward: Option<usize>,
        backward: Option<usize>,
    ) -> Vec3 {
        let at = |i: Option<usize>| i.and_then(|i| hits[i]);
        if let Some(next) = at(forward) {
            next - here
        } else if let Some(prev) = at(backward) {
            here - prev
        } else {
            Vec3::ZERO
        }
    }
}

/// Intersect a ray with the `y = 0` plane from either side.
fn intersect_ground(origin: Vec3, dir: Vec3) -> Option<Vec3> {
    if dir.y.abs() < 1e-6 {
        return None;
    }
    let t = -origin.y / dir.y;
    (t > 0.0).then(|| {
        let mut p = origin + dir * t;
        p.y = 0.0;
        p
    })
}

impl Renderer for SoftwareRenderer {
    type Output = Frame;

    fn render(&self, params: &GridParams, view: &RenderView) -> Frame {
        let shader = GridShader::new(*params, self.variant);
        let hits = self.plane_hits(view);
        let (w, h) = (self.width as usize, self.height as usize);

        let mut pixels = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let i = y * w + x;
                let Some(here) = hits[i] else {
                    pixels.push(self.clear_color);
                    continue;
                };
                let dpdx = Self::neighbour_delta(
                    &hits,
                    here,
                    (x + 1 < w).then_some(i + 1),
                    (x > 0).then(|| i - 1),
                );
                let dpdy = Self::neighbour_delta(
                    &hits,
                    here,
                    (y + 1 < h).then_some(i + w),
                    (y > 0).then(|| i - w),
                );
                let input = FragmentInput::new(here, view.eye).with_derivatives(dpdx, dpdy);
                pixels.push(shader.shade(&input).over(self.clear_color));
            }
        }

        tracing::debug!(
            width = self.width,
            height = self.height,
            variant = %self.variant,
            "software frame rendered"
        );
        Frame {
            width: self.width,
            height: self.height,
            pixels,
        }
    }
}

/// Terminal preview: a software frame mapped to a character ramp.
#[derive(Debug, Clone, Copy)]
pub struct AsciiRenderer {
    pub inner: SoftwareRenderer,
}

impl AsciiRenderer {
    /// Characters from darkest to brightest.
    pub const RAMP: &'static [u8] = b" .:-=+*#%@";

    pub fn new(columns: u32, rows: u32) -> Self {
        Self {
            inner: SoftwareRenderer::new(columns, rows),
        }
    }

    fn glyph(color: Rgb) -> char {
        let level = linear_to_srgb(luminance(color).clamp(0.0, 1.0));
        let last = Self::RAMP.len() - 1;
        Self::RAMP[((level * last as f32).round() as usize).min(last)] as char
    }
}

impl Renderer for AsciiRenderer {
    type Output = String;

    fn render(&self, params: &GridParams, view: &RenderView) -> String {
        let frame = self.inner.render(params, view);
        let mut out = String::with_capacity((frame.width as usize + 1) * frame.height as usize);
        for row in frame.pixels.chunks(frame.width as usize) {
            out.extend(row.iter().map(|c| Self::glyph(*c)));
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn top_down(height: f32) -> RenderView {
        RenderView {
            eye: Vec3::new(0.0, height, 0.0),
            target: Vec3::ZERO,
            fov_degrees: 60.0,
        }
    }

    #[test]
    fn render_view_default() {
        let view = RenderView::default();
        assert_eq!(view.fov_degrees, 60.0);
        assert_eq!(view.target, Vec3::ZERO);
        assert!(!view.view_projection(16.0 / 9.0).col(0).x.is_nan());
    }

    #[test]
    fn straight_down_view_is_finite() {
        let vp = top_down(5.0).view_projection(1.0);
        assert!(vp.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn ground_intersection_from_both_sides() {
        let from_above = intersect_ground(Vec3::new(1.0, 2.0, 0.0), Vec3::NEG_Y).unwrap();
        assert_eq!(from_above, Vec3::new(1.0, 0.0, 0.0));
        let from_below = intersect_ground(Vec3::new(0.0, -3.0, 4.0), Vec3::Y).unwrap();
        assert_eq!(from_below, Vec3::new(0.0, 0.0, 4.0));
        assert!(intersect_ground(Vec3::new(0.0, 2.0, 0.0), Vec3::Y).is_none());
        assert!(intersect_ground(Vec3::new(0.0, 2.0, 0.0), Vec3::X).is_none());
    }

    #[test]
    fn frame_has_requested_size() {
        let frame = SoftwareRenderer::new(32, 18).render(&GridParams::default(), &RenderView::default());
        assert_eq!(frame.pixels.len(), 32 * 18);
        assert!(frame.pixel(31, 17).is_some());
        assert!(frame.pixel(32, 0).is_none());
    }

    #[test]
    fn origin_from_above_shows_axis_crossing() {
        let renderer = SoftwareRenderer::new(101, 101);
        let frame = renderer.render(&GridParams::default(), &top_down(2.0));
        let center = frame.pixel(50, 50).unwrap();
        // Midpoint of the default red and blue axis colors.
        assert!(center.r > center.g);
        assert!(center.b > center.g);
    }

    #[test]
    fn sky_keeps_clear_color() {
        let renderer = SoftwareRenderer::new(40, 20);
        let view = RenderView {
            eye: Vec3::new(0.0, 1.0, 0.0),
            target: Vec3::new(0.0, 1.0, -10.0),
            fov_degrees: 60.0,
        };
        let frame = renderer.render(&GridParams::default(), &view);
        assert_eq!(frame.pixel(0, 0), Some(renderer.clear_color));
        assert_ne!(frame.pixel(20, 19), Some(renderer.clear_color));
    }

    #[test]
    fn plane_is_visible_from_below() {
        let renderer = SoftwareRenderer::new(21, 21);
        let frame = renderer.render(&GridParams::default(), &top_down(-3.0));
        assert_ne!(frame.pixel(10, 10), Some(renderer.clear_color));
    }

    #[test]
    fn transparent_grid_darkens_to_clear_color() {
        let params = GridParams {
            base_alpha: 0.0,
            major_line_width: 0.0,
            minor_line_width: 0.0,
            axis_line_width: 0.0,
            ..GridParams::default()
        };
        let renderer = SoftwareRenderer::new(16, 16);
        let frame = renderer.render(&params, &top_down(4.0));
        assert!(frame.pixels.iter().all(|p| *p == renderer.clear_color));
    }

    #[test]
    fn ascii_preview_has_one_line_per_row() {
        let preview = AsciiRenderer::new(48, 12).render(&GridParams::default(), &RenderView::default());
        let lines: Vec<&str> = preview.lines().collect();
        assert_eq!(lines.len(), 12);
        assert!(lines.iter().all(|l| l.chars().count() == 48));
    }

    #[test]
    fn ascii_glyph_ramp_ends() {
        assert_eq!(AsciiRenderer::glyph(Rgb::BLACK), ' ');
        assert_eq!(AsciiRenderer::glyph(Rgb::WHITE), '@');
    }

    #[test]
    fn pixel_lookup_on_huge_frame_does_not_overflow() {
        let frame = Frame {
            width: 70_000,
            height: 70_000,
            pixels: vec![Rgb::WHITE],
        };
        assert_eq!(frame.pixel(0, 0), Some(Rgb::WHITE));
        assert_eq!(frame.pixel(1, 69_999), None);
    }
}
