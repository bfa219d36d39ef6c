use crate::math::{
    clamp_ordered, coverage, fract2, gradient_magnitude, line_mask, mix, saturate, step,
};
use glam::{Vec2, Vec3};
use gridview_common::{GridParams, PipelineVariant, Rgb, Rgba};

/// Inputs of one fragment evaluation.
///
/// `dpdx`/`dpdy` are the world-space offsets to the neighbouring fragment
/// along screen x and y, i.e. the screen-space derivatives of the world
/// position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentInput {
    pub world_position: Vec3,
    pub camera_position: Vec3,
    pub dpdx: Vec3,
    pub dpdy: Vec3,
}

impl FragmentInput {
    /// Fragment with zero derivatives (an infinitely fine pixel).
    pub fn new(world_position: Vec3, camera_position: Vec3) -> Self {
        Self {
            world_position,
            camera_position,
            dpdx: Vec3::ZERO,
            dpdy: Vec3::ZERO,
        }
    }

    pub fn with_derivatives(mut self, dpdx: Vec3, dpdy: Vec3) -> Self {
        self.dpdx = dpdx;
        self.dpdy = dpdy;
        self
    }
}

/// Grid-space coordinates of a world position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridCoords {
    /// Camera-relative, division-scaled XZ. Stays small near the camera, so
    /// minor lines keep their precision far from the origin.
    pub uv: Vec2,
    /// Division-scaled world XZ. Axis and major lines are anchored here.
    pub world_uv: Vec2,
}

impl GridCoords {
    pub fn at(world: Vec3, camera: Vec3, grid_div: f32) -> Self {
        let snapped = world - camera.floor();
        Self {
            uv: Vec2::new(snapped.x, snapped.z) * grid_div,
            world_uv: Vec2::new(world.x, world.z) * grid_div,
        }
    }
}

/// Per-axis screen-space derivative magnitudes of [`GridCoords`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivatives {
    pub uv: Vec2,
    pub world_uv: Vec2,
}

impl Derivatives {
    /// Finite differences between the fragment and its screen neighbours.
    pub fn from_fragment(input: &FragmentInput, grid_div: f32) -> Self {
        let at = |p: Vec3| GridCoords::at(p, input.camera_position, grid_div);
        let here = at(input.world_position);
        let right = at(input.world_position + input.dpdx);
        let below = at(input.world_position + input.dpdy);
        Self {
            uv: gradient_magnitude(right.uv - here.uv, below.uv - here.uv),
            world_uv: gradient_magnitude(
                right.world_uv - here.world_uv,
                below.world_uv - here.world_uv,
            ),
        }
    }
}

/// Line masks of one fragment, each component in [0, 1].
///
/// For the per-axis masks, `.x` is the line where the X grid coordinate
/// crosses zero and `.y` the one for Z.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMasks {
    pub axis: Vec2,
    pub major: Vec2,
    pub minor: Vec2,
}

impl GridMasks {
    pub fn axis_combined(&self) -> f32 {
        self.axis.x.max(self.axis.y)
    }

    /// Second component overrides toward 1.
    pub fn minor_combined(&self) -> f32 {
        mix(self.minor.x, 1.0, self.minor.y)
    }

    pub fn major_combined(&self) -> f32 {
        mix(self.major.x, 1.0, self.major.y)
    }
}

/// Full result of one evaluation, intermediate colors included.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedFragment {
    pub masks: GridMasks,
    pub grid_color: Rgb,
    pub axis_color: Rgb,
    pub output: Rgba,
}

/// Axis line masks around `world_uv = 0`.
pub fn axis_masks(world_uv: Vec2, world_deriv: Vec2, params: &GridParams) -> Vec2 {
    let width = params.axis_width();
    let draw = (Vec2::splat(width) + world_deriv) * 0.5;
    let aa = world_deriv * 1.5;
    let distance = (world_uv * 2.0).abs();
    Vec2::new(
        line_mask(draw.x, aa.x, distance.x) * coverage(width, draw.x),
        line_mask(draw.y, aa.y, distance.y) * coverage(width, draw.y),
    )
}

/// Major grid line masks, one line every `major_divisor()` minor cells.
pub fn major_grid_mask(world_uv: Vec2, world_deriv: Vec2, params: &GridParams) -> Vec2 {
    let div = params.major_divisor();
    let deriv = world_deriv / div;
    let width = params.major_line_width / div;
    let draw = Vec2::new(
        clamp_ordered(width, deriv.x, 0.5),
        clamp_ordered(width, deriv.y, 0.5),
    );
    let aa = deriv * 1.5;
    let distance = Vec2::ONE - (fract2(world_uv / div) * 2.0 - Vec2::ONE).abs();
    Vec2::new(
        line_mask(draw.x, aa.x, distance.x) * coverage(width, draw.x),
        line_mask(draw.y, aa.y, distance.y) * coverage(width, draw.y),
    )
}

/// Minor grid line masks at every integer `uv`.
///
/// Widths above 0.5 draw the gap instead of the line and complement the
/// result, so sweeping the width through 0.5 is continuous.
pub fn minor_grid_mask(uv: Vec2, uv_deriv: Vec2, line_width: f32) -> Vec2 {
    let invert = line_width > 0.5;
    let target = if invert { 1.0 - line_width } else { line_width };
    let to_center = (fract2(uv) * 2.0 - Vec2::ONE).abs();
    let distance = if invert {
        to_center
    } else {
        Vec2::ONE - to_center
    };
    let mask = |deriv: f32, distance: f32| {
        let draw = clamp_ordered(target, deriv, 0.5);
        let m = line_mask(draw, deriv * 1.5, distance) * coverage(target, draw);
        if invert { 1.0 - m } else { m }
    };
    Vec2::new(mask(uv_deriv.x, distance.x), mask(uv_deriv.y, distance.y))
}

/// Color of the axis line at `world_uv`: the X axis color away from the Z
/// axis, the Z axis color away from the X axis, and their midpoint where
/// they cross.
pub fn axis_color(world_uv: Vec2, params: &GridParams) -> Rgb {
    let x_axis = params.x_axis_color.to_vec3();
    let z_axis = params.z_axis_color.to_vec3();
    let crossing = x_axis.lerp(z_axis, 0.5);
    let c = crossing.lerp(x_axis, step(0.5, world_uv.x.abs()));
    c.lerp(z_axis, step(0.5, world_uv.y.abs())).into()
}

/// The grid shading pipeline with a fixed parameter set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridShader {
    pub params: GridParams,
    pub variant: PipelineVariant,
}

impl GridShader {
    pub fn new(params: GridParams, variant: PipelineVariant) -> Self {
        Self { params, variant }
    }

    /// Final RGBA of one fragment.
    pub fn shade(&self, input: &FragmentInput) -> Rgba {
        self.evaluate(input).output
    }

    /// Masks for one fragment, after axis suppression when the variant
    /// applies it.
    pub fn masks(&self, input: &FragmentInput) -> GridMasks {
        let p = &self.params;
        let coords = GridCoords::at(input.world_position, input.camera_position, p.grid_div);
        let deriv = Derivatives::from_fragment(input, p.grid_div);

        let axis = axis_masks(coords.world_uv, deriv.world_uv, p);
        let mut major = major_grid_mask(coords.world_uv, deriv.world_uv, p);
        let mut minor = minor_grid_mask(coords.uv, deriv.uv, p.minor_line_width);

        if self.variant.suppresses_grid_on_axes() && axis.max_element() > 0.0 {
            major = Vec2::ZERO;
            minor = Vec2::ZERO;
        }
        GridMasks { axis, major, minor }
    }

    pub fn evaluate(&self, input: &FragmentInput) -> ShadedFragment {
        let p = &self.params;
        let masks = self.masks(input);
        let minor = masks.minor_combined();
        let major = masks.major_combined();
        let axis = masks.axis_combined();

        let grid = p
            .base_color
            .to_vec3()
            .lerp(p.minor_line_color.to_vec3(), minor)
            .lerp(p.major_line_color.to_vec3(), major);

        let world_uv = GridCoords::at(input.world_position, input.camera_position, p.grid_div)
            .world_uv;
        let axis_rgb = axis_color(world_uv, p);
        let color = grid.lerp(axis_rgb.to_vec3(), axis);

        let mut alpha = p.base_alpha;
        if self.variant.boosts_alpha() {
            for m in [minor, major, axis] {
                if m > 0.0 {
                    alpha = saturate(mix(alpha, 1.0, m));
                }
            }
        }

        ShadedFragment {
            masks,
            grid_color: grid.into(),
            axis_color: axis_rgb,
            output: Rgba::from_rgb(color.into(), saturate(alpha)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAMERA: Vec3 = Vec3::new(0.0, 10.0, 15.0);

    /// Fragment whose screen neighbours are `step` world units away in X and Z.
    fn fragment(x: f32, z: f32, step: f32) -> FragmentInput {
        FragmentInput::new(Vec3::new(x, 0.0, z), CAMERA)
            .with_derivatives(Vec3::new(step, 0.0, 0.0), Vec3::new(0.0, 0.0, step))
    }

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn derivatives_scale_with_grid_div() {
        let d = Derivatives::from_fragment(&fragment(3.0, 2.0, 0.01), 4.0);
        assert!(approx(d.world_uv.x, 0.04, 1e-5));
        assert!(approx(d.world_uv.y, 0.04, 1e-5));
        assert!(approx(d.uv.x, 0.04, 1e-5));
    }

    #[test]
    fn uv_is_camera_relative() {
        let c = GridCoords::at(Vec3::new(1000.25, 0.0, -3.5), Vec3::new(999.7, 5.0, -4.2), 2.0);
        assert!(approx(c.uv.x, 2.5, 1e-3));
        assert!(approx(c.uv.y, 3.0, 1e-3));
        assert!(approx(c.world_uv.x, 2000.5, 1e-2));
    }

    #[test]
    fn on_axis_mask_is_full_for_any_division() {
        for grid_div in [1.0, 2.0, 4.0, 13.0, 20.0] {
            for major_grid_div in [1.0, 10.0, 50.0] {
                let params = GridParams {
                    grid_div,
                    major_grid_div,
                    ..GridParams::default()
                };
                let shader = GridShader::new(params, PipelineVariant::Canonical);
                // On the line x = 0, far along z.
                let on_x = shader.masks(&fragment(0.0, 7.3, 1e-4));
                assert_eq!(on_x.axis.x, 1.0, "grid_div={grid_div}");
                // On the line z = 0.
                let on_z = shader.masks(&fragment(-4.6, 0.0, 1e-4));
                assert_eq!(on_z.axis.y, 1.0, "grid_div={grid_div}");
            }
        }
    }

    #[test]
    fn off_axis_color_is_grid_blend() {
        let shader = GridShader::default();
        for (x, z) in [(1.3, 2.7), (2.5, 2.5), (-7.1, 4.0), (10.0, -10.0)] {
            let shaded = shader.evaluate(&fragment(x, z, 0.01));
            assert_eq!(shaded.masks.axis, Vec2::ZERO);
            assert_eq!(shaded.output.rgb(), shaded.grid_color);
        }
    }

    #[test]
    fn wider_major_lines_cover_more() {
        let deriv = Vec2::splat(0.02);
        let mut last = 0;
        let mut counts = Vec::new();
        for width in [0.02, 0.04, 0.08, 0.16, 0.32] {
            let params = GridParams {
                major_line_width: width,
                ..GridParams::default()
            };
            let covered = (0..=10_000)
                .map(|i| Vec2::new(i as f32 * 0.001, 3.3))
                .filter(|uv| major_grid_mask(*uv, deriv, &params).x > 0.0)
                .count();
            assert!(covered >= last, "width {width}: {covered} < {last}");
            last = covered;
            counts.push(covered);
        }
        assert!(counts[counts.len() - 1] > counts[0]);
    }

    #[test]
    fn minor_pattern_continuous_through_half_width() {
        let deriv = Vec2::splat(0.05);
        for i in 0..200 {
            let uv = Vec2::new(i as f32 * 0.005, 0.37);
            let below = minor_grid_mask(uv, deriv, 0.5 - 1e-4);
            let above = minor_grid_mask(uv, deriv, 0.5 + 1e-4);
            assert!(
                approx(below.x, above.x, 1e-2),
                "uv={uv}: {} vs {}",
                below.x,
                above.x
            );
        }
    }

    #[test]
    fn inverted_minor_lines_fill_most_of_the_cell() {
        let deriv = Vec2::splat(0.01);
        let covered = |width: f32| {
            (0..1000)
                .map(|i| Vec2::new(i as f32 * 0.001, 0.0))
                .filter(|uv| minor_grid_mask(*uv, deriv, width).x > 0.5)
                .count()
        };
        assert!(covered(0.9) > covered(0.6));
        assert!(covered(0.6) > covered(0.4));
        assert!(covered(0.1) > covered(0.01));
    }

    #[test]
    fn alpha_stays_in_unit_range() {
        for variant in PipelineVariant::ALL {
            for base_alpha in [0.0, 0.5, 1.0] {
                for minor_line_width in [0.0, 0.01, 0.5, 0.99] {
                    let params = GridParams {
                        base_alpha,
                        minor_line_width,
                        ..GridParams::default()
                    };
                    let shader = GridShader::new(params, variant);
                    for i in -20..20 {
                        for step in [0.0, 0.001, 0.1, 2.0] {
                            let input = fragment(i as f32 * 0.13, i as f32 * 0.07, step);
                            let a = shader.shade(&input).a;
                            assert!((0.0..=1.0).contains(&a), "alpha {a}");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn default_origin_is_axis_crossing() {
        let params = GridParams::default();
        let shader = GridShader::new(params, PipelineVariant::Canonical);
        let out = shader.shade(&fragment(0.0, 0.0, 1e-5));
        let expected = params.x_axis_color.to_vec3().lerp(params.z_axis_color.to_vec3(), 0.5);
        assert!(approx(out.r, expected.x, 1e-5));
        assert!(approx(out.g, expected.y, 1e-5));
        assert!(approx(out.b, expected.z, 1e-5));
        assert!(approx(out.a, 1.0, 1e-5));
    }

    #[test]
    fn axes_get_their_own_colors() {
        let params = GridParams::default();
        let shader = GridShader::new(params, PipelineVariant::Canonical);
        let close = |a: Rgb, b: Rgb| approx(a.r, b.r, 1e-5) && approx(a.g, b.g, 1e-5) && approx(a.b, b.b, 1e-5);
        let on_x_axis = shader.shade(&fragment(5.0, 0.0, 1e-4));
        assert!(close(on_x_axis.rgb(), params.x_axis_color));
        let on_z_axis = shader.shade(&fragment(0.0, -5.0, 1e-4));
        assert!(close(on_z_axis.rgb(), params.z_axis_color));
    }

    #[test]
    fn axis_suppresses_grid_only_in_canonical() {
        // x = 0 is an axis, a minor line and a major line at once.
        let input = fragment(0.0, 2.5, 0.01);
        let canonical = GridShader::new(GridParams::default(), PipelineVariant::Canonical);
        let masks = canonical.masks(&input);
        assert!(masks.axis.x > 0.0);
        assert_eq!(masks.major, Vec2::ZERO);
        assert_eq!(masks.minor, Vec2::ZERO);

        let simplified = GridShader::new(GridParams::default(), PipelineVariant::Simplified);
        let masks = simplified.masks(&input);
        assert!(masks.major.x > 0.0);
        assert!(masks.minor.x > 0.0);
    }

    #[test]
    fn simplified_keeps_base_alpha() {
        let shader = GridShader::new(GridParams::default(), PipelineVariant::Simplified);
        for (x, z) in [(0.0, 0.0), (2.5, 0.7), (1.0, 1.0)] {
            assert_eq!(shader.shade(&fragment(x, z, 0.01)).a, 0.5);
        }
    }

    #[test]
    fn cell_interior_is_base_color_at_base_alpha() {
        let params = GridParams::default();
        let shader = GridShader::new(params, PipelineVariant::Canonical);
        // Center of a minor cell (grid_div 4 -> cells of 0.25).
        let out = shader.shade(&fragment(1.125, 2.375, 0.001));
        assert_eq!(out.rgb(), params.base_color);
        assert_eq!(out.a, params.base_alpha);
    }

    #[test]
    fn minor_line_raises_alpha() {
        let shader = GridShader::default();
        // On a minor line (x = 1.25) that is not a major line.
        let out = shader.evaluate(&fragment(1.25, 2.375, 0.001));
        assert!(out.masks.minor_combined() > 0.0);
        assert_eq!(out.masks.major_combined(), 0.0);
        assert!(out.output.a > 0.5);
    }

    #[test]
    fn zero_widths_draw_nothing() {
        let params = GridParams {
            major_line_width: 0.0,
            minor_line_width: 0.0,
            axis_line_width: 0.0,
            ..GridParams::default()
        };
        let shader = GridShader::new(params, PipelineVariant::Canonical);
        let masks = shader.masks(&fragment(0.0, 0.0, 0.0));
        assert_eq!(masks.axis, Vec2::ZERO);
        assert_eq!(masks.major, Vec2::ZERO);
        assert_eq!(masks.minor, Vec2::ZERO);
    }

    #[test]
    fn full_minor_width_fills_everything() {
        let params = GridParams {
            minor_line_width: 1.0,
            ..GridParams::default()
        };
        let shader = GridShader::new(params, PipelineVariant::Canonical);
        let masks = shader.masks(&fragment(1.125, 2.375, 0.001));
        assert_eq!(masks.minor_combined(), 1.0);
    }
}
