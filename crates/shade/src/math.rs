//! Scalar shading helpers with WGSL semantics, except where noted.

use glam::Vec2;

pub fn saturate(x: f32) -> f32 {
    x.clamp(0.0, 1.0)
}

pub fn fract(x: f32) -> f32 {
    x - x.floor()
}

pub fn mix(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// 0 when `x < edge`, otherwise 1.
pub fn step(edge: f32, x: f32) -> f32 {
    if x < edge { 0.0 } else { 1.0 }
}

/// Hermite interpolation between `edge0` and `edge1`.
///
/// Unlike WGSL, coincident edges are defined: the result is `step(edge0, x)`.
pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge0 == edge1 {
        return step(edge0, x);
    }
    let t = saturate((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

/// `min(max(x, lo), hi)`. Does not panic when `lo > hi`; `hi` wins.
pub fn clamp_ordered(x: f32, lo: f32, hi: f32) -> f32 {
    x.max(lo).min(hi)
}

/// Anti-aliased line mask: 1 inside `half_width` of the line, 0 outside,
/// with a smooth band of `aa` on either side of the edge.
pub fn line_mask(half_width: f32, aa: f32, distance: f32) -> f32 {
    1.0 - smoothstep(half_width - aa, half_width + aa, distance)
}

/// Draw-width compensation: fade a line whose draw width had to grow past
/// its nominal width. Zero draw width means nothing is drawn.
pub fn coverage(nominal: f32, draw: f32) -> f32 {
    if draw > 0.0 {
        saturate(nominal / draw)
    } else {
        0.0
    }
}

/// Component-wise `fract`.
pub fn fract2(v: Vec2) -> Vec2 {
    v - v.floor()
}

/// Length of the per-axis screen gradient: `(|(dx.x, dy.x)|, |(dx.y, dy.y)|)`.
pub fn gradient_magnitude(dx: Vec2, dy: Vec2) -> Vec2 {
    Vec2::new(Vec2::new(dx.x, dy.x).length(), Vec2::new(dx.y, dy.y).length())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn smoothstep_endpoints() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 0.5), 0.5);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
    }

    #[test]
    fn smoothstep_coincident_edges_is_step() {
        assert_eq!(smoothstep(0.3, 0.3, 0.2), 0.0);
        assert_eq!(smoothstep(0.3, 0.3, 0.3), 1.0);
    }

    #[test]
    fn fract_of_negative() {
        assert!((fract(-0.25) - 0.75).abs() < 1e-6);
        assert_eq!(fract2(Vec2::new(1.5, -1.5)), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn clamp_ordered_prefers_upper_bound() {
        assert_eq!(clamp_ordered(0.1, 0.8, 0.5), 0.5);
        assert_eq!(clamp_ordered(0.1, 0.2, 0.5), 0.2);
    }

    #[test]
    fn line_mask_without_band_is_hard_edge() {
        assert_eq!(line_mask(0.1, 0.0, 0.05), 1.0);
        assert_eq!(line_mask(0.1, 0.0, 0.1), 0.0);
    }

    #[test]
    fn line_mask_band_is_centered_on_edge() {
        assert!((line_mask(0.1, 0.05, 0.1) - 0.5).abs() < 1e-6);
        assert_eq!(line_mask(0.1, 0.05, 0.0), 1.0);
        assert_eq!(line_mask(0.1, 0.05, 0.2), 0.0);
    }

    #[test]
    fn coverage_handles_zero_width() {
        assert_eq!(coverage(0.0, 0.0), 0.0);
        assert_eq!(coverage(0.2, 0.1), 1.0);
        assert_eq!(coverage(0.1, 0.2), 0.5);
    }

    #[test]
    fn gradient_magnitude_per_axis() {
        let m = gradient_magnitude(Vec2::new(3.0, 0.0), Vec2::new(4.0, 2.0));
        assert_eq!(m, Vec2::new(5.0, 2.0));
    }
}
