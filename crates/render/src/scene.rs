//! The animated sample mesh shown above the grid.

use glam::{EulerRot, Mat4, Vec2, Vec3};
use gridview_common::{Rgb, SampleMeshConfig};

/// Sample mesh color, sRGB `#9bd8ff`.
pub const SAMPLE_MESH_COLOR: Rgb = Rgb::new(0.327_778, 0.686_685, 1.0);

/// Throttles per-frame updates to a fixed rate.
///
/// Frame deltas accumulate until at least `1 / fps` seconds have passed;
/// the whole accumulated delta is then released at once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameThrottle {
    interval: f32,
    accumulated: f32,
}

impl FrameThrottle {
    /// A non-finite or non-positive `fps` means unthrottled.
    pub fn new(fps: f32) -> Self {
        Self {
            interval: Self::interval_for(fps),
            accumulated: 0.0,
        }
    }

    fn interval_for(fps: f32) -> f32 {
        if fps.is_finite() && fps > 0.0 {
            1.0 / fps
        } else {
            0.0
        }
    }

    pub fn fps(&self) -> f32 {
        if self.interval > 0.0 {
            1.0 / self.interval
        } else {
            f32::INFINITY
        }
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.interval = Self::interval_for(fps);
    }

    /// Feed a frame delta; returns the delta to apply if a tick is due.
    pub fn advance(&mut self, dt: f32) -> Option<f32> {
        self.accumulated += dt.max(0.0);
        if self.accumulated >= self.interval {
            Some(std::mem::take(&mut self.accumulated))
        } else {
            None
        }
    }
}

/// Spinning, bobbing mesh placed at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMesh {
    /// Euler rotation around X and Y, radians.
    pub rotation: Vec2,
    pub position: Vec3,
    /// Radians per second around each axis.
    pub spin_speed: f32,
    elapsed: f32,
    throttle: FrameThrottle,
}

impl Default for SampleMesh {
    fn default() -> Self {
        Self::new(&SampleMeshConfig::default())
    }
}

impl SampleMesh {
    pub fn new(config: &SampleMeshConfig) -> Self {
        Self {
            rotation: Vec2::ZERO,
            position: Vec3::ZERO,
            spin_speed: config.spin_speed,
            elapsed: 0.0,
            throttle: FrameThrottle::new(config.fps),
        }
    }

    pub fn apply_config(&mut self, config: &SampleMeshConfig) {
        self.spin_speed = config.spin_speed;
        self.throttle.set_fps(config.fps);
    }

    pub fn fps(&self) -> f32 {
        self.throttle.fps()
    }

    pub fn set_fps(&mut self, fps: f32) {
        self.throttle.set_fps(fps);
    }

    /// Seconds since the mesh was created.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Advance the animation clock by `dt` seconds. Returns whether the
    /// transform changed this call.
    pub fn tick(&mut self, dt: f32) -> bool {
        self.elapsed += dt.max(0.0);
        let Some(delta) = self.throttle.advance(dt) else {
            return false;
        };
        self.rotation += Vec2::splat(self.spin_speed * delta);
        self.position.y = self.elapsed.sin() + 0.5;
        true
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_color_matches_hex() {
        assert_eq!(SAMPLE_MESH_COLOR.to_hex(), "#9bd8ff");
    }

    #[test]
    fn throttle_waits_for_interval() {
        let mut t = FrameThrottle::new(10.0);
        assert_eq!(t.advance(0.04), None);
        assert_eq!(t.advance(0.04), None);
        let released = t.advance(0.04).expect("tick due");
        assert!((released - 0.12).abs() < 1e-6);
        assert_eq!(t.advance(0.01), None);
    }

    #[test]
    fn unthrottled_ticks_every_frame() {
        let mut t = FrameThrottle::new(f32::INFINITY);
        assert_eq!(t.fps(), f32::INFINITY);
        assert_eq!(t.advance(0.001), Some(0.001));
        assert_eq!(t.advance(0.0), Some(0.0));
    }

    #[test]
    fn mesh_spins_and_bobs() {
        let mut mesh = SampleMesh::default();
        assert!(mesh.tick(0.5));
        assert!((mesh.rotation.x - 0.15).abs() < 1e-6);
        assert!((mesh.rotation.y - 0.15).abs() < 1e-6);
        assert!((mesh.position.y - (0.5f32.sin() + 0.5)).abs() < 1e-6);
    }

    #[test]
    fn slow_fps_skips_frames() {
        let config = SampleMeshConfig {
            fps: 1.0,
            ..SampleMeshConfig::default()
        };
        let mut mesh = SampleMesh::new(&config);
        let changed = (0..9).filter(|_| mesh.tick(0.25)).count();
        assert_eq!(changed, 2);
        assert!((mesh.elapsed() - 2.25).abs() < 1e-6);
    }

    #[test]
    fn model_matrix_carries_height() {
        let mut mesh = SampleMesh::default();
        mesh.tick(1.0);
        let origin = mesh.model_matrix().transform_point3(Vec3::ZERO);
        assert!((origin.y - mesh.position.y).abs() < 1e-6);
    }
}
