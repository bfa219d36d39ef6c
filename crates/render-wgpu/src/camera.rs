use glam::{Mat4, Vec3};
use gridview_render::RenderView;

/// Fly camera with position, yaw, pitch and a perspective lens.
/// Camera state is view-only; the grid parameters never depend on it.
pub struct FlyCamera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub aspect: f32,
    pub speed: f32,
    pub sensitivity: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 4.0, 8.0), Vec3::ZERO)
    }
}

impl FlyCamera {
    /// Camera at `position` oriented toward `target`.
    pub fn looking_at(position: Vec3, target: Vec3) -> Self {
        let dir = (target - position).try_normalize().unwrap_or(Vec3::NEG_Z);
        Self {
            position,
            yaw: dir.z.atan2(dir.x),
            pitch: dir
                .y
                .clamp(-1.0, 1.0)
                .asin()
                .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT),
            fov_degrees: 60.0,
            aspect: 16.0 / 9.0,
            speed: 10.0,
            sensitivity: 0.003,
        }
    }

    /// 89 degrees.
    const PITCH_LIMIT: f32 = 1.553_343;

    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.yaw.cos() * self.pitch.cos(),
            self.pitch.sin(),
            self.yaw.sin() * self.pitch.cos(),
        )
        .normalize()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Move along camera-local axes: `x` right, `y` world up, `z` forward.
    /// Components are expected in [-1, 1].
    pub fn fly(&mut self, local: Vec3, dt: f32) {
        let delta = self.right() * local.x + Vec3::Y * local.y + self.forward() * local.z;
        self.position += delta * self.speed * dt;
    }

    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch - dy * self.sensitivity)
            .clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// View description shared with the software renderer.
    pub fn render_view(&self) -> RenderView {
        RenderView {
            eye: self.position,
            target: self.position + self.forward(),
            fov_degrees: self.fov_degrees,
        }
    }

    pub fn view_projection(&self) -> Mat4 {
        self.render_view().view_projection(self.aspect)
    }
}
