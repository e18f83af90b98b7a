//! A device through which the player views the world.

use crate::math::prelude::*;

/// The projection funcs used when take primitives into camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Orthographic projection with half vertical size of the view volume as payload.
    Ortho(f32),
    /// Perspective projection with vertical field of view as payload.
    Perspective(Deg<f32>),
}

/// Directions the camera can move along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
}

/// A first person camera. Orientation is stored as yaw and pitch, the
/// `front`, `up` and `right` vectors are derived from them.
#[derive(Debug, Clone, Copy)]
pub struct Camera {
    position: Point3<f32>,
    yaw: Deg<f32>,
    pitch: Deg<f32>,
    front: Vector3<f32>,
    up: Vector3<f32>,
    right: Vector3<f32>,
    dimensions: Vector2<u32>,
    clip: Vector2<f32>,
    projection: Projection,
}

const WORLD_UP: Vector3<f32> = Vector3 {
    x: 0.0,
    y: 1.0,
    z: 0.0,
};

const MAX_PITCH: f32 = 89.0;

impl Camera {
    /// Creates a perspective camera at `(0, 0, 3)` looking down the negative z-axis.
    pub fn new(dimensions: Vector2<u32>) -> Camera {
        let mut camera = Camera {
            position: Point3::new(0.0, 0.0, 3.0),
            yaw: Deg(-90.0),
            pitch: Deg(0.0),
            front: Vector3::new(0.0, 0.0, -1.0),
            up: WORLD_UP,
            right: Vector3::unit_x(),
            dimensions,
            clip: Vector2::new(0.1, 100.0),
            projection: Projection::Perspective(Deg(45.0)),
        };

        camera.update_vectors();
        camera
    }

    #[inline]
    pub fn position(&self) -> Point3<f32> {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, position: Point3<f32>) {
        self.position = position;
    }

    #[inline]
    pub fn front(&self) -> Vector3<f32> {
        self.front
    }

    #[inline]
    pub fn up(&self) -> Vector3<f32> {
        self.up
    }

    #[inline]
    pub fn right(&self) -> Vector3<f32> {
        self.right
    }

    #[inline]
    pub fn yaw(&self) -> Deg<f32> {
        self.yaw
    }

    #[inline]
    pub fn pitch(&self) -> Deg<f32> {
        self.pitch
    }

    /// Sets the orientation, pitch is clamped to avoid flipping over the poles.
    pub fn set_yaw_pitch(&mut self, yaw: Deg<f32>, pitch: Deg<f32>) {
        self.yaw = yaw;
        self.pitch = Deg(pitch.0.max(-MAX_PITCH).min(MAX_PITCH));
        self.update_vectors();
    }

    /// Rotates by the given offsets.
    pub fn rotate(&mut self, yaw: Deg<f32>, pitch: Deg<f32>) {
        let (y, p) = (self.yaw + yaw, self.pitch + pitch);
        self.set_yaw_pitch(y, p);
    }

    /// Moves along the view direction or sideways by `distance`.
    pub fn advance(&mut self, movement: Movement, distance: f32) {
        let offset = match movement {
            Movement::Forward => self.front,
            Movement::Backward => -self.front,
            Movement::Left => -self.right,
            Movement::Right => self.right,
        };

        self.position += offset * distance;
    }

    /// Gets the viewport dimensions in pixels.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    #[inline]
    pub fn set_dimensions(&mut self, dimensions: Vector2<u32>) {
        self.dimensions = dimensions;
    }

    /// Gets the aspect ratio (width divided by height).
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.dimensions.x.max(1) as f32 / self.dimensions.y.max(1) as f32
    }

    /// Gets the near clipping plane distances.
    #[inline]
    pub fn near_clip_plane(&self) -> f32 {
        self.clip.x
    }

    /// Gets the far clipping plane distances.
    #[inline]
    pub fn far_clip_plane(&self) -> f32 {
        self.clip.y
    }

    /// Sets the near/far clipping plane distances.
    #[inline]
    pub fn set_clip_plane(&mut self, near: f32, far: f32) {
        self.clip = Vector2::new(near.min(far), far.max(near));
    }

    #[inline]
    pub fn projection(&self) -> Projection {
        self.projection
    }

    #[inline]
    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_dir(self.position, self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        match self.projection {
            Projection::Ortho(vsize) => {
                let hsize = vsize * self.aspect();
                ortho(-hsize, hsize, -vsize, vsize, self.clip.x, self.clip.y)
            }
            Projection::Perspective(fovy) => {
                perspective(fovy, self.aspect(), self.clip.x, self.clip.y)
            }
        }
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (Rad::from(self.yaw), Rad::from(self.pitch));
        self.front = Vector3::new(
            yaw.cos() * pitch.cos(),
            pitch.sin(),
            yaw.sin() * pitch.cos(),
        )
        .normalize();

        self.right = self.front.cross(WORLD_UP).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
        (a - b).magnitude() < 1e-5
    }

    #[test]
    fn orientation() {
        let mut camera = Camera::new(Vector2::new(800, 600));
        assert!(close(camera.front(), Vector3::new(0.0, 0.0, -1.0)));
        assert!(close(camera.right(), Vector3::new(1.0, 0.0, 0.0)));
        assert!(close(camera.up(), Vector3::new(0.0, 1.0, 0.0)));

        camera.rotate(Deg(90.0), Deg(0.0));
        assert!(close(camera.front(), Vector3::new(1.0, 0.0, 0.0)));

        camera.rotate(Deg(0.0), Deg(200.0));
        assert_eq!(camera.pitch(), Deg(MAX_PITCH));
    }

    #[test]
    fn movement() {
        let mut camera = Camera::new(Vector2::new(800, 600));
        camera.advance(Movement::Forward, 2.0);
        assert!(close(camera.position().to_vec(), Vector3::new(0.0, 0.0, 1.0)));

        camera.advance(Movement::Right, 1.0);
        camera.advance(Movement::Backward, 1.0);
        assert!(close(camera.position().to_vec(), Vector3::new(1.0, 0.0, 2.0)));
    }

    #[test]
    fn view_matrix_maps_front_to_negative_z() {
        let camera = Camera::new(Vector2::new(800, 600));
        let p = camera.view_matrix().transform_point(Point3::new(0.0, 0.0, 0.0));
        assert!(close(p.to_vec(), Vector3::new(0.0, 0.0, -3.0)));
        assert!((camera.aspect() - 800.0 / 600.0).abs() < 1e-6);
    }
}
