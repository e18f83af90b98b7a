//! This module contains the math utils that mainly comes from `cgmath`.

pub mod aabb;

pub mod prelude {
    pub use super::aabb::Aabb3;
    pub use cgmath::prelude::*;
    pub use cgmath::{
        ortho, perspective, vec3, Deg, Matrix3, Matrix4, Point3, Rad, Vector2, Vector3, Vector4,
    };
}
