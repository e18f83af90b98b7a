use serde::{Deserialize, Serialize};

use crate::math::prelude::Vector3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LightKind {
    Point,
    Directional,
}

/// Distance attenuation of point lights, `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    fn default() -> Self {
        Attenuation {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

/// A light source. Its transform comes from the scene node with the same
/// name.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    pub name: String,
    pub kind: LightKind,
    pub ambient: Vector3<f32>,
    pub diffuse: Vector3<f32>,
    pub specular: Vector3<f32>,
    /// Only used by point lights.
    pub attenuation: Attenuation,
    /// Direction in the node's local space, only used by directional lights.
    pub direction: Vector3<f32>,
}

impl Light {
    pub fn new<T: Into<String>>(name: T, kind: LightKind) -> Self {
        Light {
            name: name.into(),
            kind,
            ambient: Vector3::new(0.05, 0.05, 0.05),
            diffuse: Vector3::new(0.8, 0.8, 0.8),
            specular: Vector3::new(1.0, 1.0, 1.0),
            attenuation: Attenuation::default(),
            direction: Vector3::new(0.0, 0.0, -1.0),
        }
    }

    pub fn point<T: Into<String>>(name: T) -> Self {
        Light::new(name, LightKind::Point)
    }

    pub fn directional<T: Into<String>>(name: T, direction: Vector3<f32>) -> Self {
        Light {
            direction,
            ..Light::new(name, LightKind::Directional)
        }
    }

    #[inline]
    pub fn is_point(&self) -> bool {
        self.kind == LightKind::Point
    }
}
