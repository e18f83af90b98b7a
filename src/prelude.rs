pub use crate::errors::{Error, Result, SceneError, VideoError};
pub use crate::math::prelude::*;

pub use crate::renderer::binder::{BaseColorSource, NormalSource, ReflectionSource, ShadowSource};
pub use crate::renderer::{
    FrameStats, Pass, Program, RenderConfig, Renderer, SceneResources, ShaderRegistry,
};

pub use crate::scene::loader::{self, SceneFile};
pub use crate::scene::{Camera, Light, LightKind, Material, Mesh, Node, Scene, TextureSlot};

pub use crate::video::prelude::*;

pub use crate::app::{FrameTimer, InputHandler, Key, Settings};
