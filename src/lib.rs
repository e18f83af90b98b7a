//! A small real-time renderer on OpenGL.
//!
//! A frame renders shadow maps for every light, shades the scene either
//! forward or deferred through a G-buffer (with optional screen space
//! ambient occlusion), draws debug passes and tone maps the result. All GPU
//! work goes through the `Visitor` trait, which has an OpenGL implementation
//! and a recording one used to test pass orchestration without a GPU.
//!
//! ```ignore
//! let file = eduren::scene::loader::load("scenes/sponza.json")?;
//! let shaders = ShaderRegistry::load(&mut video, "shaders")?;
//! let mut resources = SceneResources::load(&mut video, &file.scene, file.skybox.as_ref())?;
//! let mut renderer = Renderer::new(shaders);
//! let stats = renderer.render(&mut video, &file.scene, &mut resources, &camera, &config)?;
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

#[macro_use]
pub mod utils;
pub mod app;
pub mod errors;
pub mod math;
pub mod renderer;
pub mod scene;
pub mod video;

pub mod prelude;
