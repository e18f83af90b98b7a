//! Error types shared by every module of the renderer.
//!
//! Most operations return a `failure::Error` so backend failures, I/O and
//! decoding errors can be propagated with `?`. Load-time configuration
//! problems have their own typed errors below so callers (and tests) can
//! match on them.

pub use failure::Error;

use failure::Fail;

pub type Result<T> = ::std::result::Result<T, Error>;

/// Problems found while validating a scene graph. All of them are fatal at
/// load time.
#[derive(Debug, Fail, PartialEq)]
pub enum SceneError {
    #[fail(display = "Face {} of mesh `{}` has {} indices, only triangles are supported.", face, mesh, len)]
    NonTriangularFace { mesh: String, face: usize, len: usize },
    #[fail(display = "Mesh `{}` references vertex {} but only has {} vertices.", mesh, index, len)]
    VertexOutOfBounds { mesh: String, index: u32, len: usize },
    #[fail(display = "Mesh `{}` has {} attribute entries, expected {}.", mesh, attribute, len)]
    AttributeLengthMismatch { mesh: String, attribute: &'static str, len: usize },
    #[fail(display = "Node {} is out of bounds.", _0)]
    NodeOutOfBounds(usize),
    #[fail(display = "Node {} is reachable more than once.", _0)]
    NodeCycle(usize),
    #[fail(display = "Mesh {} is out of bounds.", _0)]
    MeshOutOfBounds(usize),
    #[fail(display = "Material {} is out of bounds.", _0)]
    MaterialOutOfBounds(usize),
    #[fail(display = "Light `{}` is declared more than once.", _0)]
    DuplicateLight(String),
    #[fail(display = "Light `{}` has no node with the same name.", _0)]
    LightNodeMissing(String),
    #[fail(display = "Only one directional light is supported, found {}.", _0)]
    TooManyDirectionalLights(usize),
    #[fail(display = "At most {} point lights are supported, found {}.", max, found)]
    TooManyPointLights { max: usize, found: usize },
}

/// Problems reported by a `Visitor` implementation.
#[derive(Debug, Fail, PartialEq)]
pub enum VideoError {
    #[fail(display = "{} is invalid.", _0)]
    HandleInvalid(String),
    #[fail(display = "Surface is incomplete: {}.", _0)]
    SurfaceIncomplete(String),
    #[fail(display = "Failed to create shader `{}`, errors: \n{}.", _0, _1)]
    ShaderCreationFailure(String, String),
    #[fail(display = "No shader is bound.")]
    ShaderNotBound,
    #[fail(display = "Too many texture slots used by one draw (>= {}).", _0)]
    TooManyTextureSlots(usize),
    #[fail(display = "OpenGL implementation doesn't support {}.", _0)]
    Requirement(String),
}
