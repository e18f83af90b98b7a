pub mod mesh;
pub mod shader;
pub mod surface;
pub mod texture;

pub mod prelude {
    pub use super::mesh::{MeshAttributes, MeshData, MeshHandle, MeshParams};
    pub use super::shader::{
        Comparison, CullFace, PolygonMode, ShaderHandle, ShaderParams, UniformVariable,
    };
    pub use super::surface::{BlitMask, SurfaceHandle, SurfaceParams, SurfaceViewport};
    pub use super::texture::{
        RenderTextureFormat, RenderTextureHandle, RenderTextureParams, TextureData,
        TextureFilter, TextureFormat, TextureHandle, TextureKind, TextureParams, TextureWrap,
    };
}
