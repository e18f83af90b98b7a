//! The GPU command layer. Everything the renderer does on the GPU goes
//! through a `Visitor`, so passes can be replayed against the recording
//! backend in tests.

pub mod assets;
pub mod backends;
pub mod scope;

/// Texture units available to one draw call.
pub const MAX_TEXTURE_SLOTS: usize = 16;
/// Color attachments available to one surface.
pub const MAX_ATTACHMENTS: usize = 4;

pub mod prelude {
    pub use super::assets::prelude::*;
    pub use super::backends::record::{Call, RecordingVisitor};
    pub use super::backends::Visitor;
    pub use super::scope::PassScope;
}
