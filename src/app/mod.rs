//! The interactive shell around the renderer: settings, the window, keyboard
//! input and frame timing.

pub mod input;
pub mod settings;
pub mod time;
#[cfg(not(target_arch = "wasm32"))]
pub mod window;

pub use self::input::{InputHandler, Key, Keyboard};
pub use self::settings::{Settings, WindowParams};
pub use self::time::FrameTimer;
