pub mod capabilities;
pub mod types;
pub mod visitor;

pub use self::visitor::GLVisitor;

mod glutin {
    use gl;

    use super::visitor::GLVisitor;
    use crate::app::window::Window;
    use crate::errors::*;

    impl GLVisitor {
        /// Loads the OpenGL functions of `window`'s context and creates a
        /// visitor on it. The context must be current.
        pub unsafe fn glutin(window: &Window) -> Result<Self> {
            gl::load_with(|symbol| window.get_proc_address(symbol) as *const _);
            Self::new(window.dimensions())
        }
    }
}
