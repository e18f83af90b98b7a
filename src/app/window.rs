//! A glutin window with a current OpenGL core context.

use glutin;
use glutin::GlContext;

use crate::errors::*;
use crate::math::prelude::Vector2;

use super::input::Key;
use super::settings::WindowParams;

/// What happened to the window since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    Closed,
    /// The new size of the client area in pixels.
    Resized(Vector2<u32>),
    KeyPressed(Key),
    KeyReleased(Key),
}

pub struct Window {
    window: glutin::GlWindow,
    events_loop: glutin::EventsLoop,
}

impl Window {
    /// Opens a window and makes its context current.
    pub fn new(params: &WindowParams) -> Result<Self> {
        let builder = glutin::WindowBuilder::new()
            .with_title(params.title.clone())
            .with_dimensions(glutin::dpi::LogicalSize::new(
                f64::from(params.size.x),
                f64::from(params.size.y),
            ));

        let context = glutin::ContextBuilder::new()
            .with_multisampling(params.multisample)
            .with_depth_buffer(24)
            .with_stencil_buffer(8)
            .with_gl_profile(glutin::GlProfile::Core)
            .with_gl(glutin::GlRequest::Specific(glutin::Api::OpenGl, (3, 3)))
            .with_vsync(params.vsync);

        let events_loop = glutin::EventsLoop::new();
        let window = glutin::GlWindow::new(builder, context, &events_loop)
            .map_err(|err| format_err!("Failed to create window: {}", err))?;

        unsafe {
            window.make_current()?;
        }

        let window = Window {
            window,
            events_loop,
        };

        info!(
            "Opened window `{}` with {:?} pixels.",
            params.title,
            window.dimensions()
        );

        Ok(window)
    }

    /// The size of the client area in pixels.
    pub fn dimensions(&self) -> Vector2<u32> {
        let hidpi = self.window.get_hidpi_factor();
        match self.window.get_inner_size() {
            Some(size) => {
                let size = size.to_physical(hidpi);
                Vector2::new(size.width as u32, size.height as u32)
            }
            None => Vector2::new(0, 0),
        }
    }

    #[inline]
    pub fn get_proc_address(&self, symbol: &str) -> *const () {
        self.window.get_proc_address(symbol)
    }

    #[inline]
    pub fn set_title(&self, title: &str) {
        self.window.set_title(title);
    }

    pub fn poll_events(&mut self, events: &mut Vec<WindowEvent>) {
        let window = &self.window;
        self.events_loop.poll_events(|v| {
            if let glutin::Event::WindowEvent { event, .. } = v {
                match event {
                    glutin::WindowEvent::CloseRequested => events.push(WindowEvent::Closed),
                    glutin::WindowEvent::Resized(size) => {
                        let size = size.to_physical(window.get_hidpi_factor());
                        window.resize(size);
                        let dimensions = Vector2::new(size.width as u32, size.height as u32);
                        events.push(WindowEvent::Resized(dimensions));
                    }
                    glutin::WindowEvent::KeyboardInput { input, .. } => {
                        if let Some(key) = input.virtual_keycode.and_then(from_virtual_key_code) {
                            match input.state {
                                glutin::ElementState::Pressed => {
                                    events.push(WindowEvent::KeyPressed(key))
                                }
                                glutin::ElementState::Released => {
                                    events.push(WindowEvent::KeyReleased(key))
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
        });
    }

    #[inline]
    pub fn swap_buffers(&self) -> Result<()> {
        self.window.swap_buffers()?;
        Ok(())
    }
}

fn from_virtual_key_code(key: glutin::VirtualKeyCode) -> Option<Key> {
    use glutin::VirtualKeyCode as K;

    let key = match key {
        K::Key1 => Key::Key1,
        K::Key2 => Key::Key2,
        K::Key3 => Key::Key3,
        K::W => Key::W,
        K::A => Key::A,
        K::S => Key::S,
        K::D => Key::D,
        K::Escape => Key::Escape,
        K::F1 => Key::F1,
        K::F2 => Key::F2,
        K::F3 => Key::F3,
        K::F4 => Key::F4,
        K::F5 => Key::F5,
        K::F6 => Key::F6,
        K::F7 => Key::F7,
        K::F8 => Key::F8,
        K::F9 => Key::F9,
        K::F10 => Key::F10,
        K::F11 => Key::F11,
        K::F12 => Key::F12,
        K::Left => Key::Left,
        K::Up => Key::Up,
        K::Right => Key::Right,
        K::Down => Key::Down,
        K::LShift => Key::LShift,
        K::RShift => Key::RShift,
        K::Minus | K::Subtract => Key::Minus,
        K::Equals | K::Add => Key::Equals,
        _ => return None,
    };

    Some(key)
}
