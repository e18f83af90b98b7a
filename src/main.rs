#[macro_use]
extern crate log;

use std::env;
use std::process;

use eduren::app::window::{Window, WindowEvent};
use eduren::prelude::*;
use eduren::video::backends::gl::GLVisitor;

fn main() {
    env_logger::init();

    if let Err(err) = run() {
        error!("{}", err);
        for cause in err.iter_causes() {
            error!("  caused by: {}", cause);
        }

        process::exit(1);
    }
}

fn run() -> Result<()> {
    let settings = match env::args().nth(1) {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let mut window = Window::new(&settings.window)?;
    let mut video = unsafe { GLVisitor::glutin(&window)? };

    let file = loader::load(&settings.scene)?;
    let scene = &file.scene;
    let shaders = ShaderRegistry::load(&mut video, &settings.shader_dir)?;
    let mut resources = SceneResources::load(&mut video, scene, file.skybox.as_ref())?;
    let mut renderer = Renderer::new(shaders);

    let mut camera = Camera::new(window.dimensions());
    let mut config = settings.render.clone();
    let mut input = InputHandler::new(settings.camera_speed);
    let mut timer = FrameTimer::new(if settings.clamp_fps { 60 } else { 0 });
    let mut events = Vec::new();

    'main: loop {
        window.poll_events(&mut events);
        for v in events.drain(..) {
            match v {
                WindowEvent::Closed | WindowEvent::KeyPressed(Key::Escape) => break 'main,
                WindowEvent::Resized(dimensions) => camera.set_dimensions(dimensions),
                WindowEvent::KeyPressed(key) => input.on_key_pressed(key),
                WindowEvent::KeyReleased(key) => input.on_key_released(key),
            }
        }

        let dt = timer.advance();
        input.update(&mut camera, &mut config, scene.lights(), dt);

        // Minimized.
        if camera.dimensions().x == 0 || camera.dimensions().y == 0 {
            continue;
        }

        let stats = renderer.render(&mut video, scene, &mut resources, &camera, &config)?;
        window.swap_buffers()?;

        if timer.frames() % 100 == 0 {
            let telemetry = format!(
                "{} | {} | {} draws, {} triangles",
                settings.window.title,
                timer.summary(),
                stats.draws,
                stats.triangles
            );

            info!("{}", telemetry);
            window.set_title(&telemetry);
        }
    }

    renderer.release(&mut video)?;
    resources.release(&mut video)?;
    Ok(())
}
