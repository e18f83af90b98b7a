//! Functions for loading settings.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math::prelude::Vector2;
use crate::renderer::RenderConfig;

/// Everything needed to start the viewer. Every field has a default, so a
/// settings file only lists what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowParams,
    /// Sleeps at the end of frames to stay at 60 frames per second.
    pub clamp_fps: bool,
    /// Directory of the shader sources.
    pub shader_dir: PathBuf,
    /// The JSON scene description to render.
    pub scene: PathBuf,
    /// Camera speed in units per second.
    pub camera_speed: f32,
    /// The feature toggles of the first frame.
    pub render: RenderConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            window: WindowParams::default(),
            clamp_fps: true,
            shader_dir: PathBuf::from("shaders"),
            scene: PathBuf::from("scenes/default.json"),
            camera_speed: 2.5,
            render: RenderConfig::default(),
        }
    }
}

impl Settings {
    /// Reads settings from a JSON file. Relative paths in the file are
    /// resolved against the directory that contains it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Settings> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .map_err(|err| format_err!("Failed to read settings {:?}: {}", path, err))?;

        let mut settings: Settings = serde_json::from_str(&json)?;
        if let Some(dir) = path.parent() {
            settings.shader_dir = dir.join(&settings.shader_dir);
            settings.scene = dir.join(&settings.scene);
        }

        info!("Loaded settings from {:?}.", path);
        Ok(settings)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowParams {
    /// Sets the title of window.
    pub title: String,
    /// Sets the size in *points* of the client area of the window.
    pub size: Vector2<u32>,
    /// Sets the multisampling level to request from the default framebuffer.
    /// A value of 0 indicates that multisampling must not be enabled.
    pub multisample: u16,
    /// Specifies whether should we have vsync.
    pub vsync: bool,
}

impl Default for WindowParams {
    fn default() -> Self {
        WindowParams {
            title: "eduRen".to_owned(),
            size: Vector2::new(1280, 720),
            multisample: 0,
            vsync: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "window": {{ "title": "test", "size": {{ "x": 640, "y": 480 }} }},
                "scene": "sponza.json",
                "render": {{ "deferred": true, "ssao": true }}
            }}"#
        )
        .unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.window.title, "test");
        assert_eq!(settings.window.size, Vector2::new(640, 480));
        assert!(settings.window.vsync);
        assert_eq!(settings.scene, dir.path().join("sponza.json"));
        assert_eq!(settings.shader_dir, dir.path().join("shaders"));
        assert!(settings.render.deferred && settings.render.ssao);
        assert!(settings.clamp_fps);

        assert!(Settings::load(dir.path().join("missing.json")).is_err());
    }
}
