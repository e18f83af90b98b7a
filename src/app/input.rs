//! Keyboard state and the key bindings of the viewer.
//!
//! | Keys              | Action                               |
//! |-------------------|--------------------------------------|
//! | W, S, A, D        | Move the camera, faster with shift   |
//! | Arrows            | Rotate the camera                    |
//! | 1, 2, 3           | Toggle ambient, diffuse and specular |
//! | F1                | Shadows                              |
//! | F2                | Deferred shading                     |
//! | F3                | SSAO                                 |
//! | F4                | Normal visualization                 |
//! | F5                | Skybox                               |
//! | F6                | HDR                                  |
//! | F7                | MSAA                                 |
//! | F8                | Wireframe                            |
//! | F9                | Normal mapping                       |
//! | F10               | G-buffer overlay                     |
//! | F11               | Gradient overlay                     |
//! | F12               | Cycle the shadow map debug light     |
//! | Minus, Equals     | Decrease or increase the exposure    |

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::math::prelude::*;
use crate::renderer::RenderConfig;
use crate::scene::{Camera, Light, Movement};
use crate::utils::hash::FastHashSet;

/// Symbolic name for a keyboard key.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize, Deserialize)]
pub enum Key {
    Key1,
    Key2,
    Key3,

    W,
    A,
    S,
    D,

    /// The Escape key, next to F1.
    Escape,

    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    Left,
    Up,
    Right,
    Down,

    LShift,
    RShift,
    Minus,
    Equals,
}

/// Which keys are held, and which went down or up since the last frame.
#[derive(Debug, Default)]
pub struct Keyboard {
    downs: FastHashSet<Key>,
    presses: FastHashSet<Key>,
    releases: FastHashSet<Key>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard::default()
    }

    #[inline]
    pub fn reset(&mut self) {
        self.downs.clear();
        self.presses.clear();
        self.releases.clear();
    }

    /// Starts a new frame, forgetting presses and releases.
    #[inline]
    pub fn advance(&mut self) {
        self.presses.clear();
        self.releases.clear();
    }

    #[inline]
    pub fn on_key_pressed(&mut self, key: Key) {
        if self.downs.insert(key) {
            self.presses.insert(key);
        }
    }

    #[inline]
    pub fn on_key_released(&mut self, key: Key) {
        self.downs.remove(&key);
        self.releases.insert(key);
    }

    #[inline]
    pub fn is_key_down(&self, key: Key) -> bool {
        self.downs.contains(&key)
    }

    #[inline]
    pub fn is_key_press(&self, key: Key) -> bool {
        self.presses.contains(&key)
    }

    #[inline]
    pub fn is_key_release(&self, key: Key) -> bool {
        self.releases.contains(&key)
    }
}

/// Multiplier of the camera speed while shift is held.
const HASTE: f32 = 3.0;
/// Degrees per second rotated by the arrow keys.
const ROTATION_SPEED: f32 = 60.0;
const EXPOSURE_STEP: f32 = 0.1;
/// Samples per pixel when MSAA is toggled on.
const MSAA_SAMPLES: u8 = 4;

/// Applies the keyboard to the camera and the render config.
pub struct InputHandler {
    keyboard: Keyboard,
    speed: f32,
}

impl InputHandler {
    /// `speed` is the camera speed in units per second.
    pub fn new(speed: f32) -> Self {
        InputHandler {
            keyboard: Keyboard::new(),
            speed,
        }
    }

    #[inline]
    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    #[inline]
    pub fn on_key_pressed(&mut self, key: Key) {
        self.keyboard.on_key_pressed(key);
    }

    #[inline]
    pub fn on_key_released(&mut self, key: Key) {
        self.keyboard.on_key_released(key);
    }

    /// Moves the camera for a frame of `dt`, applies the toggles pressed
    /// since the last update and starts a new keyboard frame. Returns true
    /// if `config` changed.
    pub fn update(
        &mut self,
        camera: &mut Camera,
        config: &mut RenderConfig,
        lights: &[Light],
        dt: Duration,
    ) -> bool {
        let secs = dt.as_secs() as f32 + dt.subsec_nanos() as f32 * 1e-9;
        self.move_camera(camera, secs);

        let before = config.clone();
        self.toggle(config, lights);
        self.keyboard.advance();

        if *config != before {
            info!("Render config changed: {:?}", config);
            true
        } else {
            false
        }
    }

    fn move_camera(&self, camera: &mut Camera, secs: f32) {
        let kb = &self.keyboard;
        let mut distance = self.speed * secs;
        if kb.is_key_down(Key::LShift) || kb.is_key_down(Key::RShift) {
            distance *= HASTE;
        }

        let movements = [
            (Key::W, Movement::Forward),
            (Key::S, Movement::Backward),
            (Key::A, Movement::Left),
            (Key::D, Movement::Right),
        ];

        for &(key, movement) in movements.iter() {
            if kb.is_key_down(key) {
                camera.advance(movement, distance);
            }
        }

        let step = ROTATION_SPEED * secs;
        let axis = |negative: Key, positive: Key| {
            let mut v = 0.0;
            if kb.is_key_down(negative) {
                v -= step;
            }

            if kb.is_key_down(positive) {
                v += step;
            }

            v
        };

        let yaw = axis(Key::Left, Key::Right);
        let pitch = axis(Key::Down, Key::Up);
        if yaw != 0.0 || pitch != 0.0 {
            camera.rotate(Deg(yaw), Deg(pitch));
        }
    }

    fn toggle(&self, config: &mut RenderConfig, lights: &[Light]) {
        let kb = &self.keyboard;
        let mut flags: [(Key, &mut bool); 13] = [
            (Key::Key1, &mut config.ambient),
            (Key::Key2, &mut config.diffuse),
            (Key::Key3, &mut config.specular),
            (Key::F1, &mut config.shadows),
            (Key::F2, &mut config.deferred),
            (Key::F3, &mut config.ssao),
            (Key::F4, &mut config.draw_normals),
            (Key::F5, &mut config.skybox),
            (Key::F6, &mut config.hdr),
            (Key::F8, &mut config.wireframe),
            (Key::F9, &mut config.normal_mapping),
            (Key::F10, &mut config.gbuffer_overlay),
            (Key::F11, &mut config.gradient_overlay),
        ];

        for (key, flag) in flags.iter_mut() {
            if kb.is_key_press(*key) {
                **flag = !**flag;
            }
        }

        if kb.is_key_press(Key::F7) {
            config.msaa_samples = if config.msaa_samples > 1 {
                1
            } else {
                MSAA_SAMPLES
            };
        }

        if kb.is_key_press(Key::F12) {
            config.shadow_debug = next_light(config.shadow_debug.as_ref(), lights);
        }

        if kb.is_key_press(Key::Equals) {
            config.exposure += EXPOSURE_STEP;
        }

        if kb.is_key_press(Key::Minus) {
            config.exposure = (config.exposure - EXPOSURE_STEP).max(EXPOSURE_STEP);
        }
    }
}

/// The light after `current`, or nothing after the last one.
fn next_light(current: Option<&String>, lights: &[Light]) -> Option<String> {
    let index = match current {
        Some(name) => match lights.iter().position(|v| v.name == *name) {
            Some(i) => i + 1,
            None => 0,
        },
        None => 0,
    };

    lights.get(index).map(|v| v.name.clone())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut kb = Keyboard::new();
        kb.on_key_pressed(Key::W);
        assert!(kb.is_key_down(Key::W));
        assert!(kb.is_key_press(Key::W));

        kb.advance();
        kb.on_key_pressed(Key::W);
        assert!(kb.is_key_down(Key::W));
        assert!(!kb.is_key_press(Key::W));

        kb.on_key_released(Key::W);
        assert!(!kb.is_key_down(Key::W));
        assert!(kb.is_key_release(Key::W));
    }

    #[test]
    fn haste_moves_further() {
        let dt = Duration::from_millis(500);
        let lights = [];
        let mut config = RenderConfig::default();

        let mut input = InputHandler::new(2.0);
        let mut camera = Camera::new(Vector2::new(800, 600));
        input.on_key_pressed(Key::W);
        input.update(&mut camera, &mut config, &lights, dt);
        let walked = 3.0 - camera.position().z;

        input.on_key_pressed(Key::LShift);
        let mut camera = Camera::new(Vector2::new(800, 600));
        input.update(&mut camera, &mut config, &lights, dt);
        let ran = 3.0 - camera.position().z;

        assert!((walked - 1.0).abs() < 1e-5);
        assert!((ran - walked * HASTE).abs() < 1e-4);
    }

    #[test]
    fn function_keys_toggle_features() {
        let lights = [Light::point("a"), Light::point("b")];
        let mut config = RenderConfig::default();
        let mut camera = Camera::new(Vector2::new(800, 600));
        let mut input = InputHandler::new(1.0);
        let dt = Duration::from_millis(16);

        input.on_key_pressed(Key::F2);
        input.on_key_pressed(Key::F12);
        assert!(input.update(&mut camera, &mut config, &lights, dt));
        assert!(config.deferred);
        assert_eq!(config.shadow_debug, Some("a".to_owned()));

        // Held keys do not toggle again.
        assert!(!input.update(&mut camera, &mut config, &lights, dt));

        input.on_key_released(Key::F12);
        input.on_key_pressed(Key::F12);
        input.update(&mut camera, &mut config, &lights, dt);
        assert_eq!(config.shadow_debug, Some("b".to_owned()));

        input.on_key_released(Key::F12);
        input.on_key_pressed(Key::F12);
        input.update(&mut camera, &mut config, &lights, dt);
        assert_eq!(config.shadow_debug, None);
    }

    #[test]
    fn number_keys_mask_light_terms() {
        let mut config = RenderConfig::default();
        let mut camera = Camera::new(Vector2::new(800, 600));
        let mut input = InputHandler::new(1.0);
        let dt = Duration::from_millis(16);

        input.on_key_pressed(Key::Key1);
        input.on_key_pressed(Key::Key3);
        input.update(&mut camera, &mut config, &[], dt);
        assert!(!config.ambient);
        assert!(config.diffuse);
        assert!(!config.specular);

        input.on_key_released(Key::Key1);
        input.on_key_released(Key::Key3);
        input.update(&mut camera, &mut config, &[], dt);
        input.on_key_pressed(Key::Key1);
        input.update(&mut camera, &mut config, &[], dt);
        assert!(config.ambient);
        assert!(!config.specular);
    }
}
