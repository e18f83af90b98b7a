mod common;

use std::path::PathBuf;

use eduren::prelude::*;

use self::common::*;

fn unshadowed() -> RenderConfig {
    RenderConfig {
        shadows: false,
        ..config()
    }
}

fn everything() -> RenderConfig {
    RenderConfig {
        shadows: true,
        deferred: true,
        ssao: true,
        draw_normals: true,
        gradient_overlay: true,
        gbuffer_overlay: true,
        wireframe: true,
        hdr: true,
        msaa_samples: 4,
        shadow_debug: Some("sun".into()),
        ..config()
    }
}

fn skybox(dir: &tempfile::TempDir) -> [PathBuf; 6] {
    let face = |name: &str| png(dir.path(), name, 4);
    [
        face("right.png"),
        face("left.png"),
        face("top.png"),
        face("bottom.png"),
        face("front.png"),
        face("back.png"),
    ]
}

fn labels(passes: &[Pass]) -> Vec<String> {
    passes.iter().map(|v| v.label().to_owned()).collect()
}

/// Drops the render target from `calls`, so passes drawn into different
/// surfaces can be compared.
fn untargeted(calls: &[Call]) -> Vec<Call> {
    calls
        .iter()
        .cloned()
        .map(|v| match v {
            Call::BindSurface(_) => Call::BindSurface(None),
            Call::Draw {
                shader,
                mesh,
                triangles,
                ..
            } => Call::Draw {
                shader,
                mesh,
                surface: None,
                triangles,
            },
            v => v,
        })
        .collect()
}

#[test]
fn forward_frame() {
    let mut fixture = Fixture::new(scene(true, 2));
    let stats = fixture.frame(&unshadowed());

    assert_eq!(&stats.passes[..], &[Pass::Forward, Pass::LightMarkers][..]);
    assert_eq!(fixture.video.markers(), labels(&stats.passes));
    // Two meshes and three light markers.
    assert_eq!(stats.draws, 5);
    assert_eq!(stats.triangles, 2 + 1 + 3 * 12);
}

#[test]
fn deferred_frame() {
    let mut fixture = Fixture::new(scene(true, 2));
    let config = RenderConfig {
        deferred: true,
        ssao: true,
        ..unshadowed()
    };

    let stats = fixture.frame(&config);
    assert_eq!(
        &stats.passes[..],
        &[
            Pass::Geometry,
            Pass::Ssao,
            Pass::Lighting,
            Pass::LightMarkers,
            Pass::ToneMap
        ][..]
    );
    assert_eq!(fixture.video.markers(), labels(&stats.passes));
    assert_eq!(fixture.video.sections("ssao-estimate").len(), 1);
    assert_eq!(fixture.video.sections("ssao-blur").len(), 1);

    // World-space G-buffer samples are moved into view space for the kernel.
    let estimate = fixture.video.sections("ssao-estimate");
    assert_eq!(
        uniform(estimate[0], "view"),
        Some(&UniformVariable::Matrix4f(fixture.camera.view_matrix().into()))
    );
    assert!(uniform(estimate[0], "projection").is_some());

    let lighting = fixture.video.sections(Pass::Lighting.label());
    let occlusion = fixture.renderer.ssao().occlusion().unwrap();
    assert_eq!(
        uniform(lighting[0], "ssao"),
        Some(&UniformVariable::RenderTexture(occlusion))
    );
    assert_eq!(uniform(lighting[0], "variant.occlusion"), Some(&UniformVariable::I32(1)));

    // The depth of the scene is copied into the offscreen target before any
    // light is drawn, never into the default framebuffer.
    let target = fixture.renderer.post().surface();
    assert!(target.is_some());
    let blit = lighting[0].iter().position(|v| match *v {
        Call::Blit {
            mask: BlitMask::Depth,
            dst,
            ..
        } => dst == target,
        _ => false,
    });
    let draw = lighting[0].iter().position(Call::is_draw);
    assert!(blit.unwrap() < draw.unwrap());
}

#[test]
fn light_markers_match_across_modes() {
    let mut fixture = Fixture::new(scene(true, 3));
    fixture.frame(&unshadowed());
    let forward = untargeted(fixture.video.sections(Pass::LightMarkers.label())[0]);

    fixture.video.take_calls();
    let deferred = RenderConfig {
        deferred: true,
        ..unshadowed()
    };

    fixture.frame(&deferred);
    let sections = fixture.video.sections(Pass::LightMarkers.label());
    assert_eq!(sections.len(), 1);
    assert_eq!(untargeted(sections[0]), forward);
    assert_eq!(sections[0].iter().filter(|v| v.is_draw()).count(), 4);

    // Deferred markers land in the offscreen target.
    let target = fixture.renderer.post().surface();
    assert!(sections[0].iter().all(|v| match *v {
        Call::Draw { surface, .. } => surface == target,
        _ => true,
    }));
}

#[test]
fn offscreen_frames_end_with_tone_mapping() {
    let mut fixture = Fixture::new(scene(false, 1));
    let config = RenderConfig {
        hdr: true,
        msaa_samples: 4,
        ..unshadowed()
    };

    let stats = fixture.frame(&config);
    assert_eq!(
        &stats.passes[stats.passes.len() - 2..],
        &[Pass::Resolve, Pass::ToneMap][..]
    );

    let forward = fixture.video.sections(Pass::Forward.label());
    assert!(forward[0].iter().all(|v| match *v {
        Call::Draw { surface, .. } => surface.is_some(),
        _ => true,
    }));

    let tonemap = fixture.video.sections(Pass::ToneMap.label());
    assert!(tonemap[0].iter().any(|v| match *v {
        Call::Draw { surface, .. } => surface.is_none(),
        _ => false,
    }));
    assert_eq!(uniform(tonemap[0], "hdr"), Some(&UniformVariable::I32(1)));

    // Deferred rendering is never multisampled.
    let deferred = RenderConfig {
        deferred: true,
        ..config
    };

    fixture.video.take_calls();
    let stats = fixture.frame(&deferred);
    assert!(!stats.passes.contains(&Pass::Resolve));
    assert_eq!(stats.passes.last(), Some(&Pass::ToneMap));
    assert!(fixture.video.calls().iter().all(|v| match *v {
        Call::CreateRenderTexture(_, params) => params.samples == 1,
        _ => true,
    }));
}

#[test]
fn every_feature_restores_state() {
    let mut fixture = Fixture::new(scene(true, 2));
    let config = everything();

    for _ in 0..2 {
        fixture.video.take_calls();
        let stats = fixture.frame(&config);

        assert_eq!(stats.passes[0], Pass::Shadow);
        assert_eq!(stats.passes.last(), Some(&Pass::Overlays));
        assert!(stats.passes.contains(&Pass::Normals));
        assert!(stats.passes.contains(&Pass::ShadowDebug));
        assert!(!stats.passes.contains(&Pass::Resolve));

        let calls = fixture.video.calls();
        let pushes = calls
            .iter()
            .filter(|v| match **v {
                Call::PushMarker(_) => true,
                _ => false,
            })
            .count();
        let pops = calls.iter().filter(|v| **v == Call::PopMarker).count();
        assert_eq!(pushes, pops);

        let last_mode = calls.iter().rev().find_map(|v| match *v {
            Call::SetPolygonMode(mode) => Some(mode),
            _ => None,
        });
        assert_eq!(last_mode, Some(PolygonMode::Fill));

        assert_eq!(fixture.video.surface(), None);
        assert_eq!(fixture.video.viewport(), SurfaceViewport::new(dimensions()));
        assert_eq!(fixture.video.cull_face(), CullFace::Back);
        assert_eq!(fixture.video.depth_test(), (true, Comparison::Less));
        assert_eq!(fixture.video.polygon_mode(), PolygonMode::Fill);
    }
}

#[test]
fn skybox_takes_precedence_over_shadow_debug() {
    let dir = tempfile::tempdir().unwrap();
    let faces = skybox(&dir);
    let mut fixture = Fixture::with_skybox(scene(true, 1), Some(&faces));
    assert!(fixture.resources.skybox().is_some());

    let config = RenderConfig {
        skybox: true,
        shadow_debug: Some("sun".into()),
        ..Default::default()
    };

    let stats = fixture.frame(&config);
    assert_eq!(stats.passes.last(), Some(&Pass::Skybox));
    assert!(!stats.passes.contains(&Pass::ShadowDebug));

    let sections = fixture.video.sections(Pass::Skybox.label());
    assert!(sections[0].contains(&Call::SetCullFace(CullFace::Nothing)));
    assert_eq!(fixture.video.cull_face(), CullFace::Back);

    // Without a skybox the debug view is drawn instead.
    let config = RenderConfig {
        skybox: false,
        ..config
    };

    let stats = fixture.frame(&config);
    assert_eq!(stats.passes.last(), Some(&Pass::ShadowDebug));
}

#[test]
fn texture_slot_budget() {
    let dir = tempfile::tempdir().unwrap();
    let faces = skybox(&dir);

    let mut material = Material::new("brick");
    for &slot in TextureSlot::ALL.iter() {
        let path = png(dir.path(), &format!("{:?}.png", slot), 8);
        material.set_texture(slot, Some(path));
    }

    let scene = scene_with_material(true, 10, material, true);
    let mut fixture = Fixture::with_skybox(scene, Some(&faces));
    let config = RenderConfig {
        skybox: true,
        ..Default::default()
    };

    fixture.frame(&config);

    let sections = fixture.video.sections(Pass::Forward.label());
    let samplers: ::std::collections::HashSet<&str> = sections[0]
        .iter()
        .filter_map(|v| match *v {
            Call::BindUniform(ref name, ref v) if v.is_sampler() => Some(name.as_str()),
            _ => None,
        })
        .collect();

    assert_eq!(samplers.len(), eduren::video::MAX_TEXTURE_SLOTS);
    assert_eq!(uniform(sections[0], "variant.baseColor"), Some(&UniformVariable::I32(1)));
    assert_eq!(uniform(sections[0], "variant.normal"), Some(&UniformVariable::I32(1)));
    assert_eq!(uniform(sections[0], "variant.reflection"), Some(&UniformVariable::I32(1)));
    assert_eq!(fixture.resources.cached_textures(), 4);
}

#[test]
fn release_frees_everything() {
    let dir = tempfile::tempdir().unwrap();
    let faces = skybox(&dir);
    let mut fixture = Fixture::with_skybox(scene(true, 2), Some(&faces));

    fixture.frame(&everything());
    fixture.renderer.release(&mut fixture.video).unwrap();
    fixture.resources.release(&mut fixture.video).unwrap();

    assert_eq!(fixture.video.alive_render_textures(), 0);
    assert_eq!(fixture.video.alive_surfaces(), 0);
    assert_eq!(fixture.video.alive_textures(), 0);
    assert_eq!(fixture.video.alive_meshes(), 0);
}
