mod common;

use eduren::prelude::*;

use self::common::*;

fn shadowed() -> RenderConfig {
    RenderConfig {
        shadows: true,
        ..config()
    }
}

#[test]
fn directional_pass_restores_state() {
    let mut fixture = Fixture::new(scene(true, 0));
    let (stats, calls) = fixture.record(&shadowed());
    assert_eq!(stats.passes[0], Pass::Shadow);

    let entry = *fixture.renderer.shadows().get("sun").unwrap();
    assert!(!entry.is_cube());
    let surface = entry.surface;

    let created = calls.iter().any(|v| match *v {
        Call::CreateSurface(handle, params) => {
            handle == surface && params.colors.iter().all(|c| c.is_none())
        }
        _ => false,
    });
    assert!(created);

    fixture.video.take_calls();
    fixture.frame(&shadowed());
    let sections = fixture.video.sections(Pass::Shadow.label());
    assert_eq!(sections.len(), 1);

    let shader = fixture.shader(Program::ShadowDepth);
    let section = sections[0];
    let expected_head = [
        Call::BindSurface(Some(surface)),
        Call::SetViewport(SurfaceViewport::new(Vector2::new(1024, 1024))),
        Call::Clear {
            color: false,
            depth: true,
        },
        Call::SetCullFace(CullFace::Front),
        Call::BindShader(shader),
    ];
    assert_eq!(&section[..5], &expected_head[..]);

    match section[5] {
        Call::BindUniform(ref name, UniformVariable::Matrix4f(_)) => assert_eq!(name, "lightSpace"),
        ref v => panic!("unexpected call {:?}", v),
    }

    let body = &section[6..section.len() - 5];
    assert_eq!(body.len(), 4);
    for pair in body.chunks(2) {
        match pair[0] {
            Call::BindUniform(ref name, _) => assert_eq!(name, "model"),
            ref v => panic!("unexpected call {:?}", v),
        }

        match pair[1] {
            Call::Draw {
                shader: s,
                surface: t,
                ..
            } => {
                assert_eq!(s, shader);
                assert_eq!(t, Some(surface));
            }
            ref v => panic!("unexpected call {:?}", v),
        }
    }

    let expected_tail = [
        Call::BindSurface(None),
        Call::SetViewport(SurfaceViewport::new(dimensions())),
        Call::SetCullFace(CullFace::Back),
        Call::SetDepthTest(true, Comparison::Less),
        Call::SetPolygonMode(PolygonMode::Fill),
    ];
    assert_eq!(&section[section.len() - 5..], &expected_tail[..]);
}

#[test]
fn point_pass_renders_every_face() {
    let mut fixture = Fixture::new(scene(false, 1));
    fixture.frame(&shadowed());

    let entry = *fixture.renderer.shadows().get("lamp0").unwrap();
    assert!(entry.is_cube());

    let sections = fixture.video.sections(Pass::Shadow.label());
    assert_eq!(sections.len(), 1);

    let names = uniform_names(sections[0]);
    for i in 0..6 {
        let name = format!("shadowMatrices[{}]", i);
        assert!(names.contains(&name.as_str()), "missing {}", name);
    }

    assert_eq!(uniform(sections[0], "farPlane"), Some(&UniformVariable::F32(25.0)));
    assert!(!sections[0].iter().any(|v| match *v {
        Call::SetCullFace(CullFace::Front) => true,
        _ => false,
    }));
}

#[test]
fn disabling_shadows_releases_maps() {
    let mut fixture = Fixture::new(scene(true, 2));
    fixture.frame(&shadowed());
    assert_eq!(fixture.renderer.shadows().len(), 3);

    let unshadowed = RenderConfig {
        shadows: false,
        ..config()
    };

    let (stats, calls) = fixture.record(&unshadowed);
    assert!(!stats.passes.contains(&Pass::Shadow));
    assert!(fixture.renderer.shadows().is_empty());

    let count = |f: fn(&Call) -> bool| calls.iter().filter(|v| f(v)).count();
    assert_eq!(
        count(|v| match *v {
            Call::DeleteSurface(_) => true,
            _ => false,
        }),
        3
    );
    assert_eq!(
        count(|v| match *v {
            Call::DeleteRenderTexture(_) => true,
            _ => false,
        }),
        3
    );
    assert_eq!(count(Call::is_allocation), 0);

    let (_, calls) = fixture.record(&unshadowed);
    assert!(!calls.iter().any(|v| v.is_deletion() || v.is_allocation()));
}

#[test]
fn resolution_change_reallocates() {
    let mut fixture = Fixture::new(scene(true, 1));
    fixture.frame(&shadowed());

    // Steady state allocates nothing.
    let (_, calls) = fixture.record(&shadowed());
    assert!(!calls.iter().any(Call::is_allocation));

    let config = RenderConfig {
        shadow_resolution: 512,
        ..shadowed()
    };

    let (_, calls) = fixture.record(&config);
    let resized = calls
        .iter()
        .filter(|v| match **v {
            Call::CreateRenderTexture(_, params) => params.dimensions == Vector2::new(512, 512),
            _ => false,
        })
        .count();

    assert_eq!(resized, 2);
    assert_eq!(calls.iter().filter(|v| v.is_deletion()).count(), 4);
    assert_eq!(fixture.renderer.shadows().get("sun").unwrap().resolution, 512);
}

#[test]
fn debug_view_of_missing_light_is_skipped() {
    let mut fixture = Fixture::new(scene(true, 1));
    let config = RenderConfig {
        shadow_debug: Some("nobody".into()),
        ..shadowed()
    };

    let (stats, _) = fixture.record(&config);
    assert!(!stats.passes.contains(&Pass::ShadowDebug));
    assert!(fixture.video.sections(Pass::ShadowDebug.label()).is_empty());

    let config = RenderConfig {
        shadow_debug: Some("lamp0".into()),
        ..shadowed()
    };

    fixture.video.take_calls();
    let stats = fixture.frame(&config);
    assert_eq!(stats.passes.last(), Some(&Pass::ShadowDebug));

    let sections = fixture.video.sections(Pass::ShadowDebug.label());
    assert_eq!(sections.len(), 1);
    assert_eq!(uniform(sections[0], "cube"), Some(&UniformVariable::I32(1)));
    assert!(uniform(sections[0], "depthCube").is_some());
}

#[test]
fn light_kind_change_reallocates() {
    let mut root = Node::new("root");
    root.children = vec![1];
    let directional = Scene::new(
        vec![root, Node::new("lamp0")],
        0,
        vec![],
        vec![Light::directional("lamp0", Vector3::new(0.0, -1.0, 0.0))],
        vec![],
    )
    .unwrap();

    let mut fixture = Fixture::new(directional);
    fixture.frame(&shadowed());
    let old = *fixture.renderer.shadows().get("lamp0").unwrap();
    assert!(!old.is_cube());

    // Same light name, now a point light.
    fixture.scene = scene(false, 1);
    fixture.resources = SceneResources::load(&mut fixture.video, &fixture.scene, None).unwrap();

    fixture.video.take_calls();
    fixture.frame(&shadowed());
    let calls = fixture.video.calls();
    let entry = *fixture.renderer.shadows().get("lamp0").unwrap();
    assert!(entry.is_cube());
    assert_ne!(entry.texture, old.texture);
    assert!(calls.contains(&Call::DeleteRenderTexture(old.texture)));
    assert!(calls.iter().any(|v| match *v {
        Call::CreateRenderTexture(handle, params) => {
            handle == entry.texture && params.kind == TextureKind::Cube
        }
        _ => false,
    }));

    let sections = fixture.video.sections(Pass::Forward.label());
    assert_eq!(
        uniform(sections[0], "pointLights[0].shadowMap"),
        Some(&UniformVariable::RenderTexture(entry.texture))
    );
}
