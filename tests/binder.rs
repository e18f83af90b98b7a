mod common;

use std::collections::BTreeSet;

use eduren::prelude::*;
use eduren::scene::MAX_POINT_LIGHTS;

use self::common::*;

fn indices(names: &[&str], prefix: &str) -> BTreeSet<usize> {
    names
        .iter()
        .filter(|v| v.starts_with(prefix))
        .filter_map(|v| {
            let end = v.find(']')?;
            v[prefix.len()..end].parse().ok()
        })
        .collect()
}

fn unshadowed() -> RenderConfig {
    RenderConfig {
        shadows: false,
        ..config()
    }
}

#[test]
fn binds_every_light_once() {
    for n in 0..=MAX_POINT_LIGHTS {
        let mut fixture = Fixture::new(scene(true, n));
        fixture.frame(&unshadowed());

        let sections = fixture.video.sections(Pass::Forward.label());
        assert_eq!(sections.len(), 1);

        let names = uniform_names(sections[0]);
        let points = indices(&names, "pointLights[");
        assert_eq!(points, (0..n).collect::<BTreeSet<_>>(), "{} point lights", n);

        let directionals = indices(&names, "dirLights[");
        assert_eq!(directionals, Some(0).into_iter().collect::<BTreeSet<_>>());

        assert_eq!(
            uniform(sections[0], "pointLightsCount"),
            Some(&UniformVariable::I32(n as i32))
        );
        assert_eq!(
            uniform(sections[0], "dirLightsCount"),
            Some(&UniformVariable::I32(1))
        );
    }
}

#[test]
fn forward_pass_samples_shadow_maps() {
    let mut fixture = Fixture::new(scene(true, 2));
    fixture.frame(&config());

    let sections = fixture.video.sections(Pass::Forward.label());
    let section = sections[0];
    let shadows = fixture.renderer.shadows();

    let sun = shadows.get("sun").unwrap().texture;
    assert_eq!(
        uniform(section, "dirLights[0].shadowMap"),
        Some(&UniformVariable::RenderTexture(sun))
    );
    assert!(uniform(section, "dirLights[0].lightSpace").is_some());

    for i in 0..2 {
        let lamp = shadows.get(&format!("lamp{}", i)).unwrap().texture;
        let name = format!("pointLights[{}].shadowMap", i);
        assert_eq!(
            uniform(section, &name),
            Some(&UniformVariable::RenderTexture(lamp))
        );
    }

    assert_eq!(uniform(section, "variant.shadow"), Some(&UniformVariable::I32(1)));
}

#[test]
fn unshadowed_frames_skip_shadow_maps() {
    let mut fixture = Fixture::new(scene(true, 1));
    fixture.frame(&unshadowed());

    let sections = fixture.video.sections(Pass::Forward.label());
    let names = uniform_names(sections[0]);
    assert!(!names.iter().any(|v| v.ends_with("shadowMap")));
    assert_eq!(uniform(sections[0], "variant.shadow"), Some(&UniformVariable::I32(0)));
}

#[test]
fn masked_light_terms() {
    let mut fixture = Fixture::new(scene(false, 1));
    let config = RenderConfig {
        ambient: false,
        specular: false,
        ..unshadowed()
    };

    fixture.frame(&config);
    let sections = fixture.video.sections(Pass::Forward.label());
    let zero = UniformVariable::Vector3f([0.0; 3]);
    assert_eq!(uniform(sections[0], "pointLights[0].ambient"), Some(&zero));
    assert_eq!(uniform(sections[0], "pointLights[0].specular"), Some(&zero));
    assert_ne!(uniform(sections[0], "pointLights[0].diffuse"), Some(&zero));
}

fn lights(directionals: usize, points: usize) -> Result<Scene> {
    let mut root = Node::new("root");
    let mut nodes = Vec::new();
    let mut lights = Vec::new();

    for i in 0..directionals {
        let name = format!("sun{}", i);
        nodes.push(Node::new(name.as_str()));
        lights.push(Light::directional(name, Vector3::new(0.0, -1.0, 0.0)));
    }

    for i in 0..points {
        let name = format!("lamp{}", i);
        nodes.push(Node::new(name.as_str()));
        lights.push(Light::point(name));
    }

    root.children = (1..=nodes.len()).collect();
    nodes.insert(0, root);
    Scene::new(nodes, 0, vec![], lights, vec![])
}

#[test]
fn light_capacity() {
    assert!(lights(1, MAX_POINT_LIGHTS).is_ok());

    let err = lights(0, MAX_POINT_LIGHTS + 1).unwrap_err();
    assert_eq!(
        err.downcast::<SceneError>().unwrap(),
        SceneError::TooManyPointLights {
            max: MAX_POINT_LIGHTS,
            found: MAX_POINT_LIGHTS + 1,
        }
    );

    let err = lights(2, 0).unwrap_err();
    assert_eq!(
        err.downcast::<SceneError>().unwrap(),
        SceneError::TooManyDirectionalLights(2)
    );
}
