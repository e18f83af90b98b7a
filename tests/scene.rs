use std::fs;
use std::path::Path;

use eduren::prelude::*;

const SCENE: &str = r#"{
    "nodes": [
        { "name": "root", "children": [1, 2, 3] },
        { "name": "floor", "meshes": [0], "translation": [0, -1, 0], "scale": [10, 1, 10] },
        { "name": "sun", "rotation": [-90, 0, 0] },
        { "name": "lamp", "translation": [1, 2, 3] }
    ],
    "meshes": [
        {
            "name": "plane",
            "positions": [[-0.5, 0, -0.5], [0.5, 0, -0.5], [0.5, 0, 0.5]],
            "normals": [[0, 1, 0], [0, 1, 0], [0, 1, 0]],
            "faces": [[0, 2, 1]]
        }
    ],
    "materials": [
        { "name": "wood", "shininess": 8, "diffuse_map": "textures/wood.png" }
    ],
    "lights": [
        { "name": "sun", "kind": "directional" },
        { "name": "lamp", "kind": "point", "diffuse": [1, 0, 0],
          "attenuation": { "constant": 1, "linear": 0.5, "quadratic": 0.25 } }
    ],
    "skybox": ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"]
}"#;

fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a - b).magnitude() < 1e-5
}

#[test]
fn load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scene.json");
    fs::write(&path, SCENE).unwrap();

    let file = loader::load(&path).unwrap();
    let scene = &file.scene;

    assert_eq!(scene.draws().len(), 1);
    assert_eq!(scene.lights().len(), 2);
    assert_eq!(scene.bounds().min, Point3::new(-5.0, -1.0, -5.0));
    assert_eq!(scene.bounds().max, Point3::new(5.0, -1.0, 5.0));

    let sun = &scene.lights()[0];
    assert_eq!(sun.kind, LightKind::Directional);
    assert!(close(scene.light_direction(sun), Vector3::new(0.0, -1.0, 0.0)));

    let lamp = &scene.lights()[1];
    assert_eq!(scene.light_position(lamp), Point3::new(1.0, 2.0, 3.0));
    assert_eq!(lamp.diffuse, Vector3::new(1.0, 0.0, 0.0));
    assert_eq!(lamp.attenuation.quadratic, 0.25);

    let material = &scene.materials()[0];
    assert_eq!(material.shininess, 8.0);
    assert_eq!(
        material.texture(TextureSlot::Diffuse),
        Some(dir.path().join("textures/wood.png").as_path())
    );
    assert!(material.is_textured());

    let skybox = file.skybox.unwrap();
    assert_eq!(skybox[0], dir.path().join("px.png"));
    assert_eq!(skybox[5], dir.path().join("nz.png"));
}

#[test]
fn invalid_scenes() {
    let dir = Path::new("assets");

    let square = SCENE.replace("[[0, 2, 1]]", "[[0, 2, 1, 0]]");
    let err = loader::from_str(&square, dir).unwrap_err();
    assert_eq!(
        err.downcast::<SceneError>().unwrap(),
        SceneError::NonTriangularFace {
            mesh: "plane".into(),
            face: 0,
            len: 4,
        }
    );

    let faces = SCENE.replace(r#", "nz.png"]"#, "]");
    let err = loader::from_str(&faces, dir).unwrap_err();
    assert!(err.to_string().contains("6 faces"));

    let typo = SCENE.replace("\"shininess\"", "\"shinyness\"");
    assert!(loader::from_str(&typo, dir).is_err());

    assert!(loader::load(dir.join("missing.json")).is_err());
}

#[test]
fn missing_skybox_faces_are_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let file = loader::from_str(SCENE, dir.path()).unwrap();

    let mut video = RecordingVisitor::new(Vector2::new(64, 64));
    let resources = SceneResources::load(&mut video, &file.scene, file.skybox.as_ref()).unwrap();
    assert!(resources.skybox().is_none());
    assert_eq!(resources.meshes().len(), 1);
}
