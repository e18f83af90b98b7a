//! The scene graph, validated once when it is built.
//!
//! World transforms, the flattened draw list, the light transform index and
//! the scene bounds are all computed in `Scene::new`, so per-frame code
//! never walks the node tree.

use crate::errors::*;
use crate::math::prelude::*;
use crate::utils::hash::{FastHashMap, FastHashSet};
use crate::video::assets::prelude::MeshData;

use super::light::{Light, LightKind};
use super::material::Material;

/// At most this many point lights fit in the shaders' light arrays.
pub const MAX_POINT_LIGHTS: usize = 10;
/// Only a single directional light is supported.
pub const MAX_DIRECTIONAL_LIGHTS: usize = 1;

/// Index of a mesh that is known to exist in its scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(usize);

impl MeshId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    /// Transform relative to the parent node.
    pub transform: Matrix4<f32>,
    pub meshes: Vec<usize>,
    pub children: Vec<usize>,
}

impl Node {
    pub fn new<T: Into<String>>(name: T) -> Self {
        Node {
            name: name.into(),
            transform: Matrix4::identity(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }
}

/// Triangle mesh data as imported. Optional attributes are either empty or
/// as long as `positions`.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vector3<f32>>,
    pub normals: Vec<Vector3<f32>>,
    pub texcoords: Vec<Vector2<f32>>,
    pub tangents: Vec<Vector3<f32>>,
    pub bitangents: Vec<Vector3<f32>>,
    pub faces: Vec<Vec<u32>>,
    pub material: usize,
}

impl Mesh {
    /// Flattens the faces into GPU ready vertex and index data.
    pub fn to_mesh_data(&self) -> MeshData {
        MeshData {
            positions: self.positions.clone(),
            normals: self.normals.clone(),
            texcoords: self.texcoords.clone(),
            tangents: self.tangents.clone(),
            bitangents: self.bitangents.clone(),
            indices: self.faces.iter().flat_map(|f| f.iter().cloned()).collect(),
        }
    }

    fn validate(&self, materials: usize) -> ::std::result::Result<(), SceneError> {
        let len = self.positions.len();
        let attributes = [
            ("normals", self.normals.len()),
            ("texcoords", self.texcoords.len()),
            ("tangents", self.tangents.len()),
            ("bitangents", self.bitangents.len()),
        ];

        for &(attribute, v) in &attributes {
            if v != 0 && v != len {
                return Err(SceneError::AttributeLengthMismatch {
                    mesh: self.name.clone(),
                    attribute,
                    len,
                });
            }
        }

        for (face, v) in self.faces.iter().enumerate() {
            if v.len() != 3 {
                return Err(SceneError::NonTriangularFace {
                    mesh: self.name.clone(),
                    face,
                    len: v.len(),
                });
            }

            if let Some(&index) = v.iter().find(|&&i| i as usize >= len) {
                return Err(SceneError::VertexOutOfBounds {
                    mesh: self.name.clone(),
                    index,
                    len,
                });
            }
        }

        if self.material >= materials {
            return Err(SceneError::MaterialOutOfBounds(self.material));
        }

        Ok(())
    }
}

/// One mesh instance in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw {
    pub mesh: MeshId,
    pub world: Matrix4<f32>,
}

#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
    meshes: Vec<Mesh>,
    lights: Vec<Light>,
    materials: Vec<Material>,
    draws: Vec<Draw>,
    light_transforms: FastHashMap<String, Matrix4<f32>>,
    bounds: Aabb3,
}

impl Scene {
    /// Validates the graph under `root` and precomputes everything the
    /// renderer reads per frame.
    pub fn new(
        nodes: Vec<Node>,
        root: usize,
        meshes: Vec<Mesh>,
        lights: Vec<Light>,
        materials: Vec<Material>,
    ) -> Result<Scene> {
        for v in &meshes {
            v.validate(materials.len())?;
        }

        let directionals = lights
            .iter()
            .filter(|v| v.kind == LightKind::Directional)
            .count();
        if directionals > MAX_DIRECTIONAL_LIGHTS {
            return Err(SceneError::TooManyDirectionalLights(directionals).into());
        }

        let points = lights.len() - directionals;
        if points > MAX_POINT_LIGHTS {
            return Err(SceneError::TooManyPointLights {
                max: MAX_POINT_LIGHTS,
                found: points,
            }
            .into());
        }

        let mut names = FastHashSet::default();
        for v in &lights {
            if !names.insert(v.name.as_str()) {
                return Err(SceneError::DuplicateLight(v.name.clone()).into());
            }
        }

        if root >= nodes.len() {
            return Err(SceneError::NodeOutOfBounds(root).into());
        }

        // Depth-first, children in declaration order.
        let mut draws = Vec::new();
        let mut worlds: FastHashMap<String, Matrix4<f32>> = FastHashMap::default();
        let mut visited = FastHashSet::default();
        let mut stack = vec![(root, Matrix4::identity())];

        while let Some((index, parent)) = stack.pop() {
            if !visited.insert(index) {
                return Err(SceneError::NodeCycle(index).into());
            }

            let node = &nodes[index];
            let world = parent * node.transform;
            worlds.entry(node.name.clone()).or_insert(world);

            for &v in &node.meshes {
                if v >= meshes.len() {
                    return Err(SceneError::MeshOutOfBounds(v).into());
                }

                draws.push(Draw {
                    mesh: MeshId(v),
                    world,
                });
            }

            for &v in node.children.iter().rev() {
                if v >= nodes.len() {
                    return Err(SceneError::NodeOutOfBounds(v).into());
                }

                stack.push((v, world));
            }
        }

        let mut light_transforms = FastHashMap::default();
        for v in &lights {
            let world = worlds
                .get(&v.name)
                .ok_or_else(|| SceneError::LightNodeMissing(v.name.clone()))?;
            light_transforms.insert(v.name.clone(), *world);
        }

        let bounds = Aabb3::from_points(draws.iter().flat_map(|draw| {
            let world = draw.world;
            meshes[draw.mesh.0]
                .positions
                .iter()
                .map(move |&p| world.transform_point(Point3::from_vec(p)))
        }))
        .unwrap_or_else(Aabb3::zero);

        debug!(
            "Scene with {} nodes, {} draws, {} lights, bounds {:?}.",
            nodes.len(),
            draws.len(),
            lights.len(),
            bounds
        );

        Ok(Scene {
            nodes,
            meshes,
            lights,
            materials,
            draws,
            light_transforms,
            bounds,
        })
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    #[inline]
    pub fn mesh(&self, id: MeshId) -> &Mesh {
        &self.meshes[id.0]
    }

    /// Ids of every mesh, in declaration order.
    pub fn mesh_ids(&self) -> impl Iterator<Item = MeshId> {
        (0..self.meshes.len()).map(MeshId)
    }

    /// The material of a mesh. Material indices are validated at construction.
    #[inline]
    pub fn material(&self, id: MeshId) -> &Material {
        &self.materials[self.meshes[id.0].material]
    }

    #[inline]
    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    #[inline]
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Mesh instances in depth-first order.
    #[inline]
    pub fn draws(&self) -> &[Draw] {
        &self.draws
    }

    #[inline]
    pub fn bounds(&self) -> Aabb3 {
        self.bounds
    }

    /// The nominal center of the scene, which directional shadow cameras look at.
    #[inline]
    pub fn center(&self) -> Point3<f32> {
        self.bounds.center()
    }

    /// The world transform of the node a light is attached to.
    #[inline]
    pub fn light_transform(&self, name: &str) -> Option<&Matrix4<f32>> {
        self.light_transforms.get(name)
    }

    /// World position of a light.
    pub fn light_position(&self, light: &Light) -> Point3<f32> {
        self.light_transform(&light.name)
            .map(|m| m.transform_point(Point3::origin()))
            .unwrap_or_else(Point3::origin)
    }

    /// Normalized world direction of a directional light.
    pub fn light_direction(&self, light: &Light) -> Vector3<f32> {
        self.light_transform(&light.name)
            .map(|m| m.transform_vector(light.direction))
            .unwrap_or(light.direction)
            .normalize()
    }

    pub fn point_lights(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().filter(|v| v.kind == LightKind::Point)
    }

    pub fn directional_lights(&self) -> impl Iterator<Item = &Light> {
        self.lights.iter().filter(|v| v.kind == LightKind::Directional)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn triangle(material: usize) -> Mesh {
        Mesh {
            name: "triangle".into(),
            positions: vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
            faces: vec![vec![0, 1, 2]],
            material,
            ..Default::default()
        }
    }

    fn error(result: Result<Scene>) -> SceneError {
        result.unwrap_err().downcast::<SceneError>().unwrap()
    }

    #[test]
    fn world_transforms_accumulate() {
        let mut root = Node::new("root");
        root.transform = Matrix4::from_translation(Vector3::new(1.0, 0.0, 0.0));
        root.children = vec![1];

        let mut child = Node::new("lamp");
        child.transform = Matrix4::from_translation(Vector3::new(0.0, 2.0, 0.0));
        child.meshes = vec![0];

        let scene = Scene::new(
            vec![root, child],
            0,
            vec![triangle(0)],
            vec![Light::point("lamp")],
            vec![Material::default()],
        )
        .unwrap();

        let light = &scene.lights()[0];
        assert_eq!(scene.light_position(light), Point3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.draws().len(), 1);
        assert_eq!(scene.bounds().min, Point3::new(1.0, 2.0, 0.0));
        assert_eq!(scene.bounds().max, Point3::new(2.0, 3.0, 0.0));
    }

    #[test]
    fn rejects_invalid_graphs() {
        let mut quad = triangle(0);
        quad.faces = vec![vec![0, 1, 2, 0]];
        let e = error(Scene::new(
            vec![Node::new("root")],
            0,
            vec![quad],
            vec![],
            vec![Material::default()],
        ));
        assert_eq!(
            e,
            SceneError::NonTriangularFace {
                mesh: "triangle".into(),
                face: 0,
                len: 4
            }
        );

        let mut looping = Node::new("root");
        looping.children = vec![0];
        let e = error(Scene::new(vec![looping], 0, vec![], vec![], vec![]));
        assert_eq!(e, SceneError::NodeCycle(0));

        let e = error(Scene::new(
            vec![Node::new("root")],
            0,
            vec![triangle(1)],
            vec![],
            vec![Material::default()],
        ));
        assert_eq!(e, SceneError::MaterialOutOfBounds(1));

        let e = error(Scene::new(
            vec![Node::new("root")],
            0,
            vec![],
            vec![Light::point("missing")],
            vec![],
        ));
        assert_eq!(e, SceneError::LightNodeMissing("missing".into()));
    }

    #[test]
    fn rejects_lights_sharing_a_name() {
        let e = error(Scene::new(
            vec![Node::new("lamp")],
            0,
            vec![],
            vec![
                Light::directional("lamp", Vector3::new(0.0, -1.0, 0.0)),
                Light::point("lamp"),
            ],
            vec![],
        ));
        assert_eq!(e, SceneError::DuplicateLight("lamp".into()));
    }
}
