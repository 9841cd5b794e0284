//! YAML-backed scene document implementing the host capabilities.
//!
//! Holds just enough of a scene for the pipeline: objects with material
//! slots, node-based materials and the images loaded into the scene. Bakes
//! are delegated to a [`BakeBackend`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{
    BakeBackend, BakeRequest, ColorData, ImageHandle, NodeId, NodeRole, NormalSpace, ObjectKind,
    SceneHost, SceneObject, ShadingGraph,
};
use crate::bake::BakeSettings;
use crate::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectEntry {
    pub name: String,
    pub kind: ObjectKind,
    /// Material names, one per slot
    #[serde(default)]
    pub materials: Vec<String>,
    #[serde(default)]
    pub active_material: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub role: NodeRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageHandle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_data: Option<ColorData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_space: Option<NormalSpace>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub from: NodeId,
    pub output: String,
    pub to: NodeId,
    pub input: String,
}

/// A material and its shading node graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeGraph {
    pub name: String,
    #[serde(default)]
    pub use_nodes: bool,
    #[serde(default)]
    pub nodes: Vec<Node>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl NodeGraph {
    /// A fresh material with node shading off
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            use_nodes: false,
            nodes: Vec::new(),
            links: Vec::new(),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, PipelineError> {
        let material = &self.name;
        self.nodes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| PipelineError::UnknownNode {
                material: material.clone(),
                node: id.0,
            })
    }

    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.role == role)
    }

    fn next_id(&self) -> NodeId {
        NodeId(self.nodes.iter().map(|n| n.id.0 + 1).max().unwrap_or(0))
    }

    fn check_socket(
        &self,
        node: NodeId,
        socket: &str,
        sockets: fn(NodeRole) -> &'static [&'static str],
    ) -> Result<(), PipelineError> {
        let known = self
            .node(node)
            .map(|n| sockets(n.role).contains(&socket))
            .unwrap_or(false);
        if known {
            Ok(())
        } else {
            Err(PipelineError::UnknownSocket {
                node: node.0,
                socket: socket.to_string(),
            })
        }
    }
}

impl ShadingGraph for NodeGraph {
    fn material_name(&self) -> &str {
        &self.name
    }

    fn uses_nodes(&self) -> bool {
        self.use_nodes
    }

    /// Turning nodes on for an empty graph seeds the default shader setup
    fn enable_nodes(&mut self) {
        if self.use_nodes {
            return;
        }
        self.use_nodes = true;
        if self.nodes.is_empty() {
            let shader = self.add_node(NodeRole::PrincipledShader);
            let output = self.add_node(NodeRole::MaterialOutput);
            self.links.push(Link {
                from: shader,
                output: "BSDF".to_string(),
                to: output,
                input: "Surface".to_string(),
            });
        }
    }

    fn find_node(&self, role: NodeRole) -> Option<NodeId> {
        self.nodes_with_role(role).next().map(|n| n.id)
    }

    fn add_node(&mut self, role: NodeRole) -> NodeId {
        let id = self.next_id();
        self.nodes.push(Node {
            id,
            role,
            image: None,
            color_data: None,
            normal_space: None,
        });
        id
    }

    fn node_role(&self, node: NodeId) -> Option<NodeRole> {
        self.node(node).map(|n| n.role)
    }

    fn set_image(
        &mut self,
        node: NodeId,
        image: &ImageHandle,
        data: ColorData,
    ) -> Result<(), PipelineError> {
        let entry = self.node_mut(node)?;
        entry.image = Some(image.clone());
        entry.color_data = Some(data);
        Ok(())
    }

    fn set_normal_space(&mut self, node: NodeId, space: NormalSpace) -> Result<(), PipelineError> {
        self.node_mut(node)?.normal_space = Some(space);
        Ok(())
    }

    fn linked_source(&self, node: NodeId, input: &str) -> Option<NodeId> {
        self.links
            .iter()
            .find(|l| l.to == node && l.input == input)
            .map(|l| l.from)
    }

    fn connect(
        &mut self,
        from: NodeId,
        output: &str,
        to: NodeId,
        input: &str,
    ) -> Result<(), PipelineError> {
        self.check_socket(from, output, NodeRole::outputs)?;
        self.check_socket(to, input, NodeRole::inputs)?;

        self.links.retain(|l| !(l.to == to && l.input == input));
        self.links.push(Link {
            from,
            output: output.to_string(),
            to,
            input: input.to_string(),
        });
        Ok(())
    }
}

/// Serialisable scene state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    /// Where the document was loaded from; the scene directory derives from it
    #[serde(skip)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub active_object: Option<String>,
    #[serde(default)]
    pub objects: Vec<ObjectEntry>,
    #[serde(default)]
    pub materials: Vec<NodeGraph>,
    #[serde(default)]
    pub images: Vec<ImageHandle>,
    /// Last bake configuration pushed by the pipeline
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bake_settings: Option<BakeSettings>,
}

impl SceneDocument {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
        let mut document: SceneDocument = serde_yaml::from_str(&contents)
            .map_err(|e| PipelineError::Document {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        document.path = Some(path.to_path_buf());
        Ok(document)
    }

    /// Write back to the path the document was loaded from
    pub fn save(&self) -> Result<(), PipelineError> {
        let Some(path) = &self.path else {
            return Err(PipelineError::InvalidArguments(
                "scene document has no file path".to_string(),
            ));
        };
        self.save_as(path)
    }

    pub fn save_as<P: AsRef<Path>>(&self, path: P) -> Result<(), PipelineError> {
        let path = path.as_ref();
        let contents = serde_yaml::to_string(self)
            .map_err(|e| PipelineError::Document {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        std::fs::write(path, contents).map_err(|e| PipelineError::io(path, e))
    }

    pub fn add_object(&mut self, name: impl Into<String>, kind: ObjectKind) {
        self.objects.push(ObjectEntry {
            name: name.into(),
            kind,
            materials: Vec::new(),
            active_material: 0,
        });
    }

    pub fn object(&self, name: &str) -> Option<&ObjectEntry> {
        self.objects.iter().find(|o| o.name == name)
    }

    fn object_mut(&mut self, name: &str) -> Result<&mut ObjectEntry, PipelineError> {
        self.objects
            .iter_mut()
            .find(|o| o.name == name)
            .ok_or_else(|| PipelineError::ObjectNotFound(name.to_string()))
    }

    pub fn material(&self, name: &str) -> Option<&NodeGraph> {
        self.materials.iter().find(|m| m.name == name)
    }

    /// Append a slot holding `name`, creating the material if it does not exist
    pub fn add_material(&mut self, object: &str, name: &str) -> Result<(), PipelineError> {
        let entry = self.object_mut(object)?;
        entry.materials.push(name.to_string());
        if entry.materials.len() == 1 {
            entry.active_material = 0;
        }
        if self.material(name).is_none() {
            self.materials.push(NodeGraph::new(name));
        }
        Ok(())
    }
}

/// [`SceneHost`] over a [`SceneDocument`] and a bake backend
pub struct MemoryHost {
    document: SceneDocument,
    backend: Box<dyn BakeBackend>,
}

impl MemoryHost {
    pub fn new(document: SceneDocument, backend: impl BakeBackend + 'static) -> Self {
        Self {
            document,
            backend: Box::new(backend),
        }
    }

    pub fn scene(&self) -> &SceneDocument {
        &self.document
    }

    pub fn scene_mut(&mut self) -> &mut SceneDocument {
        &mut self.document
    }

    pub fn into_scene(self) -> SceneDocument {
        self.document
    }
}

impl SceneHost for MemoryHost {
    fn scene_dir(&self) -> Option<PathBuf> {
        let path = self.document.path.as_ref()?;
        match path.parent() {
            Some(dir) if dir.as_os_str().is_empty() => Some(PathBuf::from(".")),
            Some(dir) => Some(dir.to_path_buf()),
            None => None,
        }
    }

    fn active_object(&self) -> Option<SceneObject> {
        let name = self.document.active_object.as_deref()?;
        self.document.object(name).map(|o| SceneObject {
            name: o.name.clone(),
            kind: o.kind.clone(),
        })
    }

    fn material_slots(&self, object: &str) -> Result<Vec<String>, PipelineError> {
        self.document
            .object(object)
            .map(|o| o.materials.clone())
            .ok_or_else(|| PipelineError::ObjectNotFound(object.to_string()))
    }

    fn add_material(&mut self, object: &str, name: &str) -> Result<(), PipelineError> {
        self.document.add_material(object, name)
    }

    fn active_material(&self, object: &str) -> Option<String> {
        let entry = self.document.object(object)?;
        entry.materials.get(entry.active_material).cloned()
    }

    fn apply_bake_settings(&mut self, settings: &BakeSettings) {
        self.document.bake_settings = Some(settings.clone());
    }

    fn bake_to_file(&mut self, request: &BakeRequest) -> Result<(), String> {
        self.backend.bake(request)
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, PipelineError> {
        if !path.is_file() {
            return Err(PipelineError::ArtifactMissing(path.to_path_buf()));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let handle = ImageHandle {
            name,
            path: path.to_path_buf(),
        };

        // Reloading the same file replaces the previous entry
        self.document.images.retain(|img| img.path != handle.path);
        self.document.images.push(handle.clone());
        log::debug!("Loaded image {} into scene", handle.path.display());
        Ok(handle)
    }

    fn material_graph(&mut self, material: &str) -> Option<&mut dyn ShadingGraph> {
        self.document
            .materials
            .iter_mut()
            .find(|m| m.name == material)
            .map(|graph| graph as &mut dyn ShadingGraph)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn no_bake(_: &BakeRequest) -> Result<(), String> {
        Err("no backend".to_string())
    }

    #[test]
    fn test_enable_nodes_seeds_default_shader() {
        let mut graph = NodeGraph::new("Material");

        graph.enable_nodes();

        let shader = graph.find_node(NodeRole::PrincipledShader).unwrap();
        let output = graph.find_node(NodeRole::MaterialOutput).unwrap();
        assert!(graph.uses_nodes());
        assert_eq!(graph.linked_source(output, "Surface"), Some(shader));
    }

    #[test]
    fn test_connect_replaces_existing_input_link() {
        let mut graph = NodeGraph::new("Material");
        let shader = graph.add_node(NodeRole::PrincipledShader);
        let first = graph.add_node(NodeRole::ImageTexture);
        let second = graph.add_node(NodeRole::ImageTexture);

        graph.connect(first, "Color", shader, "Base Color").unwrap();
        graph.connect(second, "Color", shader, "Base Color").unwrap();

        assert_eq!(graph.links.len(), 1);
        assert_eq!(graph.linked_source(shader, "Base Color"), Some(second));
    }

    #[test]
    fn test_connect_rejects_unknown_socket() {
        let mut graph = NodeGraph::new("Material");
        let shader = graph.add_node(NodeRole::PrincipledShader);
        let texture = graph.add_node(NodeRole::ImageTexture);

        let result = graph.connect(texture, "Colour", shader, "Base Color");

        assert!(matches!(
            result,
            Err(PipelineError::UnknownSocket { socket, .. }) if socket == "Colour"
        ));
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_node_ids_stay_unique() {
        let mut graph = NodeGraph::new("Material");
        let a = graph.add_node(NodeRole::ImageTexture);
        let b = graph.add_node(NodeRole::NormalMap);

        assert_ne!(a, b);
        assert_eq!(graph.node_role(b), Some(NodeRole::NormalMap));
        assert_eq!(graph.node_role(NodeId(99)), None);
    }

    #[test]
    fn test_add_material_reuses_existing_definition() {
        let mut scene = SceneDocument::default();
        scene.add_object("Cube", ObjectKind::Mesh);
        scene.add_object("Plane", ObjectKind::Mesh);

        scene.add_material("Cube", "Shared").unwrap();
        scene.add_material("Plane", "Shared").unwrap();

        assert_eq!(scene.materials.len(), 1);
        assert!(matches!(
            scene.add_material("Sphere", "Shared"),
            Err(PipelineError::ObjectNotFound(_))
        ));
    }

    #[test]
    fn test_active_object_and_material() {
        let mut scene = SceneDocument::default();
        scene.add_object("Camera", ObjectKind::Camera);
        scene.add_object("Cube", ObjectKind::Mesh);
        scene.add_material("Cube", "Paint").unwrap();
        scene.active_object = Some("Cube".to_string());
        let host = MemoryHost::new(scene, no_bake);

        let active = host.active_object().unwrap();

        assert_eq!(active.kind, ObjectKind::Mesh);
        assert_eq!(host.active_material("Cube").as_deref(), Some("Paint"));
        assert_eq!(host.active_material("Camera"), None);
    }

    #[test]
    fn test_load_image_requires_file_and_replaces_entry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("final_42.png");
        let mut host = MemoryHost::new(SceneDocument::default(), no_bake);

        assert!(matches!(
            host.load_image(&path),
            Err(PipelineError::ArtifactMissing(_))
        ));

        std::fs::write(&path, b"png").unwrap();
        let handle = host.load_image(&path).unwrap();
        host.load_image(&path).unwrap();

        assert_eq!(handle.name, "final_42.png");
        assert_eq!(host.scene().images.len(), 1);
    }

    #[test]
    fn test_yaml_round_trip_sets_scene_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scene.yml");
        std::fs::write(
            &path,
            "active_object: Cube\n\
             objects:\n\
             \x20 - name: Cube\n\
             \x20   kind: mesh\n\
             \x20   materials: [Paint]\n\
             materials:\n\
             \x20 - name: Paint\n\
             \x20   use_nodes: true\n\
             \x20   nodes:\n\
             \x20     - id: 0\n\
             \x20       role: principled_shader\n",
        )
        .unwrap();

        let document = SceneDocument::load(&path).unwrap();
        let host = MemoryHost::new(document.clone(), no_bake);

        assert_eq!(host.scene_dir(), Some(dir.path().to_path_buf()));
        assert_eq!(
            document.material("Paint").unwrap().find_node(NodeRole::PrincipledShader),
            Some(NodeId(0))
        );

        document.save().unwrap();
        let reloaded = SceneDocument::load(&path).unwrap();
        assert_eq!(reloaded, document);
    }

    #[test]
    fn test_unsaved_scene_has_no_dir() {
        let host = MemoryHost::new(SceneDocument::default(), no_bake);

        assert_eq!(host.scene_dir(), None);
    }
}
