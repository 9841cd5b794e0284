//! Capability interface to the 3D host.
//!
//! The pipeline never walks a host's object model directly. It asks for the
//! active object, a material, a bake, an image load, and a shading graph it
//! can query by node role and wire by socket name. Any host that can answer
//! these can drive the pipeline.

pub mod memory;

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::bake::BakeSettings;
use crate::error::PipelineError;
use crate::models::MapKind;

pub use memory::{MemoryHost, NodeGraph, SceneDocument};

/// Kind of a scene object; only meshes can be baked
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Mesh,
    Camera,
    Light,
    Empty,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneObject {
    pub name: String,
    pub kind: ObjectKind,
}

/// Host-side reference to a loaded image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageHandle {
    pub name: String,
    pub path: PathBuf,
}

/// Everything a bake backend needs to rasterize one map
#[derive(Debug, Clone, PartialEq)]
pub struct BakeRequest {
    pub kind: MapKind,
    pub object: String,
    pub material: String,
    pub settings: BakeSettings,
    pub resolution: u32,
    pub output: PathBuf,
}

/// Renders a bake to disk on behalf of a host
pub trait BakeBackend {
    /// Rasterize `request` into `request.output`; the error is the host's reason
    fn bake(&mut self, request: &BakeRequest) -> Result<(), String>;
}

impl<F> BakeBackend for F
where
    F: FnMut(&BakeRequest) -> Result<(), String>,
{
    fn bake(&mut self, request: &BakeRequest) -> Result<(), String> {
        self(request)
    }
}

/// Scene-level operations the pipeline consumes
pub trait SceneHost {
    /// Directory of the saved scene file, if the scene has been saved
    fn scene_dir(&self) -> Option<PathBuf>;

    fn active_object(&self) -> Option<SceneObject>;

    /// Names of the materials in the object's slots
    fn material_slots(&self, object: &str) -> Result<Vec<String>, PipelineError>;

    /// Create a material and append it to the object's slots
    fn add_material(&mut self, object: &str, name: &str) -> Result<(), PipelineError>;

    fn active_material(&self, object: &str) -> Option<String>;

    /// Replace the host's bake configuration
    fn apply_bake_settings(&mut self, settings: &BakeSettings);

    fn bake_to_file(&mut self, request: &BakeRequest) -> Result<(), String>;

    /// Load (or reload) an image file into host memory
    fn load_image(&mut self, path: &Path) -> Result<ImageHandle, PipelineError>;

    fn material_graph(&mut self, material: &str) -> Option<&mut dyn ShadingGraph>;
}

/// Opaque node identifier within one graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role a shading node plays, independent of host naming
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// Samples an image
    ImageTexture,
    /// Decodes a tangent/object-space normal map
    NormalMap,
    /// The principled surface shader
    PrincipledShader,
    MaterialOutput,
}

impl NodeRole {
    pub fn outputs(self) -> &'static [&'static str] {
        match self {
            NodeRole::ImageTexture => &["Color", "Alpha"],
            NodeRole::NormalMap => &["Normal"],
            NodeRole::PrincipledShader => &["BSDF"],
            NodeRole::MaterialOutput => &[],
        }
    }

    pub fn inputs(self) -> &'static [&'static str] {
        match self {
            NodeRole::ImageTexture => &["Vector"],
            NodeRole::NormalMap => &["Strength", "Color"],
            NodeRole::PrincipledShader => &[
                "Base Color",
                "Metallic",
                "Roughness",
                "Normal",
                "Emission Color",
                "Alpha",
            ],
            NodeRole::MaterialOutput => &["Surface", "Volume", "Displacement"],
        }
    }
}

/// How the host should interpret a texture's pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorData {
    /// Gamma-managed color (sRGB)
    Color,
    /// Raw data, no color management
    NonColor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalSpace {
    Tangent,
    Object,
    World,
}

/// Node-graph operations the material rewriter consumes
pub trait ShadingGraph {
    /// Name of the material owning the graph
    fn material_name(&self) -> &str;

    fn uses_nodes(&self) -> bool;

    fn enable_nodes(&mut self);

    /// First node with this role, if any
    fn find_node(&self, role: NodeRole) -> Option<NodeId>;

    fn add_node(&mut self, role: NodeRole) -> NodeId;

    fn node_role(&self, node: NodeId) -> Option<NodeRole>;

    fn set_image(&mut self, node: NodeId, image: &ImageHandle, data: ColorData)
        -> Result<(), PipelineError>;

    fn set_normal_space(&mut self, node: NodeId, space: NormalSpace) -> Result<(), PipelineError>;

    /// Node feeding `input` of `node`, if linked
    fn linked_source(&self, node: NodeId, input: &str) -> Option<NodeId>;

    /// Link `from.output` to `to.input`, replacing any link already on that input
    fn connect(
        &mut self,
        from: NodeId,
        output: &str,
        to: NodeId,
        input: &str,
    ) -> Result<(), PipelineError>;
}
