//! Material rewriter
//!
//! Wires a corrected image into a material's shading graph, either as the
//! shader's base color or through a normal-map decoder into its normal
//! input. Existing nodes are reused where they already do the job; nothing
//! is ever removed.

use crate::error::PipelineError;
use crate::host::{ColorData, ImageHandle, NodeId, NodeRole, NormalSpace, ShadingGraph};
use crate::models::MaterialChannel;

const SHADER_BASE_COLOR: &str = "Base Color";
const SHADER_NORMAL: &str = "Normal";
const TEXTURE_COLOR: &str = "Color";
const NORMAL_MAP_COLOR: &str = "Color";
const NORMAL_MAP_NORMAL: &str = "Normal";

/// Nodes involved in one attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub channel: MaterialChannel,
    pub shader: NodeId,
    pub texture: NodeId,
    pub normal_map: Option<NodeId>,
    /// Number of nodes created for this attachment
    pub created: usize,
}

/// Source of `input` on `node`, if it has the expected role
fn linked_with_role(
    graph: &dyn ShadingGraph,
    node: NodeId,
    input: &str,
    role: NodeRole,
) -> Option<NodeId> {
    graph
        .linked_source(node, input)
        .filter(|source| graph.node_role(*source) == Some(role))
}

fn reuse_or_add(graph: &mut dyn ShadingGraph, existing: Option<NodeId>, role: NodeRole) -> (NodeId, bool) {
    match existing {
        Some(id) => (id, false),
        None => (graph.add_node(role), true),
    }
}

/// Attach `image` to `channel` of the material owning `graph`.
pub fn attach(
    graph: &mut dyn ShadingGraph,
    image: &ImageHandle,
    channel: MaterialChannel,
) -> Result<Attachment, PipelineError> {
    if !graph.uses_nodes() {
        log::debug!("Enabling nodes on material {}", graph.material_name());
        graph.enable_nodes();
    }

    let shader = graph
        .find_node(NodeRole::PrincipledShader)
        .ok_or_else(|| PipelineError::NoPrincipledShader(graph.material_name().to_string()))?;

    let attachment = match channel {
        MaterialChannel::Normal => attach_normal(graph, image, shader)?,
        MaterialChannel::BaseColor => attach_base_color(graph, image, shader)?,
    };

    log::info!(
        "Attached {} to {:?} of material {} ({} new nodes)",
        image.name,
        channel,
        graph.material_name(),
        attachment.created
    );
    Ok(attachment)
}

fn attach_normal(
    graph: &mut dyn ShadingGraph,
    image: &ImageHandle,
    shader: NodeId,
) -> Result<Attachment, PipelineError> {
    // Prefer the decoder already driving the shader, then any decoder
    let existing_decoder = linked_with_role(graph, shader, SHADER_NORMAL, NodeRole::NormalMap)
        .or_else(|| graph.find_node(NodeRole::NormalMap));
    let (normal_map, new_decoder) = reuse_or_add(graph, existing_decoder, NodeRole::NormalMap);

    let existing_texture =
        linked_with_role(graph, normal_map, NORMAL_MAP_COLOR, NodeRole::ImageTexture);
    let (texture, new_texture) = reuse_or_add(graph, existing_texture, NodeRole::ImageTexture);

    graph.set_image(texture, image, ColorData::NonColor)?;
    graph.set_normal_space(normal_map, NormalSpace::Object)?;
    graph.connect(texture, TEXTURE_COLOR, normal_map, NORMAL_MAP_COLOR)?;
    graph.connect(normal_map, NORMAL_MAP_NORMAL, shader, SHADER_NORMAL)?;

    Ok(Attachment {
        channel: MaterialChannel::Normal,
        shader,
        texture,
        normal_map: Some(normal_map),
        created: usize::from(new_decoder) + usize::from(new_texture),
    })
}

fn attach_base_color(
    graph: &mut dyn ShadingGraph,
    image: &ImageHandle,
    shader: NodeId,
) -> Result<Attachment, PipelineError> {
    let existing = linked_with_role(graph, shader, SHADER_BASE_COLOR, NodeRole::ImageTexture);
    let (texture, created) = reuse_or_add(graph, existing, NodeRole::ImageTexture);

    graph.set_image(texture, image, ColorData::Color)?;
    graph.connect(texture, TEXTURE_COLOR, shader, SHADER_BASE_COLOR)?;

    Ok(Attachment {
        channel: MaterialChannel::BaseColor,
        shader,
        texture,
        normal_map: None,
        created: usize::from(created),
    })
}
