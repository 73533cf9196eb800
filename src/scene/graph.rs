//! Scene graph construction and read-only access.
//!
//! Built once per image from GQA-format scene JSON, then immutable: every
//! interpreter run only reads. The pseudo-node `"scene"` stands for the
//! whole image and carries location/weather; object nodes carry class name,
//! attributes, bounding box and the image third their midpoint falls in.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::fault::Fault;
use crate::core::types::Aux;

/// Identifier of the whole-image pseudo-object.
pub const SCENE_NODE: &str = "scene";

// ============================================================================
// Input schema (GQA scene JSON)
// ============================================================================

/// One scene as stored in a GQA scene-graph file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneFile {
    pub width: f64,
    pub height: f64,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub weather: Option<String>,

    /// Object id → object record (order-preserving).
    #[serde(default)]
    pub objects: IndexMap<String, SceneObject>,
}

/// One object record inside a scene file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,

    #[serde(default)]
    pub attributes: Vec<String>,

    #[serde(default)]
    pub relations: Vec<SceneRelation>,
}

/// A forward relation edge as stored in the dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneRelation {
    pub name: String,
    /// Target object id.
    pub object: String,
}

// ============================================================================
// Graph
// ============================================================================

/// A node of the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub attributes: Vec<String>,

    /// Image third of the bbox midpoint: left/middle/right. Absent on the
    /// scene node.
    pub hposition: Option<String>,
    /// top/middle/bottom. Absent on the scene node.
    pub vposition: Option<String>,

    /// Raw bounding box (x, y, w, h). Absent on the scene node.
    pub bbox: Option<(f64, f64, f64, f64)>,

    /// Scene-node only.
    pub location: Option<String>,
    /// Scene-node only.
    pub weather: Option<String>,
}

/// A directed, labeled relation edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub name: String,
}

/// One auxiliary field of a node: either a scalar (possibly absent) or the
/// attribute list.
#[derive(Debug, Clone, Copy)]
pub enum Field<'a> {
    Scalar(Option<&'a str>),
    Values(&'a [String]),
}

impl Field<'_> {
    /// Membership: equality for scalars, containment for lists.
    pub fn contains(&self, needle: &str) -> bool {
        match self {
            Field::Scalar(Some(v)) => *v == needle,
            Field::Scalar(None) => false,
            Field::Values(vs) => vs.iter().any(|v| v == needle),
        }
    }
}

/// The immutable per-image graph.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: IndexMap<String, Node>,
    edges: Vec<Edge>,
    outgoing: HashMap<String, Vec<usize>>,
    incoming: HashMap<String, Vec<usize>>,
    image_size: (f64, f64),
}

impl SceneGraph {
    /// Build the graph from a scene record. Edges are stored as given even
    /// when the target id never appears in `objects`; the dangling end
    /// surfaces as an `UnknownNode` fault if an operation touches it.
    pub fn from_scene(scene: &SceneFile) -> Self {
        let mut nodes = IndexMap::new();
        nodes.insert(
            SCENE_NODE.to_string(),
            Node {
                name: SCENE_NODE.to_string(),
                attributes: Vec::new(),
                hposition: None,
                vposition: None,
                bbox: None,
                location: scene.location.clone(),
                weather: scene.weather.clone(),
            },
        );

        let mut edges = Vec::new();
        for (id, obj) in &scene.objects {
            let midpoint = (obj.x + 0.5 * obj.w, obj.y + 0.5 * obj.h);
            let hposition = if midpoint.0 > 2.0 * scene.width / 3.0 {
                "right"
            } else if midpoint.0 > scene.width / 3.0 {
                "middle"
            } else {
                "left"
            };
            let vposition = if midpoint.1 > 2.0 * scene.height / 3.0 {
                "bottom"
            } else if midpoint.1 > scene.height / 3.0 {
                "middle"
            } else {
                "top"
            };

            nodes.insert(
                id.clone(),
                Node {
                    name: obj.name.clone(),
                    attributes: obj.attributes.clone(),
                    hposition: Some(hposition.to_string()),
                    vposition: Some(vposition.to_string()),
                    bbox: Some((obj.x, obj.y, obj.w, obj.h)),
                    location: None,
                    weather: None,
                },
            );

            for rel in &obj.relations {
                edges.push(Edge {
                    from: id.clone(),
                    to: rel.object.clone(),
                    name: rel.name.clone(),
                });
            }
        }

        let mut outgoing: HashMap<String, Vec<usize>> = HashMap::new();
        let mut incoming: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, edge) in edges.iter().enumerate() {
            outgoing.entry(edge.from.clone()).or_default().push(i);
            incoming.entry(edge.to.clone()).or_default().push(i);
        }

        Self {
            nodes,
            edges,
            outgoing,
            incoming,
            image_size: (scene.width, scene.height),
        }
    }

    /// Parse a scene JSON string and build the graph.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let scene: SceneFile =
            serde_json::from_str(json).map_err(|e| format!("scene parse error: {}", e))?;
        Ok(Self::from_scene(&scene))
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Every node id, the scene pseudo-node included, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn image_size(&self) -> (f64, f64) {
        self.image_size
    }

    pub fn out_edges(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
    }

    pub fn in_edges(&self, id: &str) -> impl Iterator<Item = &Edge> {
        self.incoming
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.edges[i])
    }

    /// Class name of a node.
    pub fn name(&self, id: &str) -> Result<&str, Fault> {
        self.nodes
            .get(id)
            .map(|n| n.name.as_str())
            .ok_or_else(|| Fault::UnknownNode(id.to_string()))
    }

    /// Attribute list of a node.
    pub fn attributes(&self, id: &str) -> Result<&[String], Fault> {
        self.nodes
            .get(id)
            .map(|n| n.attributes.as_slice())
            .ok_or_else(|| Fault::UnknownNode(id.to_string()))
    }

    /// Read an auxiliary field. Weather and location of a non-scene node
    /// fall back to its attribute list: the dataset asks sky's weather even
    /// though the scene holds that information.
    pub fn field(&self, id: &str, aux: Aux) -> Result<Field<'_>, Fault> {
        let node = self
            .nodes
            .get(id)
            .ok_or_else(|| Fault::UnknownNode(id.to_string()))?;
        if id != SCENE_NODE && matches!(aux, Aux::Weather | Aux::Location) {
            return Ok(Field::Values(&node.attributes));
        }
        Ok(match aux {
            Aux::Name => Field::Scalar(Some(&node.name)),
            Aux::Weather => Field::Scalar(node.weather.as_deref()),
            Aux::Location => Field::Scalar(node.location.as_deref()),
            Aux::HPosition => Field::Scalar(node.hposition.as_deref()),
            Aux::VPosition => Field::Scalar(node.vposition.as_deref()),
        })
    }
}
