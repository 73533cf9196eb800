//! Scene graphs — the object/attribute/relation view of one image.

pub mod graph;

pub use graph::{Edge, Field, Node, SceneFile, SceneGraph, SceneObject, SceneRelation, SCENE_NODE};
