//! TOML graph documents
//!
//! A [`GraphDocument`] describes a graph to lay out: objects by dotted path
//! (parents are created implicitly) and edges between paths. A
//! [`LaidOutDocument`] is the flattened result written back out.
//!
//! ```toml
//! shape = "sequence_diagram"
//!
//! [[objects]]
//! path = "alice"
//! width = 100
//! height = 60
//!
//! [[objects]]
//! path = "bob"
//! width = 100
//! height = 60
//!
//! [[edges]]
//! from = "alice"
//! to = "bob"
//! label = "hello"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::graph::{Graph, LabelPosition, ObjectId, Shape};
use crate::layout::Point;

/// Errors that can occur when reading or writing graph documents
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Failed to read graph document: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse graph document TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write graph document TOML: {0}")]
    SerializeError(#[from] toml::ser::Error),
    #[error("edge {index} refers to unknown object '{path}'")]
    UnknownObject { index: usize, path: String },
    #[error("object path '{0}' is empty")]
    EmptyPath(String),
}

/// One object of a [`GraphDocument`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    /// Dotted path from the root, e.g. `sd.alice.t1`
    pub path: String,
    #[serde(default)]
    pub shape: Shape,
    pub label: Option<String>,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// One edge of a [`GraphDocument`]
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
    pub label: Option<String>,
}

/// Graph input as read from TOML
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphDocument {
    /// Shape of the root object
    pub shape: Shape,
    pub objects: Vec<ObjectSpec>,
    pub edges: Vec<EdgeSpec>,
}

impl GraphDocument {
    /// Load a document from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse a document from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, DocumentError> {
        Ok(toml::from_str(content)?)
    }

    /// Build the graph; objects and edges keep document order
    pub fn to_graph(&self) -> Result<Graph, DocumentError> {
        let mut graph = Graph::new();
        graph.root_mut().set_shape(self.shape);
        for spec in &self.objects {
            let segments = split_path(&spec.path)?;
            let id = graph.ensure_path(segments);
            let object = &mut graph[id];
            object.set_shape(spec.shape).set_size(spec.width, spec.height);
            if let Some(label) = &spec.label {
                object.set_label(label.clone());
            }
        }
        for (index, spec) in self.edges.iter().enumerate() {
            let src = lookup(&graph, index, &spec.from)?;
            let dst = lookup(&graph, index, &spec.to)?;
            match &spec.label {
                Some(label) => graph.connect_labeled(src, dst, label.clone()),
                None => graph.connect(src, dst),
            };
        }
        Ok(graph)
    }
}

fn split_path(path: &str) -> Result<Vec<&str>, DocumentError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(DocumentError::EmptyPath(path.to_string()));
    }
    Ok(segments)
}

fn lookup(graph: &Graph, index: usize, path: &str) -> Result<ObjectId, DocumentError> {
    graph.find(path).ok_or_else(|| DocumentError::UnknownObject {
        index,
        path: path.to_string(),
    })
}

/// Position and role of one object after layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedObject {
    pub path: String,
    pub role: String,
    pub shape: Shape,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    pub label: Option<String>,
}

/// Route of one edge after layout
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedEdge {
    pub from: String,
    pub to: String,
    pub kind: String,
    pub label: Option<String>,
    pub label_position: Option<LabelPosition>,
    pub route: Vec<Point>,
}

/// Flattened layout output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaidOutDocument {
    pub width: f64,
    pub height: f64,
    pub objects: Vec<PlacedObject>,
    pub edges: Vec<PlacedEdge>,
}

impl LaidOutDocument {
    /// Snapshot every object but the root, and every edge
    pub fn from_graph(graph: &Graph) -> Self {
        let root = &graph[graph.root()];
        let objects = graph
            .objects()
            .map(|o| PlacedObject {
                path: graph.path(o.id),
                role: o.role.as_str().to_string(),
                shape: o.shape,
                x: o.top_left.map(|p| p.x),
                y: o.top_left.map(|p| p.y),
                width: o.width,
                height: o.height,
                z_index: o.z_index,
                label: o.label.clone(),
            })
            .collect();
        let edges = graph
            .edges()
            .map(|e| PlacedEdge {
                from: graph.path(e.src),
                to: graph.path(e.dst),
                kind: e.kind.as_str().to_string(),
                label: e.label.clone(),
                label_position: e.label_position,
                route: e.route.clone(),
            })
            .collect();
        Self {
            width: root.width,
            height: root.height,
            objects,
            edges,
        }
    }

    pub fn to_toml_string(&self) -> Result<String, DocumentError> {
        Ok(toml::to_string(self)?)
    }
}
