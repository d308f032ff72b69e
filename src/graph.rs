//! Diagram graph arena
//!
//! Objects and edges live in insertion-ordered maps keyed by stable ids.
//! Containment (parent/children) and connections (src/dst) are id lookups,
//! so the tree and the edge set never hold references into each other.
//! Insertion order doubles as declaration order.

use std::collections::HashSet;
use std::fmt;
use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::layout::types::{BoundingBox, Point};

/// Stable identifier of an object in a [`Graph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

/// Stable identifier of an edge in a [`Graph`]
///
/// Ids are allocated in declaration order, so comparing two ids compares
/// when the edges were declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u32);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Shape kind of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    #[default]
    Rectangle,
    Square,
    Person,
    Diamond,
    Oval,
    Circle,
    Cylinder,
    Text,
    /// Marks the object as a sequence diagram container
    SequenceDiagram,
}

impl Shape {
    pub fn is_sequence_diagram(self) -> bool {
        self == Shape::SequenceDiagram
    }
}

/// Role an object plays in layout, decided during extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Role {
    /// Ordinary node positioned by the generic engine
    #[default]
    Plain,
    /// A sequence diagram container
    SequenceContainer,
    /// Top-level participant of a sequence diagram
    Actor,
    /// Activation box; `depth` is 1 for a direct child of an actor
    Span { depth: usize },
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Plain => "plain",
            Role::SequenceContainer => "sequence_diagram",
            Role::Actor => "actor",
            Role::Span { .. } => "span",
        }
    }
}

/// Where an edge label sits relative to its route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LabelPosition {
    OutsideTopLeft,
    OutsideTopCenter,
    OutsideTopRight,
    OutsideBottomLeft,
    OutsideBottomCenter,
    OutsideBottomRight,
    InsideMiddleCenter,
}

impl LabelPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelPosition::OutsideTopLeft => "outside-top-left",
            LabelPosition::OutsideTopCenter => "outside-top-center",
            LabelPosition::OutsideTopRight => "outside-top-right",
            LabelPosition::OutsideBottomLeft => "outside-bottom-left",
            LabelPosition::OutsideBottomCenter => "outside-bottom-center",
            LabelPosition::OutsideBottomRight => "outside-bottom-right",
            LabelPosition::InsideMiddleCenter => "inside-middle-center",
        }
    }
}

impl fmt::Display for LabelPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What an edge represents after layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EdgeKind {
    /// Ordinary connection routed by the generic engine
    #[default]
    Connection,
    /// Horizontal message inside a sequence diagram
    Message,
    /// Synthesized vertical lifeline below an actor (`src == dst`)
    Lifeline,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Connection => "connection",
            EdgeKind::Message => "message",
            EdgeKind::Lifeline => "lifeline",
        }
    }
}

/// A node of the diagram graph
#[derive(Debug, Clone, PartialEq)]
pub struct Object {
    pub id: ObjectId,
    pub name: String,
    pub label: Option<String>,
    pub shape: Shape,
    /// Top-left corner, `None` until placed
    pub top_left: Option<Point>,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    pub role: Role,
    parent: Option<ObjectId>,
    children: Vec<ObjectId>,
    /// Size before layout grew the object, if it did
    declared: Option<(f64, f64)>,
}

impl Object {
    fn new(id: ObjectId, name: impl Into<String>, parent: Option<ObjectId>) -> Self {
        Self {
            id,
            name: name.into(),
            label: None,
            shape: Shape::default(),
            top_left: None,
            width: 0.0,
            height: 0.0,
            z_index: 0,
            role: Role::default(),
            parent,
            children: vec![],
            declared: None,
        }
    }

    pub fn parent(&self) -> Option<ObjectId> {
        self.parent
    }

    /// Children in declaration order
    pub fn children(&self) -> &[ObjectId] {
        &self.children
    }

    pub fn set_size(&mut self, width: f64, height: f64) -> &mut Self {
        self.width = width;
        self.height = height;
        self.declared = None;
        self
    }

    /// Size as given, ignoring growth from an earlier layout
    pub fn declared_size(&self) -> (f64, f64) {
        self.declared.unwrap_or((self.width, self.height))
    }

    /// Take a computed size, remembering the declared one
    pub(crate) fn resize(&mut self, width: f64, height: f64) {
        if self.declared.is_none() && (width, height) != (self.width, self.height) {
            self.declared = Some((self.width, self.height));
        }
        self.width = width;
        self.height = height;
    }

    pub fn set_shape(&mut self, shape: Shape) -> &mut Self {
        self.shape = shape;
        self
    }

    pub fn set_label(&mut self, label: impl Into<String>) -> &mut Self {
        self.label = Some(label.into());
        self
    }

    /// Bounding box, if the object has been placed
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.top_left
            .map(|p| BoundingBox::new(p.x, p.y, self.width, self.height))
    }

    /// Center point, if the object has been placed
    pub fn center(&self) -> Option<Point> {
        self.bounds().map(|b| b.center())
    }
}

/// A directed relationship between two objects
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub src: ObjectId,
    pub dst: ObjectId,
    /// Position among edges sharing the same unordered src/dst pair
    pub index: usize,
    pub label: Option<String>,
    pub route: Vec<Point>,
    pub label_position: Option<LabelPosition>,
    pub kind: EdgeKind,
}

impl Edge {
    /// Unordered endpoint pair, smaller id first
    pub fn pair(&self) -> (ObjectId, ObjectId) {
        if self.src <= self.dst {
            (self.src, self.dst)
        } else {
            (self.dst, self.src)
        }
    }
}

/// Diagram graph: a containment tree under a root object plus a flat edge list
#[derive(Debug, Clone)]
pub struct Graph {
    root: ObjectId,
    objects: IndexMap<ObjectId, Object>,
    edges: IndexMap<EdgeId, Edge>,
    next_object: u32,
    next_edge: u32,
}

impl Graph {
    /// Create a graph holding only an unnamed root object
    pub fn new() -> Self {
        let root = ObjectId(0);
        let mut objects = IndexMap::new();
        objects.insert(root, Object::new(root, "", None));
        Self {
            root,
            objects,
            edges: IndexMap::new(),
            next_object: 1,
            next_edge: 0,
        }
    }

    pub fn root(&self) -> ObjectId {
        self.root
    }

    pub fn root_mut(&mut self) -> &mut Object {
        let root = self.root;
        &mut self[root]
    }

    pub fn object(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut Object> {
        self.objects.get_mut(&id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    pub fn edge_mut(&mut self, id: EdgeId) -> Option<&mut Edge> {
        self.edges.get_mut(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    /// All objects except the root, in declaration order
    pub fn objects(&self) -> impl Iterator<Item = &Object> {
        let root = self.root;
        self.objects.values().filter(move |o| o.id != root)
    }

    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut Object> {
        let root = self.root;
        self.objects.values_mut().filter(move |o| o.id != root)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len() - 1
    }

    /// All edges in order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn edges_mut(&mut self) -> impl Iterator<Item = &mut Edge> {
        self.edges.values_mut()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Return the child of `parent` called `name`, creating it if missing
    ///
    /// # Panics
    ///
    /// Panics if `parent` is not in this graph.
    pub fn ensure_child(&mut self, parent: ObjectId, name: &str) -> ObjectId {
        if let Some(existing) = self[parent]
            .children
            .iter()
            .copied()
            .find(|c| self.objects[c].name == name)
        {
            return existing;
        }
        let id = ObjectId(self.next_object);
        self.next_object += 1;
        self.objects.insert(id, Object::new(id, name, Some(parent)));
        self[parent].children.push(id);
        id
    }

    /// Ensure every segment of `path` exists below the root
    pub fn ensure_path<'a>(&mut self, path: impl IntoIterator<Item = &'a str>) -> ObjectId {
        path.into_iter()
            .fold(self.root, |parent, name| self.ensure_child(parent, name))
    }

    /// Look up an object by its dotted path from the root (`"container.a.t1"`)
    pub fn find(&self, path: &str) -> Option<ObjectId> {
        path.split('.').try_fold(self.root, |parent, name| {
            self.objects[&parent]
                .children
                .iter()
                .copied()
                .find(|c| self.objects[c].name == name)
        })
    }

    /// Dotted path of an object, `<root>` for an unnamed root
    pub fn path(&self, id: ObjectId) -> String {
        let mut names: Vec<&str> = self
            .ancestors_inclusive(id)
            .filter_map(|a| self.objects.get(&a).map(|o| o.name.as_str()))
            .filter(|name| !name.is_empty())
            .collect();
        if names.is_empty() {
            return "<root>".to_string();
        }
        names.reverse();
        names.join(".")
    }

    /// `src -> dst` using object paths, for diagnostics
    pub fn describe_edge(&self, id: EdgeId) -> String {
        match self.edges.get(&id) {
            Some(edge) => format!("{} -> {}", self.path(edge.src), self.path(edge.dst)),
            None => id.to_string(),
        }
    }

    /// Connect two objects; `index` counts earlier edges between the same pair
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is not in this graph.
    pub fn connect(&mut self, src: ObjectId, dst: ObjectId) -> EdgeId {
        assert!(
            self.contains(src) && self.contains(dst),
            "edge endpoints must belong to the graph"
        );
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        let mut edge = Edge {
            id,
            src,
            dst,
            index: 0,
            label: None,
            route: vec![],
            label_position: None,
            kind: EdgeKind::Connection,
        };
        let pair = edge.pair();
        edge.index = self.edges.values().filter(|e| e.pair() == pair).count();
        self.edges.insert(id, edge);
        id
    }

    /// Connect two objects with a label
    pub fn connect_labeled(
        &mut self,
        src: ObjectId,
        dst: ObjectId,
        label: impl Into<String>,
    ) -> EdgeId {
        let id = self.connect(src, dst);
        self[id].label = Some(label.into());
        id
    }

    /// Append a synthesized lifeline edge below `actor`
    pub(crate) fn push_lifeline(&mut self, actor: ObjectId, route: Vec<Point>) -> EdgeId {
        let id = self.connect(actor, actor);
        let edge = &mut self[id];
        edge.route = route;
        edge.kind = EdgeKind::Lifeline;
        id
    }

    /// Drop lifelines synthesized by an earlier layout so it can run again
    pub(crate) fn clear_lifelines(&mut self) {
        self.edges.retain(|_, e| e.kind != EdgeKind::Lifeline);
    }

    /// Iterate from `id` up to the root, `id` included
    pub fn ancestors_inclusive(&self, id: ObjectId) -> impl Iterator<Item = ObjectId> + '_ {
        std::iter::successors(Some(id), move |cur| {
            self.objects.get(cur).and_then(|o| o.parent)
        })
    }

    /// Whether `ancestor` strictly contains `id`
    pub fn is_ancestor(&self, ancestor: ObjectId, id: ObjectId) -> bool {
        self.ancestors_inclusive(id).skip(1).any(|a| a == ancestor)
    }

    /// Strict descendants of `id`, pre-order
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack: Vec<ObjectId> = match self.objects.get(&id) {
            Some(o) => o.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(cur) = stack.pop() {
            out.push(cur);
            if let Some(o) = self.objects.get(&cur) {
                stack.extend(o.children.iter().rev().copied());
            }
        }
        out
    }

    /// Copy of the subtree rooted at `root` as a standalone graph
    ///
    /// Ids are preserved; only edges with both endpoints in the subtree are
    /// kept.
    pub fn subgraph(&self, root: ObjectId) -> Graph {
        let mut members: HashSet<ObjectId> = self.descendants(root).into_iter().collect();
        members.insert(root);
        let objects = self
            .objects
            .iter()
            .filter(|(id, _)| members.contains(id))
            .map(|(id, o)| {
                let mut o = o.clone();
                if *id == root {
                    o.parent = None;
                }
                (*id, o)
            })
            .collect();
        let edges = self
            .edges
            .iter()
            .filter(|(_, e)| members.contains(&e.src) && members.contains(&e.dst))
            .map(|(id, e)| (*id, e.clone()))
            .collect();
        Graph {
            root,
            objects,
            edges,
            next_object: self.next_object,
            next_edge: self.next_edge,
        }
    }

    /// Remove objects and edges in place, detaching removed objects from
    /// their parents' children lists
    pub(crate) fn remove(&mut self, objects: &HashSet<ObjectId>, edges: &HashSet<EdgeId>) {
        self.objects.retain(|id, _| !objects.contains(id));
        for o in self.objects.values_mut() {
            o.children.retain(|c| !objects.contains(c));
        }
        self.edges.retain(|id, _| !edges.contains(id));
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<ObjectId> for Graph {
    type Output = Object;

    fn index(&self, id: ObjectId) -> &Object {
        &self.objects[&id]
    }
}

impl IndexMut<ObjectId> for Graph {
    fn index_mut(&mut self, id: ObjectId) -> &mut Object {
        &mut self.objects[&id]
    }
}

impl Index<EdgeId> for Graph {
    type Output = Edge;

    fn index(&self, id: EdgeId) -> &Edge {
        &self.edges[&id]
    }
}

impl IndexMut<EdgeId> for Graph {
    fn index_mut(&mut self, id: EdgeId) -> &mut Edge {
        &mut self.edges[&id]
    }
}
