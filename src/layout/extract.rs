//! Sequence diagram extraction and restoration
//!
//! Extraction classifies the contents of every outermost sequence diagram
//! container and hands the generic engine a reduced copy of the graph in
//! which each container is an empty sized box. Restoration merges the
//! generic engine's positions back by id and then places each container's
//! local geometry at the container's resolved top-left.

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::graph::{EdgeId, EdgeKind, Graph, ObjectId, Role, Shape};

use super::error::StructureError;
use super::types::{LocalLayout, Point};

/// Progress of one container through the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContainerState {
    Detected,
    Extracted,
    SizedPlaceholder,
    GenericallyPositioned,
    InternallyLaidOut,
    Restored,
}

impl fmt::Display for ContainerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A span and the chain it hangs from
#[derive(Debug, Clone, PartialEq)]
pub struct SpanInfo {
    pub id: ObjectId,
    /// Actor or enclosing span
    pub parent: ObjectId,
    pub actor: ObjectId,
    pub depth: usize,
}

/// A sequence diagram found inside an actor's subtree
#[derive(Debug, Clone, PartialEq)]
pub struct NestedInfo {
    pub container: ObjectId,
    /// Actor whose box hosts the nested diagram
    pub host: ObjectId,
}

/// Classified contents of one sequence diagram container
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceModel {
    pub container: ObjectId,
    /// Direct children, in declaration order
    pub actors: Vec<ObjectId>,
    /// Parents before children
    pub spans: Vec<SpanInfo>,
    /// Message edges in declaration order
    pub messages: Vec<EdgeId>,
    pub nested: Vec<NestedInfo>,
    /// Every strict descendant, nested interiors included
    pub withheld_objects: Vec<ObjectId>,
    /// Every edge with both endpoints inside the container
    pub withheld_edges: Vec<EdgeId>,
}

impl SequenceModel {
    /// Classify the contents of `container`
    pub fn build(graph: &Graph, container: ObjectId) -> Result<Self, StructureError> {
        let name = graph.path(container);
        let actors = graph[container].children().to_vec();
        if actors.is_empty() {
            return Err(StructureError::no_actors(name));
        }

        let mut spans = Vec::new();
        let mut nested = Vec::new();
        for &actor in &actors {
            if graph[actor].shape.is_sequence_diagram() {
                return Err(StructureError::container_as_actor(name, graph.path(actor)));
            }
            collect_spans(graph, actor, actor, 1, &mut spans, &mut nested);
        }

        // Owning nested container of every object inside one
        let mut nested_owner: HashMap<ObjectId, ObjectId> = HashMap::new();
        for n in &nested {
            nested_owner.insert(n.container, n.container);
            for d in graph.descendants(n.container) {
                nested_owner.insert(d, n.container);
            }
        }

        let withheld_objects = graph.descendants(container);
        let inside: HashSet<ObjectId> = withheld_objects.iter().copied().collect();
        let own: HashSet<ObjectId> = actors
            .iter()
            .copied()
            .chain(spans.iter().map(|s| s.id))
            .collect();

        let mut messages = Vec::new();
        let mut withheld_edges = Vec::new();
        for edge in graph.edges() {
            if edge.kind == EdgeKind::Lifeline {
                continue;
            }
            match (inside.contains(&edge.src), inside.contains(&edge.dst)) {
                (true, true) => {}
                (false, false) => continue,
                _ => {
                    return Err(StructureError::ambiguous(name, graph.describe_edge(edge.id)));
                }
            }
            withheld_edges.push(edge.id);
            if own.contains(&edge.src) && own.contains(&edge.dst) {
                messages.push(edge.id);
                continue;
            }
            let same_nested = match (nested_owner.get(&edge.src), nested_owner.get(&edge.dst)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            };
            if !same_nested {
                return Err(StructureError::invalid_endpoint(
                    name,
                    graph.describe_edge(edge.id),
                ));
            }
        }
        messages.sort();

        Ok(Self {
            container,
            actors,
            spans,
            messages,
            nested,
            withheld_objects,
            withheld_edges,
        })
    }

    /// Actor a span or actor belongs to
    pub fn actor_of(&self, id: ObjectId) -> Option<ObjectId> {
        if self.actors.contains(&id) {
            return Some(id);
        }
        self.spans.iter().find(|s| s.id == id).map(|s| s.actor)
    }
}

fn collect_spans(
    graph: &Graph,
    parent: ObjectId,
    actor: ObjectId,
    depth: usize,
    spans: &mut Vec<SpanInfo>,
    nested: &mut Vec<NestedInfo>,
) {
    for &child in graph[parent].children() {
        if graph[child].shape.is_sequence_diagram() {
            nested.push(NestedInfo {
                container: child,
                host: actor,
            });
            continue;
        }
        spans.push(SpanInfo {
            id: child,
            parent,
            actor,
            depth,
        });
        collect_spans(graph, child, actor, depth + 1, spans, nested);
    }
}

/// Find every sequence diagram container without a sequence diagram
/// ancestor and classify its contents
pub fn extract(graph: &Graph) -> Result<Vec<SequenceModel>, StructureError> {
    let mut models = Vec::new();
    let mut stack = vec![graph.root()];
    while let Some(id) = stack.pop() {
        let object = &graph[id];
        if object.shape.is_sequence_diagram() {
            let model = SequenceModel::build(graph, id)?;
            debug!(
                container = %graph.path(id),
                actors = model.actors.len(),
                spans = model.spans.len(),
                messages = model.messages.len(),
                nested = model.nested.len(),
                "extracted sequence diagram"
            );
            models.push(model);
            continue;
        }
        stack.extend(object.children().iter().rev().copied());
    }
    Ok(models)
}

/// Copy of `graph` with each container emptied and sized to its local layout
pub fn reduce(graph: &Graph, models: &[SequenceModel], locals: &IndexMap<ObjectId, LocalLayout>) -> Graph {
    let objects: HashSet<ObjectId> = models
        .iter()
        .flat_map(|m| m.withheld_objects.iter().copied())
        .collect();
    let edges: HashSet<EdgeId> = models
        .iter()
        .flat_map(|m| m.withheld_edges.iter().copied())
        .collect();

    let mut view = graph.clone();
    view.remove(&objects, &edges);
    for model in models {
        if let Some(local) = locals.get(&model.container) {
            let container = &mut view[model.container];
            container.width = local.width;
            container.height = local.height;
            container.role = Role::SequenceContainer;
        }
    }
    view
}

/// Fold the generic engine's output back into the original graph by id
///
/// Containers keep their pre-computed size; only their position is taken.
pub fn merge(graph: &mut Graph, view: &Graph) {
    for placed in view.objects() {
        let Some(object) = graph.object_mut(placed.id) else {
            continue;
        };
        object.top_left = placed.top_left;
        object.z_index = placed.z_index;
        if !object.shape.is_sequence_diagram() {
            object.width = placed.width;
            object.height = placed.height;
        }
    }
    for routed in view.edges() {
        if let Some(edge) = graph.edge_mut(routed.id) {
            edge.route = routed.route.clone();
            if routed.label_position.is_some() {
                edge.label_position = routed.label_position;
            }
        }
    }
}

/// Resolved top-left of a container after the generic pass
///
/// The graph root is the canvas and always sits at the origin.
pub fn container_origin(graph: &mut Graph, container: ObjectId) -> Option<Point> {
    if container == graph.root() {
        let origin = Point::new(0.0, 0.0);
        graph.root_mut().top_left = Some(origin);
        return Some(origin);
    }
    graph.object(container).and_then(|o| o.top_left)
}

/// Write a container's translated local layout into the graph
///
/// Lifelines are appended after every existing edge, in actor order.
pub fn restore(graph: &mut Graph, container: ObjectId, local: &LocalLayout) {
    {
        let object = &mut graph[container];
        object.resize(local.width, local.height);
        object.role = Role::SequenceContainer;
    }
    for (&id, placement) in &local.objects {
        let Some(object) = graph.object_mut(id) else {
            continue;
        };
        object.top_left = Some(placement.bounds.top_left());
        object.resize(placement.bounds.width, placement.bounds.height);
        object.role = placement.role;
        if let Some(z) = placement.z_index {
            object.z_index = z;
        }
        if let Role::Span { .. } = placement.role {
            object.label = None;
            object.shape = Shape::Rectangle;
        }
        trace!(object = %id, x = placement.bounds.x, y = placement.bounds.y, "restored");
    }
    for (&id, message) in &local.messages {
        if let Some(edge) = graph.edge_mut(id) {
            edge.route = message.route.clone();
            edge.label_position = Some(message.label_position);
            edge.kind = EdgeKind::Message;
        }
    }
    for lifeline in &local.lifelines {
        graph.push_lifeline(lifeline.actor, lifeline.route.clone());
    }
}
