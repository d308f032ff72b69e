//! seqlayout - Sequence diagram layout inside a generic diagram graph
//!
//! This library lays out sequence diagram containers (actors, activation
//! spans, messages and lifelines) embedded in an arbitrary diagram graph,
//! delegating everything outside those containers to a caller-supplied
//! generic layout engine.
//!
//! # Example
//!
//! ```rust
//! use seqlayout::layout::{row_layout, RowConfig};
//! use seqlayout::{layout, EdgeKind, Graph, Shape};
//!
//! let mut graph = Graph::new();
//! graph.root_mut().set_shape(Shape::SequenceDiagram);
//! let alice = graph.ensure_path(["alice"]);
//! let bob = graph.ensure_path(["bob"]);
//! graph[alice].set_size(100.0, 60.0);
//! graph[bob].set_size(100.0, 60.0);
//! graph.connect_labeled(alice, bob, "hello");
//!
//! layout(&mut graph, &mut |g: &mut Graph| row_layout(g, &RowConfig::default())).unwrap();
//!
//! let lifelines = graph.edges().filter(|e| e.kind == EdgeKind::Lifeline).count();
//! assert_eq!(lifelines, 2);
//! ```

pub mod document;
pub mod graph;
pub mod layout;

pub use document::{DocumentError, GraphDocument, LaidOutDocument};
pub use graph::{Edge, EdgeId, EdgeKind, Graph, LabelPosition, Object, ObjectId, Role, Shape};
pub use layout::{BoxError, GenericLayoutFn, LayoutError, SequenceConfig, StructureError};

/// Lay out every sequence diagram in `graph` with default spacing
///
/// `generic` is called once with a reduced copy of the graph in which each
/// sequence diagram is an empty box of its final size, plus once per nested
/// diagram. It must position every object and route every edge it sees.
///
/// On error the graph may be partially updated and must be discarded.
pub fn layout(graph: &mut Graph, generic: &mut GenericLayoutFn<'_>) -> Result<(), LayoutError> {
    layout_with_config(graph, &SequenceConfig::default(), generic)
}

/// Lay out every sequence diagram in `graph` with custom spacing
///
/// `config` is validated first; an invalid value fails with
/// [`LayoutError::Config`] before the graph is touched.
///
/// # Example
///
/// ```rust
/// use seqlayout::layout::{row_layout, RowConfig};
/// use seqlayout::{layout_with_config, Graph, SequenceConfig, Shape};
///
/// let mut graph = Graph::new();
/// graph.root_mut().set_shape(Shape::SequenceDiagram);
/// let a = graph.ensure_path(["a"]);
/// let b = graph.ensure_path(["b"]);
/// graph.connect(a, b);
///
/// let config = SequenceConfig::default().with_actor_spacing(40.0);
/// layout_with_config(&mut graph, &config, &mut |g: &mut Graph| {
///     row_layout(g, &RowConfig::default())
/// })
/// .unwrap();
/// assert!(graph[b].top_left.unwrap().x > graph[a].top_left.unwrap().x);
/// ```
pub fn layout_with_config(
    graph: &mut Graph,
    config: &SequenceConfig,
    generic: &mut GenericLayoutFn<'_>,
) -> Result<(), LayoutError> {
    layout::run(graph, config, generic).map(|_| ())
}
