//! Sequence diagrams nested inside an actor or span subtree
//!
//! A nested diagram is laid out on its own: its subtree is cut out as a
//! standalone graph (ids preserved) and put through the whole pipeline,
//! generic pass included. The parent then hosts the result in the owning
//! actor's box.

use tracing::debug;

use crate::graph::{Graph, ObjectId};

use super::config::SequenceConfig;
use super::error::{LayoutError, StructureError};
use super::extract::ContainerState;
use super::types::LocalLayout;
use super::{run, GenericLayoutFn};

/// Local geometry of the nested diagram `container`, relative to its own
/// top-left
pub(crate) fn layout_nested(
    graph: &Graph,
    container: ObjectId,
    config: &SequenceConfig,
    generic: &mut GenericLayoutFn<'_>,
) -> Result<LocalLayout, LayoutError> {
    let mut standalone = graph.subgraph(container);
    debug!(
        container = %graph.path(container),
        objects = standalone.object_count(),
        edges = standalone.edge_count(),
        "laying out nested sequence diagram"
    );
    let mut locals = run(&mut standalone, config, generic)?;
    locals.shift_remove(&container).ok_or_else(|| {
        StructureError::unresolved(graph.path(container), ContainerState::Detected).into()
    })
}

#[cfg(test)]
mod tests {
    use crate::graph::Shape;
    use crate::layout::error::BoxError;

    use super::*;

    #[test]
    fn test_nested_layout_is_local_and_calls_generic_once() {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        let inner = g.ensure_path(["a", "inner"]);
        g[inner].set_shape(Shape::SequenceDiagram);
        let x = g.ensure_path(["a", "inner", "x"]);
        let y = g.ensure_path(["a", "inner", "y"]);
        g[x].set_size(40.0, 20.0);
        g[y].set_size(40.0, 20.0);
        let message = g.connect(x, y);

        let mut calls = 0;
        let mut generic = |view: &mut Graph| -> Result<(), BoxError> {
            calls += 1;
            // only the container itself, which is the root here
            assert_eq!(view.object_count(), 0);
            Ok(())
        };
        let local = layout_nested(&g, inner, &SequenceConfig::default(), &mut generic).unwrap();
        assert_eq!(calls, 1);

        assert_eq!(local.objects[&x].bounds.top_left().x, 25.0);
        assert_eq!(local.objects[&y].bounds.top_left().x, 165.0);
        assert_eq!(local.messages[&message].route[0].y, 125.0);
        assert_eq!(local.lifelines.len(), 2);
        assert_eq!(local.width, 25.0 + 180.0 + 25.0);
        // the source graph is untouched
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g[x].top_left, None);
    }
}
