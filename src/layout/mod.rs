//! Layout engine for sequence diagrams embedded in a diagram graph
//!
//! This module finds every sequence diagram container in a [`Graph`],
//! computes the internal geometry of each one, lets an injected generic
//! engine place everything else (with each container as a sized box), and
//! writes the combined result back into the graph.

pub mod actors;
pub mod config;
pub mod error;
pub mod extract;
pub mod nested;
pub mod routing;
pub mod row;
pub mod sequence;
pub mod spans;
pub mod types;

pub use config::{ConfigError, SequenceConfig, SPAN_BASE_WIDTH, SPAN_MESSAGE_PAD};
pub use error::{BoxError, LayoutError, StructureError};
pub use extract::ContainerState;
pub use row::{row_layout, RowConfig};
pub use types::*;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::graph::{Graph, ObjectId};

use extract::{container_origin, extract, merge, reduce, restore};
use sequence::layout_sequence;

/// The generic layout engine invoked on the reduced graph
///
/// It must give every object a `top_left` and every edge a route.
pub type GenericLayoutFn<'a> = dyn FnMut(&mut Graph) -> Result<(), BoxError> + 'a;

/// Lay out `graph` in place
///
/// Returns the absolute geometry written for each outermost container.
pub(crate) fn run(
    graph: &mut Graph,
    config: &SequenceConfig,
    generic: &mut GenericLayoutFn<'_>,
) -> Result<IndexMap<ObjectId, LocalLayout>, LayoutError> {
    config.validate()?;
    graph.clear_lifelines();

    let models = extract(graph)?;
    let mut states: IndexMap<ObjectId, ContainerState> = IndexMap::new();
    for model in &models {
        advance(graph, &mut states, model.container, ContainerState::Extracted);
    }

    let mut locals = IndexMap::new();
    for model in &models {
        let local = layout_sequence(graph, model, config, generic)?;
        locals.insert(model.container, local);
        advance(graph, &mut states, model.container, ContainerState::SizedPlaceholder);
    }

    let mut view = reduce(graph, &models, &locals);
    debug!(
        objects = view.object_count(),
        edges = view.edge_count(),
        containers = models.len(),
        "running generic layout"
    );
    generic(&mut view).map_err(LayoutError::Generic)?;
    merge(graph, &view);

    let mut origins = IndexMap::new();
    for model in &models {
        let container = model.container;
        let Some(origin) = container_origin(graph, container) else {
            let state = states[&container];
            return Err(StructureError::unresolved(graph.path(container), state).into());
        };
        origins.insert(container, origin);
        advance(graph, &mut states, container, ContainerState::GenericallyPositioned);
    }

    for (&container, local) in locals.iter_mut() {
        let origin = origins[&container];
        local.translate(origin.x, origin.y);
        advance(graph, &mut states, container, ContainerState::InternallyLaidOut);
        restore(graph, container, local);
        advance(graph, &mut states, container, ContainerState::Restored);
    }

    debug!(containers = locals.len(), "sequence layout finished");
    Ok(locals)
}

fn advance(
    graph: &Graph,
    states: &mut IndexMap<ObjectId, ContainerState>,
    container: ObjectId,
    next: ContainerState,
) {
    let previous = states.insert(container, next);
    debug_assert!(previous.map_or(true, |state| state < next));
    trace!(container = %graph.path(container), state = %next, "container state");
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::graph::{EdgeKind, Role, Shape};

    use super::*;

    fn no_op(_: &mut Graph) -> Result<(), BoxError> {
        Ok(())
    }

    #[test]
    fn test_graph_without_diagrams_still_runs_generic() {
        let mut g = Graph::new();
        let a = g.ensure_path(["a"]);
        let mut calls = 0;
        let mut generic = |view: &mut Graph| -> Result<(), BoxError> {
            calls += 1;
            view[a].top_left = Some(Point::new(3.0, 4.0));
            Ok(())
        };
        let locals = run(&mut g, &SequenceConfig::default(), &mut generic).unwrap();
        assert!(locals.is_empty());
        assert_eq!(calls, 1);
        assert_eq!(g[a].top_left, Some(Point::new(3.0, 4.0)));
    }

    #[test]
    fn test_container_is_translated_to_generic_position() {
        let mut g = Graph::new();
        let sd = g.ensure_path(["sd"]);
        g[sd].set_shape(Shape::SequenceDiagram);
        let a = g.ensure_path(["sd", "a"]);
        let b = g.ensure_path(["sd", "b"]);
        g[a].set_size(50.0, 50.0);
        g[b].set_size(50.0, 50.0);
        g.connect(a, b);

        let mut generic = |view: &mut Graph| -> Result<(), BoxError> {
            view[sd].top_left = Some(Point::new(1000.0, 500.0));
            Ok(())
        };
        run(&mut g, &SequenceConfig::default(), &mut generic).unwrap();

        assert_eq!(g[sd].role, Role::SequenceContainer);
        assert_eq!(g[sd].top_left, Some(Point::new(1000.0, 500.0)));
        assert_eq!(g[a].top_left, Some(Point::new(1025.0, 525.0)));
        assert_eq!(g[b].top_left, Some(Point::new(1175.0, 525.0)));
        assert_eq!(g[sd].width, 25.0 + 200.0 + 25.0);
    }

    #[test]
    fn test_unplaced_container_is_unresolved() {
        let mut g = Graph::new();
        let sd = g.ensure_path(["sd"]);
        g[sd].set_shape(Shape::SequenceDiagram);
        g.ensure_path(["sd", "a"]);

        let err = run(&mut g, &SequenceConfig::default(), &mut no_op).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Structure(StructureError::Unresolved {
                state: ContainerState::SizedPlaceholder,
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_config_fails_before_generic() {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        let a = g.ensure_path(["a"]);
        let b = g.ensure_path(["b"]);
        g.connect(a, b);
        let mut calls = 0;
        let mut generic = |_: &mut Graph| -> Result<(), BoxError> {
            calls += 1;
            Ok(())
        };
        let config = SequenceConfig::default().with_message_spacing(0.0);
        let err = run(&mut g, &config, &mut generic).unwrap_err();
        assert!(matches!(
            err,
            LayoutError::Config(ConfigError::Invalid {
                field: "message_spacing",
                ..
            })
        ));
        assert_eq!(calls, 0);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn test_every_container_is_returned_restored() {
        let mut g = Graph::new();
        for name in ["s1", "s2"] {
            let sd = g.ensure_path([name]);
            g[sd].set_shape(Shape::SequenceDiagram);
            let a = g.ensure_path([name, "a"]);
            let b = g.ensure_path([name, "b"]);
            g.connect(a, b);
        }
        let s1 = g.find("s1").unwrap();
        let s2 = g.find("s2").unwrap();
        let mut generic = |view: &mut Graph| -> Result<(), BoxError> {
            view[s1].top_left = Some(Point::new(0.0, 0.0));
            view[s2].top_left = Some(Point::new(400.0, 0.0));
            Ok(())
        };
        let locals = run(&mut g, &SequenceConfig::default(), &mut generic).unwrap();
        assert_eq!(locals.keys().copied().collect::<Vec<_>>(), vec![s1, s2]);
        let s2_a = g.find("s2.a").unwrap();
        assert_eq!(locals[&s2].objects[&s2_a].bounds.x, 425.0);
        let lifelines = g.edges().filter(|e| e.kind == EdgeKind::Lifeline).count();
        assert_eq!(lifelines, 4);
    }

    #[test]
    fn test_generic_error_is_propagated() {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        g.ensure_path(["a"]);
        let mut generic = |_: &mut Graph| -> Result<(), BoxError> { Err("engine exploded".into()) };
        let err = run(&mut g, &SequenceConfig::default(), &mut generic).unwrap_err();
        match err {
            LayoutError::Generic(source) => assert_eq!(source.to_string(), "engine exploded"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_rerun_replaces_lifelines() {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        let a = g.ensure_path(["a"]);
        let b = g.ensure_path(["b"]);
        g.connect(a, b);

        run(&mut g, &SequenceConfig::default(), &mut no_op).unwrap();
        let first: Vec<_> = g.edges().cloned().collect();
        run(&mut g, &SequenceConfig::default(), &mut no_op).unwrap();
        let lifelines = g.edges().filter(|e| e.kind == EdgeKind::Lifeline).count();
        assert_eq!(lifelines, 2);
        assert_eq!(
            g.edges().map(|e| e.route.clone()).collect::<Vec<_>>(),
            first.iter().map(|e| e.route.clone()).collect::<Vec<_>>()
        );
    }
}
