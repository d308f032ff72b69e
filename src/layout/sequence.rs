//! Local layout of one sequence diagram
//!
//! Everything here is computed relative to the container's own top-left;
//! the orchestrator translates the result once the generic engine has
//! placed the container.
//!
//! Order matters: nested diagrams are sized first because hosting actors
//! grow around them, message rows are assigned against placeholder actor
//! boxes, spans are sized from those rows, and message endpoints are
//! resolved last against the final actor and span boxes.

use indexmap::IndexMap;
use tracing::debug;

use crate::graph::{Graph, ObjectId, Role};

use super::actors::{actor_order, actor_sizes, lifelines, place_actors};
use super::config::SequenceConfig;
use super::error::LayoutError;
use super::extract::SequenceModel;
use super::nested::layout_nested;
use super::routing::{message_rows, route_messages};
use super::spans::layout_spans;
use super::types::*;
use super::GenericLayoutFn;

/// Compute the local geometry of `model`'s container
pub(crate) fn layout_sequence(
    graph: &Graph,
    model: &SequenceModel,
    config: &SequenceConfig,
    generic: &mut GenericLayoutFn<'_>,
) -> Result<LocalLayout, LayoutError> {
    let mut hosted: IndexMap<ObjectId, Vec<(ObjectId, LocalLayout)>> = IndexMap::new();
    for nested in &model.nested {
        let local = layout_nested(graph, nested.container, config, generic)?;
        hosted
            .entry(nested.host)
            .or_default()
            .push((nested.container, local));
    }

    let order = actor_order(graph, model);
    let sizes = actor_sizes(graph, model, &hosted, config);
    let actors = place_actors(&order, &sizes, config);
    let bottom = actors.values().map(|b| b.bottom()).fold(0.0, f64::max);

    let rows = message_rows(&model.messages, bottom, config);
    let spans = layout_spans(graph, model, &actors, &rows, bottom + config.message_spacing);
    let span_bounds: IndexMap<ObjectId, BoundingBox> =
        spans.iter().map(|(&id, span)| (id, span.bounds)).collect();
    let messages = route_messages(graph, &rows, &actors, &span_bounds);
    let lifelines = lifelines(graph, model, &actors, &spans, &rows, config);

    let mut local = LocalLayout::new();
    for (&id, &bounds) in &actors {
        local.objects.insert(
            id,
            Placement {
                bounds,
                role: Role::Actor,
                z_index: None,
            },
        );
    }
    for (&id, span) in &spans {
        local.objects.insert(
            id,
            Placement {
                bounds: span.bounds,
                role: Role::Span { depth: span.depth },
                z_index: Some(span.z_index),
            },
        );
    }
    local.messages = messages;
    local.lifelines = lifelines;

    host_nested(graph, &mut local, &actors, hosted, config);
    fit_to_content(&mut local, config.container_padding);

    debug!(
        container = %graph.path(model.container),
        width = local.width,
        height = local.height,
        "laid out sequence diagram"
    );
    Ok(local)
}

/// Stack nested diagrams inside their hosting actors, below the declared box
fn host_nested(
    graph: &Graph,
    local: &mut LocalLayout,
    actors: &IndexMap<ObjectId, BoundingBox>,
    hosted: IndexMap<ObjectId, Vec<(ObjectId, LocalLayout)>>,
    config: &SequenceConfig,
) {
    let pad = config.container_padding;
    for (host, nested) in hosted {
        let Some(bounds) = actors.get(&host) else {
            continue;
        };
        let mut y = bounds.y + graph[host].declared_size().1 + pad;
        for (container, mut inner) in nested {
            let x = bounds.center().x - inner.width / 2.0;
            inner.translate(x, y);
            local.objects.insert(
                container,
                Placement {
                    bounds: BoundingBox::new(x, y, inner.width, inner.height),
                    role: Role::SequenceContainer,
                    z_index: None,
                },
            );
            y += inner.height + pad;
            local.absorb(inner);
        }
    }
}

/// Move the content so it starts at (`padding`, `padding`) and size the
/// diagram to it
fn fit_to_content(local: &mut LocalLayout, padding: f64) {
    let content = local.content_bounds().unwrap_or_default();
    local.translate(padding - content.x, padding - content.y);
    local.width = content.width + 2.0 * padding;
    local.height = content.height + 2.0 * padding;
}

#[cfg(test)]
mod tests {
    use crate::graph::{LabelPosition, Shape};
    use crate::layout::config::{SPAN_BASE_WIDTH, SPAN_MESSAGE_PAD};
    use crate::layout::error::BoxError;

    use super::*;

    fn local_of(graph: &Graph) -> LocalLayout {
        let model = SequenceModel::build(graph, graph.root()).unwrap();
        let mut generic = |_: &mut Graph| -> Result<(), BoxError> { Ok(()) };
        layout_sequence(graph, &model, &SequenceConfig::default(), &mut generic).unwrap()
    }

    #[test]
    fn test_basic_geometry() {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        let n1 = g.ensure_path(["n1"]);
        let n2 = g.ensure_path(["n2"]);
        g[n1].set_size(100.0, 100.0);
        g[n2].set_size(30.0, 30.0);
        let e0 = g.connect(n1, n2);
        let e1 = g.connect(n2, n1);

        let local = local_of(&g);
        assert_eq!(
            local.objects[&n1].bounds,
            BoundingBox::new(25.0, 25.0, 100.0, 100.0)
        );
        assert_eq!(
            local.objects[&n2].bounds,
            BoundingBox::new(225.0, 95.0, 30.0, 30.0)
        );
        assert_eq!(
            local.messages[&e0].route,
            vec![Point::new(75.0, 205.0), Point::new(240.0, 205.0)]
        );
        assert_eq!(local.messages[&e1].route[0].y, 285.0);
        assert_eq!(
            local.messages[&e1].label_position,
            LabelPosition::OutsideBottomCenter
        );
        // lifelines end at 285 + 40; the diagram adds 25 of padding below
        assert_eq!(local.lifelines[0].route[1].y, 325.0);
        assert_eq!(local.width, 25.0 + 230.0 + 25.0);
        assert_eq!(local.height, 25.0 + 300.0 + 25.0);
    }

    #[test]
    fn test_spans_are_placed() {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        let a = g.ensure_path(["a"]);
        g[a].set_size(100.0, 100.0);
        let a_t1 = g.ensure_path(["a", "t1"]);
        let b = g.ensure_path(["b"]);
        g[b].set_size(30.0, 30.0);
        let first = g.connect(a_t1, b);
        g.connect(b, a_t1);

        let local = local_of(&g);
        let span = &local.objects[&a_t1];
        assert_eq!(span.role, Role::Span { depth: 1 });
        assert_eq!(span.z_index, Some(1));
        assert_eq!(span.bounds.width, SPAN_BASE_WIDTH);
        assert_eq!(span.bounds.y + SPAN_MESSAGE_PAD, local.messages[&first].route[0].y);
        assert_eq!(local.messages[&first].route[0].x, span.bounds.right());
    }

    #[test]
    fn test_narrow_actor_keeps_span_inside_padding() {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        let a = g.ensure_path(["a"]);
        g[a].set_size(4.0, 20.0);
        let a_t1 = g.ensure_path(["a", "t1"]);
        g.connect(a_t1, a_t1);

        let local = local_of(&g);
        assert_eq!(local.objects[&a_t1].bounds.x, 25.0);
        assert_eq!(local.objects[&a].bounds.x, 29.0);
    }
}
