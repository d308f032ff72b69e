//! Actor ordering, placement and lifelines

use std::collections::HashSet;

use indexmap::IndexMap;
use tracing::trace;

use crate::graph::{EdgeId, Graph, ObjectId};

use super::config::SequenceConfig;
use super::extract::SequenceModel;
use super::spans::SpanBox;
use super::types::*;

/// Actors in the order they first appear in the messages, then the unseen
/// ones in declaration order
pub fn actor_order(graph: &Graph, model: &SequenceModel) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    let mut order = Vec::with_capacity(model.actors.len());
    let endpoints = model.messages.iter().flat_map(|&id| {
        let edge = &graph[id];
        [edge.src, edge.dst]
    });
    for end in endpoints {
        if let Some(actor) = model.actor_of(end) {
            if seen.insert(actor) {
                order.push(actor);
            }
        }
    }
    for &actor in &model.actors {
        if seen.insert(actor) {
            order.push(actor);
        }
    }
    order
}

/// Width and height of every actor, grown to host its nested diagrams
///
/// Nested diagrams stack below the actor's declared box, each surrounded by
/// `container_padding`.
pub fn actor_sizes(
    graph: &Graph,
    model: &SequenceModel,
    hosted: &IndexMap<ObjectId, Vec<(ObjectId, LocalLayout)>>,
    config: &SequenceConfig,
) -> IndexMap<ObjectId, (f64, f64)> {
    model
        .actors
        .iter()
        .map(|&actor| {
            let (mut width, mut height) = graph[actor].declared_size();
            if let Some(nested) = hosted.get(&actor) {
                let pad = config.container_padding;
                for (_, local) in nested {
                    width = width.max(local.width + 2.0 * pad);
                    height += local.height + pad;
                }
                height += pad;
            }
            (actor, (width, height))
        })
        .collect()
}

/// Place actors left to right with bottoms aligned
///
/// The tallest actor sits at y = 0; every other actor is pushed down so that
/// all bottoms share one y.
pub fn place_actors(
    order: &[ObjectId],
    sizes: &IndexMap<ObjectId, (f64, f64)>,
    config: &SequenceConfig,
) -> IndexMap<ObjectId, BoundingBox> {
    let bottom = order
        .iter()
        .filter_map(|a| sizes.get(a))
        .map(|&(_, h)| h)
        .fold(0.0, f64::max);

    let mut x = 0.0;
    let mut placed = IndexMap::new();
    for &actor in order {
        let Some(&(width, height)) = sizes.get(&actor) else {
            continue;
        };
        let bounds = BoundingBox::new(x, bottom - height, width, height);
        trace!(actor = %actor, x, y = bounds.y, "placed actor");
        placed.insert(actor, bounds);
        x += width + config.actor_spacing;
    }
    placed
}

/// One vertical lifeline per actor, in actor order
///
/// A lifeline runs from the actor's bottom to `lifeline_margin` past the
/// last message touching the actor or its spans, or past its lowest span
/// when that is lower.
pub fn lifelines(
    graph: &Graph,
    model: &SequenceModel,
    actors: &IndexMap<ObjectId, BoundingBox>,
    spans: &IndexMap<ObjectId, SpanBox>,
    rows: &IndexMap<EdgeId, f64>,
    config: &SequenceConfig,
) -> Vec<LifelineLayout> {
    actors
        .iter()
        .map(|(&actor, bounds)| {
            let start = Point::new(bounds.center().x, bounds.bottom());
            let last_message = rows
                .iter()
                .filter(|(id, _)| {
                    let edge = &graph[**id];
                    model.actor_of(edge.src) == Some(actor) || model.actor_of(edge.dst) == Some(actor)
                })
                .map(|(_, &y)| y)
                .fold(start.y, f64::max);
            let lowest_span = model
                .spans
                .iter()
                .filter(|s| s.actor == actor)
                .filter_map(|s| spans.get(&s.id))
                .map(|s| s.bounds.bottom())
                .fold(start.y, f64::max);
            let end_y = last_message.max(lowest_span) + config.lifeline_margin;
            LifelineLayout {
                actor,
                route: vec![start, Point::new(start.x, end_y)],
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::graph::Shape;
    use crate::layout::config::SPAN_MESSAGE_PAD;
    use crate::layout::routing::message_rows;
    use crate::layout::spans::layout_spans;

    use super::*;

    fn diagram() -> Graph {
        let mut g = Graph::new();
        g.root_mut().set_shape(Shape::SequenceDiagram);
        g
    }

    #[test]
    fn test_order_follows_first_appearance() {
        let mut g = diagram();
        let a = g.ensure_path(["a"]);
        let b = g.ensure_path(["b"]);
        let c = g.ensure_path(["c"]);
        let idle = g.ensure_path(["idle"]);
        g.connect(c, a);
        g.connect(a, b);
        let model = SequenceModel::build(&g, g.root()).unwrap();
        assert_eq!(actor_order(&g, &model), vec![c, a, b, idle]);
    }

    #[test]
    fn test_order_counts_span_messages_for_their_actor() {
        let mut g = diagram();
        let a = g.ensure_path(["a"]);
        let b = g.ensure_path(["b"]);
        let b_t1 = g.ensure_path(["b", "t1"]);
        g.connect(b_t1, a);
        let model = SequenceModel::build(&g, g.root()).unwrap();
        assert_eq!(actor_order(&g, &model), vec![b, a]);
    }

    #[test]
    fn test_place_actors_aligns_bottoms() {
        let mut g = diagram();
        let a = g.ensure_path(["a"]);
        let b = g.ensure_path(["b"]);
        g[a].set_size(100.0, 100.0);
        g[b].set_size(30.0, 30.0);
        let model = SequenceModel::build(&g, g.root()).unwrap();
        let config = SequenceConfig::default();
        let sizes = actor_sizes(&g, &model, &IndexMap::new(), &config);
        let placed = place_actors(&[a, b], &sizes, &config);

        assert_eq!(placed[&a], BoundingBox::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!(placed[&b], BoundingBox::new(200.0, 70.0, 30.0, 30.0));
        assert_eq!(placed[&a].bottom(), placed[&b].bottom());
    }

    #[test]
    fn test_hosting_actor_grows() {
        let mut g = diagram();
        let a = g.ensure_path(["a"]);
        g[a].set_size(50.0, 40.0);
        let model = SequenceModel::build(&g, g.root()).unwrap();
        let config = SequenceConfig::default().with_container_padding(10.0);
        let nested = LocalLayout {
            width: 200.0,
            height: 120.0,
            ..LocalLayout::default()
        };
        let mut hosted = IndexMap::new();
        hosted.insert(a, vec![(g.root(), nested)]);
        let sizes = actor_sizes(&g, &model, &hosted, &config);
        assert_eq!(sizes[&a], (220.0, 40.0 + 120.0 + 10.0 + 10.0));
    }

    #[test]
    fn test_lifelines() {
        let mut g = diagram();
        let a = g.ensure_path(["a"]);
        let b = g.ensure_path(["b"]);
        let idle = g.ensure_path(["idle"]);
        for id in [a, b, idle] {
            g[id].set_size(100.0, 50.0);
        }
        let b_t1 = g.ensure_path(["b", "t1"]);
        g.connect(a, b_t1);
        g.connect(b_t1, a);
        g.connect(a, a);
        let model = SequenceModel::build(&g, g.root()).unwrap();
        let config = SequenceConfig::default();
        let order = actor_order(&g, &model);
        let sizes = actor_sizes(&g, &model, &IndexMap::new(), &config);
        let placed = place_actors(&order, &sizes, &config);
        let rows = message_rows(&model.messages, 50.0, &config);
        let spans = layout_spans(&g, &model, &placed, &rows, 130.0);
        let lines = lifelines(&g, &model, &placed, &spans, &rows, &config);

        assert_eq!(lines.iter().map(|l| l.actor).collect::<Vec<_>>(), vec![a, b, idle]);
        // rows: 130, 210, 290
        assert_eq!(lines[0].route, vec![Point::new(50.0, 50.0), Point::new(50.0, 330.0)]);
        // b's span ends below its last message
        assert_eq!(
            lines[1].route,
            vec![Point::new(250.0, 50.0), Point::new(250.0, 266.0)]
        );
        assert_eq!(lines[2].route[1].y, 50.0 + config.lifeline_margin);
        assert!(lines[1].route[1].y >= spans[&b_t1].bounds.bottom());
        assert_eq!(spans[&b_t1].bounds.bottom(), 210.0 + SPAN_MESSAGE_PAD);
    }
}
