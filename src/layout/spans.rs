//! Activation span geometry
//!
//! A span is a fixed-width box centered on its parent (actor or enclosing
//! span) whose vertical extent covers the messages touching it directly,
//! padded by [`SPAN_MESSAGE_PAD`] on both ends.

use std::collections::HashMap;

use indexmap::IndexMap;
use tracing::trace;

use crate::graph::{EdgeId, Graph, ObjectId};

use super::config::{SPAN_BASE_WIDTH, SPAN_MESSAGE_PAD};
use super::extract::SequenceModel;
use super::types::BoundingBox;

/// Computed box and stacking order of one span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanBox {
    pub bounds: BoundingBox,
    pub z_index: i32,
    pub depth: usize,
}

/// Vertical extent of messages touching each span directly
fn direct_extents(
    graph: &Graph,
    model: &SequenceModel,
    rows: &IndexMap<EdgeId, f64>,
) -> HashMap<ObjectId, (f64, f64)> {
    let mut extents: HashMap<ObjectId, (f64, f64)> = HashMap::new();
    for (&id, &y) in rows {
        let edge = &graph[id];
        let ends = if edge.src == edge.dst {
            vec![edge.src]
        } else {
            vec![edge.src, edge.dst]
        };
        for end in ends {
            extents
                .entry(end)
                .and_modify(|(lo, hi)| {
                    *lo = lo.min(y);
                    *hi = hi.max(y);
                })
                .or_insert((y, y));
        }
    }
    extents.retain(|id, _| model.spans.iter().any(|s| s.id == *id));
    extents
}

/// Lay out every span of a diagram
///
/// `rows` must already hold every message's y; `first_row` places spans
/// that no message touches, directly or through a child span.
pub fn layout_spans(
    graph: &Graph,
    model: &SequenceModel,
    actors: &IndexMap<ObjectId, BoundingBox>,
    rows: &IndexMap<EdgeId, f64>,
    first_row: f64,
) -> IndexMap<ObjectId, SpanBox> {
    let direct = direct_extents(graph, model, rows);

    // Children come after their parent in `model.spans`, so walking it
    // backwards sees every child before its parent.
    let mut vertical: HashMap<ObjectId, (f64, f64)> = HashMap::new();
    let mut from_children: HashMap<ObjectId, (f64, f64)> = HashMap::new();
    for span in model.spans.iter().rev() {
        let (top, bottom) = if let Some(&(lo, hi)) = direct.get(&span.id) {
            (lo - SPAN_MESSAGE_PAD, hi + SPAN_MESSAGE_PAD)
        } else if let Some(&(lo, hi)) = from_children.get(&span.id) {
            (lo - SPAN_MESSAGE_PAD, hi + SPAN_MESSAGE_PAD)
        } else {
            (first_row - SPAN_MESSAGE_PAD, first_row + SPAN_MESSAGE_PAD)
        };
        vertical.insert(span.id, (top, bottom));
        from_children
            .entry(span.parent)
            .and_modify(|(lo, hi)| {
                *lo = lo.min(top);
                *hi = hi.max(bottom);
            })
            .or_insert((top, bottom));
    }

    let mut boxes: IndexMap<ObjectId, SpanBox> = IndexMap::new();
    for span in &model.spans {
        let (parent_x, parent_z) = match boxes.get(&span.parent) {
            Some(parent) => (parent.bounds.center().x, parent.z_index),
            None => match actors.get(&span.parent) {
                Some(actor) => (actor.center().x, graph[span.parent].z_index),
                None => continue,
            },
        };
        let Some(&(top, bottom)) = vertical.get(&span.id) else {
            continue;
        };
        let bounds = BoundingBox::new(
            parent_x - SPAN_BASE_WIDTH / 2.0,
            top,
            SPAN_BASE_WIDTH,
            bottom - top,
        );
        trace!(span = %span.id, depth = span.depth, y = top, height = bounds.height, "placed span");
        boxes.insert(
            span.id,
            SpanBox {
                bounds,
                z_index: parent_z + 1,
                depth: span.depth,
            },
        );
    }
    boxes
}
