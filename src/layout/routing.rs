//! Message routing inside a sequence diagram
//!
//! Messages are horizontal two-point routes. Rows are assigned first, in
//! declaration order, so span heights can be derived from them; endpoints
//! are resolved once actor and span boxes are known.

use indexmap::IndexMap;
use tracing::trace;

use crate::graph::{EdgeId, Graph, LabelPosition, ObjectId};

use super::config::SequenceConfig;
use super::types::*;

/// Side of a span box a message attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanSide {
    Left,
    Right,
}

/// One end of a message: the box it touches and whether that box is a span
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Endpoint {
    pub bounds: BoundingBox,
    pub is_span: bool,
}

impl Endpoint {
    pub fn actor(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            is_span: false,
        }
    }

    pub fn span(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            is_span: true,
        }
    }

    /// Actors are reached at their center, spans at the given side
    fn x(&self, side: SpanSide) -> f64 {
        if self.is_span {
            attachment_x(&self.bounds, side)
        } else {
            self.bounds.center().x
        }
    }
}

/// X coordinate of a box side
pub fn attachment_x(bounds: &BoundingBox, side: SpanSide) -> f64 {
    match side {
        SpanSide::Left => bounds.x,
        SpanSide::Right => bounds.right(),
    }
}

/// Sides facing the other participant, for (src, dst)
///
/// Endpoints on the same vertical (self messages, spans of one actor) both
/// attach on the right.
pub fn facing_span_sides(src_x: f64, dst_x: f64) -> (SpanSide, SpanSide) {
    if src_x < dst_x {
        (SpanSide::Right, SpanSide::Left)
    } else if src_x > dst_x {
        (SpanSide::Left, SpanSide::Right)
    } else {
        (SpanSide::Right, SpanSide::Right)
    }
}

/// Label above left-to-right messages and below right-to-left ones, so
/// replies on the next row do not collide with their request's label
pub fn label_position(src_x: f64, dst_x: f64) -> LabelPosition {
    if src_x > dst_x {
        LabelPosition::OutsideBottomCenter
    } else {
        LabelPosition::OutsideTopCenter
    }
}

/// Y of every message, strictly increasing in declaration order
pub fn message_rows(
    messages: &[EdgeId],
    actors_bottom: f64,
    config: &SequenceConfig,
) -> IndexMap<EdgeId, f64> {
    let mut ordered = messages.to_vec();
    ordered.sort();
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, id)| (id, actors_bottom + config.message_spacing * (i as f64 + 1.0)))
        .collect()
}

/// Route a single message at row `y`
pub fn route_message(src: Endpoint, dst: Endpoint, y: f64) -> MessageLayout {
    let src_cx = src.bounds.center().x;
    let dst_cx = dst.bounds.center().x;
    let (src_side, dst_side) = facing_span_sides(src_cx, dst_cx);
    MessageLayout {
        route: vec![Point::new(src.x(src_side), y), Point::new(dst.x(dst_side), y)],
        label_position: label_position(src_cx, dst_cx),
    }
}

/// Route every message of a diagram
///
/// `actors` and `spans` hold the final boxes in diagram-local coordinates.
pub fn route_messages(
    graph: &Graph,
    rows: &IndexMap<EdgeId, f64>,
    actors: &IndexMap<ObjectId, BoundingBox>,
    spans: &IndexMap<ObjectId, BoundingBox>,
) -> IndexMap<EdgeId, MessageLayout> {
    let endpoint = |id: ObjectId| -> Option<Endpoint> {
        spans
            .get(&id)
            .map(|b| Endpoint::span(*b))
            .or_else(|| actors.get(&id).map(|b| Endpoint::actor(*b)))
    };

    let mut routed = IndexMap::new();
    for (&id, &y) in rows {
        let edge = &graph[id];
        let (Some(src), Some(dst)) = (endpoint(edge.src), endpoint(edge.dst)) else {
            continue;
        };
        let message = route_message(src, dst, y);
        trace!(edge = %id, y, from = message.route[0].x, to = message.route[1].x, "routed message");
        routed.insert(id, message);
    }
    routed
}
