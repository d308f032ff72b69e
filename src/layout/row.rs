//! Minimal generic layout engine
//!
//! Children of every object are placed left to right in a single row,
//! vertically centered, and parents grow around them. Edges are straight
//! lines between the facing sides of their endpoints. This is enough to
//! drive sequence layout end to end without an external engine.

use tracing::trace;

use crate::graph::{Graph, ObjectId};

use super::error::BoxError;
use super::types::*;

/// Spacing used by [`row_layout`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowConfig {
    /// Horizontal gap between siblings
    pub spacing: f64,
    /// Space between a parent's border and its children
    pub padding: f64,
}

impl Default for RowConfig {
    fn default() -> Self {
        Self {
            spacing: 40.0,
            padding: 20.0,
        }
    }
}

/// Side of a box an edge attaches to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// Midpoint of a box side
pub fn attachment_point(bounds: &BoundingBox, side: Side) -> Point {
    let center = bounds.center();
    match side {
        Side::Top => Point::new(center.x, bounds.y),
        Side::Bottom => Point::new(center.x, bounds.bottom()),
        Side::Left => Point::new(bounds.x, center.y),
        Side::Right => Point::new(bounds.right(), center.y),
    }
}

/// Sides of `from` and `to` that face each other
pub fn facing_sides(from: &BoundingBox, to: &BoundingBox) -> (Side, Side) {
    let dx = to.center().x - from.center().x;
    let dy = to.center().y - from.center().y;
    if dx.abs() >= dy.abs() {
        if dx >= 0.0 {
            (Side::Right, Side::Left)
        } else {
            (Side::Left, Side::Right)
        }
    } else if dy > 0.0 {
        (Side::Bottom, Side::Top)
    } else {
        (Side::Top, Side::Bottom)
    }
}

/// Lay out `graph` as nested rows; usable as the generic engine
pub fn row_layout(graph: &mut Graph, config: &RowConfig) -> Result<(), BoxError> {
    let root = graph.root();
    let mut order = vec![root];
    order.extend(graph.descendants(root));

    // Children before parents: size every container from its children
    for &id in order.iter().rev() {
        let children = graph[id].children().to_vec();
        if children.is_empty() {
            continue;
        }
        let pad = if id == root { 0.0 } else { config.padding };
        let widths: f64 = children.iter().map(|&c| graph[c].width).sum();
        let gaps = config.spacing * (children.len() - 1) as f64;
        let tallest = children.iter().map(|&c| graph[c].height).fold(0.0, f64::max);
        let object = &mut graph[id];
        object.width = object.width.max(widths + gaps + 2.0 * pad);
        object.height = object.height.max(tallest + 2.0 * pad);
    }

    graph[root].top_left = Some(Point::new(0.0, 0.0));
    for &id in &order {
        place_children(graph, id, id == root, config)?;
    }

    let edges: Vec<_> = graph.edges().map(|e| (e.id, e.src, e.dst)).collect();
    for (id, src, dst) in edges {
        let from = placed(graph, src)?;
        let to = placed(graph, dst)?;
        let route = if src == dst {
            vec![from.center()]
        } else {
            let (from_side, to_side) = facing_sides(&from, &to);
            vec![
                attachment_point(&from, from_side),
                attachment_point(&to, to_side),
            ]
        };
        graph[id].route = route;
    }
    Ok(())
}

fn place_children(
    graph: &mut Graph,
    id: ObjectId,
    is_root: bool,
    config: &RowConfig,
) -> Result<(), BoxError> {
    let bounds = placed(graph, id)?;
    let pad = if is_root { 0.0 } else { config.padding };
    let children = graph[id].children().to_vec();
    let tallest = children.iter().map(|&c| graph[c].height).fold(0.0, f64::max);

    let mut x = bounds.x + pad;
    for child in children {
        let object = &mut graph[child];
        let y = bounds.y + pad + (tallest - object.height) / 2.0;
        object.top_left = Some(Point::new(x, y));
        trace!(object = %child, x, y, "row placed");
        x += object.width + config.spacing;
    }
    Ok(())
}

fn placed(graph: &Graph, id: ObjectId) -> Result<BoundingBox, BoxError> {
    graph[id]
        .bounds()
        .ok_or_else(|| format!("object '{}' was not placed", graph.path(id)).into())
}
