//! Core types for the layout engine

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::graph::{EdgeId, LabelPosition, ObjectId, Role};

/// A 2D point in the coordinate system
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn translate(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// A bounding box representing the spatial extent of an element
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a zero-sized bounding box at the origin
    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Right edge x-coordinate
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge y-coordinate
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// Center point of the bounding box
    pub fn center(&self) -> Point {
        Point {
            x: self.x + self.width / 2.0,
            y: self.y + self.height / 2.0,
        }
    }

    /// Compute the union of two bounding boxes (smallest box containing both)
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    /// Expand this bounding box to include a point
    pub fn expand_to_include(&self, point: Point) -> BoundingBox {
        let x = self.x.min(point.x);
        let y = self.y.min(point.y);
        let right = self.right().max(point.x);
        let bottom = self.bottom().max(point.y);
        BoundingBox::new(x, y, right - x, bottom - y)
    }

    pub fn translate(&self, dx: f64, dy: f64) -> BoundingBox {
        BoundingBox::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::zero()
    }
}

/// Geometry of one object inside a sequence diagram
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub bounds: BoundingBox,
    pub role: Role,
    /// Set for spans, which stack above their parent
    pub z_index: Option<i32>,
}

/// Route and label side of one message
#[derive(Debug, Clone, PartialEq)]
pub struct MessageLayout {
    pub route: Vec<Point>,
    pub label_position: LabelPosition,
}

/// Route of a lifeline still to be synthesized as an edge
#[derive(Debug, Clone, PartialEq)]
pub struct LifelineLayout {
    pub actor: ObjectId,
    pub route: Vec<Point>,
}

/// Everything computed for one sequence diagram, relative to its top-left
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalLayout {
    pub width: f64,
    pub height: f64,
    pub objects: IndexMap<ObjectId, Placement>,
    pub messages: IndexMap<EdgeId, MessageLayout>,
    pub lifelines: Vec<LifelineLayout>,
}

impl LocalLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift every box and route point
    pub fn translate(&mut self, dx: f64, dy: f64) {
        for placement in self.objects.values_mut() {
            placement.bounds = placement.bounds.translate(dx, dy);
        }
        let routes = self
            .messages
            .values_mut()
            .map(|m| &mut m.route)
            .chain(self.lifelines.iter_mut().map(|l| &mut l.route));
        for route in routes {
            for point in route.iter_mut() {
                *point = point.translate(dx, dy);
            }
        }
    }

    /// Take over the geometry of a nested diagram, already translated
    pub fn absorb(&mut self, other: LocalLayout) {
        self.objects.extend(other.objects);
        self.messages.extend(other.messages);
        self.lifelines.extend(other.lifelines);
    }

    /// Smallest box containing every object and route point
    pub fn content_bounds(&self) -> Option<BoundingBox> {
        let boxes = self.objects.values().map(|p| p.bounds);
        let points = self
            .messages
            .values()
            .flat_map(|m| m.route.iter())
            .chain(self.lifelines.iter().flat_map(|l| l.route.iter()))
            .copied();
        let mut bounds: Option<BoundingBox> = None;
        for b in boxes {
            bounds = Some(match bounds {
                Some(acc) => acc.union(&b),
                None => b,
            });
        }
        for p in points {
            bounds = Some(match bounds {
                Some(acc) => acc.expand_to_include(p),
                None => BoundingBox::new(p.x, p.y, 0.0, 0.0),
            });
        }
        bounds
    }
}
