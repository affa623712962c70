use serde::{Deserialize, Serialize};

/// A position in diagram coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
}

impl Point {
    /// Creates a new point with the specified coordinates
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the x-coordinate of the point
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the point
    pub fn y(self) -> f64 {
        self.y
    }

    /// Checks if both x and y coordinates are zero
    pub fn is_zero(self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    /// Adds another point to this point, returning a new point
    pub fn add_point(self, other: Point) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    /// Subtracts another point from this point, returning a new point
    pub fn sub_point(self, other: Point) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    /// Calculates the Euclidean distance to another point
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Multiplies both coordinates by the given factor
    pub fn scale(self, factor: f64) -> Self {
        Self {
            x: self.x * factor,
            y: self.y * factor,
        }
    }
}

/// An axis-aligned rectangle given by its top-left corner and extent.
///
/// This is the geometry carried by every vertex; edges use it for their
/// optional label bounds. Width and height may be zero but are never
/// interpreted as signed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rectangle {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
}

impl Rectangle {
    /// Creates a new rectangle from its top-left corner and dimensions
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns the x-coordinate of the top-left corner
    pub fn x(self) -> f64 {
        self.x
    }

    /// Returns the y-coordinate of the top-left corner
    pub fn y(self) -> f64 {
        self.y
    }

    /// Returns the width of the rectangle
    pub fn width(self) -> f64 {
        self.width
    }

    /// Returns the height of the rectangle
    pub fn height(self) -> f64 {
        self.height
    }

    /// Returns the top-left corner as a point
    pub fn position(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the center of the rectangle
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Returns a new rectangle moved to the given position
    pub fn with_position(self, position: Point) -> Self {
        Self {
            x: position.x(),
            y: position.y(),
            ..self
        }
    }

    /// Returns a new rectangle with the given width
    pub fn with_width(self, width: f64) -> Self {
        Self { width, ..self }
    }

    /// Returns a new rectangle with the given height
    pub fn with_height(self, height: f64) -> Self {
        Self { height, ..self }
    }

    /// Moves the rectangle by the specified offset
    pub fn translate(self, offset: Point) -> Self {
        Self {
            x: self.x + offset.x(),
            y: self.y + offset.y(),
            ..self
        }
    }

    /// Grows the rectangle outward by the given amount on every side
    pub fn grow(self, amount: f64) -> Self {
        Self {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + amount * 2.0,
            height: self.height + amount * 2.0,
        }
    }

    /// Checks whether the given point lies inside the rectangle
    pub fn contains_point(self, point: Point) -> bool {
        point.x() >= self.x
            && point.x() <= self.x + self.width
            && point.y() >= self.y
            && point.y() <= self.y + self.height
    }

    /// Returns the smallest rectangle containing both rectangles
    pub fn union(self, other: Rectangle) -> Self {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = (self.x + self.width).max(other.x + other.width);
        let max_y = (self.y + self.height).max(other.y + other.height);
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }
}

/// Placement information attached to a cell.
///
/// For vertices the rectangle holds absolute coordinates unless `relative`
/// is set, in which case `x`/`y` are fractions of the parent's size and
/// `offset` is an absolute nudge applied afterwards. For edges the point
/// list carries the ordered waypoints the connector is routed through.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    bounds: Rectangle,
    relative: bool,
    offset: Option<Point>,
    points: Vec<Point>,
}

impl Geometry {
    /// Creates an absolute geometry from the given bounds
    pub fn new(bounds: Rectangle) -> Self {
        Self {
            bounds,
            ..Self::default()
        }
    }

    /// Creates a relative geometry; `x` and `y` of the bounds are parent fractions
    pub fn new_relative(bounds: Rectangle, offset: Option<Point>) -> Self {
        Self {
            bounds,
            relative: true,
            offset,
            points: Vec::new(),
        }
    }

    /// Returns the raw bounds rectangle
    pub fn bounds(&self) -> Rectangle {
        self.bounds
    }

    /// Returns true if the bounds are parent-relative fractions
    pub fn is_relative(&self) -> bool {
        self.relative
    }

    /// Returns the absolute offset applied after relative resolution
    pub fn offset(&self) -> Option<Point> {
        self.offset
    }

    /// Returns the ordered edge waypoints
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Returns a copy with the given bounds
    pub fn with_bounds(&self, bounds: Rectangle) -> Self {
        Self {
            bounds,
            ..self.clone()
        }
    }

    /// Returns a copy with the given waypoints
    pub fn with_points(&self, points: Vec<Point>) -> Self {
        Self {
            points,
            ..self.clone()
        }
    }

    /// Resolves these bounds against the parent's absolute bounds.
    ///
    /// Absolute geometry is returned unchanged. Relative geometry maps the
    /// fractional position into the parent rectangle and applies the offset,
    /// keeping its own width and height.
    pub fn resolve(&self, parent: Rectangle) -> Rectangle {
        if !self.relative {
            return self.bounds;
        }
        let offset = self.offset.unwrap_or_default();
        Rectangle::new(
            parent.x() + self.bounds.x() * parent.width() + offset.x(),
            parent.y() + self.bounds.y() * parent.height() + offset.y(),
            self.bounds.width(),
            self.bounds.height(),
        )
    }
}
