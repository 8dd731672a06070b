use std::fmt;

/// A point in physical screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle in physical screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// X coordinate of the right edge.
    pub fn right(&self) -> i32 {
        self.x.saturating_add(self.width as i32)
    }

    /// Y coordinate of the bottom edge.
    pub fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height as i32)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.x + (self.width / 2) as i32,
            self.y + (self.height / 2) as i32,
        )
    }

    /// Returns true if `p` lies inside the rectangle, edges included.
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Returns true if the two rectangles share any area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Squared distance from `p` to the closest point of the rectangle.
    /// Zero when `p` is inside.
    pub fn distance_sq(&self, p: Point) -> i64 {
        let dx = if p.x < self.x {
            (self.x - p.x) as i64
        } else if p.x > self.right() {
            (p.x - self.right()) as i64
        } else {
            0
        };
        let dy = if p.y < self.y {
            (self.y - p.y) as i64
        } else if p.y > self.bottom() {
            (p.y - self.bottom()) as i64
        } else {
            0
        };
        dx * dx + dy * dy
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// A monitor: its full bounds and the work area left over by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Display {
    pub bounds: Rect,
    pub work_area: Rect,
}

impl Display {
    pub const fn new(bounds: Rect, work_area: Rect) -> Self {
        Self { bounds, work_area }
    }
}

/// Display edge the taskbar (and therefore the tray icon) sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskbarPosition {
    Top,
    Bottom,
    Left,
    Right,
}

impl TaskbarPosition {
    pub fn is_horizontal(self) -> bool {
        matches!(self, TaskbarPosition::Top | TaskbarPosition::Bottom)
    }
}

impl fmt::Display for TaskbarPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskbarPosition::Top => write!(f, "top"),
            TaskbarPosition::Bottom => write!(f, "bottom"),
            TaskbarPosition::Left => write!(f, "left"),
            TaskbarPosition::Right => write!(f, "right"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10, 20, 100, 50);
        assert_eq!(r.right(), 110);
        assert_eq!(r.bottom(), 70);
        assert_eq!(r.center(), Point::new(60, 45));
    }

    #[test]
    fn contains_is_edge_inclusive() {
        let r = Rect::new(0, 0, 10, 10);
        assert!(r.contains(Point::new(0, 0)));
        assert!(r.contains(Point::new(10, 10)));
        assert!(!r.contains(Point::new(11, 5)));
        assert!(!r.contains(Point::new(5, -1)));
    }

    #[test]
    fn intersects_excludes_touching_edges() {
        let a = Rect::new(0, 0, 10, 10);
        assert!(a.intersects(&Rect::new(5, 5, 10, 10)));
        assert!(!a.intersects(&Rect::new(10, 0, 10, 10)));
    }

    #[test]
    fn distance_sq_outside_and_inside() {
        let r = Rect::new(0, 0, 10, 10);
        assert_eq!(r.distance_sq(Point::new(5, 5)), 0);
        assert_eq!(r.distance_sq(Point::new(13, 14)), 9 + 16);
        assert_eq!(r.distance_sq(Point::new(-2, 5)), 4);
    }

    #[test]
    fn taskbar_position_display() {
        assert_eq!(TaskbarPosition::Top.to_string(), "top");
        assert_eq!(TaskbarPosition::Right.to_string(), "right");
        assert!(TaskbarPosition::Bottom.is_horizontal());
        assert!(!TaskbarPosition::Left.is_horizontal());
    }
}
