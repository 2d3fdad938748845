//! World-space geometry shared by the app shell and the content layer.
//!
//! World coordinates are map pixels with y growing downward, matching the
//! source space of tile layers and map objects.

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle anchored at its top-left corner.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_top_left(top_left: Vec2, width: f32, height: f32) -> Self {
        Self::new(top_left.x, top_left.y, width, height)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Bottom edge midpoint, the anchor used for footprint rectangles.
    pub fn midbottom(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.bottom())
    }

    pub fn set_top_left(&mut self, top_left: Vec2) {
        self.x = top_left.x;
        self.y = top_left.y;
    }

    pub fn set_midbottom(&mut self, midbottom: Vec2) {
        self.x = midbottom.x - self.width * 0.5;
        self.y = midbottom.y - self.height;
    }

    /// Strict overlap test: rectangles that only share an edge do not
    /// intersect, and zero-sized rectangles never intersect anything.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Index of the first rectangle in `rects` that overlaps `self`.
    pub fn first_intersection(&self, rects: &[Rect]) -> Option<usize> {
        rects.iter().position(|rect| self.intersects(rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlapping_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(a.intersects(&b));
        assert!(b.intersects(&a));
    }

    #[test]
    fn edge_touching_rects_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right_neighbor = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below_neighbor = Rect::new(0.0, 10.0, 10.0, 10.0);
        assert!(!a.intersects(&right_neighbor));
        assert!(!a.intersects(&below_neighbor));
    }

    #[test]
    fn zero_sized_rect_never_intersects() {
        let point_rect = Rect::new(5.0, 5.0, 0.0, 0.0);
        let area = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!point_rect.intersects(&area));
        assert!(!area.intersects(&point_rect));
    }

    #[test]
    fn midbottom_round_trips_through_set() {
        let mut rect = Rect::new(0.0, 0.0, 11.5, 8.0);
        rect.set_midbottom(Vec2::new(20.0, 40.0));
        assert_eq!(rect.midbottom(), Vec2::new(20.0, 40.0));
        assert_eq!(rect.x, 20.0 - 11.5 * 0.5);
        assert_eq!(rect.y, 32.0);
    }

    #[test]
    fn contains_point_is_half_open() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.contains_point(Vec2::new(0.0, 0.0)));
        assert!(rect.contains_point(Vec2::new(9.9, 9.9)));
        assert!(!rect.contains_point(Vec2::new(10.0, 0.0)));
        assert!(!rect.contains_point(Vec2::new(0.0, 10.0)));
    }

    #[test]
    fn first_intersection_returns_earliest_index() {
        let probe = Rect::new(4.0, 4.0, 4.0, 4.0);
        let rects = [
            Rect::new(100.0, 100.0, 5.0, 5.0),
            Rect::new(0.0, 0.0, 6.0, 6.0),
            Rect::new(5.0, 5.0, 6.0, 6.0),
        ];
        assert_eq!(probe.first_intersection(&rects), Some(1));
        assert_eq!(probe.first_intersection(&rects[..1]), None);
    }
}
