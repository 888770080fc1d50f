//! Axis-aligned overlap tests
//!
//! Every hit in the game is an AABB test between centred boxes; there is no
//! penetration resolution.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned box described by its centre and full size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Box anchored at bottom-centre (sprites standing on a level line)
    pub fn from_bottom_center(bottom: Vec2, size: Vec2) -> Self {
        Self {
            center: Vec2::new(bottom.x, bottom.y - size.y / 2.0),
            size,
        }
    }

    pub fn square(center: Vec2, side: f32) -> Self {
        Self::new(center, Vec2::splat(side))
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size / 2.0
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size / 2.0
    }

    /// Shrink or grow around the centre
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            center: self.center,
            size: self.size * factor,
        }
    }

    /// Strict overlap; boxes that only touch edges do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        let (a_min, a_max) = (self.min(), self.max());
        let (b_min, b_max) = (other.min(), other.max());
        a_min.x < b_max.x && b_min.x < a_max.x && a_min.y < b_max.y && b_min.y < a_max.y
    }

    pub fn contains(&self, point: Vec2) -> bool {
        let (min, max) = (self.min(), self.max());
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }
}

/// True once `x` has left `[0, width]` by more than `margin` on either side
#[inline]
pub fn outside_horizontal(x: f32, width: f32, margin: f32) -> bool {
    x < -margin || x > width + margin
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap_and_touching() {
        let a = Aabb::square(Vec2::new(0.0, 0.0), 10.0);
        let b = Aabb::square(Vec2::new(8.0, 0.0), 10.0);
        let c = Aabb::square(Vec2::new(10.0, 0.0), 10.0);

        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        // Edges touching only
        assert!(!a.overlaps(&c));
    }

    #[test]
    fn test_bottom_center_anchor() {
        let b = Aabb::from_bottom_center(Vec2::new(100.0, 200.0), Vec2::splat(50.0));
        assert_eq!(b.max().y, 200.0);
        assert_eq!(b.min().y, 150.0);
        assert!(b.contains(Vec2::new(100.0, 175.0)));
    }

    #[test]
    fn test_scaled_hitbox_misses_corner() {
        let player = Aabb::square(Vec2::ZERO, 50.0).scaled(0.8);
        let grazing = Aabb::square(Vec2::new(44.0, 0.0), 30.0).scaled(0.8);
        assert!(!player.overlaps(&grazing));
    }

    #[test]
    fn test_outside_horizontal() {
        assert!(!outside_horizontal(-59.0, 800.0, 60.0));
        assert!(outside_horizontal(-61.0, 800.0, 60.0));
        assert!(outside_horizontal(861.0, 800.0, 60.0));
    }
}
