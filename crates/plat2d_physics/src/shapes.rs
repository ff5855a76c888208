//! Collision shapes for 2D platformer physics
//!
//! The only shape is the axis-aligned [`Hitbox`]. A hitbox is described by
//! two offsets relative to an anchor (its owner's position) and caches the
//! resulting world-space corners. The owner calls [`Hitbox::reposition`]
//! every time its position changes; overlap tests read the cached corners.

use plat2d_math::Vec2;

/// A 2D axis-aligned bounding box anchored to an owning position
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hitbox {
    offset_min: Vec2,
    offset_max: Vec2,
    min: Vec2,
    max: Vec2,
}

impl Hitbox {
    /// Create a hitbox from two corner offsets and the current anchor
    ///
    /// Offsets are reordered per axis so that `offset_min <= offset_max`.
    pub fn new(offset_min: Vec2, offset_max: Vec2, anchor: Vec2) -> Self {
        // Non-finite offsets are kept as given so validation can see them
        let (lo, hi) = if offset_min.is_finite() && offset_max.is_finite() {
            (offset_min.min_components(offset_max), offset_min.max_components(offset_max))
        } else {
            (offset_min, offset_max)
        };
        Self {
            offset_min: lo,
            offset_max: hi,
            min: anchor + lo,
            max: anchor + hi,
        }
    }

    /// Create a hitbox covering `anchor .. anchor + size`
    ///
    /// The size is kept as given, so a negative size stays visible through
    /// [`Hitbox::size`] and registration can reject it.
    pub fn from_size(size: Vec2, anchor: Vec2) -> Self {
        Self {
            offset_min: Vec2::ZERO,
            offset_max: size,
            min: anchor,
            max: anchor + size,
        }
    }

    /// Recompute the world-space corners from a new anchor position
    pub fn reposition(&mut self, anchor: Vec2) {
        self.min = anchor + self.offset_min;
        self.max = anchor + self.offset_max;
    }

    /// Offset of the minimum corner relative to the anchor
    pub fn offset_min(&self) -> Vec2 {
        self.offset_min
    }

    /// Offset of the maximum corner relative to the anchor
    pub fn offset_max(&self) -> Vec2 {
        self.offset_max
    }

    /// World-space minimum corner (left, top)
    pub fn min(&self) -> Vec2 {
        self.min
    }

    /// World-space maximum corner (right, bottom)
    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// World-space center
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Full size in each dimension
    pub fn size(&self) -> Vec2 {
        self.offset_max - self.offset_min
    }

    /// Half the size in each dimension
    pub fn half_extents(&self) -> Vec2 {
        self.size() * 0.5
    }

    /// Strict overlap test against another hitbox
    ///
    /// Boxes that only share an edge do not overlap, so resting contact is
    /// never reported as penetration.
    pub fn overlaps(&self, other: &Hitbox) -> bool {
        crate::collision::aabb_overlaps(self, other)
    }

    /// True when every corner and offset is finite
    pub fn is_finite(&self) -> bool {
        self.offset_min.is_finite()
            && self.offset_max.is_finite()
            && self.min.is_finite()
            && self.max.is_finite()
    }
}
