//! Collision detection for 2D hitboxes
//!
//! Provides the strict overlap test, the resolution-axis heuristic used to
//! push dynamic entities out of blocks, and the per-frame contact flags.

use bitflags::bitflags;

use crate::shapes::Hitbox;
use plat2d_math::Vec2;

bitflags! {
    /// Sides of an entity that made contact with a block this frame
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ContactSides: u8 {
        /// Landed on top of a block
        const GROUND = 1 << 0;
        /// Hit the underside of a block
        const CEILING = 1 << 1;
        /// Pushed out to the right of a block (block on the left)
        const LEFT = 1 << 2;
        /// Pushed out to the left of a block (block on the right)
        const RIGHT = 1 << 3;
    }
}

/// Axis along which an overlapping entity is pushed out of a block
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Resolution decision for an overlapping pair
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Penetration {
    /// Axis chosen to resolve the overlap
    pub axis: Axis,
    /// Unit vector pointing from the entity toward the block along `axis`
    ///
    /// `(0, 1)` means the block is below the entity (landing), `(0, -1)`
    /// means the block is above it (head bump).
    pub direction: Vec2,
}

/// Test AABB vs AABB overlap using strict inequalities
pub fn aabb_overlaps(a: &Hitbox, b: &Hitbox) -> bool {
    a.min().x < b.max().x && a.max().x > b.min().x && a.min().y < b.max().y && a.max().y > b.min().y
}

/// Signed gap between two hitboxes on each axis
///
/// The gap is the distance between centers minus the combined half
/// extents. It is negative on an axis where the boxes interpenetrate and
/// measures how deep they do so.
pub fn separation(a: &Hitbox, b: &Hitbox) -> Vec2 {
    let delta = (b.center() - a.center()).abs();
    delta - (a.half_extents() + b.half_extents())
}

/// Choose the axis used to push `entity` out of `block`
///
/// The gaps are truncated with `floor` before they are compared, and ties
/// go to the horizontal axis. Near-diagonal approaches are therefore
/// resolved sideways consistently.
pub fn penetration_axis(entity: &Hitbox, block: &Hitbox) -> Penetration {
    let gap = separation(entity, block).floor();
    let delta = block.center() - entity.center();

    if gap.x >= gap.y {
        let direction = if delta.x >= 0.0 { Vec2::X } else { -Vec2::X };
        Penetration {
            axis: Axis::Horizontal,
            direction,
        }
    } else {
        let direction = if delta.y >= 0.0 { Vec2::Y } else { -Vec2::Y };
        Penetration {
            axis: Axis::Vertical,
            direction,
        }
    }
}
