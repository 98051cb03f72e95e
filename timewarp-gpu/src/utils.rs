mod f32_ext;

use glam::{Mat4, Vec2};

pub use self::f32_ext::*;
use crate::RAY_DEPTH;

/// Rotates a view ray passing through `ndc` and returns where it lands after
/// projecting it back onto the screen.
pub fn rotate_ndc(
    view_to_clip: Mat4,
    clip_to_view: Mat4,
    rotation: Mat4,
    ndc: Vec2,
) -> Vec2 {
    let dir = clip_to_view.project_point3(ndc.extend(RAY_DEPTH));
    let dir = rotation.transform_vector3(dir);

    view_to_clip.project_point3(dir).truncate()
}

/// Packs a flag into a float lane, the way shaders read it back through
/// `to_bits()`.
pub fn flag(value: bool) -> f32 {
    f32::from_bits(value as u32)
}
