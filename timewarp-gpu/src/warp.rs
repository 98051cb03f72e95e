use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3, Vec4, Vec4Swizzles};

use crate::{flag, rotate_ndc, TIMEWARP_EPSILON};

/// Parameters of the warp applied to a freshly rendered frame.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct WarpParams {
    /// Translated-world to clip space, as seen from the latest (clamped)
    /// pose.
    pub world_to_latest_clip: Mat4,

    /// Inverse of the clamped delta rotation.
    pub delta_rotation_inv: Mat4,

    pub view_to_clip: Mat4,
    pub clip_to_view: Mat4,

    /// x - blend weight
    /// y - whether depth-based translation is enabled (as bits)
    pub data: Vec4,
}

impl WarpParams {
    pub fn new(
        world_to_latest_clip: Mat4,
        delta_rotation_inv: Mat4,
        view_to_clip: Mat4,
        weight: f32,
        translation_enabled: bool,
    ) -> Self {
        Self {
            world_to_latest_clip,
            delta_rotation_inv,
            view_to_clip,
            clip_to_view: view_to_clip.inverse(),
            data: Vec4::new(weight, flag(translation_enabled), 0.0, 0.0),
        }
    }

    pub fn weight(&self) -> f32 {
        self.data.x
    }

    pub fn translation_enabled(&self) -> bool {
        self.data.y.to_bits() != 0
    }

    /// Given a point in rendered clip-space (NDC), returns where it lands
    /// after compensating for the delta rotation alone.
    pub fn reproject_rotation(&self, ndc: Vec2) -> Vec2 {
        let warped = rotate_ndc(
            self.view_to_clip,
            self.clip_to_view,
            self.delta_rotation_inv,
            ndc,
        );

        ndc.lerp(warped, self.weight())
    }

    /// Given a point in translated-world coordinates, returns where it lands
    /// in the latest view (NDC); `None` if it ends up behind the viewer.
    pub fn reproject_point(&self, pos: Vec3) -> Option<Vec2> {
        let clip = self.world_to_latest_clip * pos.extend(1.0);

        if clip.w <= TIMEWARP_EPSILON {
            return None;
        }

        Some(clip.xy() / clip.w)
    }
}
