use bytemuck::{Pod, Zeroable};
use glam::{Mat4, UVec2, Vec2, Vec4};

use crate::rotate_ndc;

/// Parameters of the rotation-only warp applied to the final back buffer,
/// after the UI has been composited.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct PresentWarpParams {
    pub view_to_clip: Mat4,
    pub clip_to_view: Mat4,
    pub delta_rotation_inv: Mat4,

    /// xy - view rectangle's min corner
    /// zw - view rectangle's size
    pub view_rect: Vec4,

    /// x - blend weight
    /// yz - inverse back buffer size
    pub data: Vec4,
}

impl PresentWarpParams {
    pub fn new(
        view_to_clip: Mat4,
        delta_rotation_inv: Mat4,
        view_rect: Vec4,
        back_buffer: UVec2,
        weight: f32,
    ) -> Self {
        let back_buffer = back_buffer.as_vec2().max(Vec2::ONE);

        Self {
            view_to_clip,
            clip_to_view: view_to_clip.inverse(),
            delta_rotation_inv,
            view_rect,
            data: Vec4::new(
                weight,
                1.0 / back_buffer.x,
                1.0 / back_buffer.y,
                0.0,
            ),
        }
    }

    pub fn weight(&self) -> f32 {
        self.data.x
    }

    /// See: [`crate::WarpParams::reproject_rotation()`].
    pub fn reproject_rotation(&self, ndc: Vec2) -> Vec2 {
        let warped = rotate_ndc(
            self.view_to_clip,
            self.clip_to_view,
            self.delta_rotation_inv,
            ndc,
        );

        ndc.lerp(warped, self.weight())
    }
}
