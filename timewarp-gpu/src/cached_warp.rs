use bytemuck::{Pod, Zeroable};
use glam::{vec2, Mat4, UVec2, Vec2, Vec4, Vec4Swizzles};

use crate::{flag, TIMEWARP_EPSILON};

/// Parameters of the warp that re-presents a cached frame toward the latest
/// pose.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
pub struct CachedWarpParams {
    /// Maps `(pixel.x, pixel.y, device_z)` of the cached frame into
    /// translated-world coordinates.
    pub screen_to_world: Mat4,
    pub world_to_latest_clip: Mat4,
    pub delta_rotation_inv: Mat4,
    pub view_to_clip: Mat4,
    pub clip_to_view: Mat4,

    /// xy - view rectangle's min corner
    /// zw - view rectangle's size
    pub view_rect: Vec4,

    /// xy - buffer size
    /// zw - inverse buffer size
    pub buffer: Vec4,

    /// x - blend weight
    /// y - whether depth-based translation is enabled (as bits)
    /// z - HUD mask threshold
    /// w - whether the debug overlay is enabled (as bits)
    pub data: Vec4,
}

impl CachedWarpParams {
    pub fn view_rect(min: UVec2, size: UVec2) -> Vec4 {
        min.as_vec2().extend(size.x as f32).extend(size.y as f32)
    }

    pub fn buffer(extent: UVec2) -> Vec4 {
        let size = extent.as_vec2().max(Vec2::ONE);

        size.extend(1.0 / size.x).extend(1.0 / size.y)
    }

    pub fn data(
        weight: f32,
        translation_enabled: bool,
        hud_mask_threshold: f32,
        debug_overlay: bool,
    ) -> Vec4 {
        Vec4::new(
            weight,
            flag(translation_enabled),
            hud_mask_threshold,
            flag(debug_overlay),
        )
    }

    pub fn weight(&self) -> f32 {
        self.data.x
    }

    pub fn translation_enabled(&self) -> bool {
        self.data.y.to_bits() != 0
    }

    pub fn hud_mask_threshold(&self) -> f32 {
        self.data.z
    }

    pub fn debug_overlay(&self) -> bool {
        self.data.w.to_bits() != 0
    }

    /// Given a pixel inside the view rectangle, returns it in NDC.
    pub fn pixel_to_ndc(&self, pixel: Vec2) -> Vec2 {
        let uv = (pixel - self.view_rect.xy()) / self.view_rect.zw();

        vec2(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0)
    }

    /// Given a point in NDC, returns the pixel it covers inside the view
    /// rectangle.
    pub fn ndc_to_pixel(&self, ndc: Vec2) -> Vec2 {
        let uv = vec2(0.5 * ndc.x + 0.5, 0.5 - 0.5 * ndc.y);

        self.view_rect.xy() + uv * self.view_rect.zw()
    }

    /// Given a cached pixel and its device depth, returns the pixel it lands
    /// on when seen from the latest pose; `None` if it ends up behind the
    /// viewer.
    pub fn reproject_pixel(&self, pixel: Vec2, device_z: f32) -> Option<Vec2> {
        let world = self.screen_to_world.project_point3(pixel.extend(device_z));
        let clip = self.world_to_latest_clip * world.extend(1.0);

        if clip.w <= TIMEWARP_EPSILON {
            return None;
        }

        Some(self.ndc_to_pixel(clip.xy() / clip.w))
    }
}
