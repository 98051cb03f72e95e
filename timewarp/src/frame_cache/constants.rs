use glam::{Mat4, Quat, UVec2, Vec3, Vec4};
use timewarp_gpu::Frame;

use crate::{Pose, RenderedView, ViewRect};

/// Geometry of a cached frame, sufficient to reproject it later on.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CachedFrameConstants {
    pub valid: bool,
    pub view_rect: ViewRect,
    pub buffer_extent: UVec2,
    pub rendered_orientation: Quat,
    pub rendered_position: Vec3,
    pub pre_view_translation: Vec3,
    pub projection: Mat4,
    pub inverse_projection: Mat4,

    /// Maps `(pixel.x, pixel.y, device_z)` into translated-world
    /// coordinates.
    pub screen_to_world: Mat4,

    pub feature_level: u32,
    pub depth_available: bool,
    pub capture_frame: Frame,
    pub capture_time: f64,
}

impl CachedFrameConstants {
    pub fn new(
        view: &RenderedView,
        extent: UVec2,
        depth_available: bool,
        capture_frame: Frame,
        capture_time: f64,
    ) -> Self {
        let view_rect = view.view_rect.or_extent(extent);

        Self {
            valid: true,
            view_rect,
            buffer_extent: extent,
            rendered_orientation: view.pose.orientation,
            rendered_position: view.pose.position,
            pre_view_translation: view.pre_view_translation,
            projection: view.projection,
            inverse_projection: view.projection.inverse(),
            screen_to_world: screen_to_world(
                view.world_to_clip(),
                view_rect,
            ),
            feature_level: view.feature_level,
            depth_available,
            capture_frame,
            capture_time,
        }
    }

    pub fn rendered_pose(&self) -> Pose {
        Pose::new(self.rendered_position, self.rendered_orientation)
    }

    pub fn age_ms(&self, now: f64) -> f64 {
        (now - self.capture_time) * 1000.0
    }
}

/// Builds a matrix mapping `(pixel.x, pixel.y, device_z)` within
/// `view_rect` back into the space `world_to_clip` projects from.
pub fn screen_to_world(world_to_clip: Mat4, view_rect: ViewRect) -> Mat4 {
    let min = view_rect.min.as_vec2();
    let size = view_rect.size().max(UVec2::ONE).as_vec2();

    let pixel_to_ndc = Mat4::from_cols(
        Vec4::new(2.0 / size.x, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -2.0 / size.y, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(
            -1.0 - 2.0 * min.x / size.x,
            1.0 + 2.0 * min.y / size.y,
            0.0,
            1.0,
        ),
    );

    world_to_clip.inverse() * pixel_to_ndc
}
