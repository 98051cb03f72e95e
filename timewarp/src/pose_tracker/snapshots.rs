use glam::{Mat4, Quat, Vec2, Vec3};

use crate::{EulerDegrees, Pose, RenderedView, ViewRect};

/// Latest pose published by the producer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PoseSnapshot {
    pub valid: bool,
    pub pose: Pose,
    pub captured_at: f64,
}

impl PoseSnapshot {
    pub fn new(pose: Pose, captured_at: f64) -> Self {
        Self {
            valid: true,
            pose,
            captured_at,
        }
    }

    pub fn pose(&self) -> Option<Pose> {
        self.valid.then_some(self.pose)
    }
}

/// State a view was rendered with, captured when its rendering begins.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderedViewSnapshot {
    pub valid: bool,
    pub rendered_orientation: Quat,
    pub rendered_position: Vec3,
    pub pre_view_translation: Vec3,

    /// Pointer totals at the moment of rendering.
    pub pointer_total: Vec2,

    pub projection: Mat4,
    pub inverse_projection: Mat4,
    pub view_rect: ViewRect,
    pub feature_level: u32,
}

impl RenderedViewSnapshot {
    pub fn new(view: &RenderedView, pointer_total: Vec2) -> Self {
        Self {
            valid: true,
            rendered_orientation: view.pose.orientation,
            rendered_position: view.pose.position,
            pre_view_translation: view.pre_view_translation,
            pointer_total,
            projection: view.projection,
            inverse_projection: view.projection.inverse(),
            view_rect: view.view_rect,
            feature_level: view.feature_level,
        }
    }

    pub fn rendered_pose(&self) -> Pose {
        Pose::new(self.rendered_position, self.rendered_orientation)
    }
}

/// Warp applied to a view, published for introspection.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DeltaSnapshot {
    pub delta_orientation: EulerDegrees,
    pub delta_translation: Vec3,
    pub depth_available: bool,
    pub translation_enabled: bool,

    /// Zero when the view got passed through unwarped.
    pub weight: f32,
}
