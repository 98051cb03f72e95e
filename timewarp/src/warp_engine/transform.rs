use glam::{Mat4, UVec2, Vec3};
use timewarp_gpu::{CachedWarpParams, PresentWarpParams, WarpParams};

use crate::{
    CachedFrameConstants, Config, LatchedWarpState, Pose, RenderedViewSnapshot,
};

/// Matrices describing how to move rendered content toward the latest
/// (clamped) pose.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpTransform {
    /// Translated-world to clip space of the latest view, using the
    /// projection the content got rendered with.
    pub world_to_latest_clip: Mat4,

    /// Inverse of the clamped delta rotation.
    pub delta_rotation_inv: Mat4,
}

impl WarpTransform {
    pub fn new(
        rendered: Pose,
        pre_view_translation: Vec3,
        projection: Mat4,
        state: &LatchedWarpState,
    ) -> Self {
        let latest = Pose::new(
            rendered.position + state.delta_translation,
            state.delta_orientation * rendered.orientation,
        );

        Self {
            world_to_latest_clip: projection
                * latest.view_matrix(pre_view_translation),
            delta_rotation_inv: Mat4::from_quat(
                state.delta_orientation.inverse(),
            ),
        }
    }

    pub fn warp_params(
        &self,
        projection: Mat4,
        state: &LatchedWarpState,
    ) -> WarpParams {
        WarpParams::new(
            self.world_to_latest_clip,
            self.delta_rotation_inv,
            projection,
            state.weight,
            state.translation_enabled,
        )
    }

    pub fn cached_warp_params(
        &self,
        constants: &CachedFrameConstants,
        state: &LatchedWarpState,
        config: &Config,
    ) -> CachedWarpParams {
        CachedWarpParams {
            screen_to_world: constants.screen_to_world,
            world_to_latest_clip: self.world_to_latest_clip,
            delta_rotation_inv: self.delta_rotation_inv,
            view_to_clip: constants.projection,
            clip_to_view: constants.inverse_projection,
            view_rect: CachedWarpParams::view_rect(
                constants.view_rect.min,
                constants.view_rect.size(),
            ),
            buffer: CachedWarpParams::buffer(constants.buffer_extent),
            data: CachedWarpParams::data(
                state.weight,
                state.translation_enabled && constants.depth_available,
                config.present.hud_mask_threshold,
                config.debug.overlay,
            ),
        }
    }
}

/// Builds parameters of the rotation-only warp applied to the final back
/// buffer.
pub fn present_warp_params(
    snapshot: &RenderedViewSnapshot,
    state: &LatchedWarpState,
    back_buffer: UVec2,
) -> PresentWarpParams {
    let view_rect = snapshot.view_rect.or_extent(back_buffer);

    PresentWarpParams::new(
        snapshot.projection,
        Mat4::from_quat(state.delta_orientation.inverse()),
        CachedWarpParams::view_rect(view_rect.min, view_rect.size()),
        back_buffer,
        state.weight,
    )
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use glam::{uvec2, vec2, vec3, Quat, Vec4Swizzles};

    use super::*;
    use crate::{EulerDegrees, RenderedView, ViewRect};

    fn projection() -> Mat4 {
        Mat4::perspective_rh(60.0_f32.to_radians(), 16.0 / 9.0, 0.1, 100.0)
    }

    fn view() -> RenderedView {
        RenderedView {
            pose: Pose::new(vec3(1.0, 2.0, 3.0), Quat::from_rotation_y(0.4)),
            pre_view_translation: vec3(-1.0, 0.0, 0.0),
            projection: projection(),
            view_rect: ViewRect::from_extent(uvec2(1280, 720)),
            feature_level: 0,
        }
    }

    fn state(delta: EulerDegrees, delta_translation: Vec3) -> LatchedWarpState {
        LatchedWarpState {
            valid: true,
            delta,
            delta_orientation: delta.to_quat(),
            delta_translation,
            weight: 1.0,
            depth_available: true,
            translation_enabled: true,
        }
    }

    #[test]
    fn identity() {
        let view = view();

        let target = WarpTransform::new(
            view.pose,
            view.pre_view_translation,
            view.projection,
            &state(Default::default(), Vec3::ZERO),
        );

        assert_abs_diff_eq!(
            view.world_to_clip(),
            target.world_to_latest_clip,
            epsilon = 1e-5
        );

        assert_abs_diff_eq!(
            Mat4::IDENTITY,
            target.delta_rotation_inv,
            epsilon = 1e-6
        );
    }

    #[test]
    fn translation() {
        let view = view();
        let delta_translation = vec3(0.5, -0.25, 1.0);

        let target = WarpTransform::new(
            view.pose,
            view.pre_view_translation,
            view.projection,
            &state(Default::default(), delta_translation),
        );

        // Point straight ahead of the latest pose lands in the center
        let forward = view.pose.orientation * -Vec3::Z;

        let point = view.pose.position
            + delta_translation
            + view.pre_view_translation
            + forward * 5.0;

        let clip = target.world_to_latest_clip * point.extend(1.0);

        assert_abs_diff_eq!(vec2(0.0, 0.0), clip.xy() / clip.w, epsilon = 1e-5);
    }

    #[test]
    fn rotation() {
        let view = view();
        let delta = EulerDegrees::new(10.0, 0.0, 0.0);

        let target = WarpTransform::new(
            view.pose,
            view.pre_view_translation,
            view.projection,
            &state(delta, Vec3::ZERO),
        );

        // Latest view looks further left; what's straight ahead of it lands
        // in the center
        let forward = delta.to_quat() * (view.pose.orientation * -Vec3::Z);

        let point =
            view.pose.position + view.pre_view_translation + forward * 5.0;

        let clip = target.world_to_latest_clip * point.extend(1.0);

        assert_abs_diff_eq!(vec2(0.0, 0.0), clip.xy() / clip.w, epsilon = 1e-5);

        assert_abs_diff_eq!(
            Mat4::from_quat(delta.to_quat().inverse()),
            target.delta_rotation_inv,
            epsilon = 1e-6
        );
    }

    #[test]
    fn cached_warp_params() {
        let view = view();
        let mut config = Config::default();

        config.present.hud_mask_threshold = 0.25;
        config.debug.overlay = true;

        let constants = CachedFrameConstants::new(
            &view,
            uvec2(1280, 720),
            false,
            Default::default(),
            0.0,
        );

        let state = state(Default::default(), Vec3::ZERO);

        let actual = WarpTransform::new(
            view.pose,
            view.pre_view_translation,
            view.projection,
            &state,
        )
        .cached_warp_params(&constants, &state, &config);

        assert_eq!(1.0, actual.weight());
        assert_eq!(0.25, actual.hud_mask_threshold());
        assert!(actual.debug_overlay());

        // No depth, no translation
        assert!(!actual.translation_enabled());

        // Unwarped pixels stay where they were
        let pixel = vec2(320.5, 100.5);

        let reprojected = actual
            .reproject_pixel(pixel, 0.5)
            .expect("point should be in front of the viewer");

        assert_abs_diff_eq!(pixel, reprojected, epsilon = 1e-2);
    }

    #[test]
    fn present_warp_params() {
        let snapshot = RenderedViewSnapshot::new(&view(), Default::default());

        let actual = super::present_warp_params(
            &snapshot,
            &LatchedWarpState {
                weight: 0.5,
                ..Default::default()
            },
            uvec2(1280, 720),
        );

        assert_eq!(0.5, actual.weight());
        assert_eq!(
            CachedWarpParams::view_rect(uvec2(0, 0), uvec2(1280, 720)),
            actual.view_rect
        );
    }
}
