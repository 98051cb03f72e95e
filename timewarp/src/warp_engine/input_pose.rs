use glam::{Quat, Vec2, Vec3};

use crate::InputConfig;

/// Returns the rotation implied by pointer motion that happened after a view
/// got rendered.
///
/// Moving right turns right (yaw around world-up) and moving up looks up
/// (pitch around the rendered view's right axis).
pub fn input_rotation(
    config: &InputConfig,
    pointer_delta: Vec2,
    rendered_orientation: Quat,
) -> Quat {
    if !config.enabled
        || (config.yaw_deg_per_unit == 0.0 && config.pitch_deg_per_unit == 0.0)
    {
        return Quat::IDENTITY;
    }

    let yaw_deg = pointer_delta.x * config.yaw_deg_per_unit;
    let pitch_deg = -pointer_delta.y * config.pitch_deg_per_unit;

    let yaw = Quat::from_axis_angle(Vec3::Y, (-yaw_deg).to_radians());

    let pitch_axis = (rendered_orientation * Vec3::X)
        .try_normalize()
        .unwrap_or(Vec3::X);

    let pitch = Quat::from_axis_angle(pitch_axis, pitch_deg.to_radians());

    pitch * yaw
}
