use glam::{EulerRot, Mat4, Quat, UVec2, Vec3};

/// Maximum number of viewpoints (e.g. local players) that get tracked.
pub const MAX_VIEWS: usize = 4;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewId(usize);

impl ViewId {
    /// The view that drives scheduling decisions.
    pub const PRIMARY: Self = Self(0);

    pub fn new(id: usize) -> Self {
        Self(id)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Returns whether this view fits within [`MAX_VIEWS`]; operations on
    /// untracked views are no-ops.
    pub fn is_tracked(self) -> bool {
        self.0 < MAX_VIEWS
    }

    pub fn all() -> impl Iterator<Item = Self> {
        (0..MAX_VIEWS).map(Self)
    }
}

/// Position and orientation of a viewpoint.
///
/// Follows glam's conventions: right-handed, Y pointing up, -Z pointing
/// forward.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Returns the world-to-view matrix for this pose, with the world shifted
    /// by `pre_view_translation` first.
    pub fn view_matrix(&self, pre_view_translation: Vec3) -> Mat4 {
        Mat4::from_quat(self.orientation.inverse())
            * Mat4::from_translation(-(self.position + pre_view_translation))
    }
}

/// Rotation decomposed into per-axis angles, in degrees.
///
/// Yaw rotates around Y, pitch around X and roll around Z, applied in that
/// order.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EulerDegrees {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl EulerDegrees {
    pub fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn from_quat(rotation: Quat) -> Self {
        let (yaw, pitch, roll) = rotation.to_euler(EulerRot::YXZ);

        Self {
            yaw: yaw.to_degrees(),
            pitch: pitch.to_degrees(),
            roll: roll.to_degrees(),
        }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(
            EulerRot::YXZ,
            self.yaw.to_radians(),
            self.pitch.to_radians(),
            self.roll.to_radians(),
        )
    }

    /// Returns the largest absolute angle across all axes.
    pub fn max_abs(self) -> f32 {
        self.yaw.abs().max(self.pitch.abs()).max(self.roll.abs())
    }

    pub fn max_element(self) -> f32 {
        self.yaw.max(self.pitch).max(self.roll)
    }

    /// Clamps each axis independently into `-limit..=limit`; negative limits
    /// are treated as zero.
    pub fn clamp_abs(self, limit: Self) -> Self {
        fn clamp(value: f32, limit: f32) -> f32 {
            let limit = limit.max(0.0);

            value.clamp(-limit, limit)
        }

        Self {
            yaw: clamp(self.yaw, limit.yaw),
            pitch: clamp(self.pitch, limit.pitch),
            roll: clamp(self.roll, limit.roll),
        }
    }
}

/// Region of a render target a view was rendered into, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewRect {
    pub min: UVec2,
    pub max: UVec2,
}

impl ViewRect {
    pub fn new(min: UVec2, max: UVec2) -> Self {
        Self { min, max }
    }

    pub fn from_extent(extent: UVec2) -> Self {
        Self {
            min: UVec2::ZERO,
            max: extent,
        }
    }

    pub fn size(&self) -> UVec2 {
        UVec2::new(
            self.max.x.saturating_sub(self.min.x),
            self.max.y.saturating_sub(self.min.y),
        )
    }

    pub fn is_empty(&self) -> bool {
        let size = self.size();

        size.x == 0 || size.y == 0
    }

    /// Returns this rectangle, or the whole buffer if it's empty.
    pub fn or_extent(self, extent: UVec2) -> Self {
        if self.is_empty() {
            Self::from_extent(extent)
        } else {
            self
        }
    }
}

/// Geometry a view got rendered with.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderedView {
    pub pose: Pose,

    /// Offset applied to world positions before the view matrix, keeping
    /// large worlds precise; zero when not used.
    pub pre_view_translation: Vec3,

    pub projection: Mat4,
    pub view_rect: ViewRect,

    /// Opaque shading capability tag of the host renderer.
    pub feature_level: u32,
}

impl RenderedView {
    pub fn view_matrix(&self) -> Mat4 {
        self.pose.view_matrix(self.pre_view_translation)
    }

    pub fn world_to_clip(&self) -> Mat4 {
        self.projection * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{uvec2, vec3};

    use super::*;

    #[test]
    fn euler_degrees() {
        // ---
        // Case 1: Single-axis rotations

        let yaw = EulerDegrees::from_quat(Quat::from_rotation_y(
            5.0_f32.to_radians(),
        ));

        assert_relative_eq!(5.0, yaw.yaw, epsilon = 1e-4);
        assert_relative_eq!(0.0, yaw.pitch, epsilon = 1e-4);
        assert_relative_eq!(0.0, yaw.roll, epsilon = 1e-4);

        let pitch = EulerDegrees::from_quat(Quat::from_rotation_x(
            (-3.0_f32).to_radians(),
        ));

        assert_relative_eq!(-3.0, pitch.pitch, epsilon = 1e-4);
        assert_relative_eq!(0.0, pitch.yaw, epsilon = 1e-4);

        // ---
        // Case 2: Conversion back into a quaternion

        let angles = EulerDegrees::new(1.5, -0.5, 2.0);
        let actual = EulerDegrees::from_quat(angles.to_quat());

        assert_relative_eq!(angles.yaw, actual.yaw, epsilon = 1e-3);
        assert_relative_eq!(angles.pitch, actual.pitch, epsilon = 1e-3);
        assert_relative_eq!(angles.roll, actual.roll, epsilon = 1e-3);
    }

    #[test]
    fn euler_degrees_clamp_abs() {
        let angles = EulerDegrees::new(5.0, -4.0, 1.0);
        let limit = EulerDegrees::new(2.0, 2.0, 3.0);

        assert_eq!(
            EulerDegrees::new(2.0, -2.0, 1.0),
            angles.clamp_abs(limit)
        );

        assert_eq!(
            EulerDegrees::new(0.0, 0.0, 0.0),
            angles.clamp_abs(EulerDegrees::new(0.0, -1.0, 0.0))
        );

        assert_eq!(5.0, angles.max_abs());
        assert_eq!(3.0, limit.max_element());
    }

    #[test]
    fn view_rect() {
        let rect = ViewRect::new(uvec2(10, 20), uvec2(110, 70));

        assert_eq!(uvec2(100, 50), rect.size());
        assert!(!rect.is_empty());
        assert_eq!(rect, rect.or_extent(uvec2(640, 480)));

        assert_eq!(
            ViewRect::from_extent(uvec2(640, 480)),
            ViewRect::default().or_extent(uvec2(640, 480))
        );
    }

    #[test]
    fn view_matrix() {
        let pose = Pose::new(vec3(1.0, 2.0, 3.0), Quat::IDENTITY);

        let actual = pose
            .view_matrix(Vec3::ZERO)
            .transform_point3(vec3(1.0, 2.0, -2.0));

        assert!(actual.abs_diff_eq(vec3(0.0, 0.0, -5.0), 1e-5));

        let actual = pose
            .view_matrix(vec3(-1.0, -2.0, -3.0))
            .transform_point3(vec3(0.0, 0.0, -5.0));

        assert!(actual.abs_diff_eq(vec3(0.0, 0.0, -5.0), 1e-5));
    }
}
