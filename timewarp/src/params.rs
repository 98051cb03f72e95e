use std::fmt::Debug;

use glam::UVec2;

use crate::{Pose, ViewId, ViewRect};

/// Types provided by the host renderer.
pub trait Params {
    /// Handle of a GPU texture; cheap to clone.
    type Texture: Clone + Debug;

    /// Pixel format of a color texture.
    type Format: Copy + PartialEq + Debug;
}

/// GPU operations the engine asks the host renderer to record.
pub trait Backend<P>
where
    P: Params,
{
    fn create_color_texture(
        &mut self,
        label: &str,
        extent: UVec2,
        format: P::Format,
    ) -> P::Texture;

    /// Creates a single-channel texture holding device depth.
    fn create_depth_texture(&mut self, label: &str, extent: UVec2)
        -> P::Texture;

    fn copy_texture(&mut self, src: &P::Texture, dst: &P::Texture);

    /// Resolves the renderer's depth buffer into `dst`, limited to the
    /// given view rectangle.
    fn extract_depth(
        &mut self,
        src: &P::Texture,
        dst: &P::Texture,
        view_rect: ViewRect,
    );
}

/// Authoritative source of poses, sampled once per simulation tick.
pub trait PoseSource {
    fn sample_pose(&self, view: ViewId) -> Option<Pose>;

    /// Returns the display's refresh rate, if the platform knows it.
    fn refresh_rate_hz(&self) -> Option<f32> {
        None
    }
}

/// Source used when every pose gets submitted explicitly.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPoseSource;

impl PoseSource for NoPoseSource {
    fn sample_pose(&self, _: ViewId) -> Option<Pose> {
        None
    }
}

impl<F> PoseSource for F
where
    F: Fn(ViewId) -> Option<Pose>,
{
    fn sample_pose(&self, view: ViewId) -> Option<Pose> {
        (self)(view)
    }
}
