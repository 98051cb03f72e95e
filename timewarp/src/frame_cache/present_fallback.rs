use derivative::Derivative;
use glam::UVec2;

use crate::Params;

/// Copy of the last successfully presented back buffer, repeated whenever
/// the cache can't be presented.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct PresentFallback<P>
where
    P: Params,
{
    pub texture: P::Texture,
    pub extent: UVec2,
    pub format: P::Format,
    pub valid: bool,
}

impl<P> PresentFallback<P>
where
    P: Params,
{
    /// Returns whether this fallback can be copied over a back buffer of
    /// given shape.
    pub fn matches(&self, extent: UVec2, format: P::Format) -> bool {
        self.extent == extent && self.format == format
    }
}
