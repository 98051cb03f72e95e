use crate::TIMEWARP_EPSILON;

pub trait F32Ext
where
    Self: Sized,
{
    fn sqr(self) -> Self;
    fn saturate(self) -> Self;

    /// Returns a factor that stays at one while `self` is within `limit` and
    /// falls off linearly to zero at 1.5x the limit; non-positive limits
    /// disable the falloff.
    fn fade_past(self, limit: Self) -> Self;
}

impl F32Ext for f32 {
    fn sqr(self) -> Self {
        self * self
    }

    fn saturate(self) -> Self {
        self.clamp(0.0, 1.0)
    }

    fn fade_past(self, limit: Self) -> Self {
        if limit <= 0.0 {
            return 1.0;
        }

        let excess =
            ((self - limit) / (0.5 * limit + TIMEWARP_EPSILON)).max(0.0);

        (1.0 - excess).saturate()
    }
}
