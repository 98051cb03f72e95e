use timewarp_gpu::Frame;

use crate::LatchedWarpState;

/// Warp state decided during a specific frame.
#[derive(Clone, Copy, Debug, Default)]
pub struct Latch {
    frame: Frame,
    state: LatchedWarpState,
}

impl Latch {
    pub fn new(frame: Frame, state: LatchedWarpState) -> Self {
        Self { frame, state }
    }

    /// Returns the latched state if it was decided during `frame`.
    ///
    /// When `frozen`, a valid state keeps being returned across frames.
    pub fn get(&self, frame: Frame, frozen: bool) -> Option<LatchedWarpState> {
        if self.frame.is_none() {
            return None;
        }

        if self.frame == frame || (frozen && self.state.valid) {
            Some(self.state)
        } else {
            None
        }
    }
}
