use timewarp_gpu::Frame;

/// Lets a repeating diagnostic through at most once per
/// [`LogThrottle::INTERVAL`] frames.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogThrottle {
    last: Option<Frame>,
}

impl LogThrottle {
    pub const INTERVAL: u32 = 120;

    pub fn ready(&mut self, frame: Frame) -> bool {
        let ready = match self.last {
            Some(last) => {
                frame.get().wrapping_sub(last.get()) >= Self::INTERVAL
            }
            None => true,
        };

        if ready {
            self.last = Some(frame);
        }

        ready
    }
}
