use bytemuck::{Pod, Zeroable};

/// Identifier of a presented frame.
///
/// Zero is reserved for "no frame yet", so freshly created markers and
/// invalidated latches never compare equal to a real frame.
#[repr(C)]
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Pod,
    Zeroable,
)]
pub struct Frame(u32);

impl Frame {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn is_some(self) -> bool {
        self.0 != 0
    }

    pub fn is_none(self) -> bool {
        !self.is_some()
    }

    /// Returns the frame following this one, skipping over zero on wrap.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1).max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next() {
        assert_eq!(Frame::new(1), Frame::default().next());
        assert_eq!(Frame::new(8), Frame::new(7).next());
        assert_eq!(Frame::new(1), Frame::new(u32::MAX).next());
    }

    #[test]
    fn is_some() {
        assert!(Frame::default().is_none());
        assert!(Frame::new(3).is_some());
    }
}
