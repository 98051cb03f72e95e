mod atomic_float;
mod double_buffered;

pub use self::atomic_float::*;
pub use self::double_buffered::*;
