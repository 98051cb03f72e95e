mod log_throttle;
mod metrics;

pub use self::log_throttle::*;
pub use self::metrics::*;
