//! Uniform blocks and reference math shared by the timewarp engine and the
//! warp shaders.

#![allow(clippy::manual_range_contains)]

mod cached_warp;
mod frame;
mod present_warp;
mod utils;
mod warp;

pub use self::cached_warp::*;
pub use self::frame::*;
pub use self::present_warp::*;
pub use self::utils::*;
pub use self::warp::*;

/// Guard added to divisors that can be configured down to zero.
pub const TIMEWARP_EPSILON: f32 = 1e-3;

/// Depth at which view rays get unprojected when only their direction
/// matters.
pub const RAY_DEPTH: f32 = 0.5;
