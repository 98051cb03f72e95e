mod error;
mod keys;

use std::fmt;
use std::str::FromStr;

pub use self::error::*;
use crate::EulerDegrees;

/// When reprojection gets applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    Off,
    On,

    /// Only when warping is likely to be invisible: small motion, stable
    /// frame rate and enough refresh-rate headroom.
    #[default]
    Auto,
}

/// Where in the host's pipeline the fresh-frame warp runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WarpPoint {
    EndOfPostProcess,

    #[default]
    PostRenderViewFamily,
}

/// How full renders and warps are mixed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TimewarpMode {
    /// Every frame renders the world; the cache is never filled.
    FullRender,

    /// World rendering stops as soon as a usable frame got cached.
    FreezeAndWarp,

    /// World gets rendered at the target rate; cached frames are presented
    /// as-is.
    DecimatedNoWarp,

    /// World gets rendered at the target rate; cached frames are warped
    /// toward the latest pose.
    #[default]
    DecimatedAndWarp,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Config {
    pub warp: WarpConfig,
    pub present: PresentConfig,
    pub auto: AutoConfig,
    pub input: InputConfig,
    pub debug: DebugConfig,
}

impl Config {
    /// Returns whether full renders should be stored in the frame cache.
    pub fn is_async_pipeline_enabled(&self) -> bool {
        self.present.enabled
            || self.warp.timewarp_mode != TimewarpMode::FullRender
    }

    /// Returns whether world rendering should stop once a usable frame is
    /// cached.
    pub fn is_world_frozen(&self) -> bool {
        self.present.freeze
            || self.warp.timewarp_mode == TimewarpMode::FreezeAndWarp
    }

    /// Returns whether cached frames get warped at all.
    pub fn warps_cached_frames(&self) -> bool {
        self.warp.timewarp_mode != TimewarpMode::DecimatedNoWarp
    }

    /// Returns the display refresh-rate override, if set.
    pub fn refresh_hz_override(&self) -> Option<f32> {
        Some(self.debug.refresh_hz_override).filter(|hz| *hz > 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WarpConfig {
    pub mode: Mode,
    pub point: WarpPoint,
    pub timewarp_mode: TimewarpMode,
    pub rotation: bool,
    pub translation: bool,

    /// Disables translation for views rendered without a depth buffer.
    pub require_depth_for_translation: bool,

    /// Runs an additional rotation-only warp over the final back buffer.
    pub after_ui: bool,

    pub max_yaw_deg: f32,
    pub max_pitch_deg: f32,
    pub max_roll_deg: f32,
    pub max_translation: f32,
}

impl WarpConfig {
    pub fn max_rotation(&self) -> EulerDegrees {
        EulerDegrees::new(
            self.max_yaw_deg,
            self.max_pitch_deg,
            self.max_roll_deg,
        )
    }
}

impl Default for WarpConfig {
    fn default() -> Self {
        Self {
            mode: Default::default(),
            point: Default::default(),
            timewarp_mode: Default::default(),
            rotation: true,
            translation: true,
            require_depth_for_translation: true,
            after_ui: false,
            max_yaw_deg: 2.0,
            max_pitch_deg: 2.0,
            max_roll_deg: 3.0,
            max_translation: 5.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PresentConfig {
    /// Enables decimation: skipping world renders and presenting the cache.
    pub enabled: bool,

    pub target_fps: f32,

    /// Keeps presenting the cache for as long as it stays usable.
    pub freeze: bool,

    pub max_cache_age_ms: f32,

    /// Presents cached frames before the UI gets composited, so the HUD
    /// stays unwarped.
    pub allow_hud_stable: bool,

    pub reproject_movement: bool,
    pub hud_mask_threshold: f32,
}

impl Default for PresentConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            target_fps: 30.0,
            freeze: false,
            max_cache_age_ms: 250.0,
            allow_hud_stable: true,
            reproject_movement: true,
            hud_mask_threshold: 0.08,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AutoConfig {
    pub min_refresh_delta_hz: f32,
    pub fps_window_ms: f32,
    pub max_fps_std_dev: f32,
    pub max_warp_deg: f32,
    pub max_translation: f32,
}

impl Default for AutoConfig {
    fn default() -> Self {
        Self {
            min_refresh_delta_hz: 10.0,
            fps_window_ms: 500.0,
            max_fps_std_dev: 1.5,
            max_warp_deg: 1.5,
            max_translation: 3.0,
        }
    }
}

/// Rotation derived from pointer motion that happened after a view got
/// rendered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InputConfig {
    pub enabled: bool,
    pub yaw_deg_per_unit: f32,
    pub pitch_deg_per_unit: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            yaw_deg_per_unit: 0.02,
            pitch_deg_per_unit: 0.02,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DebugConfig {
    pub overlay: bool,

    /// Keeps reusing the first computed warp until the latch gets
    /// invalidated.
    pub freeze_warp: bool,

    /// Overrides the platform-reported refresh rate when above 1 Hz.
    pub refresh_hz_override: f32,
}

macro_rules! named_enum {
    ($ty:ident { $($variant:ident => $name:literal),* $(,)? }) => {
        impl $ty {
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name),*
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = ();

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($name) {
                        return Ok(Self::$variant);
                    }
                )*

                Err(())
            }
        }
    };
}

named_enum!(Mode {
    Off => "off",
    On => "on",
    Auto => "auto",
});

named_enum!(WarpPoint {
    EndOfPostProcess => "end-of-post-process",
    PostRenderViewFamily => "post-render-view-family",
});

named_enum!(TimewarpMode {
    FullRender => "full-render",
    FreezeAndWarp => "freeze-and-warp",
    DecimatedNoWarp => "decimated-no-warp",
    DecimatedAndWarp => "decimated-and-warp",
});
