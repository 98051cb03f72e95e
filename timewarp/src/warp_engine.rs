mod input_pose;
mod transform;

use glam::{Quat, Vec2, Vec3};
use timewarp_gpu::F32Ext;

pub use self::input_pose::*;
pub use self::transform::*;
use crate::{Config, DeltaSnapshot, EulerDegrees, FrameStats, Mode, Pose};

/// Where the content being warped comes from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum WarpSource {
    /// Frame rendered during the current frame.
    #[default]
    Fresh,

    /// Frame re-presented from the cache.
    Cached,
}

/// Everything [`WarpEngine::evaluate()`] needs to know about a view.
#[derive(Clone, Copy, Debug, Default)]
pub struct WarpInputs {
    pub source: WarpSource,

    /// Pose the content got rendered with.
    pub rendered: Pose,

    /// Latest known pose; `None` when the tracker has nothing yet.
    pub latest: Option<Pose>,

    /// Pointer motion that happened after rendering.
    pub pointer_delta: Option<Vec2>,

    pub depth_available: bool,

    /// Age of the cached content; ignored for [`WarpSource::Fresh`].
    pub cache_age_ms: f64,

    pub stats: FrameStats,
}

/// Warp decided for a view, reused for the rest of the frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatchedWarpState {
    /// Whether the warp should actually run; when `false`, the content gets
    /// passed through unwarped.
    pub valid: bool,

    /// Clamped delta rotation.
    pub delta: EulerDegrees,

    /// Same as `delta`, as a quaternion.
    pub delta_orientation: Quat,

    /// Clamped delta translation.
    pub delta_translation: Vec3,

    pub weight: f32,
    pub depth_available: bool,
    pub translation_enabled: bool,
}

impl LatchedWarpState {
    pub fn to_delta_snapshot(&self) -> DeltaSnapshot {
        DeltaSnapshot {
            delta_orientation: self.delta,
            delta_translation: self.delta_translation,
            depth_available: self.depth_available,
            translation_enabled: self.translation_enabled,
            weight: self.weight,
        }
    }
}

impl Default for LatchedWarpState {
    fn default() -> Self {
        Self {
            valid: false,
            delta: Default::default(),
            delta_orientation: Quat::IDENTITY,
            delta_translation: Vec3::ZERO,
            weight: 0.0,
            depth_available: false,
            translation_enabled: false,
        }
    }
}

/// Turns the difference between the rendered and the latest pose into a
/// clamped, faded warp.
#[derive(Clone, Copy, Debug)]
pub struct WarpEngine<'a> {
    config: &'a Config,
}

impl<'a> WarpEngine<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, inputs: &WarpInputs) -> LatchedWarpState {
        let warp = &self.config.warp;
        let cached = inputs.source == WarpSource::Cached;

        let translation_enabled = self.reprojects_movement(inputs.source)
            && (!warp.require_depth_for_translation || inputs.depth_available);

        let Some(latest) = inputs.latest else {
            return LatchedWarpState {
                depth_available: inputs.depth_available,
                translation_enabled,
                ..Default::default()
            };
        };

        let (delta_orientation, delta_translation) =
            self.raw_delta(inputs, latest);

        let delta = EulerDegrees::from_quat(delta_orientation);
        let max_rotation = delta.max_abs();
        let translation = delta_translation.length();

        let mut weight = if cached {
            self.cache_fade(inputs.cache_age_ms)
        } else {
            1.0
        };

        weight *= self.fade(max_rotation, translation);

        let active = (!cached || self.config.warps_cached_frames())
            && self.is_active(max_rotation, translation, &inputs.stats);

        let delta = delta.clamp_abs(warp.max_rotation());

        let delta_translation = if warp.max_translation > 0.0 {
            delta_translation.clamp_length_max(warp.max_translation)
        } else {
            delta_translation
        };

        let valid = active && weight > 0.0;

        LatchedWarpState {
            valid,
            delta,
            delta_orientation: delta.to_quat(),
            delta_translation,
            weight: if valid { weight } else { 0.0 },
            depth_available: inputs.depth_available,
            translation_enabled,
        }
    }

    /// Like [`Self::evaluate()`], but ignores translation, pointer motion and
    /// the cache; used for warping the final back buffer.
    pub fn evaluate_rotation(
        &self,
        rendered: Quat,
        latest: Option<Quat>,
        stats: &FrameStats,
    ) -> LatchedWarpState {
        if !self.config.warp.rotation {
            return Default::default();
        }

        let Some(latest) = latest else {
            return Default::default();
        };

        let delta = EulerDegrees::from_quat(latest * rendered.inverse());
        let max_rotation = delta.max_abs();
        let weight = self.fade(max_rotation, 0.0);
        let active = self.is_active(max_rotation, 0.0, stats);
        let delta = delta.clamp_abs(self.config.warp.max_rotation());
        let valid = active && weight > 0.0;

        LatchedWarpState {
            valid,
            delta,
            delta_orientation: delta.to_quat(),
            weight: if valid { weight } else { 0.0 },
            ..Default::default()
        }
    }

    fn raw_delta(&self, inputs: &WarpInputs, latest: Pose) -> (Quat, Vec3) {
        let warp = &self.config.warp;
        let rendered = inputs.rendered;

        let mut delta_orientation =
            (latest.orientation * rendered.orientation.inverse()).normalize();

        if let Some(pointer_delta) = inputs.pointer_delta {
            let input = input_rotation(
                &self.config.input,
                pointer_delta,
                rendered.orientation,
            );

            delta_orientation = (input * delta_orientation).normalize();
        }

        if !warp.rotation {
            delta_orientation = Quat::IDENTITY;
        }

        let delta_translation = if self.reprojects_movement(inputs.source) {
            latest.position - rendered.position
        } else {
            Vec3::ZERO
        };

        (delta_orientation, delta_translation)
    }

    fn reprojects_movement(&self, source: WarpSource) -> bool {
        match source {
            WarpSource::Fresh => self.config.warp.translation,
            WarpSource::Cached => {
                self.config.warp.translation
                    && self.config.present.reproject_movement
            }
        }
    }

    /// Returns the warp strength for given raw motion; 1 within the clamps,
    /// fading to 0 at one and a half times the clamps.
    pub fn fade(&self, max_rotation: f32, translation: f32) -> f32 {
        let warp = &self.config.warp;

        max_rotation.fade_past(warp.max_rotation().max_element())
            * translation.fade_past(warp.max_translation)
    }

    /// Returns the warp strength for cached content of given age; 1 when
    /// the maximum age is unbounded.
    pub fn cache_fade(&self, age_ms: f64) -> f32 {
        let max_age_ms = self.config.present.max_cache_age_ms;

        if max_age_ms <= 0.0 {
            return 1.0;
        }

        (1.0 - (age_ms as f32) / max_age_ms).saturate()
    }

    pub fn is_active(
        &self,
        max_rotation: f32,
        translation: f32,
        stats: &FrameStats,
    ) -> bool {
        let auto = &self.config.auto;

        match self.config.warp.mode {
            Mode::Off => false,
            Mode::On => true,

            Mode::Auto => {
                stats.refresh_hz > 1.0
                    && stats.refresh_hz - stats.fps >= auto.min_refresh_delta_hz
                    && stats.fps_std_dev <= auto.max_fps_std_dev
                    && max_rotation <= auto.max_warp_deg
                    && translation <= auto.max_translation
            }
        }
    }
}
