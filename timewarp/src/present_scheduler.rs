use std::sync::atomic::{AtomicBool, Ordering};

use log::{info, trace};
use parking_lot::Mutex;
use timewarp_gpu::Frame;

use crate::{Config, FrameCache, LogThrottle, Params, ViewId};

/// Outcome of a single scheduling decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentDecision {
    /// Decimation is disabled; the host renders as it normally would.
    Passthrough,

    /// The world gets rendered this frame.
    Render,

    /// World rendering gets skipped; the cache gets presented instead.
    Skip,
}

impl PresentDecision {
    pub fn skips_world_rendering(self) -> bool {
        self == Self::Skip
    }
}

/// Decides, once per simulation tick, whether the upcoming frame renders the
/// world or re-presents the cached one.
#[derive(Debug, Default)]
pub struct PresentScheduler {
    force_render: AtomicBool,
    skip_world: AtomicBool,
    state: Mutex<SchedulerState>,
}

#[derive(Debug, Default)]
struct SchedulerState {
    last_render_at: Option<f64>,

    /// Whether the host's world rendering preference is currently being
    /// overridden by us.
    overriding: bool,

    last_logged: Option<(bool, bool)>,
    ticks: u32,
    log_throttle: LogThrottle,
}

impl PresentScheduler {
    /// Runs the decision for the upcoming frame.
    ///
    /// First match wins:
    ///
    /// - decimation disabled: passthrough (any override gets dropped),
    /// - forced by [`Self::report_cache_miss()`]: render,
    /// - no usable cached frame: render,
    /// - world frozen: skip,
    /// - otherwise render iff at least one period of `target_fps` elapsed
    ///   since the last render.
    pub fn tick<P>(
        &self,
        now: f64,
        config: &Config,
        cache: &FrameCache<P>,
    ) -> PresentDecision
    where
        P: Params,
    {
        let mut state = self.state.lock();

        if !config.present.enabled {
            self.skip_world.store(false, Ordering::SeqCst);

            if state.overriding {
                info!("Restoring world rendering preference");

                state.overriding = false;
            }

            state.last_logged = None;

            return PresentDecision::Passthrough;
        }

        let period = 1.0 / (config.present.target_fps.max(1.0) as f64);
        let forced = self.force_render.swap(false, Ordering::SeqCst);

        let has_cache = cache.has_cached_frame(ViewId::PRIMARY);

        let has_usable_cache = cache.has_usable_cached_frame(
            ViewId::PRIMARY,
            now,
            config.present.max_cache_age_ms,
        );

        let render = if forced || !has_usable_cache {
            true
        } else if config.is_world_frozen() {
            false
        } else {
            state
                .last_render_at
                .map_or(true, |last_render_at| now - last_render_at >= period)
        };

        if render {
            state.last_render_at = Some(now);
        }

        state.overriding = true;
        self.skip_world.store(!render, Ordering::SeqCst);

        let logged = (!render, has_cache);

        if state.last_logged != Some(logged) {
            info!(
                "Present state changed: skip_world={}, has_cache={}, \
                 has_usable_cache={}, forced={}, frozen={}, target_fps={}",
                !render,
                has_cache,
                has_usable_cache,
                forced,
                config.is_world_frozen(),
                config.present.target_fps,
            );

            state.last_logged = Some(logged);
        }

        state.ticks = state.ticks.wrapping_add(1);

        let tick = Frame::new(state.ticks);

        if state.log_throttle.ready(tick) {
            trace!(
                "Present tick: skip_world={}, has_cache={}, period={:.2}ms",
                !render,
                has_cache,
                period * 1000.0
            );
        }

        if render {
            PresentDecision::Render
        } else {
            PresentDecision::Skip
        }
    }

    /// Makes sure the next decision renders the world, so that the cache
    /// gets re-primed.
    pub fn report_cache_miss(&self) {
        self.force_render.store(true, Ordering::SeqCst);
    }

    /// Returns whether the current frame skips world rendering.
    pub fn should_skip_world_rendering(&self) -> bool {
        self.skip_world.load(Ordering::SeqCst)
    }

    /// Returns whether the scheduler currently overrides the host's world
    /// rendering preference.
    pub fn is_overriding(&self) -> bool {
        self.state.lock().overriding
    }

    pub fn reset(&self) {
        self.force_render.store(false, Ordering::SeqCst);
        self.skip_world.store(false, Ordering::SeqCst);
        *self.state.lock() = Default::default();
    }
}
