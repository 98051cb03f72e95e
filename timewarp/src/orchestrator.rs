mod latch;

use std::sync::Arc;

use derivative::Derivative;
use fxhash::FxHashMap;
use glam::{UVec2, Vec2};
use log::{debug, trace, warn};
use timewarp_gpu::{CachedWarpParams, Frame, PresentWarpParams, WarpParams};

pub use self::latch::*;
use crate::{
    measure, present_warp_params, Backend, CachedFrame, Config,
    LatchedWarpState, LogThrottle, Params, RenderedFrame, RenderedView,
    RenderedViewSnapshot, Timewarp, ViewId, WarpEngine, WarpInputs, WarpPoint,
    WarpSource, WarpTransform,
};

/// Back buffer the host is about to present.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct PresentTarget<P>
where
    P: Params,
{
    pub texture: P::Texture,
    pub extent: UVec2,
    pub format: P::Format,
}

/// Outcome of [`Orchestrator::present_cached()`].
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub enum CachedPresent<P>
where
    P: Params,
{
    /// World got rendered this frame; nothing to do.
    NotNeeded,

    /// Cached frame should be warped into the back buffer.
    Warp {
        frame: CachedFrame<P>,
        params: CachedWarpParams,
    },

    /// Nothing was cached; the last presented frame got copied into the
    /// back buffer instead.
    RestoredFallback,

    /// Nothing was cached and there was no fallback either; the back buffer
    /// is left as-is.
    Missed,
}

/// Consumer-side (render thread) driver: captures rendered views, decides
/// and latches warps, feeds the frame cache and presents it.
///
/// Warp decisions are latched per view and per frame, so that every query
/// issued during a frame sees the same warp.
#[derive(Derivative)]
#[derivative(Debug(bound = ""))]
pub struct Orchestrator<P>
where
    P: Params,
{
    timewarp: Arc<Timewarp<P>>,
    config: Config,
    frame: Frame,
    now: f64,
    latches: FxHashMap<(ViewId, WarpSource), Latch>,
    uncaptured_view_log: LogThrottle,
    missing_pose_log: LogThrottle,
    cache_miss_log: LogThrottle,
    warp_log: LogThrottle,
}

impl<P> Orchestrator<P>
where
    P: Params,
{
    pub fn new(timewarp: Arc<Timewarp<P>>) -> Self {
        let config = timewarp.config();

        Self {
            timewarp,
            config,
            frame: Default::default(),
            now: 0.0,
            latches: Default::default(),
            uncaptured_view_log: Default::default(),
            missing_pose_log: Default::default(),
            cache_miss_log: Default::default(),
            warp_log: Default::default(),
        }
    }

    pub fn timewarp(&self) -> &Arc<Timewarp<P>> {
        &self.timewarp
    }

    /// Starts a new frame; latches decided during previous frames stop
    /// being reused and the configuration gets re-read.
    pub fn begin_frame(&mut self, frame: Frame, now: f64) {
        self.frame = frame;
        self.now = now;
        self.config = self.timewarp.config();
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    /// Returns the configuration snapshot taken at the beginning of the
    /// current frame.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Records the state given view is about to be rendered with.
    pub fn capture_rendered_view(&self, view: ViewId, rendered: &RenderedView) {
        let tracker = self.timewarp.tracker();

        let snapshot =
            RenderedViewSnapshot::new(rendered, tracker.pointer_totals(view));

        tracker.publish_rendered_view(view, snapshot);
    }

    /// Returns parameters of the warp to apply over the freshly rendered
    /// view; `None` when the view should be passed through unwarped.
    pub fn warp_rendered_view(
        &mut self,
        view: ViewId,
        depth_available: bool,
    ) -> Option<WarpParams> {
        let tracker = self.timewarp.tracker();
        let snapshot = tracker.latest_rendered_view(view);

        if !snapshot.valid {
            if self.uncaptured_view_log.ready(self.frame) {
                warn!("Cannot warp {:?}: view hasn't been captured", view);
            }

            return None;
        }

        let inputs = WarpInputs {
            source: WarpSource::Fresh,
            rendered: snapshot.rendered_pose(),
            latest: tracker.latest_pose(view).pose(),
            pointer_delta: self.pointer_delta(view, &snapshot),
            depth_available,
            cache_age_ms: 0.0,
            stats: tracker.stats(),
        };

        let state = self.latched_state(view, &inputs);

        if !state.valid {
            return None;
        }

        let params = WarpTransform::new(
            snapshot.rendered_pose(),
            snapshot.pre_view_translation,
            snapshot.projection,
            &state,
        )
        .warp_params(snapshot.projection, &state);

        self.trace_warp(view, WarpSource::Fresh, &state);

        Some(params)
    }

    /// Stores a full render of given view in the frame cache, provided the
    /// asynchronous pipeline is enabled.
    pub fn submit_full_render(
        &self,
        backend: &mut dyn Backend<P>,
        view: ViewId,
        rendered: &RenderedFrame<P>,
    ) -> bool {
        if !self.config.is_async_pipeline_enabled() {
            return false;
        }

        measure("timewarp::submit_full_render", || {
            self.timewarp.cache().update(
                backend,
                view,
                rendered,
                self.frame,
                self.now,
            )
        })
    }

    /// Decides what to present for given view when world rendering got
    /// skipped this frame.
    ///
    /// When nothing is cached, reports a cache miss (so that the next frame
    /// renders the world) and repeats the last presented frame, if there's
    /// one matching the back buffer.
    pub fn present_cached(
        &mut self,
        backend: &mut dyn Backend<P>,
        view: ViewId,
        target: &PresentTarget<P>,
    ) -> CachedPresent<P> {
        if !self.config.present.enabled
            || !self.timewarp.should_skip_world_rendering()
        {
            return CachedPresent::NotNeeded;
        }

        if !view.is_tracked() {
            return CachedPresent::Missed;
        }

        let cache = self.timewarp.cache();

        cache.ensure_present_fallback(
            backend,
            view,
            target.extent,
            target.format,
        );

        let Some(frame) = cache.cached_frame(view) else {
            self.timewarp.report_cache_miss();

            if self.cache_miss_log.ready(self.frame) {
                warn!("Cache miss for {:?}; forcing a full render", view);
            }

            return match cache.present_fallback(view) {
                Some(fallback)
                    if fallback.matches(target.extent, target.format) =>
                {
                    backend.copy_texture(&fallback.texture, &target.texture);

                    CachedPresent::RestoredFallback
                }

                _ => {
                    cache.set_present_fallback_valid(view, false);

                    CachedPresent::Missed
                }
            };
        };

        let constants = frame.constants;
        let tracker = self.timewarp.tracker();
        let snapshot = tracker.latest_rendered_view(view);

        let inputs = WarpInputs {
            source: WarpSource::Cached,
            rendered: constants.rendered_pose(),
            latest: tracker.latest_pose(view).pose(),
            pointer_delta: self.pointer_delta(view, &snapshot),
            depth_available: constants.depth_available,
            cache_age_ms: constants.age_ms(self.now),
            stats: tracker.stats(),
        };

        let state = self.latched_state(view, &inputs);

        let applied = if state.valid {
            state
        } else {
            LatchedWarpState {
                depth_available: state.depth_available,
                ..Default::default()
            }
        };

        let params = WarpTransform::new(
            constants.rendered_pose(),
            constants.pre_view_translation,
            constants.projection,
            &applied,
        )
        .cached_warp_params(&constants, &applied, &self.config);

        self.trace_warp(view, WarpSource::Cached, &state);

        CachedPresent::Warp { frame, params }
    }

    /// Remembers the back buffer about to be presented, so that it can be
    /// repeated on a cache miss.
    pub fn finish_present(
        &self,
        backend: &mut dyn Backend<P>,
        view: ViewId,
        target: &PresentTarget<P>,
    ) {
        if !self.config.present.enabled {
            return;
        }

        let cache = self.timewarp.cache();

        cache.ensure_present_fallback(
            backend,
            view,
            target.extent,
            target.format,
        );

        let Some(fallback) = cache.present_fallback_target(view) else {
            return;
        };

        if !fallback.matches(target.extent, target.format) {
            return;
        }

        backend.copy_texture(&target.texture, &fallback.texture);
        cache.set_present_fallback_valid(view, true);
    }

    /// Returns parameters of the rotation-only warp applied to the final
    /// back buffer, after the UI got composited.
    pub fn present_rotation_warp(
        &self,
        view: ViewId,
        back_buffer: UVec2,
    ) -> Option<PresentWarpParams> {
        if !self.config.warp.after_ui {
            return None;
        }

        if self.config.present.enabled
            && self.timewarp.should_skip_world_rendering()
        {
            return None;
        }

        let tracker = self.timewarp.tracker();
        let snapshot = tracker.latest_rendered_view(view);

        if !snapshot.valid {
            return None;
        }

        let latest = tracker.latest_pose(view).pose()?;

        let state = WarpEngine::new(&self.config).evaluate_rotation(
            snapshot.rendered_orientation,
            Some(latest.orientation),
            &tracker.stats(),
        );

        if !state.valid {
            return None;
        }

        trace!(
            "Warping {:?} after UI: yaw={:.3}, pitch={:.3}, roll={:.3}, \
             weight={:.3}",
            view,
            state.delta.yaw,
            state.delta.pitch,
            state.delta.roll,
            state.weight,
        );

        Some(present_warp_params(&snapshot, &state, back_buffer))
    }

    pub fn invalidate_latch(&mut self, view: ViewId) {
        self.latches.retain(|(latched_view, _), _| *latched_view != view);
    }

    pub fn invalidate_all_latches(&mut self) {
        debug!("Invalidating all warp latches");

        self.latches.clear();
    }

    /// Returns whether the fresh-frame warp should run at given point of
    /// the host's pipeline.
    pub fn should_warp_at(&self, point: WarpPoint) -> bool {
        self.config.warp.point == point
    }

    /// Returns whether cached frames get presented before the UI is
    /// composited, keeping the HUD stable.
    pub fn keeps_hud_stable(&self) -> bool {
        self.config.present.allow_hud_stable
    }

    fn latched_state(
        &mut self,
        view: ViewId,
        inputs: &WarpInputs,
    ) -> LatchedWarpState {
        let key = (view, inputs.source);

        if let Some(state) = self.latches.get(&key).and_then(|latch| {
            latch.get(self.frame, self.config.debug.freeze_warp)
        }) {
            return state;
        }

        if inputs.latest.is_none() && self.missing_pose_log.ready(self.frame) {
            warn!("No pose available for {:?}; passing through", view);
        }

        let state = measure("timewarp::evaluate", || {
            WarpEngine::new(&self.config).evaluate(inputs)
        });

        self.latches.insert(key, Latch::new(self.frame, state));

        self.timewarp
            .tracker()
            .publish_delta(view, state.to_delta_snapshot());

        state
    }

    /// Returns pointer motion accumulated since given view got captured.
    fn pointer_delta(
        &self,
        view: ViewId,
        snapshot: &RenderedViewSnapshot,
    ) -> Option<Vec2> {
        if !self.config.input.enabled || !snapshot.valid {
            return None;
        }

        let totals = self.timewarp.tracker().pointer_totals(view);

        Some(totals - snapshot.pointer_total)
    }

    fn trace_warp(
        &mut self,
        view: ViewId,
        source: WarpSource,
        state: &LatchedWarpState,
    ) {
        if !self.warp_log.ready(self.frame) {
            return;
        }

        trace!(
            "Warping {:?} ({:?}): yaw={:.3}, pitch={:.3}, roll={:.3}, \
             translation={}, weight={:.3}, translation_enabled={}",
            view,
            source,
            state.delta.yaw,
            state.delta.pitch,
            state.delta.roll,
            state.delta_translation,
            state.weight,
            state.translation_enabled,
        );
    }
}
